//! Subcommand runners
//!
//! Each runner reads its inputs, calls the engine and writes results,
//! returning a [`Report`](crate::report::Report) for the run.

pub mod combine;
pub mod critical;
pub mod purge;

use std::path::{Path, PathBuf};

use sieve_css::TokenizeWarning;

use crate::error::CliError;

pub(crate) fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    let write_err = |source: std::io::Error| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, contents).map_err(write_err)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Where to write output derived from `source`.
///
/// Without a suffix the output replaces the source name; with one,
/// `site.css` becomes `site.<suffix>.css`. Outputs land next to the source
/// unless `out_dir` is given.
pub(crate) fn output_path(source: &Path, out_dir: Option<&Path>, suffix: Option<&str>) -> PathBuf {
    let file_name = match suffix {
        None => source.file_name().map(PathBuf::from).unwrap_or_default(),
        Some(suffix) => {
            let stem = source
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            PathBuf::from(format!("{stem}.{suffix}.css"))
        }
    };

    match out_dir {
        Some(dir) => dir.join(file_name),
        None => source.with_file_name(file_name),
    }
}

/// Log tokenizer warnings for a file and return them as report strings
pub(crate) fn report_warnings(path: &Path, warnings: &[TokenizeWarning]) -> Vec<String> {
    warnings
        .iter()
        .map(|warning| {
            tracing::warn!("{}: {}", path.display(), warning);
            warning.to_string()
        })
        .collect()
}
