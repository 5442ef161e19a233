//! `sieve combine`

use std::path::{Path, PathBuf};

use sieve_css::{combine, tokenize_with_warnings};

use super::{output_path, read_file, report_warnings, write_file};
use crate::batch::run_batch;
use crate::config::{CombineArgs, Config};
use crate::discover::Discovery;
use crate::error::CliError;
use crate::format::render_css;
use crate::report::{FileDetail, FileReport, Report};

pub fn run(args: &CombineArgs, config: &Config, dry_run: bool) -> Result<Report, CliError> {
    let discovery = Discovery::new(&config.content.ignore)?;
    let stylesheets = discovery.stylesheets(&args.css);
    if stylesheets.is_empty() {
        return Err(CliError::NoStylesheets);
    }

    let outcomes = run_batch(&stylesheets, config.batch.concurrency, |path: &PathBuf| {
        combine_file(path, config, dry_run)
    });
    Ok(Report::collect("combine", dry_run, &stylesheets, outcomes))
}

fn combine_file(path: &Path, config: &Config, dry_run: bool) -> Result<FileReport, CliError> {
    let css = read_file(path)?;
    let tokenized = tokenize_with_warnings(&css);
    let warnings = report_warnings(path, &tokenized.warnings);

    let combined = combine(&tokenized.blocks);
    let output = render_css(combined.to_css(), config.output.minify);
    if combined.merged_count > 0 {
        tracing::info!(
            "{}: merged {} duplicate @media blocks",
            path.display(),
            combined.merged_count
        );
    }

    let mut written = Vec::new();
    if !dry_run {
        let target = output_path(path, config.output.out_dir.as_deref(), None);
        write_file(&target, &output)?;
        written.push(target);
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        original_bytes: css.len(),
        output_bytes: output.len(),
        detail: FileDetail::Combine {
            merged_count: combined.merged_count,
            groups: combined.groups,
        },
        warnings,
        written,
    })
}
