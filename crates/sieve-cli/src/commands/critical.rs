//! `sieve critical`

use sieve_css::{CriticalSet, split_critical, tokenize_with_warnings};

use super::{output_path, read_file, report_warnings, write_file};
use crate::config::{Config, CriticalArgs};
use crate::error::CliError;
use crate::format::render_css;
use crate::inline::inline_critical;
use crate::report::{FileDetail, FileReport, Report};

pub fn run(args: &CriticalArgs, config: &Config, dry_run: bool) -> Result<Report, CliError> {
    let policy = config.match_policy()?;

    let html = read_file(&args.html)?;
    let critical = CriticalSet::from_markup(&html, &policy);
    tracing::info!(
        "{}: {} critical selectors",
        args.html.display(),
        critical.len()
    );

    let css = read_file(&args.css)?;
    let tokenized = tokenize_with_warnings(&css);
    let warnings = report_warnings(&args.css, &tokenized.warnings);

    let result = split_critical(&tokenized.blocks, &critical, &policy);
    let minify = config.output.minify;
    let critical_css = render_css(result.kept_css(), minify);
    let remaining_css = render_css(result.dropped_css(), minify);

    let out_dir = config.output.out_dir.as_deref();
    let mut written = Vec::new();
    if !dry_run {
        let target = output_path(&args.css, out_dir, Some("critical"));
        write_file(&target, &critical_css)?;
        written.push(target);

        let target = output_path(&args.css, out_dir, Some("remaining"));
        write_file(&target, &remaining_css)?;
        written.push(target);

        if config.critical.inline {
            let target = match (out_dir, args.html.file_name()) {
                (Some(dir), Some(name)) => dir.join(name),
                _ => args.html.clone(),
            };
            write_file(&target, &inline_critical(&html, &critical_css))?;
            written.push(target);
        }
    }

    let mut report = Report::new("critical", dry_run);
    report.push(FileReport {
        path: args.css.clone(),
        original_bytes: css.len(),
        output_bytes: critical_css.len(),
        detail: FileDetail::Critical {
            stats: result.stats(),
            critical_selectors: critical.selectors().to_vec(),
        },
        warnings,
        written,
    });
    Ok(report)
}
