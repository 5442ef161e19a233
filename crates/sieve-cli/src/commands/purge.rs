//! `sieve purge`

use std::path::{Path, PathBuf};

use sieve_css::{MatchPolicy, UsageSet, build_usage_set, partition, tokenize_with_warnings};

use super::{output_path, read_file, report_warnings, write_file};
use crate::batch::run_batch;
use crate::config::{Config, PurgeArgs};
use crate::discover::Discovery;
use crate::error::CliError;
use crate::format::render_css;
use crate::report::{FileDetail, FileReport, Report};

pub fn run(args: &PurgeArgs, config: &Config, dry_run: bool) -> Result<Report, CliError> {
    let policy = config.match_policy()?;
    let discovery = Discovery::new(&config.content.ignore)?;

    let stylesheets = discovery.stylesheets(&args.css);
    if stylesheets.is_empty() {
        return Err(CliError::NoStylesheets);
    }

    let documents = discovery.documents(&config.content.paths, config.content.utility_markup);
    if documents.is_empty() && !args.allow_empty_usage {
        return Err(CliError::NoContent);
    }
    let usage = build_usage_set(&documents);
    tracing::info!(
        "Usage set built from {} documents: {} identifiers",
        documents.len(),
        usage.len()
    );

    let outcomes = run_batch(&stylesheets, config.batch.concurrency, |path: &PathBuf| {
        purge_file(path, &usage, &policy, config, dry_run)
    });
    Ok(Report::collect("purge", dry_run, &stylesheets, outcomes))
}

fn purge_file(
    path: &Path,
    usage: &UsageSet,
    policy: &MatchPolicy,
    config: &Config,
    dry_run: bool,
) -> Result<FileReport, CliError> {
    let css = read_file(path)?;
    let tokenized = tokenize_with_warnings(&css);
    let warnings = report_warnings(path, &tokenized.warnings);

    let result = partition(&tokenized.blocks, usage, policy);
    let stats = result.stats();
    let kept = render_css(result.kept_css(), config.output.minify);
    tracing::info!(
        "{}: kept {} of {} rules",
        path.display(),
        stats.kept_rules,
        stats.original_rules
    );

    let out_dir = config.output.out_dir.as_deref();
    let mut written = Vec::new();
    if !dry_run {
        let target = output_path(path, out_dir, None);
        write_file(&target, &kept)?;
        written.push(target);

        if config.purge.emit_dropped {
            let target = output_path(path, out_dir, Some("unused"));
            write_file(&target, &render_css(result.dropped_css(), config.output.minify))?;
            written.push(target);
        }
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        original_bytes: css.len(),
        output_bytes: kept.len(),
        detail: FileDetail::Purge { stats },
        warnings,
        written,
    })
}
