//! Run reports
//!
//! Per-file outcomes plus totals, printed as a short summary or as JSON.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;
use sieve_css::{CombinedAtRule, PartitionStats};

use crate::error::CliError;

/// What a pass did to one stylesheet
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum FileDetail {
    Purge {
        stats: PartitionStats,
    },
    Critical {
        stats: PartitionStats,
        critical_selectors: Vec<String>,
    },
    Combine {
        merged_count: usize,
        groups: Vec<CombinedAtRule>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub original_bytes: usize,
    pub output_bytes: usize,
    pub detail: FileDetail,
    /// Malformed input skipped while tokenizing
    pub warnings: Vec<String>,
    /// Files written (empty on a dry run)
    pub written: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub files: usize,
    pub failed: usize,
    pub original_rules: usize,
    pub kept_rules: usize,
    pub dropped_rules: usize,
    pub merged_count: usize,
    pub original_bytes: usize,
    pub output_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub command: &'static str,
    pub dry_run: bool,
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
    pub totals: Totals,
}

impl Report {
    pub fn new(command: &'static str, dry_run: bool) -> Self {
        Self {
            command,
            dry_run,
            files: Vec::new(),
            failures: Vec::new(),
            totals: Totals::default(),
        }
    }

    /// Build a report from batch outcomes, paired with their inputs
    pub fn collect(
        command: &'static str,
        dry_run: bool,
        inputs: &[PathBuf],
        outcomes: Vec<Result<FileReport, CliError>>,
    ) -> Self {
        let mut report = Self::new(command, dry_run);
        for (path, outcome) in inputs.iter().zip(outcomes) {
            match outcome {
                Ok(file) => report.push(file),
                Err(err) => {
                    tracing::error!("{}: {}", path.display(), err);
                    report.push_failure(path.clone(), &err);
                }
            }
        }
        report
    }

    pub fn push(&mut self, file: FileReport) {
        let totals = &mut self.totals;
        totals.files += 1;
        totals.original_bytes += file.original_bytes;
        totals.output_bytes += file.output_bytes;
        match &file.detail {
            FileDetail::Purge { stats } | FileDetail::Critical { stats, .. } => {
                totals.original_rules += stats.original_rules;
                totals.kept_rules += stats.kept_rules;
                totals.dropped_rules += stats.dropped_rules;
            }
            FileDetail::Combine { merged_count, .. } => totals.merged_count += merged_count,
        }
        self.files.push(file);
    }

    pub fn push_failure(&mut self, path: PathBuf, err: &CliError) {
        self.totals.failed += 1;
        self.failures.push(FileFailure {
            path,
            error: err.to_string(),
        });
    }

    pub fn render(&self, json: bool) -> Result<String, serde_json::Error> {
        if json {
            serde_json::to_string_pretty(self)
        } else {
            Ok(self.summary())
        }
    }

    /// Human readable summary
    pub fn summary(&self) -> String {
        let mut out = String::new();

        for file in &self.files {
            let _ = write!(out, "{}: ", file.path.display());
            let _ = match &file.detail {
                FileDetail::Purge { stats } => write!(
                    out,
                    "kept {} of {} rules, removed {}",
                    stats.kept_rules, stats.original_rules, stats.dropped_rules
                ),
                FileDetail::Critical {
                    stats,
                    critical_selectors,
                } => write!(
                    out,
                    "{} critical rules, {} remaining ({} critical selectors)",
                    stats.kept_rules,
                    stats.dropped_rules,
                    critical_selectors.len()
                ),
                FileDetail::Combine { merged_count, groups } => write!(
                    out,
                    "merged {} duplicate @media blocks into {} groups",
                    merged_count,
                    groups.len()
                ),
            };
            let _ = writeln!(
                out,
                ", {} -> {} bytes",
                file.original_bytes, file.output_bytes
            );
            for warning in &file.warnings {
                let _ = writeln!(out, "  warning: {warning}");
            }
        }

        for failure in &self.failures {
            let _ = writeln!(out, "{}: FAILED: {}", failure.path.display(), failure.error);
        }

        let totals = &self.totals;
        let _ = write!(
            out,
            "{}: {} files, {} failed, {} -> {} bytes",
            self.command, totals.files, totals.failed, totals.original_bytes, totals.output_bytes
        );
        if self.dry_run {
            out.push_str(" (dry run, nothing written)");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purge_file(path: &str, kept: usize, dropped: usize) -> FileReport {
        FileReport {
            path: PathBuf::from(path),
            original_bytes: 100,
            output_bytes: 60,
            detail: FileDetail::Purge {
                stats: PartitionStats {
                    original_rules: kept + dropped,
                    kept_rules: kept,
                    dropped_rules: dropped,
                    removed_selectors: vec![".unused".to_string()],
                },
            },
            warnings: Vec::new(),
            written: Vec::new(),
        }
    }

    #[test]
    fn test_totals() {
        let mut report = Report::new("purge", false);
        report.push(purge_file("a.css", 3, 1));
        report.push(purge_file("b.css", 2, 2));
        report.push_failure(PathBuf::from("c.css"), &CliError::NoStylesheets);

        assert_eq!(
            report.totals,
            Totals {
                files: 2,
                failed: 1,
                original_rules: 8,
                kept_rules: 5,
                dropped_rules: 3,
                merged_count: 0,
                original_bytes: 200,
                output_bytes: 120,
            }
        );
    }

    #[test]
    fn test_collect_pairs_inputs() {
        let inputs = vec![PathBuf::from("a.css"), PathBuf::from("b.css")];
        let outcomes = vec![Ok(purge_file("a.css", 1, 0)), Err(CliError::Panicked("boom".to_string()))];
        let report = Report::collect("purge", true, &inputs, outcomes);

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.failures[0].path, PathBuf::from("b.css"));
        assert!(report.failures[0].error.contains("boom"));
    }

    #[test]
    fn test_json_report() {
        let mut report = Report::new("purge", false);
        report.push(purge_file("a.css", 1, 1));

        let json: serde_json::Value = serde_json::from_str(&report.render(true).unwrap()).unwrap();
        assert_eq!(json["command"], "purge");
        assert_eq!(json["files"][0]["detail"]["mode"], "purge");
        assert_eq!(json["files"][0]["detail"]["stats"]["removed_selectors"][0], ".unused");
        assert_eq!(json["totals"]["kept_rules"], 1);
    }

    #[test]
    fn test_summary_mentions_dry_run() {
        let mut report = Report::new("combine", true);
        report.push(FileReport {
            path: PathBuf::from("a.css"),
            original_bytes: 10,
            output_bytes: 8,
            detail: FileDetail::Combine {
                merged_count: 1,
                groups: Vec::new(),
            },
            warnings: vec!["Dangling closing brace at offset 0, skipped".to_string()],
            written: Vec::new(),
        });

        let summary = report.render(false).unwrap();
        assert!(summary.contains("a.css: merged 1 duplicate @media blocks"));
        assert!(summary.contains("warning: Dangling"));
        assert!(summary.ends_with("(dry run, nothing written)"));
    }
}
