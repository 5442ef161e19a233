//! File Discovery
//!
//! Expands the paths given on the command line into stylesheets and
//! content documents. Directories are walked recursively; explicit files
//! are taken as given.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use sieve_css::{DocumentKind, SourceDocument};
use walkdir::WalkDir;

use crate::error::CliError;

/// Suffixes of files written by previous runs
const GENERATED_SUFFIXES: &[&str] = &[".unused.css", ".critical.css", ".remaining.css"];

pub struct Discovery {
    ignore: GlobSet,
}

impl Discovery {
    pub fn new(patterns: &[String]) -> Result<Self, CliError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|source| CliError::Ignore {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let ignore = builder.build().map_err(|source| CliError::Ignore {
            pattern: patterns.join(", "),
            source,
        })?;
        Ok(Self { ignore })
    }

    /// Whether a path or its file name matches an ignore pattern
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignore.is_match(path)
            || path
                .file_name()
                .is_some_and(|name| self.ignore.is_match(Path::new(name)))
    }

    /// Stylesheets under the given paths, sorted and deduplicated
    pub fn stylesheets(&self, roots: &[PathBuf]) -> Vec<PathBuf> {
        self.files(roots, is_source_stylesheet)
    }

    /// Content documents under the given paths.
    ///
    /// Unreadable files are logged and skipped. With `utility_markup`,
    /// markup files are scanned as utility-class markup.
    pub fn documents(&self, roots: &[PathBuf], utility_markup: bool) -> Vec<SourceDocument> {
        let mut documents = Vec::new();

        for path in self.files(roots, |path| DocumentKind::from_path(path).is_some()) {
            let Some(mut kind) = DocumentKind::from_path(&path) else {
                continue;
            };
            if utility_markup && kind == DocumentKind::Markup {
                kind = DocumentKind::UtilityMarkup;
            }

            match std::fs::read_to_string(&path) {
                Ok(content) => documents.push(SourceDocument::new(path, content, kind)),
                Err(err) => tracing::warn!("Skipping content file {}: {}", path.display(), err),
            }
        }

        tracing::debug!("Discovered {} content documents", documents.len());
        documents
    }

    fn files(&self, roots: &[PathBuf], accept: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
        let mut found = Vec::new();

        for root in roots {
            if root.is_file() {
                if !self.is_ignored(root) {
                    found.push(root.clone());
                }
                continue;
            }
            if !root.exists() {
                tracing::warn!("Path does not exist: {}", root.display());
                continue;
            }

            let walker = WalkDir::new(root)
                .follow_links(true)
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !self.is_ignored(entry.path()));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::warn!("Skipping unreadable entry: {}", err);
                        continue;
                    }
                };
                if entry.file_type().is_file() && accept(entry.path()) {
                    found.push(entry.into_path());
                }
            }
        }

        found.sort();
        found.dedup();
        found
    }
}

fn is_source_stylesheet(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let name = name.to_ascii_lowercase();
    name.ends_with(".css") && !GENERATED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
