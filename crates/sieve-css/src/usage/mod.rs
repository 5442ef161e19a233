//! Usage Set Builder
//!
//! Collects the classes, ids, tags and utility tokens referenced by a
//! batch of content documents. One extractor per document kind; the
//! result is a union of sets, so document order does not matter.

mod extractor;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::matcher::IdentifierLookup;

pub use extractor::{
    ComponentScriptExtractor, DocumentExtractor, Extractor, MarkupExtractor,
    UtilityMarkupExtractor,
};

/// Identifiers referenced by content documents
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSet {
    pub classes: BTreeSet<String>,
    pub ids: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    /// Verbatim utility tokens (`md:flex`, `w-1/2`), matched as classes
    pub utilities: BTreeSet<String>,
}

impl UsageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of identifiers across all sets
    pub fn len(&self) -> usize {
        self.classes.len() + self.ids.len() + self.tags.len() + self.utilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union another set into this one
    pub fn merge(&mut self, other: UsageSet) {
        self.classes.extend(other.classes);
        self.ids.extend(other.ids);
        self.tags.extend(other.tags);
        self.utilities.extend(other.utilities);
    }
}

impl IdentifierLookup for UsageSet {
    fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name) || self.utilities.contains(name)
    }

    fn has_id(&self, name: &str) -> bool {
        self.ids.contains(name)
    }

    fn has_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    fn is_empty(&self) -> bool {
        UsageSet::is_empty(self)
    }
}

/// How a content document is scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// HTML pages and fragments
    Markup,
    /// Components and scripts (JSX, Vue, Svelte, plain JS/TS)
    ComponentScript,
    /// Markup styled with utility classes
    UtilityMarkup,
}

impl DocumentKind {
    /// Classify a file by extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" | "xhtml" => Some(Self::Markup),
            "js" | "mjs" | "cjs" | "jsx" | "ts" | "tsx" | "vue" | "svelte" | "astro" => {
                Some(Self::ComponentScript)
            }
            _ => None,
        }
    }
}

/// A content document to scan for usage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub content: String,
    pub kind: DocumentKind,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind,
        }
    }
}

/// Build the usage set for a batch of documents
pub fn build_usage_set(documents: &[SourceDocument]) -> UsageSet {
    let mut markup = None;
    let mut script = None;
    let mut utility = None;
    let mut usage = UsageSet::new();

    for document in documents {
        let extractor = match document.kind {
            DocumentKind::Markup => markup.get_or_insert_with(|| DocumentExtractor::for_kind(DocumentKind::Markup)),
            DocumentKind::ComponentScript => {
                script.get_or_insert_with(|| DocumentExtractor::for_kind(DocumentKind::ComponentScript))
            }
            DocumentKind::UtilityMarkup => {
                utility.get_or_insert_with(|| DocumentExtractor::for_kind(DocumentKind::UtilityMarkup))
            }
        };

        let found = extractor.extract(&document.content);
        tracing::debug!(
            "Extracted {} identifiers from {}",
            found.len(),
            document.path.display()
        );
        usage.merge(found);
    }

    tracing::debug!(
        "Usage set: {} classes, {} ids, {} tags, {} utilities from {} documents",
        usage.classes.len(),
        usage.ids.len(),
        usage.tags.len(),
        usage.utilities.len(),
        documents.len()
    );
    usage
}
