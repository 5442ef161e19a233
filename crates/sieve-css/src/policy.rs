//! Match Policy
//!
//! Per-invocation configuration deciding which otherwise unused constructs
//! are preserved. Patterns are compiled once here and passed by reference
//! into every pure engine function.

use std::collections::BTreeSet;
use std::fmt;

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::error::CssError;
use crate::selector::Identifier;

/// Class names that keep an element out of the critical set even inside
/// the positional window
pub const DEFAULT_CRITICAL_DENYLIST: &[&str] = &[
    "footer",
    "modal",
    "popup",
    "overlay",
    "tooltip",
    "dropdown",
    "carousel",
    "slider",
    "lazy",
    "hidden",
    "offscreen",
    "below-fold",
    "comments",
    "newsletter",
    "cookie",
];

/// A safelist entry
#[derive(Clone)]
pub enum SafelistEntry {
    /// Matches a whole selector or one bare identifier exactly
    Literal(String),
    /// Shell-style pattern such as `keep-*`
    Glob { pattern: String, matcher: GlobMatcher },
    /// Regular expression written as `/.../`
    Pattern(Regex),
}

impl SafelistEntry {
    /// Parse a safelist entry.
    ///
    /// `/.../` is a regular expression, text containing `*` or `?` is a glob,
    /// anything else is literal.
    pub fn parse(entry: &str) -> Result<Self, CssError> {
        let entry = entry.trim();

        if entry.len() >= 2 && entry.starts_with('/') && entry.ends_with('/') {
            let source = &entry[1..entry.len() - 1];
            let regex = Regex::new(source).map_err(|e| CssError::InvalidSafelist {
                pattern: entry.to_string(),
                message: e.to_string(),
            })?;
            return Ok(Self::Pattern(regex));
        }

        if entry.contains(['*', '?']) {
            let glob = Glob::new(entry).map_err(|e| CssError::InvalidSafelist {
                pattern: entry.to_string(),
                message: e.to_string(),
            })?;
            return Ok(Self::Glob {
                pattern: entry.to_string(),
                matcher: glob.compile_matcher(),
            });
        }

        Ok(Self::Literal(entry.to_string()))
    }

    /// Whether this entry matches a selector (normalized), its
    /// pseudo-stripped form, or one of its identifiers
    pub fn matches(&self, selector: &str, stripped: &str, identifiers: &[Identifier]) -> bool {
        match self {
            Self::Literal(text) => {
                text == selector
                    || text == stripped
                    || identifiers.iter().any(|ident| ident.name() == text)
            }
            Self::Glob { matcher, .. } => {
                matcher.is_match(selector)
                    || identifiers.iter().any(|ident| matcher.is_match(ident.name()))
            }
            Self::Pattern(regex) => {
                regex.is_match(selector)
                    || identifiers.iter().any(|ident| regex.is_match(ident.name()))
            }
        }
    }
}

impl fmt::Debug for SafelistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "Literal({text:?})"),
            Self::Glob { pattern, .. } => write!(f, "Glob({pattern:?})"),
            Self::Pattern(regex) => write!(f, "Pattern(/{}/)", regex.as_str()),
        }
    }
}

/// Positional bounds for critical CSS extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriticalWindow {
    /// Elements whose tag names count as critical
    pub tag_limit: usize,
    /// Elements whose classes and ids count as critical
    pub class_limit: usize,
}

impl Default for CriticalWindow {
    fn default() -> Self {
        Self {
            tag_limit: 8,
            class_limit: 12,
        }
    }
}

/// Preservation policy for one engine invocation
#[derive(Debug, Clone)]
pub struct MatchPolicy {
    pub safelist: Vec<SafelistEntry>,
    /// Keep `:root` rules and rules declaring custom properties
    pub preserve_variables: bool,
    /// Keep rules whose selectors are state dependent
    pub preserve_pseudo: bool,
    pub critical_window: CriticalWindow,
    pub critical_denylist: BTreeSet<String>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            safelist: Vec::new(),
            preserve_variables: true,
            preserve_pseudo: true,
            critical_window: CriticalWindow::default(),
            critical_denylist: DEFAULT_CRITICAL_DENYLIST
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl MatchPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and append safelist entries
    pub fn with_safelist<I, S>(mut self, entries: I) -> Result<Self, CssError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in entries {
            self.safelist.push(SafelistEntry::parse(entry.as_ref())?);
        }
        Ok(self)
    }

    pub fn preserve_variables(mut self, preserve: bool) -> Self {
        self.preserve_variables = preserve;
        self
    }

    pub fn preserve_pseudo(mut self, preserve: bool) -> Self {
        self.preserve_pseudo = preserve;
        self
    }

    pub fn critical_window(mut self, window: CriticalWindow) -> Self {
        self.critical_window = window;
        self
    }

    /// Replace the critical denylist. Terms are stored lowercased.
    pub fn critical_denylist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.critical_denylist = names
            .into_iter()
            .map(|name| name.into().to_lowercase())
            .collect();
        self
    }

    /// Whether any safelist entry matches the selector
    pub fn is_safelisted(&self, selector: &str, stripped: &str, identifiers: &[Identifier]) -> bool {
        self.safelist
            .iter()
            .any(|entry| entry.matches(selector, stripped, identifiers))
    }

    /// Whether a class, id or tag name is denied from the critical set.
    ///
    /// A name is denied when it equals a denylist term or one of its
    /// `-`/`_` separated segments does (`site-footer` matches `footer`).
    pub fn is_critical_denied(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.critical_denylist.contains(&lower)
            || lower
                .split(['-', '_'])
                .any(|segment| self.critical_denylist.contains(segment))
    }
}
