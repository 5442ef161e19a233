//! Critical Set
//!
//! Approximates the above-the-fold selectors of a page by position: the
//! first rendered elements of `<body>` contribute their tags, classes and
//! ids. There is no layout; "first" means document order.

use std::collections::BTreeSet;

use crate::markup;
use crate::matcher::IdentifierLookup;
use crate::policy::MatchPolicy;

/// Tags that are always critical
const ROOT_TAGS: &[&str] = &["html", "body"];

/// Selectors treated as above the fold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriticalSet {
    /// Entries as simple selectors (`header`, `.hero`, `#main`) in discovery order
    selectors: Vec<String>,
    classes: BTreeSet<String>,
    ids: BTreeSet<String>,
    tags: BTreeSet<String>,
}

impl CriticalSet {
    /// Derive the critical set from a page.
    ///
    /// Only rendered elements count toward the window: anything inside
    /// `<head>`, `<script>`, `<style>`, `<noscript>` or `<template>` is
    /// skipped. An element carrying a denylisted class or id still uses
    /// up its position but contributes nothing.
    pub fn from_markup(html: &str, policy: &MatchPolicy) -> Self {
        let window = policy.critical_window;
        let limit = window.tag_limit.max(window.class_limit);
        let mut set = Self::default();

        for tag in ROOT_TAGS {
            set.insert_tag(tag);
        }

        let rendered = markup::elements(html).into_iter().filter(|e| e.rendered);
        for (position, element) in rendered.take(limit).enumerate() {
            let denied = element
                .classes
                .iter()
                .chain(&element.ids)
                .any(|name| policy.is_critical_denied(name));
            if denied {
                tracing::trace!("Skipping below-the-fold element <{}>", element.tag);
                continue;
            }

            if position < window.tag_limit {
                set.insert_tag(&element.tag);
            }
            if position < window.class_limit {
                for class in &element.classes {
                    set.insert_class(class);
                }
                for id in &element.ids {
                    set.insert_id(id);
                }
            }
        }

        tracing::debug!("Critical set has {} selectors", set.selectors.len());
        set
    }

    /// Entries as simple selectors in discovery order
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn insert_tag(&mut self, tag: &str) {
        let tag = tag.to_ascii_lowercase();
        if self.tags.insert(tag.clone()) {
            self.selectors.push(tag);
        }
    }

    pub fn insert_class(&mut self, class: &str) {
        if self.classes.insert(class.to_string()) {
            self.selectors.push(format!(".{class}"));
        }
    }

    pub fn insert_id(&mut self, id: &str) {
        if self.ids.insert(id.to_string()) {
            self.selectors.push(format!("#{id}"));
        }
    }
}

impl IdentifierLookup for CriticalSet {
    fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    fn has_id(&self, name: &str) -> bool {
        self.ids.contains(name)
    }

    fn has_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    fn is_empty(&self) -> bool {
        CriticalSet::is_empty(self)
    }
}
