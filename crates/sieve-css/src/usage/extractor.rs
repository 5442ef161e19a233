//! Document Extractors
//!
//! One extractor per document kind, all behind the same [`Extractor`]
//! contract. Pattern-based extraction over arbitrary source text is a
//! heuristic: unterminated or malformed attribute syntax simply does not
//! match and is skipped.

use std::collections::BTreeSet;

use regex::{Captures, Regex};

use super::{DocumentKind, UsageSet};
use crate::markup;
use crate::selector::{Identifier, identifiers};

/// Extraction contract shared by every document kind
pub trait Extractor {
    /// All identifiers referenced by a document
    fn extract(&self, content: &str) -> UsageSet;

    fn extract_classes(&self, content: &str) -> BTreeSet<String> {
        self.extract(content).classes
    }

    fn extract_ids(&self, content: &str) -> BTreeSet<String> {
        self.extract(content).ids
    }

    fn extract_tags(&self, content: &str) -> BTreeSet<String> {
        self.extract(content).tags
    }
}

/// Extractor selected by document kind
#[derive(Debug, Clone)]
pub enum DocumentExtractor {
    Markup(MarkupExtractor),
    ComponentScript(ComponentScriptExtractor),
    UtilityMarkup(UtilityMarkupExtractor),
}

impl DocumentExtractor {
    pub fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Markup => Self::Markup(MarkupExtractor),
            DocumentKind::ComponentScript => Self::ComponentScript(ComponentScriptExtractor::new()),
            DocumentKind::UtilityMarkup => Self::UtilityMarkup(UtilityMarkupExtractor::new()),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Markup(_) => DocumentKind::Markup,
            Self::ComponentScript(_) => DocumentKind::ComponentScript,
            Self::UtilityMarkup(_) => DocumentKind::UtilityMarkup,
        }
    }
}

impl Extractor for DocumentExtractor {
    fn extract(&self, content: &str) -> UsageSet {
        match self {
            Self::Markup(extractor) => extractor.extract(content),
            Self::ComponentScript(extractor) => extractor.extract(content),
            Self::UtilityMarkup(extractor) => extractor.extract(content),
        }
    }
}

// ============================================================================
// Markup
// ============================================================================

/// Tags plus `class`/`id` attribute tokens of every element
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupExtractor;

impl Extractor for MarkupExtractor {
    fn extract(&self, content: &str) -> UsageSet {
        let mut usage = UsageSet::new();
        for element in markup::elements(content) {
            usage.tags.insert(element.tag);
            usage.classes.extend(element.classes);
            usage.ids.extend(element.ids);
        }
        usage
    }
}

// ============================================================================
// Component / Script
// ============================================================================

/// Literal strings handed to class bindings, `classList` calls and
/// selector queries in component and script sources
#[derive(Debug, Clone)]
pub struct ComponentScriptExtractor {
    class_binding: Regex,
    class_directive: Regex,
    class_helper: Regex,
    class_list: Regex,
    id_binding: Regex,
    selector_query: Regex,
    element_by_id: Regex,
    elements_by_class: Regex,
    elements_by_tag: Regex,
    jsx_tag: Regex,
    string_literal: Regex,
}

impl Default for ComponentScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentScriptExtractor {
    pub fn new() -> Self {
        Self {
            class_binding: pattern(r#"\bclass(?:Name)?\s*=\s*\{?\s*(?:"([^"]*)"|'([^']*)'|`([^`]*)`)"#),
            class_directive: pattern(r"\bclass:([A-Za-z_][\w-]*)"),
            class_helper: pattern(r"\b(?:clsx|classnames|classNames|cx|cn|twMerge)\(([^)]*)\)"),
            class_list: pattern(r"\.classList\.(?:add|remove|toggle|contains|replace)\(([^)]*)\)"),
            id_binding: pattern(r#"\bid\s*=\s*\{?\s*(?:"([^"]*)"|'([^']*)')"#),
            selector_query: pattern(
                r#"\.(?:querySelectorAll|querySelector|closest|matches)\(\s*(?:"([^"]*)"|'([^']*)'|`([^`]*)`)"#,
            ),
            element_by_id: pattern(r#"\.getElementById\(\s*["'`]([^"'`]+)["'`]"#),
            elements_by_class: pattern(r#"\.getElementsByClassName\(\s*["'`]([^"'`]+)["'`]"#),
            elements_by_tag: pattern(r#"\.getElementsByTagName\(\s*["'`]([^"'`]+)["'`]"#),
            jsx_tag: pattern(r"<([a-z][a-z0-9-]*)[\s/>]"),
            string_literal: pattern(r#""([^"\\]*)"|'([^'\\]*)'|`([^`\\]*)`"#),
        }
    }

    /// Class tokens in every string literal of `args`
    fn literal_tokens(&self, args: &str, out: &mut BTreeSet<String>) {
        for caps in self.string_literal.captures_iter(args) {
            if let Some(text) = first_group(&caps) {
                out.extend(class_tokens(text));
            }
        }
    }
}

impl Extractor for ComponentScriptExtractor {
    fn extract(&self, content: &str) -> UsageSet {
        let mut usage = UsageSet::new();

        for caps in self.class_binding.captures_iter(content) {
            if let Some(text) = first_group(&caps) {
                usage.classes.extend(class_tokens(text));
            }
        }
        for caps in self.class_directive.captures_iter(content) {
            usage.classes.insert(caps[1].to_string());
        }
        for caps in self
            .class_helper
            .captures_iter(content)
            .chain(self.class_list.captures_iter(content))
        {
            self.literal_tokens(&caps[1], &mut usage.classes);
        }
        for caps in self.id_binding.captures_iter(content) {
            if let Some(text) = first_group(&caps) {
                usage.ids.extend(class_tokens(text));
            }
        }

        for caps in self.selector_query.captures_iter(content) {
            let Some(selector) = first_group(&caps) else {
                continue;
            };
            for ident in identifiers(selector) {
                match ident {
                    Identifier::Class(name) => usage.classes.insert(name),
                    Identifier::Id(name) => usage.ids.insert(name),
                    Identifier::Tag(name) => usage.tags.insert(name),
                };
            }
        }

        for caps in self.element_by_id.captures_iter(content) {
            usage.ids.insert(caps[1].trim().to_string());
        }
        for caps in self.elements_by_class.captures_iter(content) {
            usage.classes.extend(class_tokens(&caps[1]));
        }
        for caps in self.elements_by_tag.captures_iter(content) {
            usage.tags.insert(caps[1].trim().to_ascii_lowercase());
        }
        for caps in self.jsx_tag.captures_iter(content) {
            usage.tags.insert(caps[1].to_string());
        }

        usage
    }
}

// ============================================================================
// Utility Markup
// ============================================================================

/// Markup extraction plus verbatim utility tokens from class attributes
/// and `@apply` directives
#[derive(Debug, Clone)]
pub struct UtilityMarkupExtractor {
    markup: MarkupExtractor,
    class_attribute: Regex,
    apply_directive: Regex,
}

impl Default for UtilityMarkupExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl UtilityMarkupExtractor {
    pub fn new() -> Self {
        Self {
            markup: MarkupExtractor,
            class_attribute: pattern(r#"\bclass(?:Name)?\s*=\s*(?:"([^"]*)"|'([^']*)')"#),
            apply_directive: pattern(r"@apply\s+([^;}\n]+)"),
        }
    }
}

impl Extractor for UtilityMarkupExtractor {
    fn extract(&self, content: &str) -> UsageSet {
        let mut usage = self.markup.extract(content);

        for caps in self.class_attribute.captures_iter(content) {
            if let Some(text) = first_group(&caps) {
                usage.utilities.extend(text.split_whitespace().map(str::to_string));
            }
        }

        for caps in self.apply_directive.captures_iter(content) {
            usage.utilities.extend(
                caps[1]
                    .split_whitespace()
                    .filter(|token| *token != "!important")
                    .map(|token| token.trim_start_matches('!').to_string())
                    .filter(|token| !token.is_empty()),
            );
        }

        usage
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Compile a built-in pattern
fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("built-in extractor pattern should compile")
}

/// First participating capture group among the alternatives
fn first_group<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.iter().skip(1).flatten().next().map(|m| m.as_str())
}

/// Plausible class names in free text such as `"btn {active: on}"`
fn class_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|token| {
            token.trim_matches(|c: char| {
                matches!(c, '\'' | '"' | '`' | '{' | '}' | ',' | ':' | ';' | '(' | ')' | '?' | '&' | '|')
            })
        })
        .filter(|token| is_class_token(token))
        .map(str::to_string)
}

fn is_class_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '-' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '/' | '.' | '[' | ']' | '%'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_markup_extractor() {
        let html = r#"<section id="hero" class="banner dark"><a class="btn">Go</a></section>"#;
        let usage = MarkupExtractor.extract(html);
        assert_eq!(usage.classes, set(&["banner", "btn", "dark"]));
        assert_eq!(usage.ids, set(&["hero"]));
        assert!(usage.tags.contains("section"));
        assert!(usage.tags.contains("a"));
        assert!(usage.utilities.is_empty());
    }

    #[test]
    fn test_component_class_bindings() {
        let source = r#"
            const A = () => <div className="card shadow" id="root"><span className={'label'} /></div>;
            const B = `<p class="note">`;
        "#;
        let extractor = ComponentScriptExtractor::new();
        let usage = extractor.extract(source);
        assert_eq!(usage.classes, set(&["card", "label", "note", "shadow"]));
        assert_eq!(usage.ids, set(&["root"]));
        assert!(usage.tags.contains("div"));
        assert!(usage.tags.contains("span"));
    }

    #[test]
    fn test_component_vue_object_binding() {
        let source = r#"<li :class="{ active: isActive, 'is-done': done }">"#;
        let classes = ComponentScriptExtractor::new().extract_classes(source);
        assert!(classes.contains("active"));
        assert!(classes.contains("is-done"));
    }

    #[test]
    fn test_class_list_and_helpers() {
        let source = r#"
            el.classList.add("open", 'visible');
            el.classList.toggle(`dark-mode`);
            const cls = clsx('btn', cond && "btn-primary");
        "#;
        let classes = ComponentScriptExtractor::new().extract_classes(source);
        assert_eq!(classes, set(&["btn", "btn-primary", "dark-mode", "open", "visible"]));
    }

    #[test]
    fn test_selector_queries() {
        let source = r#"
            document.querySelector('.modal > #close');
            document.querySelectorAll("ul li.item");
            document.getElementById('app');
            document.getElementsByClassName("a b");
            document.getElementsByTagName('TABLE');
        "#;
        let usage = ComponentScriptExtractor::new().extract(source);
        assert_eq!(usage.classes, set(&["a", "b", "item", "modal"]));
        assert_eq!(usage.ids, set(&["app", "close"]));
        assert!(usage.tags.contains("ul"));
        assert!(usage.tags.contains("li"));
        assert!(usage.tags.contains("table"));
    }

    #[test]
    fn test_svelte_class_directive() {
        let classes = ComponentScriptExtractor::new().extract_classes("<div class:selected={on}>");
        assert!(classes.contains("selected"));
    }

    #[test]
    fn test_unterminated_attribute_skipped() {
        let usage = ComponentScriptExtractor::new().extract("<div className=\"broken");
        assert!(usage.classes.is_empty());
    }

    #[test]
    fn test_utility_markup() {
        let html = r#"
            <div class="flex md:flex w-1/2 hover:bg-blue-500"></div>
            <style>.btn { @apply px-4 py-2 !important; }</style>
        "#;
        let usage = UtilityMarkupExtractor::new().extract(html);
        assert!(usage.classes.contains("md:flex"));
        assert!(usage.utilities.contains("md:flex"));
        assert!(usage.utilities.contains("w-1/2"));
        assert!(usage.utilities.contains("hover:bg-blue-500"));
        assert!(usage.utilities.contains("px-4"));
        assert!(usage.utilities.contains("py-2"));
        assert!(!usage.utilities.contains("!important"));
    }

    #[test]
    fn test_utility_arbitrary_values_kept_verbatim() {
        let html = r#"<div class="w-[calc(100%-1rem)] bg-[url('/a.png')] [&>*]:p-4 flex"></div>"#;
        let usage = UtilityMarkupExtractor::new().extract(html);
        assert_eq!(
            usage.utilities,
            set(&["[&>*]:p-4", "bg-[url('/a.png')]", "flex", "w-[calc(100%-1rem)]"])
        );
    }

    #[test]
    fn test_document_extractor_dispatch() {
        let extractor = DocumentExtractor::for_kind(DocumentKind::ComponentScript);
        assert_eq!(extractor.kind(), DocumentKind::ComponentScript);
        assert_eq!(extractor.extract_ids("x.getElementById('nav')"), set(&["nav"]));
        assert!(extractor.extract_tags("").is_empty());
    }
}
