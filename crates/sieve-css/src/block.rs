//! Parsed CSS Blocks
//!
//! Top-level rules and at-rules produced by the tokenizer, with their raw
//! source text so that untouched blocks serialize back byte for byte.

use serde::Serialize;

/// Kind of a parsed block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    /// Style rule (`selector { declarations }`)
    Rule,
    /// At-rule (`@media ... { ... }`, `@import ...;`)
    AtRule,
}

/// Body of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockBody {
    /// Statement at-rule terminated by `;`
    Empty,
    /// Text between the braces, without nested blocks
    Declarations(String),
    /// Nested blocks of an at-rule
    Nested(Vec<Block>),
}

/// A parsed rule or at-rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Trimmed text before the opening brace
    pub prelude: String,
    pub body: BlockBody,
    /// Position in the source, strictly increasing in opening order
    pub source_order: usize,
    /// Source text from the prelude through the closing brace (or `;`)
    pub raw_text: String,
}

/// How an at-rule takes part in usage decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtRuleClass {
    /// Conditional or layering wrapper; its nested rules are judged individually
    Grouping,
    /// Always kept as a whole (`@font-face`, `@keyframes`, `@import`, ...)
    Opaque,
}

const GROUPING_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "container",
    "layer",
    "document",
    "-moz-document",
    "scope",
    "starting-style",
];

impl AtRuleClass {
    /// Classify an at-rule name (without the `@`)
    pub fn of_name(name: &str) -> Self {
        if GROUPING_AT_RULES.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            Self::Grouping
        } else {
            Self::Opaque
        }
    }
}

impl Block {
    /// Build an at-rule with the same prelude and position but new children
    pub fn with_children(&self, children: Vec<Block>) -> Block {
        let inner: String = children.iter().map(|c| c.raw_text.as_str()).collect();
        Block {
            kind: BlockKind::AtRule,
            prelude: self.prelude.clone(),
            raw_text: format!("{}{{{}}}", self.prelude, inner),
            body: BlockBody::Nested(children),
            source_order: self.source_order,
        }
    }

    pub fn is_at_rule(&self) -> bool {
        self.kind == BlockKind::AtRule
    }

    /// At-rule name without the `@`, as written
    pub fn at_rule_name(&self) -> Option<&str> {
        if !self.is_at_rule() {
            return None;
        }
        let rest = self.prelude.strip_prefix('@')?;
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '(' || c == '{' || c == ';' || c == '"' || c == '\'')
            .unwrap_or(rest.len());
        Some(&rest[..end])
    }

    /// At-rule parameters (prelude after the name), trimmed
    pub fn at_rule_params(&self) -> &str {
        match self.at_rule_name() {
            Some(name) => self.prelude[1 + name.len()..].trim(),
            None => "",
        }
    }

    /// Grouping/opaque class of an at-rule; `None` for style rules
    pub fn at_rule_class(&self) -> Option<AtRuleClass> {
        self.at_rule_name().map(AtRuleClass::of_name)
    }

    /// Nested blocks, empty unless the body is [`BlockBody::Nested`]
    pub fn children(&self) -> &[Block] {
        match &self.body {
            BlockBody::Nested(children) => children,
            _ => &[],
        }
    }

    /// Text between the outer braces
    pub fn inner_text(&self) -> &str {
        match &self.body {
            BlockBody::Empty => "",
            BlockBody::Declarations(text) => text,
            BlockBody::Nested(_) => {
                let Some(open) = find_unescaped(&self.raw_text, b'{') else {
                    return "";
                };
                let close = self.raw_text.len().saturating_sub(1).max(open + 1);
                &self.raw_text[open + 1..close]
            }
        }
    }

    /// CSS text of this block
    pub fn to_css(&self) -> &str {
        &self.raw_text
    }

    /// Number of style rules in this block, looking through grouping at-rules
    pub fn rule_count(&self) -> usize {
        match self.kind {
            BlockKind::Rule => 1,
            BlockKind::AtRule => match self.at_rule_class() {
                Some(AtRuleClass::Grouping) => self.children().iter().map(Block::rule_count).sum(),
                _ => 0,
            },
        }
    }
}

/// Serialize blocks back into CSS text, one block per line
pub fn blocks_to_css(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(block.to_css());
    }
    out
}

/// Byte offset of the first `needle` not preceded by a backslash escape
pub(crate) fn find_unescaped(text: &str, needle: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == needle => return Some(i),
            _ => i += 1,
        }
    }
    None
}
