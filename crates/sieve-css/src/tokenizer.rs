//! CSS Tokenizer
//!
//! Splits stylesheet text into top-level blocks in one left-to-right pass.
//! Open braces are tracked on an explicit frame stack, so nested at-rules
//! are built without re-scanning their bodies.
//!
//! Comments are stripped up front and the stripping is not aware of string
//! literals: a `/*` inside a quoted value starts a comment.

use crate::block::{Block, BlockBody, BlockKind};
use crate::error::TokenizeWarning;

/// Result of tokenizing a stylesheet
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tokenized {
    pub blocks: Vec<Block>,
    pub warnings: Vec<TokenizeWarning>,
}

/// Tokenize a stylesheet, logging malformed input as warnings
pub fn tokenize(css: &str) -> Vec<Block> {
    let Tokenized { blocks, warnings } = tokenize_with_warnings(css);
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    blocks
}

/// Tokenize a stylesheet, returning malformed input warnings to the caller
pub fn tokenize_with_warnings(css: &str) -> Tokenized {
    let (text, comment_warning) = strip_comments_checked(css);
    let mut tokenized = Tokenizer::new(&text).run();
    if let Some(warning) = comment_warning {
        tokenized.warnings.insert(0, warning);
    }
    tracing::debug!(
        "Tokenized {} top-level blocks ({} warnings)",
        tokenized.blocks.len(),
        tokenized.warnings.len()
    );
    tokenized
}

/// Remove `/* ... */` comments
///
/// An unterminated comment swallows the rest of the input.
pub fn strip_comments(css: &str) -> String {
    strip_comments_checked(css).0
}

fn strip_comments_checked(css: &str) -> (String, Option<TokenizeWarning>) {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;

    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                let offset = out.len();
                return (out, Some(TokenizeWarning::UnterminatedComment { offset }));
            }
        }
    }

    out.push_str(rest);
    (out, None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameMode {
    /// At-rule body: braces nest
    AtRule,
    /// Style rule body: ends at the next `}`
    Rule,
    /// Block with an empty prelude, consumed like a rule and discarded
    Skip,
}

/// An open block waiting for its closing brace
#[derive(Debug)]
struct Frame {
    mode: FrameMode,
    prelude: String,
    /// Offset of the first prelude character
    start: usize,
    /// Offset of the opening brace
    open: usize,
    order: usize,
    children: Vec<Block>,
}

impl Frame {
    fn finish(self, text: &str, close: usize) -> Option<Block> {
        let inner = &text[self.open + 1..close];
        let raw_text = text[self.start..=close].to_string();

        match self.mode {
            FrameMode::Skip => None,
            FrameMode::Rule => Some(Block {
                kind: BlockKind::Rule,
                prelude: self.prelude,
                body: BlockBody::Declarations(inner.to_string()),
                source_order: self.order,
                raw_text,
            }),
            FrameMode::AtRule => {
                let body = if self.children.is_empty() {
                    BlockBody::Declarations(inner.to_string())
                } else {
                    BlockBody::Nested(self.children)
                };
                Some(Block {
                    kind: BlockKind::AtRule,
                    prelude: self.prelude,
                    body,
                    source_order: self.order,
                    raw_text,
                })
            }
        }
    }
}

struct Tokenizer<'a> {
    text: &'a str,
    /// Start of the text accumulated since the last block boundary
    segment_start: usize,
    next_order: usize,
    stack: Vec<Frame>,
    blocks: Vec<Block>,
    warnings: Vec<TokenizeWarning>,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            segment_start: 0,
            next_order: 0,
            stack: Vec::new(),
            blocks: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn run(mut self) -> Tokenized {
        // Only ASCII bytes are significant, and those never occur inside
        // a multi-byte UTF-8 sequence.
        let bytes = self.text.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' => {
                    pos += 2;
                    continue;
                }
                b'{' => self.open_brace(pos),
                b'}' => self.close_brace(pos),
                b';' => self.semicolon(pos),
                _ => {}
            }
            pos += 1;
        }

        self.finish()
    }

    fn current_mode(&self) -> Option<FrameMode> {
        self.stack.last().map(|frame| frame.mode)
    }

    /// Trimmed segment text and the offset where it starts
    fn segment(&self, end: usize) -> (&'a str, usize) {
        let text = self.text;
        let raw = &text[self.segment_start..end];
        let leading = raw.len() - raw.trim_start().len();
        (raw.trim(), self.segment_start + leading)
    }

    fn open_brace(&mut self, pos: usize) {
        if matches!(self.current_mode(), Some(FrameMode::Rule | FrameMode::Skip)) {
            // Style rule bodies do not nest
            return;
        }

        let (prelude, start) = self.segment(pos);
        let mode = if prelude.is_empty() {
            FrameMode::Skip
        } else if prelude.starts_with('@') {
            FrameMode::AtRule
        } else {
            FrameMode::Rule
        };

        self.stack.push(Frame {
            mode,
            prelude: prelude.to_string(),
            start,
            open: pos,
            order: self.next_order,
            children: Vec::new(),
        });
        self.next_order += 1;
        self.segment_start = pos + 1;
    }

    fn close_brace(&mut self, pos: usize) {
        match self.stack.pop() {
            None => self.warnings.push(TokenizeWarning::DanglingBrace { offset: pos }),
            Some(frame) => {
                if let Some(block) = frame.finish(self.text, pos) {
                    self.push_block(block);
                }
            }
        }
        self.segment_start = pos + 1;
    }

    fn semicolon(&mut self, pos: usize) {
        let mode = self.current_mode();
        if !matches!(mode, None | Some(FrameMode::AtRule)) {
            return;
        }

        let (statement, start) = self.segment(pos);
        if statement.starts_with('@') {
            let block = Block {
                kind: BlockKind::AtRule,
                prelude: statement.to_string(),
                body: BlockBody::Empty,
                source_order: self.next_order,
                raw_text: self.text[start..=pos].to_string(),
            };
            self.next_order += 1;
            self.push_block(block);
            self.segment_start = pos + 1;
        } else if mode.is_some() {
            // Declarations inside an at-rule body end at `;`
            self.segment_start = pos + 1;
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(block),
            None => self.blocks.push(block),
        }
    }

    fn finish(mut self) -> Tokenized {
        if self.stack.is_empty() {
            let (trailing, start) = self.segment(self.text.len());
            if !trailing.is_empty() {
                self.warnings.push(TokenizeWarning::TrailingText { offset: start });
            }
        }

        for frame in self.stack.drain(..) {
            self.warnings.push(TokenizeWarning::UnterminatedBlock {
                prelude: frame.prelude,
                offset: frame.start,
            });
        }

        Tokenized {
            blocks: self.blocks,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_rules() {
        let blocks = tokenize(".a{color:red}.b{color:blue}");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].prelude, ".a");
        assert_eq!(blocks[0].raw_text, ".a{color:red}");
        assert_eq!(blocks[0].body, BlockBody::Declarations("color:red".to_string()));
        assert_eq!(blocks[1].prelude, ".b");
        assert!(blocks[0].source_order < blocks[1].source_order);
    }

    #[test]
    fn test_whitespace_is_not_part_of_raw_text() {
        let blocks = tokenize("\n  .a , .b {\n color: red;\n}\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].prelude, ".a , .b");
        assert_eq!(blocks[0].raw_text, ".a , .b {\n color: red;\n}");
    }

    #[test]
    fn test_nested_media() {
        let blocks = tokenize("@media (max-width: 600px) { .a { color: red } .b { color: blue } }");
        assert_eq!(blocks.len(), 1);
        let media = &blocks[0];
        assert_eq!(media.kind, BlockKind::AtRule);
        assert_eq!(media.prelude, "@media (max-width: 600px)");
        assert_eq!(media.children().len(), 2);
        assert_eq!(media.children()[0].prelude, ".a");
        assert!(media.source_order < media.children()[0].source_order);
    }

    #[test]
    fn test_deeply_nested_at_rules() {
        let css = "@supports (display:grid){@media print{.a{x:1}}}.b{y:2}";
        let blocks = tokenize(css);
        assert_eq!(blocks.len(), 2);
        let supports = &blocks[0];
        assert_eq!(supports.children().len(), 1);
        assert_eq!(supports.children()[0].children()[0].prelude, ".a");
        assert_eq!(blocks[1].prelude, ".b");
    }

    #[test]
    fn test_at_rule_without_nested_rules() {
        let blocks = tokenize("@font-face{font-family:x;src:url(a.woff)}");
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].body,
            BlockBody::Declarations("font-family:x;src:url(a.woff)".to_string())
        );
    }

    #[test]
    fn test_statement_at_rules() {
        let blocks = tokenize("@charset \"utf-8\";\n@import url(a.css) screen;\n.a{x:1}");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].body, BlockBody::Empty);
        assert_eq!(blocks[0].raw_text, "@charset \"utf-8\";");
        assert_eq!(blocks[1].at_rule_name(), Some("import"));
        assert_eq!(blocks[2].prelude, ".a");
    }

    #[test]
    fn test_layer_statement_inside_media() {
        let blocks = tokenize("@media print{@layer base;.a{x:1}}");
        let children = blocks[0].children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].body, BlockBody::Empty);
        assert_eq!(children[1].prelude, ".a");
    }

    #[test]
    fn test_unterminated_rule_is_dropped() {
        let tokenized = tokenize_with_warnings(".a{color:red");
        assert!(tokenized.blocks.is_empty());
        assert_eq!(
            tokenized.warnings,
            vec![TokenizeWarning::UnterminatedBlock { prelude: ".a".to_string(), offset: 0 }]
        );
    }

    #[test]
    fn test_unterminated_at_rule_is_dropped() {
        let tokenized = tokenize_with_warnings(".ok{x:1}@media print{.a{color:red}");
        assert_eq!(tokenized.blocks.len(), 1);
        assert_eq!(tokenized.blocks[0].prelude, ".ok");
        assert_eq!(tokenized.warnings.len(), 1);
    }

    #[test]
    fn test_rule_bodies_do_not_nest() {
        let tokenized = tokenize_with_warnings(".a{ .b{x:1} }");
        assert_eq!(tokenized.blocks.len(), 1);
        assert_eq!(tokenized.blocks[0].raw_text, ".a{ .b{x:1}");
        assert!(matches!(tokenized.warnings[0], TokenizeWarning::DanglingBrace { .. }));
    }

    #[test]
    fn test_empty_prelude_skipped() {
        let blocks = tokenize("{color:red}.a{x:1}");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].prelude, ".a");
    }

    #[test]
    fn test_escaped_brace_in_selector() {
        let blocks = tokenize(r".a\{b{x:1}");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].prelude, r".a\{b");
    }

    #[test]
    fn test_comments_stripped() {
        let blocks = tokenize("/* head */.a{/* inner */color:red}/* tail */");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].raw_text, ".a{color:red}");
    }

    #[test]
    fn test_comment_stripping_ignores_strings() {
        assert_eq!(
            strip_comments(".a{content:\"/*\"}.b{x:1}*/.c{y:2}"),
            ".a{content:\".c{y:2}"
        );
    }

    #[test]
    fn test_unterminated_comment() {
        let tokenized = tokenize_with_warnings(".a{x:1}/* open");
        assert_eq!(tokenized.blocks.len(), 1);
        assert_eq!(
            tokenized.warnings,
            vec![TokenizeWarning::UnterminatedComment { offset: 7 }]
        );
    }

    #[test]
    fn test_trailing_text() {
        let tokenized = tokenize_with_warnings(".a{x:1} .b");
        assert_eq!(tokenized.blocks.len(), 1);
        assert_eq!(tokenized.warnings, vec![TokenizeWarning::TrailingText { offset: 8 }]);
    }

    #[test]
    fn test_empty_input() {
        let tokenized = tokenize_with_warnings("   \n ");
        assert!(tokenized.blocks.is_empty());
        assert!(tokenized.warnings.is_empty());
    }

    #[test]
    fn test_utf8_content() {
        let blocks = tokenize(".é{content:\"→\"}.ü{x:1}");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].prelude, ".é");
        assert_eq!(blocks[1].prelude, ".ü");
    }
}
