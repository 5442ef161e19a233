//! Engine error and warning types

/// Malformed input found while tokenizing.
///
/// Never fatal: the offending construct is skipped and tokenizing continues.
/// Offsets are byte offsets into the comment-stripped text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeWarning {
    #[error("Unterminated block `{prelude}` at offset {offset}, dropped")]
    UnterminatedBlock { prelude: String, offset: usize },

    #[error("Dangling closing brace at offset {offset}, skipped")]
    DanglingBrace { offset: usize },

    #[error("Unterminated comment at offset {offset}, rest of input discarded")]
    UnterminatedComment { offset: usize },

    #[error("Trailing text without a block at offset {offset}, ignored")]
    TrailingText { offset: usize },
}

/// Contract violations in engine configuration
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Invalid safelist pattern `{pattern}`: {message}")]
    InvalidSafelist { pattern: String, message: String },
}
