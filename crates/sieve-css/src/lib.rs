//! Sieve CSS Engine
//!
//! Rule partitioning and duplicate at-rule combining over plain CSS text.
//! Every entry point is a pure function over strings; reading files and
//! writing results is left to the caller.

mod block;
mod combine;
mod critical;
mod error;
mod markup;
mod matcher;
mod normalize;
mod partition;
mod policy;
pub mod selector;
mod tokenizer;
pub mod usage;

pub use block::{AtRuleClass, Block, BlockBody, BlockKind, blocks_to_css};
pub use combine::{Combined, CombinedAtRule, combine};
pub use critical::CriticalSet;
pub use error::{CssError, TokenizeWarning};
pub use matcher::{IdentifierLookup, MatchReason, is_used, match_reason};
pub use normalize::{normalize_at_rule_params, normalize_selector};
pub use partition::{Partition, PartitionStats, partition, split_critical};
pub use policy::{CriticalWindow, DEFAULT_CRITICAL_DENYLIST, MatchPolicy, SafelistEntry};
pub use tokenizer::{Tokenized, strip_comments, tokenize, tokenize_with_warnings};
pub use usage::{DocumentKind, SourceDocument, UsageSet, build_usage_set};

/// Tokenize a stylesheet and partition it against a usage set
pub fn purge_css(css: &str, usage: &UsageSet, policy: &MatchPolicy) -> Partition {
    partition(&tokenize(css), usage, policy)
}

/// Tokenize a stylesheet and split it into critical and remaining CSS
pub fn critical_css(css: &str, html: &str, policy: &MatchPolicy) -> Partition {
    let critical = CriticalSet::from_markup(html, policy);
    split_critical(&tokenize(css), &critical, policy)
}

/// Tokenize a stylesheet and merge duplicate `@media` blocks
pub fn combine_css(css: &str) -> Combined {
    combine(&tokenize(css))
}
