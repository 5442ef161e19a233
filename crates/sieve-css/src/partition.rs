//! Partitioner
//!
//! Splits top-level blocks into kept and dropped sequences, preserving
//! source order in both. Grouping at-rules are pruned child by child: a
//! `@media` block with one used and one unused rule is kept as a copy
//! holding only the used rule, while the unused rule is reported under a
//! copy of the same at-rule.

use serde::Serialize;

use crate::block::{AtRuleClass, Block, BlockKind};
use crate::critical::CriticalSet;
use crate::matcher::{IdentifierLookup, is_used};
use crate::policy::MatchPolicy;
use crate::selector::split_selector_list;

/// Result of partitioning a stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Used blocks, grouping at-rules pruned to their used children
    pub kept: Vec<Block>,
    /// Top-level blocks with nothing used
    pub dropped: Vec<Block>,
    /// Unused children of kept grouping at-rules, each wrapped in a copy of
    /// its at-rule
    pub pruned: Vec<Block>,
}

/// Rule counts of a partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    pub original_rules: usize,
    pub kept_rules: usize,
    pub dropped_rules: usize,
    /// Selectors of removed style rules, in source order
    pub removed_selectors: Vec<String>,
}

impl Partition {
    /// Kept CSS, one block per line
    pub fn kept_css(&self) -> String {
        join_css(self.kept.iter())
    }

    /// Everything removed (dropped and pruned), in source order
    pub fn dropped_css(&self) -> String {
        join_css(self.removed().into_iter())
    }

    /// Dropped and pruned blocks merged by source order
    pub fn removed(&self) -> Vec<&Block> {
        let mut removed: Vec<&Block> = self.dropped.iter().chain(&self.pruned).collect();
        removed.sort_by_key(|block| block.source_order);
        removed
    }

    pub fn stats(&self) -> PartitionStats {
        let kept_rules: usize = self.kept.iter().map(Block::rule_count).sum();
        let removed = self.removed();
        let dropped_rules: usize = removed.iter().map(|block| block.rule_count()).sum();

        let mut removed_selectors = Vec::new();
        for block in removed {
            collect_selectors(block, &mut removed_selectors);
        }

        PartitionStats {
            original_rules: kept_rules + dropped_rules,
            kept_rules,
            dropped_rules,
            removed_selectors,
        }
    }
}

/// Partition blocks by usage.
///
/// Every top-level block ends up in exactly one of `kept` or `dropped`,
/// except grouping at-rules with both used and unused children, which are
/// split between `kept` and `pruned`.
pub fn partition<L>(blocks: &[Block], lookup: &L, policy: &MatchPolicy) -> Partition
where
    L: IdentifierLookup + ?Sized,
{
    if lookup.is_empty() {
        tracing::warn!("Usage data is empty; only preserved constructs will be kept");
    }

    let mut result = Partition::default();
    for block in blocks {
        match split(block, lookup, policy) {
            Split::Kept => result.kept.push(block.clone()),
            Split::Dropped => result.dropped.push(block.clone()),
            Split::Mixed { kept, dropped } => {
                result.kept.push(kept);
                result.pruned.push(dropped);
            }
        }
    }

    tracing::debug!(
        "Partitioned {} blocks: {} kept, {} dropped, {} pruned",
        blocks.len(),
        result.kept.len(),
        result.dropped.len(),
        result.pruned.len()
    );
    result
}

/// Partition blocks into critical (kept) and remaining (dropped) CSS
pub fn split_critical(blocks: &[Block], critical: &CriticalSet, policy: &MatchPolicy) -> Partition {
    partition(blocks, critical, policy)
}

enum Split {
    Kept,
    Dropped,
    Mixed { kept: Block, dropped: Block },
}

fn split<L>(block: &Block, lookup: &L, policy: &MatchPolicy) -> Split
where
    L: IdentifierLookup + ?Sized,
{
    let grouping = block.at_rule_class() == Some(AtRuleClass::Grouping);
    if !grouping || block.children().is_empty() {
        return if is_used(block, lookup, policy) {
            Split::Kept
        } else {
            Split::Dropped
        };
    }

    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for child in block.children() {
        match split(child, lookup, policy) {
            Split::Kept => kept.push(child.clone()),
            Split::Dropped => dropped.push(child.clone()),
            Split::Mixed {
                kept: used,
                dropped: unused,
            } => {
                kept.push(used);
                dropped.push(unused);
            }
        }
    }

    match (kept.is_empty(), dropped.is_empty()) {
        (_, true) => Split::Kept,
        (true, false) => Split::Dropped,
        (false, false) => Split::Mixed {
            kept: block.with_children(kept),
            dropped: block.with_children(dropped),
        },
    }
}

fn collect_selectors(block: &Block, out: &mut Vec<String>) {
    match block.kind {
        BlockKind::Rule => out.extend(split_selector_list(&block.prelude)),
        BlockKind::AtRule => {
            if block.at_rule_class() == Some(AtRuleClass::Grouping) {
                for child in block.children() {
                    collect_selectors(child, out);
                }
            }
        }
    }
}

fn join_css<'a>(blocks: impl Iterator<Item = &'a Block>) -> String {
    let mut out = String::new();
    for block in blocks {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(block.to_css());
    }
    out
}
