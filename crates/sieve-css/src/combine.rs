//! AtRule Combiner
//!
//! Merges top-level `@media` blocks whose parameters normalize to the same
//! key. The merged block takes the place of the first occurrence and uses
//! its prelude; later occurrences are removed. Bodies that are textually
//! identical (after trimming) are included only once.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::block::{Block, BlockBody, BlockKind, blocks_to_css};
use crate::normalize::normalize_at_rule_params;

/// A group of `@media` blocks merged into one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedAtRule {
    pub normalized_key: String,
    /// Prelude of the first occurrence
    pub representative_prelude: String,
    pub merged_body: String,
    pub occurrence_count: usize,
}

/// Result of combining duplicate at-rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combined {
    pub blocks: Vec<Block>,
    /// Blocks removed by merging
    pub merged_count: usize,
    /// Groups with more than one occurrence, in first-seen order
    pub groups: Vec<CombinedAtRule>,
}

impl Combined {
    pub fn to_css(&self) -> String {
        blocks_to_css(&self.blocks)
    }
}

/// Merge duplicate top-level `@media` blocks
pub fn combine(blocks: &[Block]) -> Combined {
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut keys: Vec<String> = Vec::new();
    let mut members: Vec<Vec<usize>> = Vec::new();
    let mut group_of: Vec<Option<usize>> = vec![None; blocks.len()];

    for (index, block) in blocks.iter().enumerate() {
        if !is_mergeable(block) {
            continue;
        }
        let key = normalize_at_rule_params(block.at_rule_params());
        let group = *group_index.entry(key.clone()).or_insert_with(|| {
            keys.push(key);
            members.push(Vec::new());
            members.len() - 1
        });
        members[group].push(index);
        group_of[index] = Some(group);
    }

    let mut result = Combined::default();
    for (index, block) in blocks.iter().enumerate() {
        let Some(group) = group_of[index] else {
            result.blocks.push(block.clone());
            continue;
        };

        let occurrences = &members[group];
        if occurrences.len() == 1 {
            result.blocks.push(block.clone());
            continue;
        }
        if occurrences[0] != index {
            continue;
        }

        let group_blocks: Vec<&Block> = occurrences.iter().map(|&i| &blocks[i]).collect();
        let (merged, summary) = merge_group(&keys[group], &group_blocks);
        tracing::debug!(
            "Merged {} @media blocks for \"{}\"",
            summary.occurrence_count,
            summary.normalized_key
        );
        result.merged_count += occurrences.len() - 1;
        result.groups.push(summary);
        result.blocks.push(merged);
    }

    result
}

/// Top-level `@media` with a body
fn is_mergeable(block: &Block) -> bool {
    block
        .at_rule_name()
        .is_some_and(|name| name.eq_ignore_ascii_case("media"))
        && block.body != BlockBody::Empty
}

fn merge_group(key: &str, group: &[&Block]) -> (Block, CombinedAtRule) {
    let first = group[0];
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged_body = String::new();
    let mut children = Vec::new();

    for block in group {
        let body = block.inner_text().trim();
        if body.is_empty() || !seen.insert(body) {
            continue;
        }
        if !merged_body.is_empty() && !merged_body.ends_with(['}', ';']) {
            merged_body.push(';');
        }
        merged_body.push_str(body);
        children.extend(block.children().iter().cloned());
    }

    let body = if children.is_empty() {
        BlockBody::Declarations(merged_body.clone())
    } else {
        BlockBody::Nested(children)
    };

    let merged = Block {
        kind: BlockKind::AtRule,
        prelude: first.prelude.clone(),
        raw_text: format!("{}{{{}}}", first.prelude, merged_body),
        body,
        source_order: first.source_order,
    };

    let summary = CombinedAtRule {
        normalized_key: key.to_string(),
        representative_prelude: first.prelude.clone(),
        merged_body,
        occurrence_count: group.len(),
    };

    (merged, summary)
}
