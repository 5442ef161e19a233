//! Selector Matcher
//!
//! Decides whether a block is used. Each selector in a rule's list is tried
//! against a fixed precedence; the first step that matches wins:
//!
//! 1. referenced by the usage data (after stripping pseudo-classes)
//! 2. safelisted
//! 3. `:root` or a custom property declaration, with `preserve_variables`
//! 4. state-dependent (pseudo-class/element), with `preserve_pseudo`
//!
//! A compound or complex selector counts as referenced when every class,
//! id and type identifier in it is present, so `.a .b` needs both `a` and
//! `b`. This can over-match (the elements may not be related) and is kept
//! deliberately simple.

use serde::Serialize;

use crate::block::{AtRuleClass, Block, BlockKind};
use crate::policy::MatchPolicy;
use crate::selector::{Identifier, has_pseudo, identifiers, split_selector_list, strip_pseudo};

/// Membership queries a matcher runs against
pub trait IdentifierLookup {
    fn has_class(&self, name: &str) -> bool;
    fn has_id(&self, name: &str) -> bool;
    fn has_tag(&self, name: &str) -> bool;
    /// No identifiers at all
    fn is_empty(&self) -> bool;
}

/// Why a block was kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchReason {
    /// Every identifier of a selector is referenced
    Referenced,
    Safelisted,
    /// `:root` or custom property declarations
    Variables,
    /// State-dependent selector
    Pseudo,
    /// Grouping at-rule with at least one used nested rule
    NestedRule,
    /// At-rule kept as a whole
    OpaqueAtRule,
}

/// Whether a block is used under the lookup and policy
pub fn is_used<L>(block: &Block, lookup: &L, policy: &MatchPolicy) -> bool
where
    L: IdentifierLookup + ?Sized,
{
    match_reason(block, lookup, policy).is_some()
}

/// The precedence step that keeps a block, or `None` when it is unused
pub fn match_reason<L>(block: &Block, lookup: &L, policy: &MatchPolicy) -> Option<MatchReason>
where
    L: IdentifierLookup + ?Sized,
{
    match block.kind {
        BlockKind::Rule => rule_reason(block, lookup, policy),
        BlockKind::AtRule => match block.at_rule_class() {
            Some(AtRuleClass::Grouping) if !block.children().is_empty() => block
                .children()
                .iter()
                .any(|child| is_used(child, lookup, policy))
                .then_some(MatchReason::NestedRule),
            _ => Some(MatchReason::OpaqueAtRule),
        },
    }
}

fn rule_reason<L>(block: &Block, lookup: &L, policy: &MatchPolicy) -> Option<MatchReason>
where
    L: IdentifierLookup + ?Sized,
{
    let declares_variables = declares_custom_property(block.inner_text());
    split_selector_list(&block.prelude)
        .iter()
        .find_map(|selector| selector_reason(selector, declares_variables, lookup, policy))
}

fn selector_reason<L>(
    selector: &str,
    declares_variables: bool,
    lookup: &L,
    policy: &MatchPolicy,
) -> Option<MatchReason>
where
    L: IdentifierLookup + ?Sized,
{
    let stripped = strip_pseudo(selector);
    let idents = identifiers(&stripped);

    if is_referenced(&idents, lookup) {
        return Some(MatchReason::Referenced);
    }
    if policy.is_safelisted(selector, &stripped, &idents) {
        return Some(MatchReason::Safelisted);
    }
    if policy.preserve_variables && (selector == ":root" || declares_variables) {
        return Some(MatchReason::Variables);
    }
    if policy.preserve_pseudo && has_pseudo(selector) {
        return Some(MatchReason::Pseudo);
    }
    None
}

/// All identifiers present. Selectors without any class, id or tag
/// (`*`, `[hidden]`) are never referenced by usage.
fn is_referenced<L>(idents: &[Identifier], lookup: &L) -> bool
where
    L: IdentifierLookup + ?Sized,
{
    if idents.is_empty() {
        return false;
    }
    idents.iter().all(|ident| match ident {
        Identifier::Class(name) => lookup.has_class(name),
        Identifier::Id(name) => lookup.has_id(name),
        Identifier::Tag(name) => lookup.has_tag(name),
    })
}

/// Whether declaration text declares a custom property (`--name: value`)
fn declares_custom_property(body: &str) -> bool {
    body.split(';').any(|decl| {
        let decl = decl.trim_start();
        decl.starts_with("--") && decl.contains(':')
    })
}
