//! Markup Scanning
//!
//! Parses HTML with html5ever's RcDom and flattens the elements into
//! document order. Parsing never fails on malformed markup; html5ever
//! recovers the same way a browser would.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Subtrees that never render above the fold
const NON_RENDERED: &[&str] = &["head", "script", "style", "noscript", "template"];

/// An element in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MarkupElement {
    /// Lowercased local name
    pub tag: String,
    pub classes: Vec<String>,
    pub ids: Vec<String>,
    /// Descendant of `<body>` outside non-rendered subtrees
    pub rendered: bool,
}

/// All elements of a document in document order
pub(crate) fn elements(html: &str) -> Vec<MarkupElement> {
    let dom = match parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
    {
        Ok(dom) => dom,
        Err(err) => {
            tracing::debug!("Markup could not be read: {}", err);
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    // (node, inside body, inside a non-rendered subtree)
    let mut stack: Vec<(Handle, bool, bool)> = vec![(dom.document.clone(), false, false)];

    while let Some((handle, in_body, hidden)) = stack.pop() {
        let (in_body, hidden) = match &handle.data {
            NodeData::Element { name, attrs, .. } => {
                let tag = str::to_ascii_lowercase(&name.local);
                let in_body = in_body || tag == "body";
                let hidden = hidden || NON_RENDERED.contains(&tag.as_str());

                let mut classes = Vec::new();
                let mut ids = Vec::new();
                for attr in attrs.borrow().iter() {
                    let value: &str = &attr.value;
                    match attr.name.local.as_ref() {
                        "class" => classes.extend(attribute_tokens(value)),
                        "id" => ids.extend(attribute_tokens(value)),
                        _ => {}
                    }
                }

                found.push(MarkupElement {
                    rendered: in_body && !hidden && tag != "body",
                    tag,
                    classes,
                    ids,
                });
                (in_body, hidden)
            }
            _ => (in_body, hidden),
        };

        let children = handle.children.borrow();
        for child in children.iter().rev() {
            stack.push((child.clone(), in_body, hidden));
        }
    }

    tracing::debug!("Scanned {} markup elements", found.len());
    found
}

/// Whitespace separated attribute tokens, skipping template syntax
pub(crate) fn attribute_tokens(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split_whitespace()
        .filter(|token| !token.contains(['{', '}', '<', '>', '"', '\'', '=', '$', '(', ')']))
        .map(str::to_string)
}
