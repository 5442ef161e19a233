//! Selector and At-Rule Parameter Normalization
//!
//! Canonical string forms used when comparing selectors and grouping
//! media queries.

/// Trim a selector and collapse whitespace runs to a single space.
///
/// Case is preserved: class names and ids are case-sensitive.
pub fn normalize_selector(selector: &str) -> String {
    selector.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical key for at-rule parameters.
///
/// Lowercases, collapses whitespace, removes spaces around `(`, `)`, `:`,
/// drops `only`/`screen` keywords and redundant `and` connectors, so that
/// `screen and (max-width: 768px)` and `(max-width:768px)` share a key.
/// This is a grouping heuristic, not media query equivalence.
pub fn normalize_at_rule_params(params: &str) -> String {
    let lower = params.to_lowercase();
    lower
        .split(',')
        .map(normalize_media_query)
        .collect::<Vec<_>>()
        .join(",")
}

fn normalize_media_query(query: &str) -> String {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
    let tight = tighten_punctuation(&collapsed);

    let words: Vec<&str> = tight
        .split(' ')
        .filter(|word| !word.is_empty() && *word != "only" && *word != "screen")
        .collect();

    let mut kept: Vec<&str> = Vec::with_capacity(words.len());
    for word in words {
        if word == "and" && kept.last().is_none_or(|prev| *prev == "and") {
            continue;
        }
        kept.push(word);
    }
    while kept.last() == Some(&"and") {
        kept.pop();
    }

    kept.join(" ")
}

/// Remove single spaces that touch `(`, `)` or `:`
fn tighten_punctuation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.get(i + 1).copied();
            if matches!(prev, Some('(' | ':')) || matches!(next, Some(')' | ':')) {
                continue;
            }
        }
        out.push(c);
    }

    out
}
