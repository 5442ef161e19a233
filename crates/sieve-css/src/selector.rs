//! Selector Scanning
//!
//! Lightweight, non-validating helpers over selector text: splitting
//! selector lists, stripping pseudo-classes and pulling out the class, id
//! and type identifiers a selector references.

use crate::normalize::normalize_selector;

/// An identifier referenced by a selector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// `.name`
    Class(String),
    /// `#name`
    Id(String),
    /// Type selector, lowercased
    Tag(String),
}

impl Identifier {
    /// Bare name without the `.`/`#` prefix
    pub fn name(&self) -> &str {
        match self {
            Self::Class(name) | Self::Id(name) | Self::Tag(name) => name,
        }
    }
}

/// Split a selector list on top-level commas.
///
/// Commas inside `()` or `[]` are not split points. Each part is
/// normalized; empty parts are dropped.
pub fn split_selector_list(prelude: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut chars = prelude.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&prelude[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&prelude[start..]);

    parts
        .into_iter()
        .map(normalize_selector)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Whether the selector contains a pseudo-class or pseudo-element
pub fn has_pseudo(selector: &str) -> bool {
    let chars: Vec<char> = selector.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '[' => i = skip_balanced(&chars, i, '[', ']'),
            ':' => return true,
            _ => i += 1,
        }
    }
    false
}

/// Remove every pseudo-class and pseudo-element, including arguments.
///
/// `.btn:hover` becomes `.btn`, `a:not(.x)::after` becomes `a`, and `:root`
/// becomes the empty string.
pub fn strip_pseudo(selector: &str) -> String {
    let chars: Vec<char> = selector.chars().collect();
    let mut out = String::with_capacity(selector.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                out.extend(chars[i..(i + 2).min(chars.len())].iter());
                i += 2;
            }
            '[' => {
                let end = skip_balanced(&chars, i, '[', ']');
                out.extend(chars[i..end].iter());
                i = end;
            }
            ':' => i = skip_pseudo(&chars, i),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    normalize_selector(&out)
}

/// Class, id and type identifiers referenced by a selector.
///
/// Attribute selectors and pseudo arguments are skipped, so `:not(.x)`
/// does not reference `x`. The universal selector references nothing.
pub fn identifiers(selector: &str) -> Vec<Identifier> {
    let chars: Vec<char> = selector.chars().collect();
    let mut found = Vec::new();
    let mut compound_start = true;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '.' | '#' => {
                let (raw, next) = read_ident(&chars, i + 1);
                if !raw.is_empty() {
                    let name = unescape(&raw);
                    found.push(if c == '.' { Identifier::Class(name) } else { Identifier::Id(name) });
                }
                i = next.max(i + 1);
                compound_start = false;
            }
            '[' => {
                i = skip_balanced(&chars, i, '[', ']');
                compound_start = false;
            }
            ':' => {
                i = skip_pseudo(&chars, i);
                compound_start = false;
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~' | ',') => {
                i += 1;
                compound_start = true;
            }
            c if compound_start && is_ident_start(c) => {
                let (raw, next) = read_ident(&chars, i);
                found.push(Identifier::Tag(unescape(&raw).to_lowercase()));
                i = next.max(i + 1);
                compound_start = false;
            }
            _ => {
                i += 1;
                compound_start = false;
            }
        }
    }

    found
}

/// Resolve CSS escapes: `\:` becomes `:`, `\31 ` becomes `1`
pub fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let hex: String = chars[i + 1..]
            .iter()
            .take(6)
            .take_while(|c| c.is_ascii_hexdigit())
            .collect();

        if hex.is_empty() {
            if let Some(&next) = chars.get(i + 1) {
                out.push(next);
            }
            i += 2;
        } else {
            let code = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
            out.push(code.unwrap_or(char::REPLACEMENT_CHARACTER));
            i += 1 + hex.len();
            if chars.get(i).is_some_and(|c| c.is_whitespace()) {
                i += 1;
            }
        }
    }

    out
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// Read an identifier (with escapes) starting at `start`
fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut raw = String::new();
    let mut i = start;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            raw.extend(chars[i..(i + 2).min(chars.len())].iter());
            i += 2;
        } else if is_ident_char(c) {
            raw.push(c);
            i += 1;
        } else {
            break;
        }
    }

    (raw, i.min(chars.len()))
}

/// Index just past the bracket group opening at `start`
fn skip_balanced(chars: &[char], start: usize, open: char, close: char) -> usize {
    let mut depth = 0usize;
    let mut i = start;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return i + 1;
            }
        }
        i += 1;
    }

    chars.len()
}

/// Index just past a pseudo-class/element starting at the `:` at `start`
fn skip_pseudo(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while chars.get(i) == Some(&':') {
        i += 1;
    }
    let (_, next) = read_ident(chars, i);
    i = next;
    if chars.get(i) == Some(&'(') {
        i = skip_balanced(chars, i, '(', ')');
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_selector_list() {
        assert_eq!(split_selector_list(".a, .b"), vec![".a", ".b"]);
        assert_eq!(
            split_selector_list(":is(.a, .b) > p,  [data-x=\"1,2\"]"),
            vec![":is(.a, .b) > p", "[data-x=\"1,2\"]"]
        );
        assert_eq!(split_selector_list(".a,,"), vec![".a"]);
        assert_eq!(split_selector_list(r".a\,b, .c"), vec![r".a\,b", ".c"]);
    }

    #[test]
    fn test_strip_pseudo() {
        assert_eq!(strip_pseudo(".btn:hover"), ".btn");
        assert_eq!(strip_pseudo("a:not(.x)::after"), "a");
        assert_eq!(strip_pseudo(":root"), "");
        assert_eq!(strip_pseudo(".a:nth-child(2n+1) .b:focus-visible"), ".a .b");
        assert_eq!(strip_pseudo(r".md\:flex"), r".md\:flex");
        assert_eq!(strip_pseudo("a[href^=\"http:\"]"), "a[href^=\"http:\"]");
    }

    #[test]
    fn test_has_pseudo() {
        assert!(has_pseudo(".a:hover"));
        assert!(has_pseudo("::selection"));
        assert!(!has_pseudo(".a .b"));
        assert!(!has_pseudo(r".md\:flex"));
        assert!(!has_pseudo("a[href^=\"http:\"]"));
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            identifiers("div.card > #main .title:hover"),
            vec![
                Identifier::Tag("div".to_string()),
                Identifier::Class("card".to_string()),
                Identifier::Id("main".to_string()),
                Identifier::Class("title".to_string()),
            ]
        );
    }

    #[test]
    fn test_identifiers_skip_attributes_and_pseudo_args() {
        assert_eq!(
            identifiers("input[type=text]:not(.hidden)"),
            vec![Identifier::Tag("input".to_string())]
        );
        assert!(identifiers("*").is_empty());
        assert!(identifiers("[data-theme]").is_empty());
    }

    #[test]
    fn test_identifiers_unescape() {
        assert_eq!(identifiers(r".md\:flex"), vec![Identifier::Class("md:flex".to_string())]);
        assert_eq!(identifiers(r".w-1\/2"), vec![Identifier::Class("w-1/2".to_string())]);
        assert_eq!(identifiers("H1"), vec![Identifier::Tag("h1".to_string())]);
    }

    #[test]
    fn test_unescape_hex() {
        assert_eq!(unescape(r"\31 0"), "10");
        assert_eq!(unescape(r"a\:b"), "a:b");
        assert_eq!(unescape("plain"), "plain");
    }
}
