//! Critical CSS inlining

/// Insert a `<style>` block with `css` into a page.
///
/// The block goes right before `</head>`; pages without a head get it
/// before `<body`, and anything else gets it prepended.
pub fn inline_critical(html: &str, css: &str) -> String {
    let style = format!("<style>{}</style>", css.trim_end());
    // ASCII lowercasing keeps byte offsets intact
    let lower = html.to_ascii_lowercase();
    let position = lower.find("</head>").or_else(|| lower.find("<body"));

    match position {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + style.len());
            out.push_str(&html[..at]);
            out.push_str(&style);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{style}{html}"),
    }
}
