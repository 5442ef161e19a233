//! Output formatting
//!
//! Trailing newline handling and optional minification of written CSS
//! through [`lightningcss`].

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

use crate::error::CliError;

/// Final text of a CSS output file.
///
/// With `minify`, CSS that lightningcss cannot handle is written unminified.
pub fn render_css(css: String, minify: bool) -> String {
    if !minify || css.is_empty() {
        return with_newline(css);
    }
    match minified(&css) {
        Ok(code) => with_newline(code),
        Err(err) => {
            tracing::warn!("{}; writing unminified CSS", err);
            with_newline(css)
        }
    }
}

fn minified(css: &str) -> Result<String, CliError> {
    let failed = |stage: &'static str, message: String| CliError::Minify { stage, message };

    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|err| failed("parse", err.to_string()))?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|err| failed("minify", err.to_string()))?;
    let printed = sheet
        .to_css(PrinterOptions { minify: true, ..PrinterOptions::default() })
        .map_err(|err| failed("print", err.to_string()))?;
    Ok(printed.code)
}

fn with_newline(mut css: String) -> String {
    if !css.is_empty() && !css.ends_with('\n') {
        css.push('\n');
    }
    css
}
