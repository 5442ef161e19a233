//! CLI error types

use std::io;
use std::path::PathBuf;

use sieve_css::CssError;

/// Errors raised while loading inputs, running a pass or writing results
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Policy(#[from] CssError),

    #[error("Invalid ignore pattern `{pattern}`: {source}")]
    Ignore {
        pattern: String,
        source: globset::Error,
    },

    #[error("lightningcss could not {stage} the output: {message}")]
    Minify { stage: &'static str, message: String },

    #[error("No stylesheets found")]
    NoStylesheets,

    #[error("No content documents found; pass --content or --allow-empty-usage to purge anyway")]
    NoContent,

    #[error("Processing panicked: {0}")]
    Panicked(String),
}
