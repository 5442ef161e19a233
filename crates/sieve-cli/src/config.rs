use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Deserialize;
use sieve_css::{CriticalWindow, MatchPolicy};

use crate::error::CliError;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "sieve.toml";

#[derive(Parser, Debug)]
#[command(
    name = "sieve",
    version,
    about = "Remove unused CSS, split critical CSS and merge duplicate media queries"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of stylesheets processed at once
    #[arg(short = 'j', long, global = true)]
    pub concurrency: Option<usize>,

    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Minify written CSS
    #[arg(long, global = true)]
    pub minify: bool,

    /// Report what would change without writing files
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Glob patterns for paths to skip during discovery
    #[arg(long = "ignore", value_name = "GLOB", global = true)]
    pub ignore: Vec<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove rules not referenced by any content document
    Purge(PurgeArgs),
    /// Split a stylesheet into critical and remaining CSS for a page
    Critical(CriticalArgs),
    /// Merge duplicate @media blocks
    Combine(CombineArgs),
}

#[derive(Args, Debug, Default)]
pub struct PurgeArgs {
    /// Stylesheets or directories of stylesheets
    #[arg(required = true)]
    pub css: Vec<PathBuf>,

    /// Content files or directories scanned for used selectors
    #[arg(long, num_args = 1..)]
    pub content: Vec<PathBuf>,

    /// Write results here instead of in place
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Also write removed rules to `<name>.unused.css`
    #[arg(long)]
    pub emit_dropped: bool,

    /// Purge even when no content documents are found
    #[arg(long)]
    pub allow_empty_usage: bool,

    /// Selectors to always keep (literal, glob or /regex/)
    #[arg(long = "safelist", value_name = "PATTERN")]
    pub safelist: Vec<String>,

    /// Do not keep `:root` and custom property rules automatically
    #[arg(long)]
    pub no_preserve_variables: bool,

    /// Do not keep pseudo-class rules automatically
    #[arg(long)]
    pub no_preserve_pseudo: bool,

    /// Treat markup as utility-class markup (`md:flex`, `@apply`)
    #[arg(long)]
    pub utility_markup: bool,
}

#[derive(Args, Debug, Default)]
pub struct CriticalArgs {
    /// Stylesheet to split
    pub css: PathBuf,

    /// Page whose first elements define the critical set
    #[arg(long)]
    pub html: PathBuf,

    /// Write results here instead of next to the inputs
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Inject the critical CSS into the page's <head>
    #[arg(long)]
    pub inline: bool,

    /// Elements whose tag names are critical
    #[arg(long)]
    pub tag_limit: Option<usize>,

    /// Elements whose classes and ids are critical
    #[arg(long)]
    pub class_limit: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct CombineArgs {
    /// Stylesheets or directories of stylesheets
    #[arg(required = true)]
    pub css: Vec<PathBuf>,

    /// Write results here instead of in place
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub purge: PurgeConfig,
    pub critical: CriticalConfig,
    pub content: ContentConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PurgeConfig {
    pub safelist: Vec<String>,
    pub preserve_variables: bool,
    pub preserve_pseudo: bool,
    pub emit_dropped: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CriticalConfig {
    pub tag_limit: usize,
    pub class_limit: usize,
    /// Replaces the built-in denylist when set
    pub denylist: Option<Vec<String>>,
    pub inline: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ContentConfig {
    pub paths: Vec<PathBuf>,
    pub utility_markup: bool,
    pub ignore: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub out_dir: Option<PathBuf>,
    pub minify: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BatchConfig {
    pub concurrency: usize,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            safelist: Vec::new(),
            preserve_variables: true,
            preserve_pseudo: true,
            emit_dropped: false,
        }
    }
}

impl Default for CriticalConfig {
    fn default() -> Self {
        let window = CriticalWindow::default();
        Self {
            tag_limit: window.tag_limit,
            class_limit: window.class_limit,
            denylist: None,
            inline: false,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self, CliError> {
        let path = cli.config.clone().or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// CLI flags beat config file values
    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(concurrency) = cli.concurrency {
            self.batch.concurrency = concurrency;
        }
        self.batch.concurrency = self.batch.concurrency.max(1);
        if cli.minify {
            self.output.minify = true;
        }
        self.content.ignore.extend(cli.ignore.iter().cloned());

        match &cli.command {
            Command::Purge(args) => {
                self.purge.safelist.extend(args.safelist.iter().cloned());
                if args.no_preserve_variables {
                    self.purge.preserve_variables = false;
                }
                if args.no_preserve_pseudo {
                    self.purge.preserve_pseudo = false;
                }
                if args.emit_dropped {
                    self.purge.emit_dropped = true;
                }
                if !args.content.is_empty() {
                    self.content.paths = args.content.clone();
                }
                if args.utility_markup {
                    self.content.utility_markup = true;
                }
                if let Some(ref dir) = args.out_dir {
                    self.output.out_dir = Some(dir.clone());
                }
            }
            Command::Critical(args) => {
                if let Some(limit) = args.tag_limit {
                    self.critical.tag_limit = limit;
                }
                if let Some(limit) = args.class_limit {
                    self.critical.class_limit = limit;
                }
                if args.inline {
                    self.critical.inline = true;
                }
                if let Some(ref dir) = args.out_dir {
                    self.output.out_dir = Some(dir.clone());
                }
            }
            Command::Combine(args) => {
                if let Some(ref dir) = args.out_dir {
                    self.output.out_dir = Some(dir.clone());
                }
            }
        }
    }

    /// Engine policy for this run
    pub fn match_policy(&self) -> Result<MatchPolicy, CliError> {
        let policy = MatchPolicy::new()
            .with_safelist(&self.purge.safelist)?
            .preserve_variables(self.purge.preserve_variables)
            .preserve_pseudo(self.purge.preserve_pseudo)
            .critical_window(CriticalWindow {
                tag_limit: self.critical.tag_limit,
                class_limit: self.critical.class_limit,
            });

        Ok(match self.critical.denylist {
            Some(ref names) => policy.critical_denylist(names.iter().cloned()),
            None => policy,
        })
    }
}
