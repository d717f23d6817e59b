use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(name = "codepad")]
#[command(
    about = "Terminal code editor with an AI assistant that writes files for you",
    long_about = "Terminal code editor with an AI assistant that writes files for you\n\nConfig file loading:\n  - --config <path> (explicit file, overrides default path discovery)\n  - Default probe path when --config is not provided:\n    1. $XDG_CONFIG_HOME/codepad_ai/config.toml\n    2. ~/.config/codepad_ai/config.toml"
)]
pub struct CliArgs {
    /// Load config from this file path instead of the default discovery path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Start without the starter component.
    #[arg(long)]
    pub empty: bool,

    /// Print redacted HTTP exchanges to stderr (with --prompt).
    #[arg(long, short)]
    pub verbose: bool,

    /// Send one message, print the resulting files and exit.
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,
}
