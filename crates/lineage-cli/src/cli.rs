use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lineage",
    about = "Signed event lineage with adaptive source trust",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML). Defaults to ./lineage.toml when present.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug detail to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for command results.
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the trust demonstration: bootstrap, misbehavior, restart, re-verify
    Demo(DemoArgs),
    /// Print persisted chains and check their structural integrity
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// Event store location (overrides the config file)
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Keep events from earlier runs instead of starting a fresh store
    #[arg(long)]
    pub append: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Event store location (overrides the config file)
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Only show this source's chain
    #[arg(long)]
    pub source: Option<String>,
}
