//! Command-line interface definitions.

pub mod check;
pub mod diagnostic;
pub mod expiries;
pub mod output;
pub mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Right;

/// smilearb - Option smile arbitrage between leveraged and unlevered ETFs.
#[derive(Parser, Debug)]
#[command(name = "smilearb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the configured pair for the best leg selection
    Scan(ScanArgs),

    /// Print upcoming option expiries
    Expiries(ExpiriesArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `smilearb check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `scan` subcommand.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Market snapshot to replay, overriding `data.snapshot`
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Option right to select legs from (call or put)
    #[arg(long)]
    pub side: Option<Right>,

    /// Number of forward expiries to scan, overriding the config
    #[arg(long)]
    pub expiries: Option<usize>,

    /// Spread time decay instead of premium
    #[arg(long)]
    pub theta: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Arguments for the `expiries` subcommand.
#[derive(Parser, Debug)]
pub struct ExpiriesArgs {
    /// How many expiries to print
    #[arg(default_value_t = 3)]
    pub count: usize,

    /// Use the Thursday before a third-week Friday
    #[arg(long)]
    pub cboe: bool,
}
