pub mod file;

pub use file::{FileConfig, LogConfig};

pub const DEFAULT_STORE_PATH: &str = "ranks.json";

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "rankshift")]
#[command(about = "Display-order maintenance for scoped item collections")]
pub struct Cli {
    /// Path to the JSON rank store (defaults to ranks.json)
    #[arg(long)]
    pub store: Option<String>,

    /// Optional TOML config file; command-line flags win over file values
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print a scope's current display order
    Show { scope: String },
    /// Insert a new item at the end of a scope
    Add { scope: String, id: String },
    /// Move one item to a new display position
    Move { scope: String, id: String, rank: u32 },
    /// Apply a batch of moves from a JSON file as one transaction
    Batch { scope: String, file: String },
}
