use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "compass")]
#[command(
    author,
    version,
    about = "Resolve policy evaluation evidence to compliance controls"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load configuration, catalogs and plans, then print a summary
    Check {
        #[command(flatten)]
        load: LoadArgs,
    },

    /// Enrich newline-delimited JSON evidence records
    Enrich {
        #[command(flatten)]
        load: LoadArgs,

        /// Evidence file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },
}

impl Commands {
    pub fn load_args(&self) -> &LoadArgs {
        match self {
            Self::Check { load } | Self::Enrich { load, .. } => load,
        }
    }
}

/// Options shared by every subcommand that loads configuration
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Configuration file path
    #[arg(short, long, env = "COMPASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Catalog file, replacing the configured list (repeatable)
    #[arg(long = "catalog")]
    pub catalogs: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
