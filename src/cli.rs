use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipforged")]
#[command(author, version, about = "Fetch a remote video as a single playable, optionally trimmed file")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video, merging and trimming as needed
    Fetch {
        /// Manifest URL, or a video id resolved against download.base_url
        #[arg(required = true)]
        source: String,

        /// Output file (the configured container extension is enforced)
        #[arg(short, long)]
        output: PathBuf,

        /// Trim start, MM:SS or HH:MM:SS
        #[arg(long)]
        start: Option<String>,

        /// Trim end, MM:SS or HH:MM:SS
        #[arg(long)]
        end: Option<String>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config or the default locations if not specified)
        #[arg(value_name = "CONFIG")]
        file: Option<PathBuf>,
    },
}
