use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "splicer")]
#[command(author, version, about = "Splice tagged video/audio ranges into clips over HTTP")]
pub struct Cli {
    /// Path to a JSON config file
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
    /// Start the HTTP server
    Start {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory to place the output clips in
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Path to the ffmpeg binary
        #[arg(short, long)]
        ffmpeg: Option<PathBuf>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate a configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
