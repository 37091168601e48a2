//! CLI module for Clipquiz.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Clipquiz - quiz questions from video transcripts
///
/// Fetches the transcript of a YouTube video (captions, or speech recognition
/// when there are none), splits it into labeled windows and generates one
/// reviewed question per window.
#[derive(Parser, Debug)]
#[command(name = "clipquiz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CLIPQUIZ_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Process a single video and print the resulting JSON
    Process {
        /// YouTube URL (watch, youtu.be, embed or shorts form)
        url: String,

        /// Write the JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check external tools and credentials
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
