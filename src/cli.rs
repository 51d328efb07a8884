use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dispatches")]
#[command(about = "A terminal reader for curated news dispatches", long_about = None)]
pub struct Cli {
    /// Base URL of the dispatches backend
    #[arg(long, env = "SERVER_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Custom config directory (default: ~/.config/dispatches)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Use the light color scheme
    #[arg(long)]
    pub light: bool,

    /// Show timestamps in local time instead of UTC
    #[arg(long)]
    pub local_time: bool,

    /// Enable verbose logging (prints log path, sets DEBUG level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one page of the feed
    Stories {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Only include this source key (repeatable)
        #[arg(short, long = "source", value_name = "KEY")]
        sources: Vec<String>,

        /// Search text
        #[arg(long)]
        search: Option<String>,

        /// Bypass the page cache
        #[arg(long)]
        fresh: bool,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a single story with its reference articles
    Story {
        id: String,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
    /// List known sources and their collection keys
    Sources,
}
