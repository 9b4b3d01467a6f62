//! chanlog CLI
//!
//! Command-line front end for chanlog.
//!
//! # Commands
//!
//! - `run` - Record JSON-lines events from stdin into daily segments
//! - `link` - Print the log link for a date phrase
//! - `list` - List the segments in a log directory

mod commands;
mod config_file;
mod input;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Daily HTML logs for IRC channels.
#[derive(Parser)]
#[command(name = "chanlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record events read from stdin, one JSON object per line
    Run {
        /// Log directory
        #[arg(short, long)]
        dir: PathBuf,

        /// JSON config file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Channel label for segment titles
        #[arg(short, long)]
        title: Option<String>,

        /// The program's own nick
        #[arg(short, long)]
        nick: Option<String>,

        /// Public base URL of the log directory
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Print the log link for a date phrase
    Link {
        /// Date phrase, e.g. "yesterday" or "last monday" (default: today)
        phrase: Vec<String>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Public base URL of the log directory
        #[arg(long)]
        base_url: Option<String>,
    },

    /// List segments and whether they are finalized
    List {
        /// Log directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Segment file extension
        #[arg(short, long, default_value = "html")]
        extension: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            dir,
            config,
            title,
            nick,
            base_url,
        } => {
            let mut settings = config_file::load(config.as_deref())?.log_dir(dir);
            if let Some(title) = title {
                settings = settings.title(title);
            }
            if let Some(nick) = nick {
                settings = settings.own_nick(nick);
            }
            if let Some(url) = base_url {
                settings = settings.base_url(url);
            }
            commands::run::run(&settings)?;
        }
        Commands::Link {
            phrase,
            config,
            base_url,
        } => {
            let mut settings = config_file::load(config.as_deref())?;
            if let Some(url) = base_url {
                settings = settings.base_url(url);
            }
            println!("{}", commands::link::run(&settings, &phrase.join(" ")));
        }
        Commands::List {
            dir,
            extension,
            format,
        } => {
            commands::list::run(&dir, &extension, &format)?;
        }
        Commands::Version => {
            println!("chanlog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("chanlog core v{}", chanlog_core::VERSION);
        }
    }

    Ok(())
}
