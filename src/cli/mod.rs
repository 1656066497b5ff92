//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// chat-maint - Maintenance tools for chat conversation data.
#[derive(Parser, Debug)]
#[command(name = "chat-maint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format for reports: table or json.
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Configuration file (defaults to ~/.chat-maint/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Document store file, overriding configuration and environment.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Archive conversations not updated within the threshold.
    Archive {
        /// Usernames to process, in order.
        #[arg(required = true, num_args = 1..)]
        usernames: Vec<String>,

        /// Report what would be archived without changing anything.
        #[arg(long)]
        dry_run: bool,

        /// Age threshold in days (defaults to the configured value).
        #[arg(long)]
        days: Option<u32>,
    },

    /// Export conversations to JSON files, one per conversation.
    Export {
        /// Export only this user (all users if not specified).
        #[arg(short, long)]
        user: Option<String>,

        /// Export root directory (defaults to the configured value).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Render a markdown message and display its code blocks.
    View {
        /// Markdown file to render, or a `.json` dump of a rendered content node.
        file: PathBuf,

        /// Display code blocks with this language instead of their own.
        #[arg(short, long)]
        language: Option<String>,

        /// Tab name for the displayed code blocks.
        #[arg(short, long)]
        name: Option<String>,

        /// Copy the Nth code block (1-based) and print its raw text.
        #[arg(long)]
        copy: Option<usize>,

        /// Available terminal rows for each code block.
        #[arg(long)]
        rows: Option<usize>,

        /// Print HTML instead of terminal output.
        #[arg(long)]
        html: bool,

        /// Extra CSS class for HTML code viewers.
        #[arg(long, requires = "html")]
        class: Option<String>,
    },

    /// Show record counts in the document store.
    Stats,

    /// Show the effective configuration.
    Config {
        /// Write a default config file if none exists.
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}
