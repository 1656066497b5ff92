//! chat-maint - Maintenance tools for chat conversation data.
//!
//! Archives stale conversations, exports conversation history to JSON files,
//! and renders code artifacts from markdown chat messages.
//!
//!   chat-maint archive alice bob --dry-run   # Preview what would be archived
//!   chat-maint archive alice                 # Archive alice's stale conversations
//!   chat-maint export                        # Export every user's conversations
//!   chat-maint export --user alice           # Export a single user
//!   chat-maint view answer.md --copy 1       # Show code blocks, copy the first

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    copy_block, format_archive_reports, format_export_report, format_json, format_stats,
    render_markdown, run_archive, run_export, ArchiveOptions, CodeArtifact, CodeViewer,
    OutputFormat, LANGUAGE_OPTIONS,
};
use cli::{Cli, Commands};
use domain::{AppConfig, AppError, ContentNode};
use infrastructure::{ensure_config_exists, load_config, DocumentStore, SyntaxHighlighter};

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli
        .output_format()
        .map_err(|message| AppError::Config { message })?;

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = cli.database {
        config.database.path = Some(path);
    }

    match cli.command {
        Commands::Archive {
            usernames,
            dry_run,
            days,
        } => {
            let options = ArchiveOptions {
                usernames,
                threshold_days: days.unwrap_or(config.archive.threshold_days),
                dry_run,
            };
            cmd_archive(&config, &options, format)?;
        }
        Commands::Export { user, dir } => {
            if let Some(dir) = dir {
                config.export.dir = Some(dir);
            }
            cmd_export(&config, user.as_deref(), format)?;
        }
        Commands::View {
            file,
            language,
            name,
            copy,
            rows,
            html,
            class,
        } => {
            let overrides = ViewOverrides {
                language,
                name,
                copy,
                rows,
                class,
            };
            cmd_view(&config, &file, &overrides, html)?;
        }
        Commands::Stats => {
            cmd_stats(&config, format)?;
        }
        Commands::Config { init } => {
            cmd_config(&config, init)?;
        }
    }

    Ok(())
}

/// Archive command.
fn cmd_archive(
    config: &AppConfig,
    options: &ArchiveOptions,
    format: OutputFormat,
) -> anyhow::Result<()> {
    tracing::info!(
        users = options.usernames.len(),
        threshold_days = options.threshold_days,
        dry_run = options.dry_run,
        "Starting archive run"
    );

    let reports = run_archive(config, options).context("Archive run aborted")?;

    match format {
        OutputFormat::Table => println!("{}", format_archive_reports(&reports)),
        OutputFormat::Json => println!("{}", format_json(&reports)?),
    }

    Ok(())
}

/// Export command.
fn cmd_export(config: &AppConfig, user: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    let root = config.export_dir();
    tracing::info!(root = %root.display(), "Starting export");

    let report = run_export(config, user).context("Export aborted")?;

    match format {
        OutputFormat::Table => println!("{}", format_export_report(&report)),
        OutputFormat::Json => println!("{}", format_json(&report)?),
    }

    Ok(())
}

/// Presentation overrides for the view command.
struct ViewOverrides {
    language: Option<String>,
    name: Option<String>,
    copy: Option<usize>,
    rows: Option<usize>,
    class: Option<String>,
}

/// View command.
fn cmd_view(
    config: &AppConfig,
    file: &Path,
    overrides: &ViewOverrides,
    html: bool,
) -> anyhow::Result<()> {
    if let Some(language) = &overrides.language {
        if !LANGUAGE_OPTIONS.contains(&language.as_str()) {
            return Err(AppError::Config {
                message: format!(
                    "Unknown language: {language}. Use one of: {}",
                    LANGUAGE_OPTIONS.join(", ")
                ),
            }
            .into());
        }
    }

    let input = std::fs::read_to_string(file)
        .map_err(|e| AppError::io(format!("Failed to read {}", file.display()), e))?;
    let (document_html, artifacts) = if file.extension().is_some_and(|ext| ext == "json") {
        let value: serde_json::Value = serde_json::from_str(&input).map_err(AppError::json_parse)?;
        let artifact = CodeArtifact {
            language: overrides.language.clone(),
            display_name: None,
            content: ContentNode::from_value(&value),
        };
        (String::new(), vec![artifact])
    } else {
        let rendered = render_markdown(&input);
        (rendered.html, rendered.artifacts)
    };

    let now = Instant::now();
    let mut viewers = Vec::with_capacity(artifacts.len());

    for artifact in &artifacts {
        let mut viewer = CodeViewer::from_artifact(artifact, &config.viewer);

        if let Some(language) = &overrides.language {
            viewer.set_language(language.clone());
        }
        if let Some(name) = &overrides.name {
            viewer.set_display_name(name.clone());
        }
        if let Some(class) = &overrides.class {
            viewer.set_class_name(class.clone());
        }
        viewer.resize(overrides.rows);
        viewers.push(viewer);
    }

    let copied = overrides
        .copy
        .map(|n| copy_block(&mut viewers, n, now))
        .transpose()?;

    if html {
        if !document_html.is_empty() {
            println!("{document_html}");
        }
        for viewer in &viewers {
            println!("{}", viewer.render_html());
        }
        return Ok(());
    }

    if viewers.is_empty() {
        println!("No code blocks found in {}", file.display());
        return Ok(());
    }

    let highlighter = SyntaxHighlighter::new();
    for viewer in &viewers {
        println!("{}\n", viewer.render(&highlighter, now));
    }

    if let Some(text) = copied {
        println!("{}", "─── copied ───".dimmed());
        print!("{text}");
    }

    Ok(())
}

/// Show statistics command.
fn cmd_stats(config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    let store = DocumentStore::open(&config.database_path())?;
    let counts = store.counts()?;

    match format {
        OutputFormat::Table => {
            println!("{}", format_stats(&counts));
            println!("  Store: {}", config.database_path().display());
        }
        OutputFormat::Json => println!("{}", format_json(&counts)?),
    }

    Ok(())
}

/// Show configuration command.
fn cmd_config(config: &AppConfig, init: bool) -> anyhow::Result<()> {
    if init {
        let path = ensure_config_exists()?;
        println!("{} Config file: {}", "✓".green().bold(), path.display());
        return Ok(());
    }

    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{}", "⚙ Effective configuration".bold());
    println!();
    println!("{content}");
    println!("# database path: {}", config.database_path().display());
    println!("# export dir:    {}", config.export_dir().display());

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
