//! Output formatting for maintenance reports.
//!
//! Supports a human-readable table view and JSON for scripting.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::domain::StoreCounts;

use super::archiver::ArchiveReport;
use super::exporter::ExportReport;

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Compact table listing.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: table, json")),
        }
    }
}

/// Formats any report as pretty JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Formats archival reports, one section per user.
pub fn format_archive_reports(reports: &[ArchiveReport]) -> String {
    let mut sections = Vec::with_capacity(reports.len());

    for report in reports {
        let heading = format!("👤 {}", report.username.bold());

        if report.is_empty() {
            sections.push(format!("{heading}\n  No conversations to archive"));
            continue;
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["ID", "Updated", "Model", "Title"]);

        for conv in &report.candidates {
            table.add_row(vec![
                truncate(&conv.conversation_id, 12),
                conv.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                truncate(&conv.model, 18),
                truncate(&conv.title, 35),
            ]);
        }

        let summary = if report.dry_run {
            format!(
                "{} would archive {} conversation(s)",
                "[dry-run]".yellow().bold(),
                report.candidates.len()
            )
        } else {
            format!(
                "{} archived {} conversation(s)",
                "✓".green().bold(),
                report.archived
            )
        };

        sections.push(format!("{heading}\n{table}\n{summary}"));
    }

    sections.join("\n\n")
}

/// Formats an export summary.
pub fn format_export_report(report: &ExportReport) -> String {
    let mut out = String::new();

    for path in &report.written {
        out.push_str(&format!("{} {}\n", "✓".green(), path.display()));
    }

    out.push_str(&format!(
        "\n{} Exported {} conversation(s); skipped {} empty conversation(s) and {} user(s) without conversations",
        "📁".bold(),
        report.written.len().to_string().cyan(),
        report.skipped_conversations,
        report.skipped_users
    ));

    out
}

/// Formats store statistics for display.
pub fn format_stats(counts: &StoreCounts) -> String {
    format!(
        "{}\n  Users: {}\n  Conversations: {}\n  Archived: {}\n  Messages: {}",
        "📊 Statistics".bold(),
        counts.users.to_string().cyan(),
        counts.conversations.to_string().cyan(),
        counts.archived.to_string().yellow(),
        counts.messages.to_string().green()
    )
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::document_store::fixtures::conversation;
    use std::path::PathBuf;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world!", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_archive_report_no_candidates() {
        let reports = vec![ArchiveReport {
            username: "bob".into(),
            candidates: Vec::new(),
            archived: 0,
            dry_run: false,
        }];
        assert!(format_archive_reports(&reports).contains("No conversations to archive"));
    }

    #[test]
    fn test_archive_report_dry_run() {
        colored::control::set_override(false);
        let reports = vec![ArchiveReport {
            username: "alice".into(),
            candidates: vec![conversation("c1", "u1", 40, false)],
            archived: 0,
            dry_run: true,
        }];

        let out = format_archive_reports(&reports);
        assert!(out.contains("Chat c1"));
        assert!(out.contains("[dry-run] would archive 1 conversation(s)"));
    }

    #[test]
    fn test_export_report_json() {
        let report = ExportReport {
            written: vec![PathBuf::from("/out/alice/a--m-1.json")],
            skipped_conversations: 2,
            skipped_users: 1,
        };
        let json = format_json(&report).unwrap();
        assert!(json.contains("\"skipped_conversations\": 2"));
    }
}
