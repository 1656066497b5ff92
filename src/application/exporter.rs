//! Conversation export service.
//!
//! Writes each conversation's messages to
//! `<root>/<username>/<sanitized-title>--<model>-<conversation-id>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::value::RawValue;

use crate::domain::{sanitize_path_segment, AppConfig, AppError, Conversation, Result, User};
use crate::infrastructure::DocumentStore;

/// Directory used when a conversation's owner cannot be resolved.
const UNKNOWN_USER_DIR: &str = "unknown_user";

/// Summary of an export run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    /// Files written, in order.
    pub written: Vec<PathBuf>,
    /// Conversations skipped because they had no messages.
    pub skipped_conversations: usize,
    /// Users skipped because they had no conversations.
    pub skipped_users: usize,
}

/// Service exporting conversations from a store to a directory tree.
pub struct ExportService<'a> {
    store: &'a DocumentStore,
    root: PathBuf,
}

impl<'a> ExportService<'a> {
    /// Create an export service writing below `root`.
    #[must_use]
    pub fn new(store: &'a DocumentStore, root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    /// Export every user's conversations.
    ///
    /// # Errors
    /// Stops at the first database, serialization, or filesystem error.
    pub fn export_all(&self) -> Result<ExportReport> {
        let mut report = ExportReport::default();

        for user in self.store.list_users()? {
            self.export_user_into(&user, &mut report)?;
        }

        tracing::info!(
            files = report.written.len(),
            skipped_conversations = report.skipped_conversations,
            skipped_users = report.skipped_users,
            "Export completed"
        );

        Ok(report)
    }

    /// Export the conversations of a single user.
    ///
    /// # Errors
    /// Returns `UserNotFound` for an unknown username, otherwise stops at the
    /// first database, serialization, or filesystem error.
    pub fn export_user(&self, username: &str) -> Result<ExportReport> {
        let user = self
            .store
            .find_user_by_username(username)?
            .ok_or_else(|| AppError::UserNotFound {
                username: username.to_string(),
            })?;

        let mut report = ExportReport::default();
        self.export_user_into(&user, &mut report)?;
        Ok(report)
    }

    fn export_user_into(&self, user: &User, report: &mut ExportReport) -> Result<()> {
        let conversations = self.store.list_conversations_for_user(&user.id)?;

        if conversations.is_empty() {
            tracing::info!(user = %user.username, "No conversations found, skipping user");
            report.skipped_users += 1;
            return Ok(());
        }

        for conv in &conversations {
            if let Some(path) = self.export_conversation(conv)? {
                report.written.push(path);
            } else {
                report.skipped_conversations += 1;
            }
        }

        Ok(())
    }

    /// Export one conversation. Returns `None` when it has no messages.
    fn export_conversation(&self, conv: &Conversation) -> Result<Option<PathBuf>> {
        let messages = self.store.fetch_messages(&conv.conversation_id)?;

        if messages.is_empty() {
            tracing::info!(
                conversation = %conv.conversation_id,
                "No messages found, skipping conversation"
            );
            return Ok(None);
        }

        let dir = self.root.join(self.owner_directory(conv)?);
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::io(format!("Failed to create directory {}", dir.display()), e)
        })?;

        let path = dir.join(conv.export_file_name());
        let payloads: Vec<&RawValue> = messages.iter().map(|m| m.payload.as_ref()).collect();
        let content = serde_json::to_string_pretty(&payloads).map_err(AppError::json_parse)?;

        write_file(&path, &content)?;

        tracing::info!(
            conversation = %conv.conversation_id,
            messages = messages.len(),
            path = %path.display(),
            "Exported conversation"
        );

        Ok(Some(path))
    }

    /// Directory name for the conversation's owner.
    fn owner_directory(&self, conv: &Conversation) -> Result<String> {
        let username = self
            .store
            .find_user_by_id(&conv.user)?
            .map(|u| sanitize_path_segment(&u.username))
            .filter(|name| !name.trim().is_empty() && !name.chars().all(|c| c == '.'));

        Ok(username.unwrap_or_else(|| {
            tracing::warn!(user = %conv.user, "Owner username unusable, using placeholder");
            UNKNOWN_USER_DIR.to_string()
        }))
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| AppError::write_failed(path, e))
}

/// Opens the configured store and exports one user, or everyone.
///
/// # Errors
/// Returns the first error encountered; the remaining work is abandoned.
pub fn run_export(config: &AppConfig, username: Option<&str>) -> Result<ExportReport> {
    let store = DocumentStore::open(&config.database_path())?;
    let service = ExportService::new(&store, config.export_dir());

    match username {
        Some(name) => service.export_user(name),
        None => service.export_all(),
    }
}
