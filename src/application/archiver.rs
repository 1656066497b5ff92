//! Conversation archival.
//!
//! Flags a user's stale conversations as archived. Archiving is permanent;
//! there is no unarchive path.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{AppConfig, AppError, Conversation, Result};
use crate::infrastructure::DocumentStore;

/// Options for an archival run.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Users whose conversations are considered, processed in order.
    pub usernames: Vec<String>,
    /// Conversations not updated for this many days qualify.
    pub threshold_days: u32,
    /// Select and report only; never mutate.
    pub dry_run: bool,
}

/// Outcome of archival for a single user.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    /// User the report is for.
    pub username: String,
    /// Conversations that qualified.
    pub candidates: Vec<Conversation>,
    /// Number of conversations flagged. Always 0 in dry-run mode.
    pub archived: usize,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl ArchiveReport {
    /// True when nothing qualified for archiving.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Checks that a username only contains letters, digits and underscore.
///
/// # Errors
/// Returns `InvalidUsername` otherwise.
pub fn validate_username(username: &str) -> Result<()> {
    let valid = !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidUsername {
            username: username.to_string(),
        })
    }
}

/// Oldest `updatedAt` a conversation may have without being archived.
#[must_use]
pub fn archive_cutoff(now: DateTime<Utc>, threshold_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(threshold_days))
}

/// Validates every username, then opens the configured store and archives.
///
/// The store is not opened when any username is invalid.
///
/// # Errors
/// Returns the first validation, lookup, or database error; the run stops there.
pub fn run_archive(config: &AppConfig, options: &ArchiveOptions) -> Result<Vec<ArchiveReport>> {
    for username in &options.usernames {
        validate_username(username)?;
    }

    let store = DocumentStore::open(&config.database_path())?;
    archive_for_users(&store, options, Utc::now())
}

/// Archives stale conversations for each user in `options`.
///
/// Usernames are expected to be validated already, see [`run_archive`].
///
/// # Errors
/// Aborts the whole run on an unknown user or any database error.
pub fn archive_for_users(
    store: &DocumentStore,
    options: &ArchiveOptions,
    now: DateTime<Utc>,
) -> Result<Vec<ArchiveReport>> {
    let cutoff = archive_cutoff(now, options.threshold_days);
    let mut reports = Vec::with_capacity(options.usernames.len());

    for username in &options.usernames {
        let user = store
            .find_user_by_username(username)?
            .ok_or_else(|| AppError::UserNotFound {
                username: username.clone(),
            })?;

        let candidates = store.find_archivable_conversations(&user.id, cutoff)?;

        if candidates.is_empty() {
            tracing::info!(user = %username, "No conversations to archive");
            reports.push(ArchiveReport {
                username: username.clone(),
                candidates,
                archived: 0,
                dry_run: options.dry_run,
            });
            continue;
        }

        let archived = if options.dry_run {
            tracing::info!(
                user = %username,
                count = candidates.len(),
                "Dry run: would archive conversations"
            );
            0
        } else {
            let ids: Vec<String> = candidates
                .iter()
                .map(|c| c.conversation_id.clone())
                .collect();
            let updated = store.archive_conversations(&ids)?;
            tracing::info!(user = %username, archived = updated, "Archived conversations");
            updated
        };

        reports.push(ArchiveReport {
            username: username.clone(),
            candidates,
            archived,
            dry_run: options.dry_run,
        });
    }

    Ok(reports)
}
