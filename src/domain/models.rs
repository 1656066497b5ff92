//! Domain models for chat conversation data.
//!
//! These models represent the records held by the chat application's
//! document store: users, their conversations, and conversation messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Characters that cannot appear in an exported file name.
const PATH_SPECIAL_CHARS: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Replacement for every filesystem-special character.
const PATH_REPLACEMENT: char = '-';

/// Title used when a conversation has none.
const UNTITLED: &str = "untitled";

/// A chat application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Login name, unique across users.
    pub username: String,
}

/// Conversation metadata as stored by the chat application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique identifier for this conversation.
    pub conversation_id: String,
    /// Identifier of the owning user.
    pub user: String,
    /// Title shown in the chat sidebar.
    #[serde(default)]
    pub title: String,
    /// Model the conversation was held with.
    #[serde(default)]
    pub model: String,
    /// Whether the conversation is hidden from default views.
    #[serde(default)]
    pub is_archived: bool,
    /// Last time the conversation changed.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// File name used when exporting this conversation.
    ///
    /// Format: `<sanitized-title>--<model>-<conversation-id>.json`
    #[must_use]
    pub fn export_file_name(&self) -> String {
        let title = if self.title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            sanitize_path_segment(&self.title)
        };

        format!(
            "{title}--{}-{}.json",
            sanitize_path_segment(&self.model),
            sanitize_path_segment(&self.conversation_id)
        )
    }
}

/// A single stored message. The payload is opaque and exported verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Conversation this message belongs to.
    pub conversation_id: String,
    /// Raw message document, byte for byte as stored.
    pub payload: Box<RawValue>,
}

/// Record counts across the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreCounts {
    /// Number of users.
    pub users: usize,
    /// Number of conversations.
    pub conversations: usize,
    /// Number of archived conversations.
    pub archived: usize,
    /// Number of messages.
    pub messages: usize,
}

/// Replaces filesystem-special characters with a hyphen.
#[must_use]
pub fn sanitize_path_segment(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if PATH_SPECIAL_CHARS.contains(&c) {
                PATH_REPLACEMENT
            } else {
                c
            }
        })
        .collect()
}
