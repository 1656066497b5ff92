//! SQLite-backed document store for chat data.
//!
//! Holds the `users`, `conversations` and `messages` collections using the
//! chat application's field names. The connection lives as long as the
//! store value and is released on every exit path when it drops.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::value::RawValue;

use crate::domain::{AppError, Conversation, Message, Result, StoreCounts, User};

/// Ids bound per `UPDATE ... IN (...)` statement, below SQLite's variable limit.
const ARCHIVE_CHUNK_SIZE: usize = 500;

const CONVERSATION_COLUMNS: &str =
    r#"conversationId, "user", title, model, isArchived, updatedAt"#;

/// Document store repository using SQLite.
pub struct DocumentStore {
    conn: Connection,
}

impl DocumentStore {
    /// Opens or creates the store at `path`.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or schema creation fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create storage directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(AppError::database)?;

        tracing::debug!(path = %path.display(), "Opened document store");

        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL
            );

            CREATE TABLE IF NOT EXISTS conversations (
                conversationId TEXT PRIMARY KEY,
                "user" TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                model TEXT NOT NULL DEFAULT '',
                isArchived INTEGER NOT NULL DEFAULT 0,
                updatedAt INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversationId TEXT NOT NULL,
                payload TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_conversations_user
                ON conversations("user", isArchived, updatedAt);
            CREATE INDEX IF NOT EXISTS idx_messages_conversation
                ON messages(conversationId);
            "#,
            )
            .map_err(AppError::database)?;

        Ok(())
    }

    /// Find a user by exact username.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, username FROM users WHERE username = ?1",
                [username],
                Self::row_to_user,
            )
            .optional()
            .map_err(AppError::database)
    }

    /// Find a user by id.
    pub fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, username FROM users WHERE id = ?1",
                [id],
                Self::row_to_user,
            )
            .optional()
            .map_err(AppError::database)
    }

    /// List every user, ordered by username.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username FROM users ORDER BY username")
            .map_err(AppError::database)?;

        let rows = stmt
            .query_map([], Self::row_to_user)
            .map_err(AppError::database)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(AppError::database)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
        })
    }

    /// Non-archived conversations of `user_id` last updated before `cutoff`,
    /// oldest first.
    pub fn find_archivable_conversations(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Conversation>> {
        let query = format!(
            r#"SELECT {CONVERSATION_COLUMNS} FROM conversations
               WHERE "user" = ?1 AND isArchived = 0 AND updatedAt < ?2
               ORDER BY updatedAt ASC"#
        );

        let mut stmt = self.conn.prepare(&query).map_err(AppError::database)?;
        let rows = stmt
            .query_map(
                params![user_id, cutoff.timestamp_millis()],
                Self::row_to_conversation,
            )
            .map_err(AppError::database)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(AppError::database)
    }

    /// Flags the given conversations as archived in one transaction.
    ///
    /// Ids are bound in chunks of [`ARCHIVE_CHUNK_SIZE`]. Returns the number
    /// of records matched. Records already archived are re-flagged without
    /// effect.
    pub fn archive_conversations(&self, conversation_ids: &[String]) -> Result<usize> {
        if conversation_ids.is_empty() {
            return Ok(0);
        }

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(AppError::database)?;

        let mut updated = 0;
        for chunk in conversation_ids.chunks(ARCHIVE_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "UPDATE conversations SET isArchived = 1 WHERE conversationId IN ({placeholders})"
            );
            updated += tx
                .execute(&sql, params_from_iter(chunk.iter()))
                .map_err(AppError::database)?;
        }

        tx.commit().map_err(AppError::database)?;

        Ok(updated)
    }

    /// Every conversation owned by `user_id`, most recently updated first.
    pub fn list_conversations_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let query = format!(
            r#"SELECT {CONVERSATION_COLUMNS} FROM conversations
               WHERE "user" = ?1
               ORDER BY updatedAt DESC"#
        );

        let mut stmt = self.conn.prepare(&query).map_err(AppError::database)?;
        let rows = stmt
            .query_map([user_id], Self::row_to_conversation)
            .map_err(AppError::database)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(AppError::database)
    }

    /// Convert a row to a Conversation.
    fn row_to_conversation(row: &rusqlite::Row) -> rusqlite::Result<Conversation> {
        let updated_ms: i64 = row.get(5)?;
        let updated_at = DateTime::from_timestamp_millis(updated_ms).ok_or_else(|| {
            rusqlite::Error::IntegralValueOutOfRange(5, updated_ms)
        })?;

        Ok(Conversation {
            conversation_id: row.get(0)?,
            user: row.get(1)?,
            title: row.get(2)?,
            model: row.get(3)?,
            is_archived: row.get::<_, i32>(4)? != 0,
            updated_at,
        })
    }

    /// Messages of a conversation in insertion order.
    pub fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM messages WHERE conversationId = ?1 ORDER BY id ASC")
            .map_err(AppError::database)?;

        let rows = stmt
            .query_map([conversation_id], |row| row.get::<_, String>(0))
            .map_err(AppError::database)?;

        let mut messages = Vec::new();
        for row in rows {
            let raw = row.map_err(AppError::database)?;
            let payload = RawValue::from_string(raw).map_err(AppError::json_parse)?;
            messages.push(Message {
                conversation_id: conversation_id.to_string(),
                payload,
            });
        }

        Ok(messages)
    }

    /// Record counts for every collection.
    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |sql: &str| -> Result<usize> {
            self.conn
                .query_row(sql, [], |row| row.get::<_, i64>(0))
                .map(|c| usize::try_from(c).unwrap_or(0))
                .map_err(AppError::database)
        };

        Ok(StoreCounts {
            users: count("SELECT COUNT(*) FROM users")?,
            conversations: count("SELECT COUNT(*) FROM conversations")?,
            archived: count("SELECT COUNT(*) FROM conversations WHERE isArchived = 1")?,
            messages: count("SELECT COUNT(*) FROM messages")?,
        })
    }
}

impl Drop for DocumentStore {
    fn drop(&mut self) {
        tracing::debug!("Closing document store");
    }
}

#[cfg(test)]
impl DocumentStore {
    /// Opens a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn insert_user(&self, id: &str, username: &str) {
        self.conn
            .execute(
                "INSERT INTO users (id, username) VALUES (?1, ?2)",
                params![id, username],
            )
            .unwrap();
    }

    pub fn insert_conversation(&self, conv: &Conversation) {
        self.conn
            .execute(
                &format!("INSERT INTO conversations ({CONVERSATION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    conv.conversation_id,
                    conv.user,
                    conv.title,
                    conv.model,
                    i32::from(conv.is_archived),
                    conv.updated_at.timestamp_millis(),
                ],
            )
            .unwrap();
    }

    pub fn insert_message(&self, conversation_id: &str, payload: &serde_json::Value) {
        self.insert_raw_message(conversation_id, &payload.to_string());
    }

    pub fn insert_raw_message(&self, conversation_id: &str, payload: &str) {
        self.conn
            .execute(
                "INSERT INTO messages (conversationId, payload) VALUES (?1, ?2)",
                params![conversation_id, payload],
            )
            .unwrap();
    }

    pub fn conversation(&self, conversation_id: &str) -> Conversation {
        self.conn
            .query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE conversationId = ?1"),
                [conversation_id],
                Self::row_to_conversation,
            )
            .unwrap()
    }
}

#[cfg(test)]
pub mod fixtures {
    use chrono::{Duration, Utc};

    use crate::domain::Conversation;

    /// A conversation last updated `days_ago` days ago.
    pub fn conversation(id: &str, user: &str, days_ago: i64, archived: bool) -> Conversation {
        Conversation {
            conversation_id: id.into(),
            user: user.into(),
            title: format!("Chat {id}"),
            model: "gpt-4o".into(),
            is_archived: archived,
            updated_at: Utc::now() - Duration::days(days_ago),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::conversation;
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/chat.db");

        let store = DocumentStore::open(&db_path).unwrap();

        let count: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert!(count >= 3);
        assert!(db_path.exists());
    }

    #[test]
    fn test_user_lookup() {
        let store = DocumentStore::open_in_memory().unwrap();
        store.insert_user("u1", "alice");

        let user = store.find_user_by_username("alice").unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert!(store.find_user_by_username("bob").unwrap().is_none());
        assert_eq!(store.find_user_by_id("u1").unwrap(), Some(user));
    }

    #[test]
    fn test_archivable_selection() {
        let store = DocumentStore::open_in_memory().unwrap();
        store.insert_user("u1", "alice");
        store.insert_conversation(&conversation("old", "u1", 45, false));
        store.insert_conversation(&conversation("older", "u1", 90, false));
        store.insert_conversation(&conversation("recent", "u1", 2, false));
        store.insert_conversation(&conversation("done", "u1", 60, true));
        store.insert_conversation(&conversation("other", "u2", 60, false));

        let cutoff = Utc::now() - Duration::days(30);
        let ids: Vec<_> = store
            .find_archivable_conversations("u1", cutoff)
            .unwrap()
            .into_iter()
            .map(|c| c.conversation_id)
            .collect();

        assert_eq!(ids, vec!["older", "old"]);
    }

    #[test]
    fn test_archive_conversations_bulk() {
        let store = DocumentStore::open_in_memory().unwrap();
        store.insert_conversation(&conversation("a", "u1", 45, false));
        store.insert_conversation(&conversation("b", "u1", 45, false));

        let updated = store
            .archive_conversations(&["a".to_string(), "b".to_string()])
            .unwrap();

        assert_eq!(updated, 2);
        assert!(store.conversation("a").is_archived);
        assert!(store.conversation("b").is_archived);
        assert_eq!(store.archive_conversations(&[]).unwrap(), 0);
    }

    #[test]
    fn test_archive_conversations_spans_several_chunks() {
        let store = DocumentStore::open_in_memory().unwrap();
        let ids: Vec<String> = (0..ARCHIVE_CHUNK_SIZE * 2 + 7)
            .map(|i| format!("conv-{i}"))
            .collect();
        for id in &ids {
            store.insert_conversation(&conversation(id, "u1", 45, false));
        }

        let updated = store.archive_conversations(&ids).unwrap();

        assert_eq!(updated, ids.len());
        assert!(store.conversation("conv-0").is_archived);
        assert!(store.conversation(&ids[ids.len() - 1]).is_archived);
        assert!(store
            .find_archivable_conversations("u1", Utc::now())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_messages_in_insertion_order() {
        let store = DocumentStore::open_in_memory().unwrap();
        store.insert_message("c1", &json!({ "text": "first" }));
        store.insert_message("c2", &json!({ "text": "elsewhere" }));
        store.insert_message("c1", &json!({ "text": "second" }));

        let messages = store.fetch_messages("c1").unwrap();
        let payloads: Vec<_> = messages.iter().map(|m| m.payload.get()).collect();

        assert_eq!(payloads, vec![r#"{"text":"first"}"#, r#"{"text":"second"}"#]);
    }

    #[test]
    fn test_payload_text_is_kept_as_stored() {
        let store = DocumentStore::open_in_memory().unwrap();
        let raw = r#"{"text":"hi","sender":"User","tokens":12345678901234567890123}"#;
        store.insert_raw_message("c1", raw);

        let messages = store.fetch_messages("c1").unwrap();

        assert_eq!(messages[0].payload.get(), raw);
    }

    #[test]
    fn test_invalid_payload_is_a_parse_error() {
        let store = DocumentStore::open_in_memory().unwrap();
        store.insert_raw_message("c1", "{not json");

        assert!(matches!(
            store.fetch_messages("c1"),
            Err(AppError::JsonParse { .. })
        ));
    }

    #[test]
    fn test_counts() {
        let store = DocumentStore::open_in_memory().unwrap();
        store.insert_user("u1", "alice");
        store.insert_conversation(&conversation("a", "u1", 1, false));
        store.insert_conversation(&conversation("b", "u1", 1, true));
        store.insert_message("a", &json!({}));

        let counts = store.counts().unwrap();
        assert_eq!(counts.users, 1);
        assert_eq!(counts.conversations, 2);
        assert_eq!(counts.archived, 1);
        assert_eq!(counts.messages, 1);
    }
}
