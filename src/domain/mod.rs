//! Domain layer - core types and rules.
//!
//! This layer contains pure domain models, content nodes, configuration
//! and error types without any I/O.

pub mod config;
pub mod content;
pub mod error;
pub mod models;

pub use config::{AppConfig, ViewerConfig};
pub use content::ContentNode;
pub use error::{AppError, Result};
pub use models::{sanitize_path_segment, Conversation, Message, StoreCounts, User};
