//! Infrastructure layer - external adapters (database, filesystem, highlighting).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod document_store;
pub mod highlighter;

pub use config::{ensure_config_exists, load_config};
pub use document_store::DocumentStore;
pub use highlighter::SyntaxHighlighter;
