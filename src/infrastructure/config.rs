//! Configuration file management.
//!
//! Handles loading TOML configuration files and applying environment
//! overrides on top of them.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Overrides the document store path.
pub const ENV_DATABASE: &str = "CHAT_MAINT_DATABASE";
/// Overrides the export root directory.
pub const ENV_EXPORT_DIR: &str = "CHAT_MAINT_EXPORT_DIR";

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# chat-maint configuration
# Auto-generated - edit as needed

[database]
# Document store file (defaults to ~/.chat-maint/chat.db)
# path = "/var/lib/chat/chat.db"

[archive]
# Conversations not updated for this many days get archived
threshold_days = 30

[export]
# Export root directory (defaults to ~/.chat-maint/exports)
# dir = "/srv/chat-exports"

[viewer]
# Code viewer height bounds, in lines
min_lines = 4
max_lines = 40

# How long the "Copied!" acknowledgement stays visible
copied_feedback_ms = 2000
"#;

/// Load configuration from `path`, or from the default location, then apply
/// environment overrides.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = path.map_or_else(AppConfig::config_file_path, Path::to_path_buf);

    let mut config = if config_path.exists() {
        load_config_from_file(&config_path)?
    } else if path.is_some() {
        return Err(AppError::Config {
            message: format!("Config file not found: {}", config_path.display()),
        });
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Apply environment variable overrides. `lookup` returns a variable's value.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(path) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
        tracing::debug!(path = %path, "Database path from environment");
        config.database.path = Some(PathBuf::from(path));
    }

    if let Some(dir) = lookup(ENV_EXPORT_DIR).filter(|v| !v.is_empty()) {
        tracing::debug!(dir = %dir, "Export directory from environment");
        config.export.dir = Some(PathBuf::from(dir));
    }
}

/// Create the default configuration file if it doesn't exist.
///
/// Returns the path of the configuration file.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists() -> Result<PathBuf> {
    let config_path = AppConfig::config_file_path();

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create config directory", e))?;
        }

        fs::write(&config_path, DEFAULT_CONFIG)
            .map_err(|e| AppError::io("Failed to create default config", e))?;

        tracing::info!(path = %config_path.display(), "Created default configuration");
    }

    Ok(config_path)
}
