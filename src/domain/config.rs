//! Configuration models.
//!
//! Every entry point receives an [`AppConfig`] instead of reading global
//! constants, so the same logic runs against any store and export root.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Document store location.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Path of the store file. Defaults to `<data_dir>/chat.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Archival settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Conversations untouched for longer than this are archived.
    #[serde(default = "default_threshold_days")]
    pub threshold_days: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            threshold_days: default_threshold_days(),
        }
    }
}

const fn default_threshold_days() -> u32 {
    30
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportConfig {
    /// Export root. Defaults to `<data_dir>/exports`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Code viewer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Smallest height in lines.
    #[serde(default = "default_min_lines")]
    pub min_lines: usize,

    /// Largest height in lines.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// How long the "Copied!" acknowledgement stays visible.
    #[serde(default = "default_copied_feedback_ms")]
    pub copied_feedback_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_lines: default_min_lines(),
            max_lines: default_max_lines(),
            copied_feedback_ms: default_copied_feedback_ms(),
        }
    }
}

impl ViewerConfig {
    /// Acknowledgement duration.
    #[must_use]
    pub const fn copied_feedback(&self) -> Duration {
        Duration::from_millis(self.copied_feedback_ms)
    }
}

const fn default_min_lines() -> usize {
    4
}

const fn default_max_lines() -> usize {
    40
}

const fn default_copied_feedback_ms() -> u64 {
    2000
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl AppConfig {
    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chat-maint")
    }

    /// Get the document store path.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("chat.db"))
    }

    /// Get the export root directory.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("exports"))
    }

    /// Get the default config file path.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.archive.threshold_days, 30);
        assert_eq!(config.viewer.min_lines, 4);
        assert_eq!(config.viewer.max_lines, 40);
        assert_eq!(config.viewer.copied_feedback(), Duration::from_secs(2));
    }

    #[test]
    fn test_explicit_paths_win() {
        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from("/tmp/chat.db"));
        config.export.dir = Some(PathBuf::from("/tmp/out"));

        assert_eq!(config.database_path(), PathBuf::from("/tmp/chat.db"));
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_default_paths_under_data_dir() {
        let config = AppConfig::default();
        assert!(config.database_path().ends_with(".chat-maint/chat.db"));
        assert!(config.export_dir().ends_with(".chat-maint/exports"));
    }
}
