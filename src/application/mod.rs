//! Application layer - use cases and orchestration.
//!
//! Archival and export run against the document store; the markdown and
//! code viewer modules make up the artifact rendering pipeline.

pub mod archiver;
pub mod code_viewer;
pub mod exporter;
pub mod formatter;
pub mod markdown;

pub use archiver::{run_archive, ArchiveOptions};
pub use code_viewer::{copy_block, CodeViewer, LANGUAGE_OPTIONS};
pub use exporter::run_export;
pub use formatter::{
    format_archive_reports, format_export_report, format_json, format_stats, OutputFormat,
};
pub use markdown::{render_markdown, CodeArtifact};
