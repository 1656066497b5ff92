//! Read-only code viewer for extracted artifacts.
//!
//! Holds the presentation state of one code block: display name, language,
//! height bounds, and the transient "copied" acknowledgement. Switching the
//! language only changes the label and highlighting, never the text.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use colored::Colorize;

use crate::domain::{AppError, Result, ViewerConfig};
use crate::infrastructure::SyntaxHighlighter;

use super::markdown::CodeArtifact;

/// Languages offered by the language selector.
pub const LANGUAGE_OPTIONS: &[&str] = &[
    "bash",
    "c",
    "cpp",
    "csharp",
    "css",
    "go",
    "html",
    "java",
    "javascript",
    "json",
    "kotlin",
    "markdown",
    "php",
    "python",
    "ruby",
    "rust",
    "sql",
    "swift",
    "typescript",
    "yaml",
    "plaintext",
];

const COPY_LABEL: &str = "Copy";
const COPIED_LABEL: &str = "Copied!";
const PLAIN_LABEL: &str = "plaintext";

/// Guesses a file extension from a language tag.
#[must_use]
pub fn guess_extension(language: Option<&str>) -> &'static str {
    let Some(language) = language else {
        return "txt";
    };

    match language.trim().to_lowercase().as_str() {
        "bash" | "sh" | "shell" | "zsh" => "sh",
        "c" => "c",
        "cpp" | "c++" => "cpp",
        "csharp" | "c#" | "cs" => "cs",
        "css" => "css",
        "go" | "golang" => "go",
        "html" | "xml" => "html",
        "java" => "java",
        "javascript" | "js" | "jsx" => "js",
        "json" => "json",
        "kotlin" | "kt" => "kt",
        "markdown" | "md" => "md",
        "php" => "php",
        "python" | "py" => "py",
        "ruby" | "rb" => "rb",
        "rust" | "rs" => "rs",
        "sql" => "sql",
        "swift" => "swift",
        "typescript" | "ts" | "tsx" => "ts",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        _ => "txt",
    }
}

/// Properties supplied by the embedding view.
#[derive(Debug, Clone, Default)]
pub struct ViewerProps {
    /// Language tag of the content.
    pub language: Option<String>,
    /// Whether the content is read-only.
    pub read_only: bool,
    /// Explicit display name; derived from the language when absent.
    pub display_name: Option<String>,
    /// Extra CSS class for the HTML fragment.
    pub class_name: Option<String>,
}

/// Presentation state of one code block.
#[derive(Debug, Clone)]
pub struct CodeViewer {
    content: String,
    language: Option<String>,
    display_name: String,
    read_only: bool,
    class_name: Option<String>,
    min_lines: usize,
    max_lines: usize,
    viewport_rows: Option<usize>,
    copied_feedback: Duration,
    copied_at: Option<Instant>,
}

impl CodeViewer {
    /// Create a viewer over `content`.
    pub fn new(content: impl Into<String>, props: ViewerProps, config: &ViewerConfig) -> Self {
        let display_name = props.display_name.unwrap_or_else(|| {
            format!("untitled.{}", guess_extension(props.language.as_deref()))
        });

        Self {
            content: content.into(),
            language: props.language,
            display_name,
            read_only: props.read_only,
            class_name: props.class_name,
            min_lines: config.min_lines,
            max_lines: config.max_lines,
            viewport_rows: None,
            copied_feedback: config.copied_feedback(),
            copied_at: None,
        }
    }

    /// Create a read-only viewer for an extracted artifact.
    #[must_use]
    pub fn from_artifact(artifact: &CodeArtifact, config: &ViewerConfig) -> Self {
        let props = ViewerProps {
            language: artifact.language.clone(),
            read_only: true,
            display_name: artifact.display_name.clone(),
            class_name: None,
        };
        Self::new(artifact.content.flatten(), props, config)
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Label shown in the language selector.
    #[must_use]
    pub fn language_label(&self) -> &str {
        self.language.as_deref().unwrap_or(PLAIN_LABEL)
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Rename the tab.
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    /// Relabel the content's language. The text is left untouched.
    pub fn set_language(&mut self, language: impl Into<String>) {
        let language = language.into();
        tracing::debug!(from = %self.language_label(), to = %language, "Switching language");
        self.language = (language != PLAIN_LABEL).then_some(language);
    }

    /// Set the styling hook used by the HTML fragment.
    pub fn set_class_name(&mut self, class_name: impl Into<String>) {
        self.class_name = Some(class_name.into());
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.content.lines().count().max(1)
    }

    /// Recompute bounds for an available viewport of `rows` lines.
    pub fn resize(&mut self, rows: Option<usize>) {
        self.viewport_rows = rows;
    }

    /// Visible height in lines, clamped into the configured bounds.
    #[must_use]
    pub fn height(&self) -> usize {
        let max = self
            .viewport_rows
            .map_or(self.max_lines, |rows| rows.min(self.max_lines))
            .max(self.min_lines);
        self.line_count().max(self.min_lines).min(max)
    }

    /// Copy the content and start the "copied" acknowledgement.
    pub fn copy(&mut self, now: Instant) -> &str {
        self.copied_at = Some(now);
        &self.content
    }

    /// Whether the acknowledgement is still showing at `now`.
    #[must_use]
    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.copied_feedback)
    }

    #[must_use]
    pub fn copy_label(&self, now: Instant) -> &'static str {
        if self.is_copied(now) {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }

    /// Render the viewer for a terminal: tab header, then highlighted lines.
    #[must_use]
    pub fn render(&self, highlighter: &SyntaxHighlighter, now: Instant) -> String {
        let mut out = String::new();

        let copy = if self.is_copied(now) {
            self.copy_label(now).green().bold()
        } else {
            self.copy_label(now).dimmed()
        };
        let mode = if self.read_only { " · read-only" } else { "" };

        let _ = writeln!(
            out,
            "╭─ {} ─ [{}]{} ─ {}",
            self.display_name.bold(),
            self.language_label().cyan(),
            mode.dimmed(),
            copy
        );

        let syntax = highlighter.syntax_name(self.language());
        tracing::trace!(name = %self.display_name, syntax, "Rendering code viewer");

        let height = self.height();
        let lines = highlighter.highlight_lines(self.content(), self.language());
        let width = lines.len().to_string().len();

        for (i, line) in lines.iter().take(height).enumerate() {
            let number = format!("{:>width$}", i + 1);
            let _ = writeln!(out, "│ {} {line}", number.dimmed());
        }

        let hidden = lines.len().saturating_sub(height);
        if hidden > 0 {
            let _ = writeln!(out, "│ {}", format!("… {hidden} more lines").dimmed());
        }
        out.push_str("╰─");

        out
    }

    /// Render the viewer as an HTML fragment.
    #[must_use]
    pub fn render_html(&self) -> String {
        let class = self
            .class_name
            .as_deref()
            .map_or_else(|| "code-viewer".to_string(), |c| format!("code-viewer {c}"));

        format!(
            "<div class=\"{}\" data-lines=\"{}\">\n<div class=\"tab\">{}</div>\n<pre><code class=\"language-{}\">{}</code></pre>\n</div>\n",
            escape_html(&class),
            self.height(),
            escape_html(&self.display_name),
            escape_html(self.language_label()),
            escape_html(&self.content)
        )
    }
}

/// Copy the `index`-th viewer (1-based) and return its text.
///
/// # Errors
/// Returns a config error when no viewer has that index.
pub fn copy_block(viewers: &mut [CodeViewer], index: usize, now: Instant) -> Result<String> {
    let found = viewers.len();
    index
        .checked_sub(1)
        .and_then(|i| viewers.get_mut(i))
        .map(|viewer| viewer.copy(now).to_string())
        .ok_or_else(|| AppError::Config {
            message: format!("No code block #{index} (found {found})"),
        })
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentNode;

    fn config() -> ViewerConfig {
        ViewerConfig {
            min_lines: 3,
            max_lines: 10,
            copied_feedback_ms: 2000,
        }
    }

    fn viewer(content: &str, language: Option<&str>) -> CodeViewer {
        let props = ViewerProps {
            language: language.map(String::from),
            read_only: true,
            ..Default::default()
        };
        CodeViewer::new(content, props, &config())
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(viewer("x", Some("python")).display_name(), "untitled.py");
        assert_eq!(viewer("x", Some("TypeScript")).display_name(), "untitled.ts");
        assert_eq!(viewer("x", None).display_name(), "untitled.txt");
        assert_eq!(viewer("x", Some("klingon")).display_name(), "untitled.txt");
    }

    #[test]
    fn test_explicit_display_name_wins() {
        let props = ViewerProps {
            language: Some("rust".into()),
            display_name: Some("main.rs".into()),
            ..Default::default()
        };
        assert_eq!(CodeViewer::new("", props, &config()).display_name(), "main.rs");
    }

    #[test]
    fn test_height_is_clamped() {
        assert_eq!(viewer("one", None).height(), 3);
        assert_eq!(viewer("1\n2\n3\n4\n5", None).height(), 5);
        let long = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        assert_eq!(viewer(&long, None).height(), 10);
    }

    #[test]
    fn test_resize_recomputes_height() {
        let long = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut v = viewer(&long, None);

        v.resize(Some(6));
        assert_eq!(v.height(), 6);
        v.resize(Some(6));
        assert_eq!(v.height(), 6);
        v.resize(Some(1));
        assert_eq!(v.height(), 3);
        v.resize(None);
        assert_eq!(v.height(), 10);
    }

    #[test]
    fn test_language_switch_keeps_content() {
        let highlighter = SyntaxHighlighter::new();
        let code = "def f():\n    return 1\n";
        let mut v = viewer(code, Some("rust"));
        let name_before = v.display_name().to_string();

        assert_eq!(highlighter.syntax_name(v.language()), "Rust");

        v.set_language("python");

        assert_eq!(v.content(), code);
        assert_eq!(v.language_label(), "python");
        assert_eq!(highlighter.syntax_name(v.language()), "Python");
        assert_eq!(v.display_name(), name_before);

        v.set_language("plaintext");
        assert_eq!(v.language(), None);
        assert_eq!(v.content(), code);
    }

    #[test]
    fn test_copy_acknowledgement_reverts() {
        let mut v = viewer("let x = 1;", Some("rust"));
        let start = Instant::now();

        assert_eq!(v.copy_label(start), "Copy");
        assert_eq!(v.copy(start), "let x = 1;");
        assert_eq!(v.copy_label(start), "Copied!");
        assert!(v.is_copied(start + Duration::from_millis(1999)));
        assert_eq!(v.copy_label(start + Duration::from_secs(2)), "Copy");
    }

    #[test]
    fn test_from_artifact_flattens_content() {
        let artifact = CodeArtifact {
            language: Some("js".into()),
            display_name: None,
            content: ContentNode::Sequence(vec!["let a;".into(), "\n".into(), "a = 1;".into()]),
        };
        let v = CodeViewer::from_artifact(&artifact, &config());

        assert_eq!(v.content(), "let a;\na = 1;");
        assert_eq!(v.display_name(), "untitled.js");
    }

    #[test]
    fn test_render_truncates_and_labels() {
        colored::control::set_override(false);
        let highlighter = SyntaxHighlighter::new();
        let long = (0..12).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let v = viewer(&long, None);

        let out = v.render(&highlighter, Instant::now());

        assert!(out.contains("untitled.txt"));
        assert!(out.contains("[plaintext]"));
        assert!(out.contains("read-only"));
        assert!(out.contains("… 2 more lines"));
    }

    #[test]
    fn test_render_html_escapes() {
        let mut v = viewer("a < b && c", Some("c"));
        v.set_class_name("compact");
        let html = v.render_html();

        assert!(html.contains("class=\"code-viewer compact\""));
        assert!(html.contains("a &lt; b &amp;&amp; c"));
        assert!(html.contains("language-c"));
    }

    #[test]
    fn test_language_options_have_extensions() {
        for lang in LANGUAGE_OPTIONS.iter().filter(|l| **l != "plaintext") {
            assert_ne!(guess_extension(Some(lang)), "txt", "{lang}");
        }
    }

    #[test]
    fn test_copy_block_by_index() {
        let now = Instant::now();
        let mut viewers = vec![viewer("first", None), viewer("second", None)];

        assert_eq!(copy_block(&mut viewers, 2, now).unwrap(), "second");
        assert!(viewers[1].is_copied(now));
        assert!(!viewers[0].is_copied(now));
    }

    #[test]
    fn test_copy_block_out_of_range() {
        let now = Instant::now();
        let mut viewers = vec![viewer("only", None)];

        for index in [0, 2] {
            assert!(matches!(
                copy_block(&mut viewers, index, now),
                Err(AppError::Config { .. })
            ));
        }
        assert!(!viewers[0].is_copied(now));
    }
}
