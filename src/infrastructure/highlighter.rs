//! Syntax highlighting via `syntect`.
//!
//! Produces 24-bit ANSI escaped lines for terminal display. Unknown
//! languages fall back to plain text.

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const DEFAULT_THEME: &str = "base16-ocean.dark";
const ANSI_RESET: &str = "\x1b[0m";

/// Syntax highlighter for code content.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Create a highlighter with the bundled syntaxes and themes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme: DEFAULT_THEME.to_string(),
        }
    }

    /// Resolve a language tag (name or extension) to a syntax.
    fn find_syntax(&self, language: Option<&str>) -> &SyntaxReference {
        language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .and_then(|l| self.syntax_set.find_syntax_by_token(l))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    /// Name of the syntax used for `language`.
    #[must_use]
    pub fn syntax_name(&self, language: Option<&str>) -> &str {
        &self.find_syntax(language).name
    }

    /// Highlight `code`, returning one escaped string per line.
    #[must_use]
    pub fn highlight_lines(&self, code: &str, language: Option<&str>) -> Vec<String> {
        let Some(theme) = self.theme_set.themes.get(&self.theme) else {
            tracing::warn!(theme = %self.theme, "Highlight theme missing, using plain text");
            return code.lines().map(String::from).collect();
        };

        let syntax = self.find_syntax(language);
        let mut highlighter = HighlightLines::new(syntax, theme);

        LinesWithEndings::from(code)
            .map(|line| match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let escaped = as_24_bit_terminal_escaped(&ranges, false);
                    format!("{}{ANSI_RESET}", escaped.trim_end_matches(['\n', '\r']))
                }
                Err(e) => {
                    tracing::debug!("Highlighting failed, using plain line: {}", e);
                    line.trim_end_matches(['\n', '\r']).to_string()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_lookup_by_name_and_extension() {
        let highlighter = SyntaxHighlighter::new();
        assert_eq!(highlighter.syntax_name(Some("rust")), "Rust");
        assert_eq!(highlighter.syntax_name(Some("rs")), "Rust");
        assert_eq!(highlighter.syntax_name(Some("py")), "Python");
    }

    #[test]
    fn test_unknown_language_is_plain_text() {
        let highlighter = SyntaxHighlighter::new();
        assert_eq!(highlighter.syntax_name(Some("no-such-lang")), "Plain Text");
        assert_eq!(highlighter.syntax_name(None), "Plain Text");
    }

    #[test]
    fn test_highlight_keeps_line_count() {
        let highlighter = SyntaxHighlighter::new();
        let lines = highlighter.highlight_lines("fn main() {\n    let x = 1;\n}\n", Some("rust"));
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("main"));
        assert!(lines.iter().all(|l| !l.ends_with('\n')));
    }
}
