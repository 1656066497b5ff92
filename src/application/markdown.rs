//! Markdown rendering and code artifact extraction.
//!
//! Renders a chat message to HTML with `pulldown-cmark` and collects each
//! code block as a [`CodeArtifact`] for dedicated display.

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::domain::ContentNode;

/// A code block extracted from rendered markdown.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeArtifact {
    /// Language tag from the fence info string.
    pub language: Option<String>,
    /// Explicit display name from a `title=` attribute.
    pub display_name: Option<String>,
    /// Block content as handed over by the renderer.
    pub content: ContentNode,
}

/// Rendered markdown document.
#[derive(Debug, Clone, Default)]
pub struct RenderedMarkdown {
    /// HTML rendering of the whole document.
    pub html: String,
    /// Code blocks in document order.
    pub artifacts: Vec<CodeArtifact>,
}

/// Renders `input` to HTML and extracts its code blocks.
#[must_use]
pub fn render_markdown(input: &str) -> RenderedMarkdown {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let events: Vec<Event> = Parser::new_ext(input, options).collect();

    let mut artifacts = Vec::new();
    let mut current: Option<(Option<String>, Option<String>, Vec<ContentNode>)> = None;

    for event in &events {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let (language, display_name) = match kind {
                    CodeBlockKind::Fenced(info) => parse_info_string(info),
                    CodeBlockKind::Indented => (None, None),
                };
                current = Some((language, display_name, Vec::new()));
            }
            Event::Text(text) => {
                if let Some((_, _, parts)) = current.as_mut() {
                    parts.push(ContentNode::text(text.as_ref()));
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, display_name, parts)) = current.take() {
                    artifacts.push(CodeArtifact {
                        language,
                        display_name,
                        content: ContentNode::Sequence(parts),
                    });
                }
            }
            _ => {}
        }
    }

    let mut html_out = String::with_capacity(input.len() * 3 / 2);
    html::push_html(&mut html_out, events.into_iter());

    tracing::debug!(artifacts = artifacts.len(), "Rendered markdown");

    RenderedMarkdown {
        html: html_out,
        artifacts,
    }
}

/// Splits a fence info string into a language tag and optional title.
///
/// Accepts `rust`, `rust title=main.rs` and `rust title="my file.rs"`.
fn parse_info_string(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    let language = info
        .split_whitespace()
        .next()
        .filter(|token| !token.contains('='))
        .map(String::from);

    let title = info.find("title=").and_then(|start| {
        let rest = &info[start + "title=".len()..];
        let value = if let Some(quoted) = rest.strip_prefix('"') {
            quoted.split('"').next().unwrap_or_default()
        } else {
            rest.split_whitespace().next().unwrap_or_default()
        };
        (!value.is_empty()).then(|| value.to_string())
    });

    (language, title)
}
