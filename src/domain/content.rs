//! Rendered content nodes and their normalization to flat text.
//!
//! Markdown renderers hand code blocks over as loosely shaped trees. Every
//! shape the pipeline understands is a variant of [`ContentNode`], and
//! [`ContentNode::flatten`] reduces any of them to a single string.

use serde_json::Value;

/// A literal carried by a `value` node.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String literal.
    Str(String),
    /// Numeric literal, kept in its source representation.
    Number(serde_json::Number),
    /// Boolean literal.
    Bool(bool),
    /// Absent value. Flattens to the empty string.
    Absent,
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Absent => Ok(()),
        }
    }
}

/// Output of the rendering stage for a block of content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    /// Plain text.
    Text(String),
    /// Ordered children, concatenated when flattened.
    Sequence(Vec<ContentNode>),
    /// A node exposing a literal `value` field.
    Value(Literal),
    /// A node exposing a `raw` text field.
    Raw(String),
    /// A node wrapping further children under `props.children`.
    Nested(Box<ContentNode>),
}

impl ContentNode {
    /// Shorthand for a text node.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Reduces the node to one string, preserving order and content.
    #[must_use]
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut String) {
        match self {
            Self::Text(s) | Self::Raw(s) => out.push_str(s),
            Self::Sequence(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            Self::Value(literal) => out.push_str(&literal.to_string()),
            Self::Nested(inner) => inner.flatten_into(out),
        }
    }

    /// Converts untyped renderer output into a node.
    ///
    /// Shapes are probed in order: array, `value`, `raw`, `props.children`,
    /// `children`. Anything else degrades to its string form.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Text(String::new()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Number(n) => Self::Text(n.to_string()),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from_value).collect()),
            Value::Object(map) => {
                if let Some(inner) = map.get("value") {
                    return match inner {
                        Value::Null => Self::Value(Literal::Absent),
                        Value::String(s) => Self::Value(Literal::Str(s.clone())),
                        Value::Number(n) => Self::Value(Literal::Number(n.clone())),
                        Value::Bool(b) => Self::Value(Literal::Bool(*b)),
                        other => Self::Nested(Box::new(Self::from_value(other))),
                    };
                }

                if let Some(raw) = map.get("raw") {
                    return Self::Raw(match raw {
                        Value::String(s) => s.clone(),
                        other => Self::from_value(other).flatten(),
                    });
                }

                let children = map
                    .get("props")
                    .and_then(|props| props.get("children"))
                    .or_else(|| map.get("children"));

                if let Some(children) = children {
                    return Self::Nested(Box::new(Self::from_value(children)));
                }

                tracing::debug!("Unrecognized content node shape, using its JSON text");
                Self::Text(value.to_string())
            }
        }
    }
}

impl From<&str> for ContentNode {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_plain_string() {
        let node = ContentNode::from_value(&json!("fn main() {}"));
        assert_eq!(node.flatten(), "fn main() {}");
    }

    #[test]
    fn test_flatten_one_level_array() {
        let node = ContentNode::from_value(&json!(["let x = 1;", "\n", "let y = 2;"]));
        assert_eq!(node.flatten(), "let x = 1;\nlet y = 2;");
    }

    #[test]
    fn test_flatten_nested_raw_node() {
        let node = ContentNode::from_value(&json!({
            "props": { "children": [{ "raw": "print('hi')" }, "\n"] }
        }));
        let flat = node.flatten();
        assert_eq!(flat, "print('hi')\n");
        assert!(!flat.contains("[object Object]"));
    }

    #[test]
    fn test_flatten_value_literals() {
        assert_eq!(ContentNode::from_value(&json!({ "value": "abc" })).flatten(), "abc");
        assert_eq!(ContentNode::from_value(&json!({ "value": 42 })).flatten(), "42");
        assert_eq!(ContentNode::from_value(&json!({ "value": true })).flatten(), "true");
    }

    #[test]
    fn test_absent_values_flatten_to_empty() {
        assert_eq!(ContentNode::from_value(&json!(null)).flatten(), "");
        assert_eq!(ContentNode::from_value(&json!({ "value": null })).flatten(), "");
        assert_eq!(ContentNode::Value(Literal::Absent).flatten(), "");
    }

    #[test]
    fn test_hast_style_children() {
        let node = ContentNode::from_value(&json!({
            "type": "element",
            "children": [{ "type": "text", "value": "a" }, { "type": "text", "value": "b" }]
        }));
        assert_eq!(node.flatten(), "ab");
    }

    #[test]
    fn test_unrecognized_shape_degrades_to_json_text() {
        let node = ContentNode::from_value(&json!({ "unexpected": 1 }));
        assert_eq!(node.flatten(), r#"{"unexpected":1}"#);
    }

    #[test]
    fn test_constructed_tree() {
        let node = ContentNode::Sequence(vec![
            ContentNode::from("a"),
            ContentNode::Nested(Box::new(ContentNode::Raw("b".into()))),
            ContentNode::Value(Literal::Str("c".into())),
        ]);
        assert_eq!(node.flatten(), "abc");
    }
}
