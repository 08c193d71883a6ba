//! Placeholder substitution for templates.
//!
//! # Syntax
//!
//! - `{{ name }}` - replaced with the value of `name` (whitespace inside the
//!   braces is ignored)
//! - `\{{` - produces a literal `{{` in output
//!
//! Names are ASCII identifiers (`project_name`, `node_version`). Every
//! placeholder must resolve; a missing value, a malformed name or an
//! unterminated placeholder is an authoring error, so literal `{{name}}`
//! text never reaches an emitted file.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use stackup::template::interpolation::render;
//!
//! let mut values = BTreeMap::new();
//! values.insert("name".to_string(), "Bob".to_string());
//! assert_eq!(render("greeting", "hello {{name}}", &values).unwrap(), "hello Bob");
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, StackupError};

/// A segment of a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Placeholder reference: {{ name }}
    Placeholder(String),
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a template into literal text and placeholders.
///
/// Returns a message describing the first syntax problem.
pub fn parse_template(input: &str) -> std::result::Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(pos) = rest.find("{{") {
        // `\{{` is an escaped opening.
        if rest[..pos].ends_with('\\') {
            literal.push_str(&rest[..pos - 1]);
            literal.push_str("{{");
            rest = &rest[pos + 2..];
            continue;
        }

        literal.push_str(&rest[..pos]);
        let after_open = &rest[pos + 2..];
        let Some(close) = after_open.find("}}") else {
            let offset = input.len() - rest.len() + pos;
            let line = input[..offset].matches('\n').count() + 1;
            return Err(format!("unterminated placeholder on line {}", line));
        };

        let name = after_open[..close].trim();
        if !is_valid_name(name) {
            return Err(format!("invalid placeholder name '{}'", name));
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Placeholder(name.to_string()));
        rest = &after_open[close + 2..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Unique placeholder names used by a template.
pub fn extract_placeholders(input: &str) -> std::result::Result<BTreeSet<String>, String> {
    Ok(parse_template(input)?
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Placeholder(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Substitute every placeholder in `input` from `values`.
///
/// # Errors
///
/// Returns `TemplateAuthoring` naming `template` if the syntax is invalid
/// or any placeholder has no value. All missing names are listed.
pub fn render(template: &str, input: &str, values: &BTreeMap<String, String>) -> Result<String> {
    let authoring = |message: String| StackupError::TemplateAuthoring {
        template: template.to_string(),
        message,
    };

    let segments = parse_template(input).map_err(authoring)?;

    let missing: BTreeSet<&str> = segments
        .iter()
        .filter_map(|seg| match seg {
            Segment::Placeholder(name) if !values.contains_key(name) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|n| format!("{{{{{}}}}}", n)).collect();
        return Err(authoring(format!("no value for {}", names.join(", "))));
    }

    let mut result = String::with_capacity(input.len());
    for segment in &segments {
        match segment {
            Segment::Literal(text) => result.push_str(text),
            Segment::Placeholder(name) => {
                if let Some(value) = values.get(name) {
                    result.push_str(value);
                }
            }
        }
    }
    Ok(result)
}
