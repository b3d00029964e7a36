use crate::error::{DiagramError, Result};
use crate::ir::NodeDescription;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static INIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%%\{\s*init\s*:\s*(\{.*\})\s*\}%%").unwrap());

#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub descriptions: Vec<NodeDescription>,
    /// Body of a leading `%%{init: {...}}%%` directive.
    pub init_config: Option<Value>,
}

/// Parse a single description written as JSON or JSON5.
pub fn parse_description(input: &str) -> Result<NodeDescription> {
    let mut parsed = parse_document(input)?;
    match parsed.descriptions.len() {
        1 => Ok(parsed.descriptions.remove(0)),
        count => Err(DiagramError::Parse(format!(
            "expected one description, found {count}"
        ))),
    }
}

/// Parse a document holding one description or an array of them.
///
/// Lines starting with `%%` are comments, except an `init` directive whose
/// JSON body is returned as `init_config`.
pub fn parse_document(input: &str) -> Result<ParseOutput> {
    let (body, init_config) = preprocess_input(input);
    if body.trim().is_empty() {
        return Err(DiagramError::Parse("no description in input".to_string()));
    }
    let value = parse_value(&body)?;
    let descriptions = match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                serde_json::from_value(item)
                    .map_err(|err| DiagramError::Parse(format!("description {}: {err}", idx + 1)))
            })
            .collect::<Result<Vec<_>>>()?,
        other => vec![
            serde_json::from_value(other).map_err(|err| DiagramError::Parse(err.to_string()))?,
        ],
    };
    Ok(ParseOutput {
        descriptions,
        init_config,
    })
}

fn parse_value(text: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(json_err) => json5::from_str::<Value>(text).map_err(|json5_err| {
            DiagramError::Parse(format!("{json_err} (as JSON5: {json5_err})"))
        }),
    }
}

fn preprocess_input(input: &str) -> (String, Option<Value>) {
    let mut init_config = None;
    let mut lines = Vec::new();
    for raw_line in input.lines() {
        let trimmed = raw_line.trim();
        if let Some(caps) = INIT_RE.captures(trimmed) {
            if let Some(json_str) = caps.get(1).map(|m| m.as_str()) {
                if let Ok(value) = serde_json::from_str::<Value>(json_str) {
                    init_config = Some(value);
                } else if let Ok(value) = json5::from_str::<Value>(json_str) {
                    init_config = Some(value);
                }
            }
            continue;
        }
        if trimmed.starts_with("%%") {
            continue;
        }
        lines.push(raw_line);
    }
    (lines.join("\n"), init_config)
}
