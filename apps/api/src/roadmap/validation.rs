//! Checks a parsed model reply before it may be stored as a roadmap.

use serde_json::Value;
use thiserror::Error;

use crate::models::roadmap::{RoadmapDraft, RoadmapNode};

const REQUIRED_FIELDS: [&str; 4] = ["title", "description", "timeEstimate", "nodes"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Roadmap must be a JSON object")]
    NotAnObject,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Roadmap must contain at least one node")]
    NoNodes,

    #[error("Roadmap field has the wrong type: {0}")]
    Malformed(String),
}

pub fn validate_draft(value: &Value) -> Result<RoadmapDraft, DraftError> {
    let obj = value.as_object().ok_or(DraftError::NotAnObject)?;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| obj.get(*field).map_or(true, is_blank))
        .collect();
    if !missing.is_empty() {
        return Err(DraftError::MissingFields(missing));
    }

    let nodes = match obj.get("nodes") {
        Some(Value::Array(nodes)) if !nodes.is_empty() => nodes,
        _ => return Err(DraftError::NoNodes),
    };

    Ok(RoadmapDraft {
        title: string_field(obj.get("title"), "title")?,
        description: string_field(obj.get("description"), "description")?,
        time_estimate: string_field(obj.get("timeEstimate"), "timeEstimate")?,
        nodes: nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                serde_json::from_value::<RoadmapNode>(node.clone())
                    .map_err(|e| DraftError::Malformed(format!("nodes[{i}]: {e}")))
            })
            .collect::<Result<_, _>>()?,
    })
}

/// Null, `false`, zero and the empty string all count as absent.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn string_field(value: Option<&Value>, name: &str) -> Result<String, DraftError> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(DraftError::Malformed(format!("{name} must be a string"))),
    }
}
