//! Pulls a JSON value out of model output.
//!
//! Tries the text as-is first. Failing that, code fences are unwrapped and the slice from
//! the first `{` to the last `}` is parsed. Anything still unparseable is `NotValidJson`.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Model output is not valid JSON: {0}")]
    NotValidJson(String),
}

pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    let text = text.trim_start_matches('\u{feff}').trim();

    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    let unfenced = strip_code_fences(text);
    let start = unfenced.find('{');
    let end = unfenced.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&unfenced[start..=end])
            .map_err(|e| ExtractError::NotValidJson(e.to_string())),
        _ => Err(ExtractError::NotValidJson(
            "no JSON object found in response".to_string(),
        )),
    }
}

/// Replaces every ```` ```json … ``` ```` (or bare ```` ``` ````) block with its trimmed body.
/// An unterminated fence is left as it is.
fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let Some(close) = after_open.find("```") else {
            break;
        };
        let body = &after_open[..close];
        let body = body.strip_prefix("json").unwrap_or(body);

        out.push_str(&rest[..open]);
        out.push_str(body.trim());
        rest = &after_open[close + 3..];
    }

    out.push_str(rest);
    out
}
