//! Tool result classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Running,
    Success,
    /// Never derived from a result; reserved for failures injected by the host.
    Error,
    Aborted,
}

impl EventStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, EventStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Running => "running",
            EventStatus::Success => "success",
            EventStatus::Error => "error",
            EventStatus::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResult {
    Text { text: String },
    Image { data: String },
    Aborted { text: String },
    Unknown { raw: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedResult {
    pub result: Option<ToolResult>,
    pub status: EventStatus,
}

/// Decodes a raw tool result into a [`ToolResult`] and its terminal status.
///
/// `None`, JSON `null`, and the empty string count as "no result" and still complete the
/// event as [`EventStatus::Success`].
pub fn classify_result(raw: Option<&Value>, abort_sentinel: &str) -> ClassifiedResult {
    let result = raw.and_then(|value| classify_value(value, abort_sentinel));
    ClassifiedResult {
        status: derive_status_from_result(result.as_ref()),
        result,
    }
}

pub fn derive_status_from_result(result: Option<&ToolResult>) -> EventStatus {
    match result {
        Some(ToolResult::Aborted { .. }) => EventStatus::Aborted,
        _ => EventStatus::Success,
    }
}

fn classify_value(value: &Value, abort_sentinel: &str) -> Option<ToolResult> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text_or_aborted(text, abort_sentinel)),
        Value::Object(obj) => {
            let field = |key: &str| obj.get(key).and_then(Value::as_str);
            let classified = match obj.get("type").and_then(Value::as_str) {
                Some("image") => field("data").map(|data| ToolResult::Image {
                    data: data.to_string(),
                }),
                Some("text") => field("text").map(|text| text_or_aborted(text, abort_sentinel)),
                _ => None,
            };
            Some(classified.unwrap_or_else(|| ToolResult::Unknown { raw: value.clone() }))
        }
        other => Some(ToolResult::Unknown { raw: other.clone() }),
    }
}

fn text_or_aborted(text: &str, abort_sentinel: &str) -> ToolResult {
    if text == abort_sentinel {
        ToolResult::Aborted {
            text: text.to_string(),
        }
    } else {
        ToolResult::Text {
            text: text.to_string(),
        }
    }
}
