//! Chat history as seen by the scanner.
//!
//! Messages come from the chat transport as loosely shaped JSON. Only tool-invocation parts
//! matter here; everything else decodes to [`MessagePart::Other`] and is ignored.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum InvocationState {
    /// Arguments are still streaming; never dispatched.
    PartialCall,
    Call,
    Result,
}

impl InvocationState {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "partial-call" => Some(InvocationState::PartialCall),
            "call" => Some(InvocationState::Call),
            "result" => Some(InvocationState::Result),
            _ => None,
        }
    }
}

/// One sighting of a tool invocation inside a message part.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub tool_name: String,
    pub state: InvocationState,
    pub args: Value,
    pub result: Option<Value>,
}

impl ToolInvocation {
    pub fn call(id: impl Into<String>, tool_name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            state: InvocationState::Call,
            args,
            result: None,
        }
    }

    pub fn result(
        id: impl Into<String>,
        tool_name: impl Into<String>,
        args: Value,
        result: Option<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            state: InvocationState::Result,
            args,
            result,
        }
    }

    /// Decodes `{toolCallId, toolName, state, args, result}`. Returns `None` when the id or
    /// state is missing or unrecognized.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let Some(id) = obj.get("toolCallId").and_then(Value::as_str) else {
            debug!("skipping tool invocation without toolCallId");
            return None;
        };
        let raw_state = obj.get("state").and_then(Value::as_str);
        let Some(state) = raw_state.and_then(InvocationState::from_label) else {
            debug!(id, state = ?raw_state, "skipping tool invocation with unrecognized state");
            return None;
        };
        Some(Self {
            id: id.to_string(),
            tool_name: obj
                .get("toolName")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            state,
            args: obj.get("args").cloned().unwrap_or(Value::Null),
            result: obj.get("result").cloned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessagePart {
    ToolInvocation(ToolInvocation),
    Other,
}

impl MessagePart {
    pub fn from_value(value: &Value) -> Self {
        if value.get("type").and_then(Value::as_str) != Some("tool-invocation") {
            return MessagePart::Other;
        }
        value
            .get("toolInvocation")
            .and_then(ToolInvocation::from_value)
            .map_or(MessagePart::Other, MessagePart::ToolInvocation)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct ChatMessage {
    pub id: Option<String>,
    pub role: Option<String>,
    pub parts: Vec<MessagePart>,
}

impl ChatMessage {
    pub fn assistant(parts: Vec<MessagePart>) -> Self {
        Self {
            id: None,
            role: Some("assistant".to_string()),
            parts,
        }
    }

    /// Total decode: non-object input yields an empty message.
    ///
    /// Reads `parts` first, then the older top-level `toolInvocations` array.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let string = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        let mut parts: Vec<MessagePart> = obj
            .get("parts")
            .and_then(Value::as_array)
            .map(|raw| raw.iter().map(MessagePart::from_value).collect())
            .unwrap_or_default();
        if let Some(legacy) = obj.get("toolInvocations").and_then(Value::as_array) {
            parts.extend(legacy.iter().map(|raw| {
                ToolInvocation::from_value(raw)
                    .map_or(MessagePart::Other, MessagePart::ToolInvocation)
            }));
        }

        Self {
            id: string("id"),
            role: string("role"),
            parts,
        }
    }

    pub fn tool_invocations(&self) -> impl Iterator<Item = &ToolInvocation> + '_ {
        self.parts.iter().filter_map(|part| match part {
            MessagePart::ToolInvocation(invocation) => Some(invocation),
            MessagePart::Other => None,
        })
    }
}

impl From<Value> for ChatMessage {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}
