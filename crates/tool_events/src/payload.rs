//! Typed tool-invocation payloads.
//!
//! Tool arguments arrive as untrusted JSON. [`normalize_payload`] decodes them into a closed
//! set of shapes and never fails: recognized tools with malformed fields keep the fields that
//! type-check, and anything else degrades to [`ToolPayload::Unknown`] with the raw value kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Computer,
    Bash,
    Unknown,
}

impl ToolKind {
    pub fn from_label(label: &str) -> Self {
        match label {
            "computer" => ToolKind::Computer,
            "bash" => ToolKind::Bash,
            _ => ToolKind::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Computer => "computer",
            ToolKind::Bash => "bash",
            ToolKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputerAction {
    Screenshot,
    LeftClick,
    RightClick,
    DoubleClick,
    MouseMove,
    Type,
    Key,
    Wait,
    Scroll,
    Unknown,
}

impl ComputerAction {
    pub fn from_label(label: &str) -> Self {
        match label {
            "screenshot" => ComputerAction::Screenshot,
            "left_click" => ComputerAction::LeftClick,
            "right_click" => ComputerAction::RightClick,
            "double_click" => ComputerAction::DoubleClick,
            "mouse_move" => ComputerAction::MouseMove,
            "type" => ComputerAction::Type,
            "key" => ComputerAction::Key,
            "wait" => ComputerAction::Wait,
            "scroll" => ComputerAction::Scroll,
            _ => ComputerAction::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComputerAction::Screenshot => "screenshot",
            ComputerAction::LeftClick => "left_click",
            ComputerAction::RightClick => "right_click",
            ComputerAction::DoubleClick => "double_click",
            ComputerAction::MouseMove => "mouse_move",
            ComputerAction::Type => "type",
            ComputerAction::Key => "key",
            ComputerAction::Wait => "wait",
            ComputerAction::Scroll => "scroll",
            ComputerAction::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "up" => Some(ScrollDirection::Up),
            "down" => Some(ScrollDirection::Down),
            "left" => Some(ScrollDirection::Left),
            "right" => Some(ScrollDirection::Right),
            _ => None,
        }
    }
}

/// Screen position in VNC pixels. Serializes as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate(pub f64, pub f64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerPayload {
    pub action: ComputerAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_direction: Option<ScrollDirection>,
}

impl ComputerPayload {
    pub fn new(action: ComputerAction) -> Self {
        Self {
            action,
            coordinate: None,
            text: None,
            duration: None,
            scroll_amount: None,
            scroll_direction: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BashPayload {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnknownPayload {
    pub raw: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "toolName", rename_all = "snake_case")]
pub enum ToolPayload {
    Computer(ComputerPayload),
    Bash(BashPayload),
    Unknown(UnknownPayload),
}

impl ToolPayload {
    pub fn unknown_empty() -> Self {
        ToolPayload::Unknown(UnknownPayload::default())
    }

    pub fn tool_kind(&self) -> ToolKind {
        match self {
            ToolPayload::Computer(_) => ToolKind::Computer,
            ToolPayload::Bash(_) => ToolKind::Bash,
            ToolPayload::Unknown(_) => ToolKind::Unknown,
        }
    }

    /// Grouping key for summaries: `computer:<action>`, `bash:command`, or `unknown`.
    pub fn type_label(&self) -> String {
        match self {
            ToolPayload::Computer(payload) => format!("computer:{}", payload.action.as_str()),
            ToolPayload::Bash(_) => "bash:command".to_string(),
            ToolPayload::Unknown(_) => "unknown".to_string(),
        }
    }
}

pub fn normalize_payload(tool_name: &str, args: &Value) -> ToolPayload {
    let kind = ToolKind::from_label(tool_name);
    let Some(obj) = args.as_object() else {
        return ToolPayload::Unknown(UnknownPayload {
            raw: raw_map(args),
        });
    };

    match kind {
        ToolKind::Computer => ToolPayload::Computer(normalize_computer(obj)),
        ToolKind::Bash => ToolPayload::Bash(BashPayload {
            command: string_field(obj, "command").unwrap_or_default(),
        }),
        ToolKind::Unknown => ToolPayload::Unknown(UnknownPayload { raw: obj.clone() }),
    }
}

fn normalize_computer(obj: &Map<String, Value>) -> ComputerPayload {
    let action = obj
        .get("action")
        .and_then(Value::as_str)
        .map(ComputerAction::from_label)
        .unwrap_or(ComputerAction::Unknown);

    ComputerPayload {
        action,
        coordinate: obj.get("coordinate").and_then(coordinate),
        text: string_field(obj, "text"),
        duration: obj.get("duration").and_then(Value::as_f64),
        scroll_amount: obj.get("scroll_amount").and_then(Value::as_f64),
        scroll_direction: obj
            .get("scroll_direction")
            .and_then(Value::as_str)
            .and_then(ScrollDirection::from_label),
    }
}

fn coordinate(value: &Value) -> Option<Coordinate> {
    match value.as_array()?.as_slice() {
        [x, y] => Some(Coordinate(x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn raw_map(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(obj) => obj.clone(),
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other.clone());
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn left_click_keeps_coordinate_only() {
        let payload = normalize_payload(
            "computer",
            &json!({"action": "left_click", "coordinate": [10, 20]}),
        );
        let mut expected = ComputerPayload::new(ComputerAction::LeftClick);
        expected.coordinate = Some(Coordinate(10.0, 20.0));
        assert_eq!(payload, ToolPayload::Computer(expected));
        assert_eq!(payload.type_label(), "computer:left_click");
    }

    #[test]
    fn bash_without_command_yields_empty_command() {
        let payload = normalize_payload("bash", &json!({}));
        assert_eq!(
            payload,
            ToolPayload::Bash(BashPayload {
                command: String::new()
            })
        );
        assert_eq!(payload.type_label(), "bash:command");
    }

    #[test]
    fn malformed_fields_are_dropped_independently() {
        let payload = normalize_payload(
            "computer",
            &json!({
                "action": "scroll",
                "coordinate": [1, "two"],
                "text": 5,
                "duration": "long",
                "scroll_amount": 3,
                "scroll_direction": "sideways",
            }),
        );
        let mut expected = ComputerPayload::new(ComputerAction::Scroll);
        expected.scroll_amount = Some(3.0);
        assert_eq!(payload, ToolPayload::Computer(expected));
    }

    #[test]
    fn coordinate_requires_exactly_two_numbers() {
        for bad in [json!([1]), json!([1, 2, 3]), json!({"x": 1, "y": 2}), json!(null)] {
            let payload = normalize_payload(
                "computer",
                &json!({"action": "mouse_move", "coordinate": bad}),
            );
            let ToolPayload::Computer(computer) = payload else {
                panic!("expected computer payload");
            };
            assert!(computer.coordinate.is_none());
        }
    }

    #[test]
    fn unrecognized_action_stays_computer() {
        let payload = normalize_payload("computer", &json!({"action": "triple_click"}));
        assert_eq!(
            payload,
            ToolPayload::Computer(ComputerPayload::new(ComputerAction::Unknown))
        );
        let payload = normalize_payload("computer", &json!({"action": 7}));
        assert_eq!(payload.type_label(), "computer:unknown");
    }

    #[test]
    fn unknown_tool_preserves_raw_arguments() {
        let args = json!({"url": "https://example.com", "depth": 2});
        let payload = normalize_payload("browser", &args);
        let ToolPayload::Unknown(unknown) = payload else {
            panic!("expected unknown payload");
        };
        assert_eq!(Value::Object(unknown.raw), args);
    }

    #[test]
    fn non_object_arguments_fall_back_to_unknown() {
        let payload = normalize_payload("bash", &json!("ls -la"));
        let ToolPayload::Unknown(unknown) = payload else {
            panic!("expected unknown payload");
        };
        assert_eq!(unknown.raw.get("value"), Some(&json!("ls -la")));

        assert_eq!(
            normalize_payload("computer", &Value::Null),
            ToolPayload::unknown_empty()
        );
    }

    #[test]
    fn serializes_with_tool_name_discriminant() {
        let payload = normalize_payload(
            "computer",
            &json!({"action": "scroll", "scroll_direction": "down", "scroll_amount": 2}),
        );
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "toolName": "computer",
                "action": "scroll",
                "scrollAmount": 2.0,
                "scrollDirection": "down",
            })
        );
        let bash = normalize_payload("bash", &json!({"command": "ls"}));
        assert_eq!(
            serde_json::to_value(&bash).unwrap(),
            json!({"toolName": "bash", "command": "ls"})
        );
    }
}
