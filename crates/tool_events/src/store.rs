//! Ordered, keyed log of tool events.
//!
//! [`EventStore::dispatch`] is the only mutator. Events are appended in first-seen order and
//! later updates touch status, duration, and result in place without moving them.

use std::collections::HashMap;

use serde::Serialize;

use crate::payload::{ToolKind, ToolPayload};
use crate::result::{EventStatus, ToolResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEvent {
    pub id: String,
    pub tool_name: ToolKind,
    /// Creation time in epoch milliseconds.
    pub timestamp: u64,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub payload: ToolPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
}

impl ToolEvent {
    /// A freshly issued call in `running` status. The tool kind follows the payload.
    pub fn running(id: impl Into<String>, payload: ToolPayload, timestamp: u64) -> Self {
        let tool_name = payload.tool_kind();
        Self::call(id, tool_name, payload, timestamp)
    }

    /// A freshly issued call whose tool kind comes from the invocation label, which can
    /// differ from the payload when the arguments were malformed.
    pub fn call(
        id: impl Into<String>,
        tool_name: ToolKind,
        payload: ToolPayload,
        timestamp: u64,
    ) -> Self {
        Self {
            id: id.into(),
            tool_name,
            timestamp,
            status: EventStatus::Running,
            duration_ms: None,
            payload,
            result: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventAction {
    RegisterCall(ToolEvent),
    RegisterResult {
        id: String,
        status: EventStatus,
        duration_ms: u64,
        result: Option<ToolResult>,
        /// Timestamp for the synthesized event when no call was registered.
        observed_at_ms: u64,
    },
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventState {
    pub by_id: HashMap<String, ToolEvent>,
    pub order: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EventStore {
    state: EventState,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: EventAction) {
        match action {
            EventAction::RegisterCall(event) => self.register_call(event),
            EventAction::RegisterResult {
                id,
                status,
                duration_ms,
                result,
                observed_at_ms,
            } => self.register_result(id, status, duration_ms, result, observed_at_ms),
            EventAction::Reset => self.state = EventState::default(),
        }
    }

    fn register_call(&mut self, mut event: ToolEvent) {
        if self.state.by_id.contains_key(&event.id) {
            return;
        }
        event.status = EventStatus::Running;
        self.state.order.push(event.id.clone());
        self.state.by_id.insert(event.id.clone(), event);
    }

    fn register_result(
        &mut self,
        id: String,
        status: EventStatus,
        duration_ms: u64,
        result: Option<ToolResult>,
        observed_at_ms: u64,
    ) {
        if let Some(event) = self.state.by_id.get_mut(&id) {
            event.status = status;
            event.duration_ms = Some(duration_ms);
            if result.is_some() {
                event.result = result;
            }
            return;
        }

        let event = ToolEvent {
            id: id.clone(),
            tool_name: ToolKind::Unknown,
            timestamp: observed_at_ms,
            status,
            duration_ms: Some(duration_ms),
            payload: ToolPayload::unknown_empty(),
            result,
        };
        self.state.order.push(id.clone());
        self.state.by_id.insert(id, event);
    }

    pub fn state(&self) -> &EventState {
        &self.state
    }

    pub fn get(&self, id: &str) -> Option<&ToolEvent> {
        self.state.by_id.get(id)
    }

    /// Events in first-seen order.
    pub fn events(&self) -> impl Iterator<Item = &ToolEvent> + '_ {
        self.state
            .order
            .iter()
            .filter_map(|id| self.state.by_id.get(id))
    }

    /// Ids still `running`, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &str> + '_ {
        self.events()
            .filter(|event| event.status == EventStatus::Running)
            .map(|event| event.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.state.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::payload::normalize_payload;

    fn call(id: &str, command: &str) -> EventAction {
        EventAction::RegisterCall(ToolEvent::running(
            id,
            normalize_payload("bash", &json!({ "command": command })),
            100,
        ))
    }

    fn result(id: &str, status: EventStatus, result: Option<ToolResult>) -> EventAction {
        EventAction::RegisterResult {
            id: id.to_string(),
            status,
            duration_ms: 25,
            result,
            observed_at_ms: 500,
        }
    }

    fn text(text: &str) -> Option<ToolResult> {
        Some(ToolResult::Text {
            text: text.to_string(),
        })
    }

    fn assert_order_invariant(store: &EventStore) {
        let state = store.state();
        assert_eq!(state.order.len(), state.by_id.len());
        for id in &state.order {
            assert!(state.by_id.contains_key(id));
            assert_eq!(state.order.iter().filter(|other| *other == id).count(), 1);
        }
    }

    #[test]
    fn register_call_is_idempotent() {
        let mut once = EventStore::new();
        once.dispatch(call("a", "ls"));

        let mut twice = EventStore::new();
        twice.dispatch(call("a", "ls"));
        twice.dispatch(call("a", "pwd"));

        assert_eq!(once.state(), twice.state());
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn register_call_forces_running() {
        let mut event = ToolEvent::running("a", ToolPayload::unknown_empty(), 1);
        event.status = EventStatus::Success;
        let mut store = EventStore::new();
        store.dispatch(EventAction::RegisterCall(event));
        assert_eq!(store.get("a").unwrap().status, EventStatus::Running);
    }

    #[test]
    fn result_updates_in_place_without_reordering() {
        let mut store = EventStore::new();
        store.dispatch(call("a", "ls"));
        store.dispatch(call("b", "pwd"));
        store.dispatch(result("a", EventStatus::Success, text("out")));

        assert_eq!(store.state().order, vec!["a", "b"]);
        let a = store.get("a").unwrap();
        assert_eq!(a.status, EventStatus::Success);
        assert_eq!(a.duration_ms, Some(25));
        assert_eq!(a.result, text("out"));
        assert_eq!(a.timestamp, 100);
        assert_eq!(store.pending().collect::<Vec<_>>(), vec!["b"]);
        assert_order_invariant(&store);
    }

    #[test]
    fn missing_result_keeps_previous_value() {
        let mut store = EventStore::new();
        store.dispatch(call("a", "ls"));
        store.dispatch(result("a", EventStatus::Success, text("first")));
        store.dispatch(result("a", EventStatus::Aborted, None));

        let a = store.get("a").unwrap();
        assert_eq!(a.status, EventStatus::Aborted);
        assert_eq!(a.result, text("first"));
    }

    #[test]
    fn orphan_result_synthesizes_unknown_event() {
        let mut store = EventStore::new();
        store.dispatch(call("a", "ls"));
        store.dispatch(result("ghost", EventStatus::Aborted, None));

        assert_eq!(store.state().order, vec!["a", "ghost"]);
        let ghost = store.get("ghost").unwrap();
        assert_eq!(ghost.tool_name, ToolKind::Unknown);
        assert_eq!(ghost.payload, ToolPayload::unknown_empty());
        assert_eq!(ghost.status, EventStatus::Aborted);
        assert_eq!(ghost.timestamp, 500);

        store.dispatch(call("ghost", "late"));
        assert_eq!(store.get("ghost").unwrap().status, EventStatus::Aborted);
        assert_order_invariant(&store);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut store = EventStore::new();
        store.dispatch(call("a", "ls"));
        store.dispatch(result("b", EventStatus::Success, None));
        store.dispatch(EventAction::Reset);

        assert_eq!(store.state(), &EventState::default());
        assert!(store.is_empty());
        assert_eq!(store.events().count(), 0);
    }

    #[test]
    fn events_iterate_in_first_seen_order() {
        let mut store = EventStore::new();
        for id in ["c", "a", "b"] {
            store.dispatch(call(id, id));
        }
        store.dispatch(result("a", EventStatus::Success, None));
        let ids: Vec<_> = store.events().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn event_serializes_camel_case() {
        let mut store = EventStore::new();
        store.dispatch(call("t1", "ls"));
        store.dispatch(result("t1", EventStatus::Success, text("x")));
        let value = serde_json::to_value(store.get("t1").unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "t1",
                "toolName": "bash",
                "timestamp": 100,
                "status": "success",
                "durationMs": 25,
                "payload": {"toolName": "bash", "command": "ls"},
                "result": {"type": "text", "text": "x"},
            })
        );
    }
}
