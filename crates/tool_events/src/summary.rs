use std::collections::BTreeMap;

use serde::Serialize;

use crate::result::EventStatus;
use crate::store::{EventStore, ToolEvent};

/// Per-status and per-type counts for a summary header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub total: usize,
    pub running: usize,
    pub success: usize,
    pub aborted: usize,
    pub error: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl EventSummary {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a ToolEvent>) -> Self {
        let mut summary = Self::default();
        for event in events {
            summary.total += 1;
            match event.status {
                EventStatus::Running => summary.running += 1,
                EventStatus::Success => summary.success += 1,
                EventStatus::Aborted => summary.aborted += 1,
                EventStatus::Error => summary.error += 1,
            }
            *summary
                .by_type
                .entry(event.payload.type_label())
                .or_default() += 1;
        }
        summary
    }
}

/// Ordered event list plus its summary, detached from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventSnapshot {
    pub events: Vec<ToolEvent>,
    pub summary: EventSummary,
}

impl EventSnapshot {
    pub fn capture(store: &EventStore) -> Self {
        Self {
            events: store.events().cloned().collect(),
            summary: EventSummary::from_events(store.events()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::payload::normalize_payload;

    fn event(id: &str, tool: &str, args: serde_json::Value, status: EventStatus) -> ToolEvent {
        let mut event = ToolEvent::running(id, normalize_payload(tool, &args), 0);
        event.status = status;
        event
    }

    #[test]
    fn counts_by_status_and_type() {
        let events = vec![
            event(
                "1",
                "computer",
                json!({"action": "left_click"}),
                EventStatus::Success,
            ),
            event(
                "2",
                "computer",
                json!({"action": "left_click"}),
                EventStatus::Running,
            ),
            event(
                "3",
                "computer",
                json!({"action": "screenshot"}),
                EventStatus::Aborted,
            ),
            event("4", "bash", json!({"command": "ls"}), EventStatus::Error),
            event("5", "browser", json!({}), EventStatus::Success),
        ];

        let summary = EventSummary::from_events(&events);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.running, 1);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.aborted, 1);
        assert_eq!(summary.error, 1);
        assert_eq!(summary.by_type.get("computer:left_click"), Some(&2));
        assert_eq!(summary.by_type.get("computer:screenshot"), Some(&1));
        assert_eq!(summary.by_type.get("bash:command"), Some(&1));
        assert_eq!(summary.by_type.get("unknown"), Some(&1));
    }

    #[test]
    fn empty_log_has_empty_summary() {
        assert_eq!(EventSummary::from_events(std::iter::empty()), EventSummary::default());
    }
}
