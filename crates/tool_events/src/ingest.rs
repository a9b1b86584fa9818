use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::clock::{elapsed_ms, Clock, SystemClock};
use crate::config::ScanConfig;
use crate::message::{ChatMessage, InvocationState, ToolInvocation};
use crate::payload::{normalize_payload, ToolKind};
use crate::result::{classify_result, ClassifiedResult, EventStatus, ToolResult};
use crate::store::{EventAction, EventStore, ToolEvent};
use crate::summary::{EventSnapshot, EventSummary};
use crate::update::HistoryUpdate;

/// Dispatches made by a single [`ToolEventScanner::scan`] pass.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ScanReport {
    pub calls: usize,
    pub results: usize,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.calls == 0 && self.results == 0
    }
}

/// Turns a growing chat history into tool events, exactly once per call and per result.
///
/// The host hands over the full history on every change; the scanner remembers which ids it
/// has already dispatched for the current conversation, so rescans are idempotent.
pub struct ToolEventScanner<C: Clock = SystemClock> {
    config: ScanConfig,
    clock: C,
    conversation: Option<String>,
    seen_calls: HashSet<String>,
    seen_results: HashSet<String>,
    started_at: HashMap<String, u64>,
    store: EventStore,
}

impl ToolEventScanner<SystemClock> {
    pub fn new(config: ScanConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> ToolEventScanner<C> {
    pub fn with_clock(config: ScanConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            conversation: None,
            seen_calls: HashSet::new(),
            seen_results: HashSet::new(),
            started_at: HashMap::new(),
            store: EventStore::new(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn conversation(&self) -> Option<&str> {
        self.conversation.as_deref()
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn events(&self) -> impl Iterator<Item = &ToolEvent> + '_ {
        self.store.events()
    }

    pub fn summary(&self) -> EventSummary {
        EventSummary::from_events(self.store.events())
    }

    pub fn snapshot(&self) -> EventSnapshot {
        EventSnapshot::capture(&self.store)
    }

    pub fn has_seen_call(&self, id: &str) -> bool {
        self.seen_calls.contains(id)
    }

    pub fn has_seen_result(&self, id: &str) -> bool {
        self.seen_results.contains(id)
    }

    /// Rescans the full history and dispatches only what has not been seen yet.
    pub fn scan(&mut self, messages: &[ChatMessage]) -> ScanReport {
        let mut report = ScanReport::default();
        for invocation in messages.iter().flat_map(ChatMessage::tool_invocations) {
            match invocation.state {
                InvocationState::PartialCall => {}
                InvocationState::Call => {
                    if self.observe_call(invocation) {
                        report.calls += 1;
                    }
                }
                InvocationState::Result => {
                    if self.seen_results.contains(&invocation.id) {
                        continue;
                    }
                    // A result whose call streamed past unseen still carries its arguments.
                    if !invocation.args.is_null() && self.observe_call(invocation) {
                        report.calls += 1;
                    }
                    if self.observe_result(invocation) {
                        report.results += 1;
                    }
                }
            }
        }
        report
    }

    /// Switches the active conversation. Tracking state is dropped only when the id changes.
    pub fn set_conversation(&mut self, conversation: impl Into<String>) -> bool {
        let conversation = conversation.into();
        if self.conversation.as_deref() == Some(conversation.as_str()) {
            return false;
        }
        info!(
            from = ?self.conversation,
            to = %conversation,
            "conversation switched; resetting tool events"
        );
        self.conversation = Some(conversation);
        self.reset();
        true
    }

    /// Clears dedup sets, start times, and the event store together.
    pub fn reset(&mut self) {
        self.seen_calls.clear();
        self.seen_results.clear();
        self.started_at.clear();
        self.store.dispatch(EventAction::Reset);
    }

    /// Completes the most recent `running` event as aborted, as a user stop would.
    ///
    /// The id is marked result-seen, so a real result arriving later is ignored.
    pub fn abort_pending(&mut self) -> Option<String> {
        let id = self.store.pending().last()?.to_string();
        let now = self.clock.now_ms();
        let started = self.started_at.get(&id).copied().unwrap_or(now);
        let sentinel = self.config.abort_sentinel.clone();

        info!(id = %id, "aborting pending tool call");
        self.seen_results.insert(id.clone());
        self.store.dispatch(EventAction::RegisterResult {
            id: id.clone(),
            status: EventStatus::Aborted,
            duration_ms: elapsed_ms(started, now),
            result: Some(ToolResult::Aborted { text: sentinel }),
            observed_at_ms: now,
        });
        Some(id)
    }

    pub fn apply(&mut self, update: HistoryUpdate) -> ScanReport {
        match update {
            HistoryUpdate::History {
                conversation,
                messages,
            } => {
                if let Some(conversation) = conversation {
                    self.set_conversation(conversation);
                }
                self.scan(&messages)
            }
            HistoryUpdate::Switch { conversation } => {
                self.set_conversation(conversation);
                ScanReport::default()
            }
            HistoryUpdate::Stop => ScanReport {
                calls: 0,
                results: usize::from(self.abort_pending().is_some()),
            },
        }
    }

    fn observe_call(&mut self, invocation: &ToolInvocation) -> bool {
        if self.seen_calls.contains(&invocation.id) {
            return false;
        }
        self.seen_calls.insert(invocation.id.clone());

        let now = self.clock.now_ms();
        self.started_at.insert(invocation.id.clone(), now);
        let payload = normalize_payload(&invocation.tool_name, &invocation.args);
        debug!(
            id = %invocation.id,
            kind = %payload.type_label(),
            "tool call registered"
        );
        self.store.dispatch(EventAction::RegisterCall(ToolEvent::call(
            invocation.id.clone(),
            ToolKind::from_label(&invocation.tool_name),
            payload,
            now,
        )));
        true
    }

    fn observe_result(&mut self, invocation: &ToolInvocation) -> bool {
        if self.seen_results.contains(&invocation.id) {
            return false;
        }
        self.seen_results.insert(invocation.id.clone());

        let now = self.clock.now_ms();
        let started = self
            .started_at
            .get(&invocation.id)
            .copied()
            .unwrap_or(now);
        let ClassifiedResult { result, status } =
            classify_result(invocation.result.as_ref(), &self.config.abort_sentinel);
        debug!(
            id = %invocation.id,
            status = status.as_str(),
            "tool result registered"
        );
        self.store.dispatch(EventAction::RegisterResult {
            id: invocation.id.clone(),
            status,
            duration_ms: elapsed_ms(started, now),
            result,
            observed_at_ms: now,
        });
        true
    }
}
