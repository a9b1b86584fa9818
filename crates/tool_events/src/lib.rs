#![forbid(unsafe_code)]
//! Tool-call event pipeline for agent dashboards.
//!
//! A chat transport streams messages whose parts include tool invocations (mouse clicks,
//! key presses, shell commands). This crate turns that history into an ordered event log:
//! - [`normalize_payload`] decodes untrusted tool arguments into a closed [`ToolPayload`].
//! - [`classify_result`] decodes raw results into a [`ToolResult`] and a terminal status.
//! - [`EventStore`] is the keyed, append-mostly log, mutated only through [`EventAction`].
//! - [`ToolEventScanner`] rescans the full history on every change and dispatches each call
//!   and each result exactly once per conversation.
//!
//! Nothing in the pipeline fails on malformed input; unrecognized shapes become `Unknown`
//! variants. Errors exist only where configuration or transcripts are read from disk.

mod clock;
mod config;
mod error;
mod ingest;
mod message;
mod payload;
mod replay;
mod result;
mod store;
mod summary;
mod update;

#[cfg(feature = "tokio")]
mod driver;

pub use clock::{elapsed_ms, Clock, ManualClock, SystemClock};
pub use config::{ScanConfig, DEFAULT_ABORT_SENTINEL};
pub use error::{ConfigError, ReplayError};
pub use ingest::{ScanReport, ToolEventScanner};
pub use message::{ChatMessage, InvocationState, MessagePart, ToolInvocation};
pub use payload::{
    normalize_payload, BashPayload, ComputerAction, ComputerPayload, Coordinate, ScrollDirection,
    ToolKind, ToolPayload, UnknownPayload,
};
pub use replay::{parse_update_line, ReplayReader, ReplayRecord};
pub use result::{
    classify_result, derive_status_from_result, ClassifiedResult, EventStatus, ToolResult,
};
pub use store::{EventAction, EventState, EventStore, ToolEvent};
pub use summary::{EventSnapshot, EventSummary};
pub use update::HistoryUpdate;

#[cfg(feature = "tokio")]
pub use driver::run_scanner;
