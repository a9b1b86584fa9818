use serde::Deserialize;

use crate::message::ChatMessage;

/// A change the host observed: a new history snapshot, a conversation switch, or a user stop.
///
/// Transcripts store one update per line, e.g.
/// `{"type":"history","conversation":"c1","messages":[...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryUpdate {
    History {
        #[serde(default)]
        conversation: Option<String>,
        #[serde(default)]
        messages: Vec<ChatMessage>,
    },
    Switch {
        conversation: String,
    },
    Stop,
}
