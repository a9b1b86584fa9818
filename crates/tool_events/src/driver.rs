use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::clock::Clock;
use crate::ingest::ToolEventScanner;
use crate::summary::EventSnapshot;
use crate::update::HistoryUpdate;

/// Applies updates in arrival order and publishes a snapshot after every one, including
/// updates that leave the event log unchanged.
///
/// Returns the scanner once every update sender has been dropped. Updates keep being applied
/// when no snapshot receiver is left.
pub async fn run_scanner<C: Clock>(
    mut scanner: ToolEventScanner<C>,
    mut updates: mpsc::Receiver<HistoryUpdate>,
    snapshots: watch::Sender<EventSnapshot>,
) -> ToolEventScanner<C> {
    while let Some(update) = updates.recv().await {
        let report = scanner.apply(update);
        debug!(
            calls = report.calls,
            results = report.results,
            "history update applied"
        );
        snapshots.send_replace(scanner.snapshot());
    }
    scanner
}
