//! Custom test assertions for integration tests

use playlist_relay::{EventReceiver, LogEvent, Orchestrator, OrchestratorState};
use std::path::Path;
use std::time::Duration;

/// Collect events until the predicate matches or the timeout expires
///
/// The matching event is the last element of the returned list.
pub async fn collect_events_until<F>(
    events: &mut EventReceiver,
    timeout: Duration,
    stop_predicate: F,
) -> Vec<LogEvent>
where
    F: Fn(&LogEvent) -> bool,
{
    let mut collected = Vec::new();

    let _ = tokio::time::timeout(timeout, async {
        while let Some(event) = events.recv().await {
            let should_stop = stop_predicate(&event);
            collected.push(event);
            if should_stop {
                break;
            }
        }
    })
    .await;

    collected
}

/// Wait until the orchestrator reports the given state
pub async fn wait_for_state(
    orchestrator: &Orchestrator,
    expected: OrchestratorState,
    timeout: Duration,
) -> bool {
    tokio::time::timeout(timeout, async {
        while orchestrator.state().await != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}

/// Assert that a directory holds no entries at all
pub fn assert_dir_empty(dir: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("Cannot read {}: {}", dir.display(), e))
        .filter_map(|e| e.ok())
        .map(|e| e.file_name())
        .collect();
    assert!(
        leftovers.is_empty(),
        "Expected {} to be empty, found {:?}",
        dir.display(),
        leftovers
    );
}
