//! Common test utilities shared across integration tests.

use reprise::testing::RecordingHandler;
use reprise::Event;
use std::time::Duration;

/// Wait for an event matching a predicate, polling the recording handler.
///
/// This is more reliable than fixed sleeps since tick timing can vary.
/// Polls every 10ms and times out after the specified duration.
///
/// # Panics
///
/// Panics if the timeout is reached before a matching event arrives.
pub async fn wait_for_event(
    handler: &RecordingHandler,
    matches: impl Fn(&Event) -> bool,
    timeout: Duration,
) -> Event {
    let start = tokio::time::Instant::now();
    loop {
        if let Some(event) = handler.events().await.into_iter().find(&matches) {
            return event;
        }
        if start.elapsed() > timeout {
            panic!(
                "Timeout waiting for a matching event; saw {} event(s)",
                handler.len().await
            );
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
