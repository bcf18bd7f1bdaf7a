//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [spawned] worker=worker-0
//! [assigned] worker=worker-0 size=10
//! [failed] worker=worker-0 produced=4
//! [replaced] worker=worker-5 replaces=worker-0 size=10
//! [retired] worker=worker-1 produced=10
//! [work-day-stopped]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Useful for demos and debugging. Implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::WorkerSpawned => {
                println!("[spawned] worker={:?}", e.worker);
            }
            EventKind::SpawnSkipped => {
                println!("[spawn-skipped] reason={:?}", e.reason);
            }
            EventKind::WorkAssigned => {
                println!("[assigned] worker={:?} size={:?}", e.worker, e.size);
            }
            EventKind::AssignRejected => {
                println!("[assign-rejected] worker={:?} reason={:?}", e.worker, e.reason);
            }
            EventKind::WorkerCompleted => {
                println!("[completed] worker={:?} produced={:?}", e.worker, e.produced);
            }
            EventKind::WorkerFailed => {
                println!("[failed] worker={:?} produced={:?}", e.worker, e.produced);
            }
            EventKind::WorkerRetired => {
                println!("[retired] worker={:?} produced={:?}", e.worker, e.produced);
            }
            EventKind::WorkerReplaced => {
                println!(
                    "[replaced] worker={:?} replaces={:?} size={:?}",
                    e.worker, e.reason, e.size
                );
            }
            EventKind::PollTimedOut => {
                println!("[poll-timeout] worker={:?}", e.worker);
            }
            EventKind::WorkDayStarted => {
                println!("[work-day-started] size={:?}", e.size);
            }
            EventKind::WorkDayStopped => {
                println!("[work-day-stopped]");
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] sub={:?} reason={:?}", e.worker, e.reason);
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panic] sub={:?} reason={:?}", e.worker, e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
