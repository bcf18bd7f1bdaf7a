//! # Worker handle: the supervisor's view of a worker actor.
//!
//! [`WorkerHandle`] is the only way to reach a running [`Worker`]: message
//! sends for assignment, bounded-wait queries for state/data, and token
//! cancellation for stop. It never touches the actor's fields.
//!
//! ## Bounded-wait reads
//! `state()` and `data()` wrap the request/reply round trip in
//! [`tokio::time::timeout`]. An unresponsive worker yields
//! [`WorkerError::PollTimeout`] after the bound instead of stalling the
//! caller; a closed mailbox yields [`WorkerError::Unreachable`].
//!
//! ## Stop semantics
//! [`stop`](WorkerHandle::stop) cancels the actor's token and returns
//! immediately: cancellation is requested, not awaited-to-completion.
//! It is idempotent and safe to call mid-unit.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::workers::actor::Command;
use crate::workers::state::{WorkerId, WorkerState};

/// Cloneable handle to a spawned worker actor.
#[derive(Clone)]
pub struct WorkerHandle {
    id: WorkerId,
    tx: mpsc::Sender<Command>,
    cancel: CancellationToken,
}

impl WorkerHandle {
    pub(crate) fn new(id: WorkerId, tx: mpsc::Sender<Command>, cancel: CancellationToken) -> Self {
        Self { id, tx, cancel }
    }

    /// Returns the worker's id.
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Assigns a work unit of `size` points.
    ///
    /// Returns [`WorkerError::Rejected`] when the worker refuses the unit
    /// (size at or above the cap), [`WorkerError::Unreachable`] when the
    /// actor is gone. Fire-and-forget from the unit's perspective: the
    /// reply confirms admission, not completion.
    pub async fn assign(&self, size: u32) -> Result<(), WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Assign { size, reply })
            .await
            .map_err(|_| WorkerError::Unreachable)?;
        match rx.await {
            Ok(res) => res.map_err(WorkerError::Rejected),
            Err(_) => Err(WorkerError::Unreachable),
        }
    }

    /// Reads the worker's state, waiting at most `timeout`.
    pub async fn state(&self, timeout: Duration) -> Result<WorkerState, WorkerError> {
        self.query(timeout, |reply| Command::GetState { reply })
            .await
    }

    /// Reads a copy of the worker's data, waiting at most `timeout`.
    ///
    /// Returns an empty sequence before assignment; the copy is committed
    /// at a draw boundary, never mid-append.
    pub async fn data(&self, timeout: Duration) -> Result<Vec<u32>, WorkerError> {
        self.query(timeout, |reply| Command::GetData { reply }).await
    }

    /// Requests cancellation of the worker's execution context.
    ///
    /// Idempotent; always succeeds; never blocks on the worker's progress.
    /// Outstanding work is discarded at the actor's next safe point.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Request/reply round trip with a bounded wait.
    async fn query<T>(
        &self,
        timeout: Duration,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, WorkerError> {
        let (reply, rx) = oneshot::channel();
        let round_trip = async {
            self.tx
                .send(make(reply))
                .await
                .map_err(|_| WorkerError::Unreachable)?;
            rx.await.map_err(|_| WorkerError::Unreachable)
        };
        match time::timeout(timeout, round_trip).await {
            Ok(res) => res,
            Err(_elapsed) => Err(WorkerError::PollTimeout { timeout }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(50);

    /// Handle wired to a mailbox nobody serves: every query must hit the
    /// poll bound instead of hanging.
    fn unserviced() -> (WorkerHandle, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(4);
        let handle = WorkerHandle::new(WorkerId::next(), tx, CancellationToken::new());
        (handle, rx)
    }

    #[tokio::test]
    async fn test_state_read_times_out_on_unresponsive_worker() {
        let (handle, _mailbox) = unserviced();
        let err = handle.state(POLL).await.unwrap_err();
        assert!(matches!(err, WorkerError::PollTimeout { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_data_read_times_out_on_unresponsive_worker() {
        let (handle, _mailbox) = unserviced();
        let err = handle.data(POLL).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_closed_mailbox_is_unreachable() {
        let (handle, mailbox) = unserviced();
        drop(mailbox);
        let err = handle.state(POLL).await.unwrap_err();
        assert!(matches!(err, WorkerError::Unreachable));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_assign_to_closed_mailbox_is_unreachable() {
        let (handle, mailbox) = unserviced();
        drop(mailbox);
        let err = handle.assign(10).await.unwrap_err();
        assert!(matches!(err, WorkerError::Unreachable));
    }
}
