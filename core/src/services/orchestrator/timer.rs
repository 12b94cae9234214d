//! Cancelable deadline signal handed out by a [`TimerService`](super::TimerService)

use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::oneshot;

/// Identifier assigned by the timer service that created the handle
pub type TimerId = u64;

/// A started timer.
///
/// The owner must either observe it fired or call [`TimerHandle::cancel`]
/// before moving past it. Canceling after the deadline passed is a no-op.
pub struct TimerHandle {
    id: TimerId,
    deadline: DateTime<Utc>,
    signal: oneshot::Receiver<()>,
    fired: bool,
    canceller: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Build a handle from the firing signal and the routine that releases
    /// the timer's resources.
    pub fn new<F>(
        id: TimerId,
        deadline: DateTime<Utc>,
        signal: oneshot::Receiver<()>,
        canceller: F,
    ) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id,
            deadline,
            signal,
            fired: false,
            canceller: Some(Box::new(canceller)),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Resolve once the deadline has passed.
    ///
    /// Cancel-safe: dropping the future before it resolves leaves the timer
    /// armed. A signal dropped by the service counts as fired so a waiter is
    /// never stranded.
    pub async fn fired(&mut self) {
        if self.fired {
            return;
        }
        if (&mut self.signal).await.is_err() {
            tracing::warn!(timer_id = self.id, "Timer signal dropped before firing");
        }
        self.fired = true;
    }

    /// Whether the deadline has passed, observed or not
    pub fn has_fired(&mut self) -> bool {
        if !self.fired && self.signal.try_recv().is_ok() {
            self.fired = true;
        }
        self.fired
    }

    /// Release the timer. Returns `false` when it had already fired.
    pub fn cancel(mut self) -> bool {
        if self.has_fired() {
            return false;
        }
        if let Some(cancel) = self.canceller.take() {
            cancel();
        }
        true
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("deadline", &self.deadline)
            .field("fired", &self.fired)
            .finish()
    }
}
