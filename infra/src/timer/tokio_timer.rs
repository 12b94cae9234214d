//! Timer service backed by spawned tokio sleeps

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

use vv_core::services::orchestrator::{TimerHandle, TimerService};

use super::clock::AnchoredClock;

/// Timer service that arms one tokio task per timer.
///
/// Must be used from within a tokio runtime. Canceling a handle aborts its
/// task, so no late firing is observed.
pub struct TokioTimerService {
    clock: AnchoredClock,
    next_id: AtomicU64,
    active: Arc<AtomicUsize>,
}

impl TokioTimerService {
    pub fn new(clock: AnchoredClock) -> Self {
        Self {
            clock,
            next_id: AtomicU64::new(1),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Timers neither fired nor canceled yet
    pub fn active_timers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl TimerService for TokioTimerService {
    fn schedule(&self, deadline: DateTime<Utc>) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let at = self.clock.instant_for(deadline);
        let (tx, rx) = oneshot::channel();

        self.active.fetch_add(1, Ordering::SeqCst);
        let settled = Arc::new(AtomicBool::new(false));

        let task = {
            let active = self.active.clone();
            let settled = settled.clone();
            tokio::spawn(async move {
                tokio::time::sleep_until(at).await;
                if !settled.swap(true, Ordering::SeqCst) {
                    active.fetch_sub(1, Ordering::SeqCst);
                }
                let _ = tx.send(());
                debug!(timer_id = id, "Timer fired");
            })
        };

        let active = self.active.clone();
        TimerHandle::new(id, deadline, rx, move || {
            task.abort();
            if !settled.swap(true, Ordering::SeqCst) {
                active.fetch_sub(1, Ordering::SeqCst);
            }
            debug!(timer_id = id, "Timer canceled");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vv_core::services::orchestrator::Clock;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_at_deadline() {
        let clock = AnchoredClock::new();
        let timers = TokioTimerService::new(clock);
        let mut handle = timers.schedule(clock.now() + chrono::Duration::seconds(90));

        let started = tokio::time::Instant::now();
        handle.fired().await;

        assert_eq!(started.elapsed().as_secs(), 90);
        assert!(handle.has_fired());
        assert_eq!(timers.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_deadline_fires_immediately() {
        let clock = AnchoredClock::new();
        let timers = TokioTimerService::new(clock);
        let mut handle = timers.schedule(clock.now() - chrono::Duration::seconds(5));

        let started = tokio::time::Instant::now();
        handle.fired().await;

        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_releases_timer() {
        let clock = AnchoredClock::new();
        let timers = TokioTimerService::new(clock);
        let handle = timers.schedule(clock.now() + chrono::Duration::seconds(90));
        assert_eq!(timers.active_timers(), 1);

        assert!(handle.cancel());
        assert_eq!(timers.active_timers(), 0);

        // Nothing fires afterwards
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(timers.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_is_noop() {
        let clock = AnchoredClock::new();
        let timers = TokioTimerService::new(clock);
        let handle = timers.schedule(clock.now() + chrono::Duration::seconds(1));

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!handle.cancel());
        assert_eq!(timers.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_unique() {
        let clock = AnchoredClock::new();
        let timers = TokioTimerService::new(clock);
        let first = timers.schedule(clock.now());
        let second = timers.schedule(clock.now());

        assert_ne!(first.id(), second.id());
        first.cancel();
        second.cancel();
    }
}
