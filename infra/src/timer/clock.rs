//! Wall-clock time derived from tokio's monotonic clock

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

use vv_core::services::orchestrator::Clock;

/// Clock anchored to a wall-clock reading and a tokio instant taken together
#[derive(Debug, Clone, Copy)]
pub struct AnchoredClock {
    anchor_utc: DateTime<Utc>,
    anchor_instant: Instant,
}

impl AnchoredClock {
    pub fn new() -> Self {
        Self {
            anchor_utc: Utc::now(),
            anchor_instant: Instant::now(),
        }
    }

    /// Tokio instant at which `deadline` is reached; deadlines in the past map to now
    pub fn instant_for(&self, deadline: DateTime<Utc>) -> Instant {
        match (deadline - self.anchor_utc).to_std() {
            Ok(offset) => self.anchor_instant + offset,
            Err(_) => self.anchor_instant,
        }
    }
}

impl Default for AnchoredClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed: Duration = self.anchor_instant.elapsed();
        self.anchor_utc + chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero())
    }
}
