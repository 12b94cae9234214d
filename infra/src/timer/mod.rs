//! Timer module
//!
//! Timers and the clock share one anchor so that a deadline computed from
//! [`AnchoredClock::now`] fires exactly when tokio's clock reaches it. Under
//! a paused tokio runtime both advance in virtual time.

pub mod clock;
pub mod tokio_timer;

pub use clock::AnchoredClock;
pub use tokio_timer::TokioTimerService;
