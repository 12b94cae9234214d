//! Event channel module
//!
//! In-process implementation of the keyed mailbox verdicts are posted to.
//! Values posted before anyone waits are buffered in posting order.

pub mod mailbox;

pub use mailbox::InMemoryEventChannel;
