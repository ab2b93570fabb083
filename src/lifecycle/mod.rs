//! Host lifecycle integration
//!
//! Carries host application lifecycle transitions into the session manager
//! and handles Unix shutdown signals for the daemon itself.

mod shutdown;

pub use shutdown::ShutdownSignal;

use serde::{Deserialize, Serialize};

/// Host application lifecycle transitions relayed to the session manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Host returned to the foreground
    Resumed,
    /// Host moved to the background
    Paused,
    /// Host is shutting down for good
    Destroyed,
}
