//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::SessionEvent;
use crate::lifecycle::LifecycleEvent;
use crate::session::Mode;

/// Requests from a host client to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current daemon status
    GetStatus,

    /// Set the session mode
    SetMode { mode: Mode },

    /// Relay a host application lifecycle transition
    Lifecycle { event: LifecycleEvent },

    /// Ping to check connectivity
    Ping,

    /// Subscribe to session event notifications
    ///
    /// After the confirmation the connection carries only pushed
    /// [`Notification`]s; further requests are not read.
    Subscribe,
}

/// Responses from daemon to host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(DaemonStatus),

    /// Mode change accepted and queued
    ModeChange { mode: Mode, in_call: bool },

    /// Lifecycle event accepted and queued
    Accepted,

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification from daemon to subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A session event occurred
    SessionEvent { event: SessionEvent },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Current session mode
    pub mode: Mode,

    /// Whether the session currently holds audio focus
    pub has_focus: bool,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: Mode::default(),
            has_focus: false,
            uptime_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::SetMode {
            mode: Mode::VoiceCall,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("set_mode"));
        assert!(json.contains("voice_call"));
    }

    #[test]
    fn test_lifecycle_request_round_trip() {
        let json = r#"{"type":"lifecycle","event":"destroyed"}"#;
        let req: Request = serde_json::from_str(json).unwrap();
        assert!(matches!(
            req,
            Request::Lifecycle {
                event: LifecycleEvent::Destroyed
            }
        ));
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Status(DaemonStatus::default());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("status"));
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_notification_serialization() {
        let notification = Notification::SessionEvent {
            event: SessionEvent::FocusChanged { has_focus: true },
        };
        let json = serde_json::to_string(&notification).unwrap();
        assert!(json.contains("session_event"));
        assert!(json.contains("focus_changed"));
    }
}
