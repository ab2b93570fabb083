//! Session events emitted to the host
//!
//! The session manager reports exactly one kind of outward event: whether
//! it currently holds audio focus. Everything else it does (routing, system
//! mode changes) is observable through the platform, not through events.

use serde::{Deserialize, Serialize};

/// Events emitted by the session manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session's hold on audio focus changed
    FocusChanged {
        /// Whether focus is held after the change
        has_focus: bool,
    },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::FocusChanged { has_focus } => {
                write!(f, "FOCUS_CHANGED ({})", has_focus)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::FocusChanged { has_focus: true };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("focus_changed"));
        assert!(json.contains("true"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"focus_changed","has_focus":false}"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, SessionEvent::FocusChanged { has_focus: false });
    }
}
