//! Session mode definitions
//!
//! Provides the mode owned by the session manager and the shared status
//! snapshot the IPC layer reads for diagnostics.

use serde::{Deserialize, Serialize};

/// The four possible modes of the audio session
///
/// Carried verbatim over IPC, so hosts name modes the same way the daemon
/// logs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No call in progress; system audio left in its normal state
    Idle,
    /// Video call: defaults to the open speaker when nothing is plugged in
    VideoCall,
    /// Voice call: defaults to the private earpiece
    VoiceCall,
    /// Call with routing pinned manually by the host; automatic
    /// configuration is suspended
    UserSpecifiedRoute,
}

impl Mode {
    /// Whether this mode manages a live call audio path
    ///
    /// Focus is held and the hotplug watch is registered exactly while the
    /// session is in a call mode.
    pub fn is_call(self) -> bool {
        self != Mode::Idle
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Idle => write!(f, "Idle"),
            Mode::VideoCall => write!(f, "VideoCall"),
            Mode::VoiceCall => write!(f, "VoiceCall"),
            Mode::UserSpecifiedRoute => write!(f, "UserSpecifiedRoute"),
        }
    }
}

/// Diagnostic snapshot shared with the IPC server
///
/// Written only from inside the serialized command loop; readers get a
/// point-in-time view for status queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStatus {
    /// Current session mode
    pub mode: Mode,
    /// Last focus state reported to the host
    pub has_focus: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(Mode::default(), Mode::Idle);
    }

    #[test]
    fn test_mode_wire_names() {
        let json = serde_json::to_string(&Mode::UserSpecifiedRoute).unwrap();
        assert_eq!(json, r#""user_specified_route""#);
        let mode: Mode = serde_json::from_str(r#""video_call""#).unwrap();
        assert_eq!(mode, Mode::VideoCall);
    }

    #[test]
    fn test_call_modes() {
        assert!(!Mode::Idle.is_call());
        assert!(Mode::VideoCall.is_call());
        assert!(Mode::VoiceCall.is_call());
        assert!(Mode::UserSpecifiedRoute.is_call());
    }
}
