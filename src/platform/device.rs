//! Audio device and routing type definitions
//!
//! Provides the output-device vocabulary reported by the platform and the
//! route/system-mode values the daemon applies to it.

use serde::{Deserialize, Serialize};

/// Output route applied to the platform when configuring devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDeviceType {
    /// Bluetooth hands-free headset
    Bluetooth,
    /// Wired headset/headphones, or the earpiece when nothing is plugged
    WiredOrEarpiece,
    /// Loud built-in speaker
    Speakerphone,
}

impl std::fmt::Display for AudioDeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioDeviceType::Bluetooth => write!(f, "bluetooth"),
            AudioDeviceType::WiredOrEarpiece => write!(f, "wired_or_earpiece"),
            AudioDeviceType::Speakerphone => write!(f, "speakerphone"),
        }
    }
}

/// System-wide audio mode set on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemAudioMode {
    /// Default media playback mode
    Normal,
    /// Full-duplex communication mode used during calls
    Communication,
}

impl std::fmt::Display for SystemAudioMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemAudioMode::Normal => write!(f, "normal"),
            SystemAudioMode::Communication => write!(f, "communication"),
        }
    }
}

/// Hardware kind of an attached output device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Bluetooth SCO (hands-free profile) endpoint
    BluetoothSco,
    /// Wired headset with microphone
    WiredHeadset,
    /// Wired headphones without microphone
    WiredHeadphones,
    /// Built-in earpiece/receiver
    BuiltinEarpiece,
    /// Built-in speaker
    BuiltinSpeaker,
    /// Anything else the platform reports
    Other,
}

/// A single output device reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDevice {
    /// Human-readable device name
    pub name: String,
    /// Hardware kind used by the routing policy
    pub kind: OutputKind,
}

impl OutputDevice {
    /// Create a device with the given name and kind
    pub fn new(name: impl Into<String>, kind: OutputKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Check if this is a Bluetooth hands-free endpoint
    pub fn is_bluetooth_headset(&self) -> bool {
        self.kind == OutputKind::BluetoothSco
    }

    /// Check if this is a wired headset or headphones
    pub fn is_wired_headset(&self) -> bool {
        matches!(
            self.kind,
            OutputKind::WiredHeadset | OutputKind::WiredHeadphones
        )
    }
}
