//! Platform module abstracting the OS audio stack
//!
//! Defines the collaborator interface the daemon drives (device enumeration,
//! system audio mode, routing, the focus arbiter, hotplug watches) and the
//! null backend used when no OS integration is available.

mod backend;
mod device;

pub use backend::{
    AudioContent, AudioPlatform, AudioUsage, DeviceWatch, FocusAcquisition, FocusChange,
    FocusDecision, FocusHandle, FocusRequest, NullBackend, PlatformError, PlatformEvent,
};
pub use device::{AudioDeviceType, OutputDevice, OutputKind, SystemAudioMode};

#[cfg(test)]
pub(crate) use backend::testing;
