//! Output route selection policy
//!
//! Pure priority over the freshly queried device set: a paired Bluetooth
//! hands-free headset wins outright, wired headsets beat the mode default,
//! and the default depends on whether the call carries video.

use tracing::trace;

use crate::platform::{AudioDeviceType, OutputDevice};

use super::mode::Mode;

/// Compute the preferred output route for the given mode and device set
///
/// Multiple devices of the same class never change the outcome; only the
/// presence of a class matters.
pub fn preferred_route(mode: Mode, devices: &[OutputDevice]) -> AudioDeviceType {
    let route = if devices.iter().any(OutputDevice::is_bluetooth_headset) {
        AudioDeviceType::Bluetooth
    } else if devices.iter().any(OutputDevice::is_wired_headset) {
        AudioDeviceType::WiredOrEarpiece
    } else if mode == Mode::VideoCall {
        AudioDeviceType::Speakerphone
    } else {
        AudioDeviceType::WiredOrEarpiece
    };

    trace!(%mode, devices = devices.len(), %route, "route selected");
    route
}
