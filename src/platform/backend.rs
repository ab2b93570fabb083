//! Platform audio collaborator interface
//!
//! The daemon never talks to an OS audio stack directly; it goes through the
//! [`AudioPlatform`] trait. Backends deliver hotplug and focus-change
//! notifications by sending [`PlatformEvent`]s into the channel they are
//! handed at registration time.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::debug;

use super::device::{AudioDeviceType, OutputDevice, SystemAudioMode};

/// Token for an outstanding audio-focus grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusHandle(pub u64);

/// Token for an active device-hotplug registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceWatch(pub u64);

/// Attribute describing what the focus claim will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioUsage {
    /// Two-way call audio
    VoiceCommunication,
    /// Ordinary media playback
    Media,
}

/// Attribute describing the kind of content played under the claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioContent {
    /// Spoken audio
    Speech,
    /// Music or other media
    Music,
}

/// A focus request submitted to the platform's focus arbiter
#[derive(Debug)]
pub struct FocusRequest {
    /// Declared usage of the claim
    pub usage: AudioUsage,
    /// Declared content type
    pub content: AudioContent,
    /// Whether an asynchronous grant after an initial deferral is acceptable
    pub accepts_delayed_grant: bool,
    /// Channel the arbiter uses to report later focus changes
    pub listener: mpsc::Sender<PlatformEvent>,
}

impl FocusRequest {
    /// Build the request used for call audio: voice-communication usage,
    /// speech content, delayed grants accepted.
    pub fn voice_call(listener: mpsc::Sender<PlatformEvent>) -> Self {
        Self {
            usage: AudioUsage::VoiceCommunication,
            content: AudioContent::Speech,
            accepts_delayed_grant: true,
            listener,
        }
    }
}

/// Synchronous answer from the focus arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDecision {
    /// Focus granted immediately
    Granted,
    /// Grant deferred; a `FocusChange::Gain` will arrive later
    Delayed,
    /// Request denied outright
    Denied,
}

/// Result of submitting a focus request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusAcquisition {
    /// Handle identifying the request, valid regardless of the decision
    pub handle: FocusHandle,
    /// The arbiter's synchronous decision
    pub decision: FocusDecision,
}

/// Asynchronous focus-change notification from the arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    /// Focus gained (or regained after a loss)
    Gain,
    /// Focus lost permanently
    Loss,
    /// Focus lost temporarily
    LossTransient,
    /// Focus lost temporarily; ducked playback would be tolerated
    LossTransientCanDuck,
}

/// Events sent from a platform backend to the session manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// One or more output devices were attached
    DevicesAdded,
    /// One or more output devices were detached
    DevicesRemoved,
    /// The focus arbiter reported a change for our claim
    FocusChanged(FocusChange),
}

/// Errors reported by platform backends
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("system audio mode change to {mode} failed: {reason}")]
    SystemMode {
        mode: SystemAudioMode,
        reason: String,
    },

    #[error("routing audio to {route} failed: {reason}")]
    Route {
        route: AudioDeviceType,
        reason: String,
    },

    #[error("audio platform unavailable: {0}")]
    Unavailable(String),
}

/// Interface to the OS audio stack
///
/// All methods are synchronous and must not block; backends queue hardware
/// work internally and report asynchronous outcomes through the event
/// channels they were given.
pub trait AudioPlatform: Send + Sync + 'static {
    /// Snapshot of currently attached output devices
    fn output_devices(&self) -> Vec<OutputDevice>;

    /// Set the system-wide audio mode
    fn set_system_mode(&self, mode: SystemAudioMode) -> Result<(), PlatformError>;

    /// Route call audio to the given device type
    fn apply_route(&self, route: AudioDeviceType) -> Result<(), PlatformError>;

    /// Submit a focus request to the arbiter
    ///
    /// A handle is returned even for deferred or denied requests; a later
    /// asynchronous grant arrives on the request's listener channel.
    fn request_focus(&self, request: FocusRequest) -> FocusAcquisition;

    /// Abandon a previously issued focus request
    fn abandon_focus(&self, handle: FocusHandle);

    /// Register for device attach/detach notifications
    fn watch_devices(&self, events: mpsc::Sender<PlatformEvent>) -> DeviceWatch;

    /// Cancel a device-hotplug registration
    fn unwatch_devices(&self, watch: DeviceWatch);
}

/// Backend used when no OS audio integration is compiled in
///
/// Reports no devices, grants focus immediately, and logs every routing call
/// instead of touching hardware. Lets the daemon run (and be driven over
/// IPC) on hosts without a platform audio stack.
pub struct NullBackend {
    next_token: AtomicU64,
}

impl NullBackend {
    /// Create a new null backend
    pub fn new() -> Self {
        Self {
            next_token: AtomicU64::new(1),
        }
    }

    fn next_token(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlatform for NullBackend {
    fn output_devices(&self) -> Vec<OutputDevice> {
        Vec::new()
    }

    fn set_system_mode(&self, mode: SystemAudioMode) -> Result<(), PlatformError> {
        debug!(%mode, "null backend: system audio mode");
        Ok(())
    }

    fn apply_route(&self, route: AudioDeviceType) -> Result<(), PlatformError> {
        debug!(%route, "null backend: route applied");
        Ok(())
    }

    fn request_focus(&self, request: FocusRequest) -> FocusAcquisition {
        let handle = FocusHandle(self.next_token());
        debug!(?handle, ?request.usage, ?request.content, "null backend: focus granted");
        FocusAcquisition {
            handle,
            decision: FocusDecision::Granted,
        }
    }

    fn abandon_focus(&self, handle: FocusHandle) {
        debug!(?handle, "null backend: focus abandoned");
    }

    fn watch_devices(&self, _events: mpsc::Sender<PlatformEvent>) -> DeviceWatch {
        let watch = DeviceWatch(self.next_token());
        debug!(?watch, "null backend: device watch registered");
        watch
    }

    fn unwatch_devices(&self, watch: DeviceWatch) {
        debug!(?watch, "null backend: device watch cancelled");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// A platform call observed by [`FakeBackend`], in invocation order
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PlatformCall {
        SetSystemMode(SystemAudioMode),
        ApplyRoute(AudioDeviceType),
        RequestFocus,
        AbandonFocus(FocusHandle),
        WatchDevices,
        UnwatchDevices(DeviceWatch),
    }

    /// Scriptable in-memory backend for exercising the session manager
    pub struct FakeBackend {
        devices: Mutex<Vec<OutputDevice>>,
        calls: Mutex<Vec<PlatformCall>>,
        decision: Mutex<FocusDecision>,
        next_token: AtomicU64,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self {
                devices: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
                decision: Mutex::new(FocusDecision::Granted),
                next_token: AtomicU64::new(1),
            }
        }

        pub fn with_devices(devices: Vec<OutputDevice>) -> Self {
            let backend = Self::new();
            backend.set_devices(devices);
            backend
        }

        pub fn set_devices(&self, devices: Vec<OutputDevice>) {
            *self.devices.lock().unwrap() = devices;
        }

        pub fn set_decision(&self, decision: FocusDecision) {
            *self.decision.lock().unwrap() = decision;
        }

        pub fn calls(&self) -> Vec<PlatformCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        fn record(&self, call: PlatformCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl AudioPlatform for FakeBackend {
        fn output_devices(&self) -> Vec<OutputDevice> {
            self.devices.lock().unwrap().clone()
        }

        fn set_system_mode(&self, mode: SystemAudioMode) -> Result<(), PlatformError> {
            self.record(PlatformCall::SetSystemMode(mode));
            Ok(())
        }

        fn apply_route(&self, route: AudioDeviceType) -> Result<(), PlatformError> {
            self.record(PlatformCall::ApplyRoute(route));
            Ok(())
        }

        fn request_focus(&self, _request: FocusRequest) -> FocusAcquisition {
            self.record(PlatformCall::RequestFocus);
            FocusAcquisition {
                handle: FocusHandle(self.next_token.fetch_add(1, Ordering::Relaxed)),
                decision: *self.decision.lock().unwrap(),
            }
        }

        fn abandon_focus(&self, handle: FocusHandle) {
            self.record(PlatformCall::AbandonFocus(handle));
        }

        fn watch_devices(&self, _events: mpsc::Sender<PlatformEvent>) -> DeviceWatch {
            self.record(PlatformCall::WatchDevices);
            DeviceWatch(self.next_token.fetch_add(1, Ordering::Relaxed))
        }

        fn unwatch_devices(&self, watch: DeviceWatch) {
            self.record(PlatformCall::UnwatchDevices(watch));
        }
    }
}
