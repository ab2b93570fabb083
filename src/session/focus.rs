//! Audio-focus lifecycle management
//!
//! Holds the single outstanding focus handle and talks to the platform's
//! focus arbiter. Change notifications arrive on the listener channel and
//! are handled by the session manager, never here.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::platform::{AudioPlatform, FocusDecision, FocusHandle, FocusRequest, PlatformEvent};

/// Requests, holds, and releases the exclusive audio-focus claim
pub struct FocusCoordinator<P> {
    platform: Arc<P>,
    listener: mpsc::Sender<PlatformEvent>,
    handle: Option<FocusHandle>,
}

impl<P: AudioPlatform> FocusCoordinator<P> {
    /// Create a coordinator that reports focus changes on `listener`
    pub fn new(platform: Arc<P>, listener: mpsc::Sender<PlatformEvent>) -> Self {
        Self {
            platform,
            listener,
            handle: None,
        }
    }

    /// Submit a voice-call focus request and store the resulting handle
    ///
    /// The handle is stored even when the arbiter defers or denies the
    /// request synchronously; an asynchronous grant is still expected on the
    /// listener channel. A handle left over from an earlier request (host
    /// resume repair) is abandoned first so at most one is ever alive.
    pub fn acquire(&mut self) {
        if let Some(stale) = self.handle.take() {
            debug!(?stale, "replacing existing focus handle");
            self.platform.abandon_focus(stale);
        }

        let request = FocusRequest::voice_call(self.listener.clone());
        let acquisition = self.platform.request_focus(request);
        match acquisition.decision {
            FocusDecision::Granted => {
                debug!(handle = ?acquisition.handle, "focus granted");
            }
            FocusDecision::Delayed => {
                debug!(handle = ?acquisition.handle, "focus deferred, awaiting grant");
            }
            FocusDecision::Denied => {
                warn!(handle = ?acquisition.handle, "focus denied, awaiting grant");
            }
        }
        self.handle = Some(acquisition.handle);
    }

    /// Abandon the stored focus handle, if any
    pub fn release(&mut self) {
        match self.handle.take() {
            Some(handle) => {
                debug!(?handle, "abandoning focus");
                self.platform.abandon_focus(handle);
            }
            None => {
                debug!("no focus handle to release");
            }
        }
    }

    /// Whether a focus handle is currently held
    pub fn is_held(&self) -> bool {
        self.handle.is_some()
    }
}
