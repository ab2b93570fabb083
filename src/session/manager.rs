//! Serialized session command loop
//!
//! Owns the session mode and every interaction with the audio platform.
//! All inputs (host mode requests, platform notifications, lifecycle
//! events) arrive as [`Command`]s on a single channel and are handled one
//! at a time, so no state is ever touched concurrently.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::events::SessionEvent;
use crate::lifecycle::LifecycleEvent;
use crate::platform::{
    AudioDeviceType, AudioPlatform, DeviceWatch, FocusChange, PlatformError, PlatformEvent,
    SystemAudioMode,
};

use super::focus::FocusCoordinator;
use super::mode::{Mode, SessionStatus};
use super::routing;

/// Unit of work submitted to the session manager
#[derive(Debug)]
pub enum Command {
    /// Host requested a mode change
    SetMode(Mode),
    /// Notification from the platform backend
    Platform(PlatformEvent),
    /// Host application lifecycle change
    Lifecycle(LifecycleEvent),
}

/// The session manager that arbitrates call audio
pub struct SessionManager<P: AudioPlatform> {
    /// Current session mode
    mode: Mode,
    platform: Arc<P>,
    focus: FocusCoordinator<P>,
    /// Hotplug registration, held exactly while in a call mode
    device_watch: Option<DeviceWatch>,
    /// Sender handed to the platform for focus and hotplug callbacks
    platform_tx: mpsc::Sender<PlatformEvent>,
    /// Taken by `run` to forward platform events into the command channel
    platform_rx: Option<mpsc::Receiver<PlatformEvent>>,
    cmd_tx: mpsc::Sender<Command>,
    /// Channel for emitting session events to the host
    event_tx: broadcast::Sender<SessionEvent>,
    /// Last focus state reported to the host
    has_focus: bool,
    /// Snapshot shared with the IPC server
    status: Arc<RwLock<SessionStatus>>,
}

impl<P: AudioPlatform> SessionManager<P> {
    /// Create a new session manager starting in Idle
    pub fn new(
        platform: Arc<P>,
        cmd_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<SessionEvent>,
        status: Arc<RwLock<SessionStatus>>,
    ) -> Self {
        let (platform_tx, platform_rx) = mpsc::channel(32);
        let focus = FocusCoordinator::new(Arc::clone(&platform), platform_tx.clone());

        Self {
            mode: Mode::Idle,
            platform,
            focus,
            device_watch: None,
            platform_tx,
            platform_rx: Some(platform_rx),
            cmd_tx,
            event_tx,
            has_focus: false,
            status,
        }
    }

    /// Get the current session mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Run the session manager, processing commands until destroyed
    ///
    /// Platform notifications are forwarded into the command channel by a
    /// background task, so they queue behind host commands instead of
    /// interleaving with them.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<Command>) {
        info!(mode = %self.mode, "session manager started");

        if let Some(mut platform_rx) = self.platform_rx.take() {
            let cmd_tx = self.cmd_tx.clone();
            tokio::spawn(async move {
                while let Some(event) = platform_rx.recv().await {
                    if cmd_tx.send(Command::Platform(event)).await.is_err() {
                        break;
                    }
                }
            });
        }

        if let Err(e) = self.configure_devices() {
            warn!(error = %e, "initial device configuration failed");
        }
        self.sync_status().await;

        while let Some(command) = commands.recv().await {
            let destroyed = matches!(command, Command::Lifecycle(LifecycleEvent::Destroyed));

            if let Err(e) = self.handle_command(command) {
                warn!(error = %e, "platform call failed, continuing");
            }
            self.sync_status().await;

            if destroyed {
                break;
            }
        }

        info!("session manager stopped");
    }

    /// Handle a single command
    fn handle_command(&mut self, command: Command) -> Result<(), PlatformError> {
        match command {
            Command::SetMode(mode) => self.set_mode(mode),
            Command::Platform(event) => self.handle_platform_event(event),
            Command::Lifecycle(event) => self.handle_lifecycle_event(event),
        }
    }

    /// Switch the session to a new mode
    ///
    /// Setting the current mode again is a no-op with no platform calls.
    fn set_mode(&mut self, mode: Mode) -> Result<(), PlatformError> {
        let previous = self.mode;
        if mode == previous {
            debug!(%mode, "mode unchanged");
            return Ok(());
        }

        info!(from = %previous, to = %mode, "mode transition");
        self.mode = mode;

        match mode {
            Mode::Idle => self.leave_call(),
            _ if previous.is_call() => self.configure_devices(),
            _ => self.enter_call(),
        }
    }

    /// Enter a call mode from Idle
    ///
    /// Devices are configured before focus is requested so that audio comes
    /// out of the right output the moment the platform unmutes us. Focus and
    /// the hotplug watch are acquired even if configuration fails; the first
    /// error is kept for logging.
    fn enter_call(&mut self) -> Result<(), PlatformError> {
        let configured = self.configure_devices();
        self.focus.acquire();
        let watch = self.platform.watch_devices(self.platform_tx.clone());
        self.device_watch = Some(watch);
        configured
    }

    /// Leave the call and restore normal system audio
    ///
    /// Mirror image of [`enter_call`](Self::enter_call): the watch and focus
    /// go first, then the system is put back to its normal state.
    fn leave_call(&mut self) -> Result<(), PlatformError> {
        if let Some(watch) = self.device_watch.take() {
            self.platform.unwatch_devices(watch);
        }
        self.focus.release();
        self.configure_devices()
    }

    /// Apply the system audio mode and output route for the current mode
    fn configure_devices(&mut self) -> Result<(), PlatformError> {
        match self.mode {
            Mode::UserSpecifiedRoute => {
                debug!("routing pinned by host, configuration skipped");
                Ok(())
            }
            Mode::Idle => {
                self.platform.set_system_mode(SystemAudioMode::Normal)?;
                self.platform.apply_route(AudioDeviceType::WiredOrEarpiece)
            }
            Mode::VideoCall | Mode::VoiceCall => {
                self.platform.set_system_mode(SystemAudioMode::Communication)?;
                let devices = self.platform.output_devices();
                let route = routing::preferred_route(self.mode, &devices);
                self.platform.apply_route(route)
            }
        }
    }

    /// Handle a hotplug or focus notification from the platform
    ///
    /// Notifications can trail behind a call teardown because they queue on
    /// the command channel; outside a call mode they are dropped.
    fn handle_platform_event(&mut self, event: PlatformEvent) -> Result<(), PlatformError> {
        if !self.mode.is_call() {
            debug!(?event, "platform event outside call, ignored");
            return Ok(());
        }

        match event {
            PlatformEvent::DevicesAdded | PlatformEvent::DevicesRemoved => {
                debug!(?event, "device set changed");
                self.configure_devices()
            }
            PlatformEvent::FocusChanged(change) => self.handle_focus_change(change),
        }
    }

    /// Handle an asynchronous focus change from the arbiter
    fn handle_focus_change(&mut self, change: FocusChange) -> Result<(), PlatformError> {
        match change {
            FocusChange::Gain => {
                debug!("focus gained");
                let configured = self.configure_devices();
                self.emit_focus(true);
                configured
            }
            FocusChange::Loss | FocusChange::LossTransient | FocusChange::LossTransientCanDuck => {
                debug!(?change, "focus lost");
                self.emit_focus(false);
                Ok(())
            }
        }
    }

    /// Handle a host lifecycle event
    fn handle_lifecycle_event(&mut self, event: LifecycleEvent) -> Result<(), PlatformError> {
        match event {
            LifecycleEvent::Resumed => {
                if !self.mode.is_call() {
                    debug!("host resumed outside call");
                    return Ok(());
                }
                // Another application may have reconfigured audio while the
                // host was in the background. Re-request focus first, then
                // reassert our configuration on top of whatever was left.
                info!(mode = %self.mode, "host resumed, repairing session");
                self.focus.acquire();
                let configured = self.configure_devices();
                self.emit_focus(true);
                configured
            }
            LifecycleEvent::Paused => {
                debug!("host paused, session unchanged");
                Ok(())
            }
            LifecycleEvent::Destroyed => {
                info!("host destroyed, tearing down session");
                self.set_mode(Mode::Idle)
            }
        }
    }

    /// Report a focus state to the host and remember it for status queries
    fn emit_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
        debug!(has_focus, "reporting focus state");
        let _ = self.event_tx.send(SessionEvent::FocusChanged { has_focus });
    }

    /// Publish the current mode and focus state to the shared snapshot
    async fn sync_status(&self) {
        let mut status = self.status.write().await;
        status.mode = self.mode;
        status.has_focus = self.has_focus;
    }
}
