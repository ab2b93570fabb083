//! audio-session-daemon: Call audio session coordinator
//!
//! This daemon owns the system audio configuration for call apps:
//! - Session modes for video calls, voice calls, and host-pinned routing
//! - Audio focus acquisition and release against the platform arbiter
//! - Output route selection (Bluetooth, wired, speaker, earpiece)
//! - IPC server for mode changes, lifecycle relay, and focus notifications
//!
//! Every session mutation flows through one command channel into the
//! session manager, so host requests and platform notifications are always
//! applied in arrival order.

mod config;
mod events;
mod ipc;
mod lifecycle;
mod platform;
mod session;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::events::SessionEvent;
use crate::ipc::Server;
use crate::lifecycle::{LifecycleEvent, ShutdownSignal};
use crate::platform::NullBackend;
use crate::session::{Command, SessionManager, SessionStatus};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "audio-session-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, "configuration loaded");

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Create channels for inter-component communication
    // IPC server and platform callbacks -> session manager
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(32);
    // Session manager -> IPC server (focus notifications for subscribers)
    let (event_tx, _event_rx) = broadcast::channel::<SessionEvent>(64);
    // Diagnostic snapshot shared between manager and server
    let status = Arc::new(RwLock::new(SessionStatus::default()));

    // Create the session manager on the null backend; a platform backend
    // would be selected here once one is compiled in.
    let platform = Arc::new(NullBackend::new());
    let mut manager = SessionManager::new(
        platform,
        cmd_tx.clone(),
        event_tx.clone(),
        Arc::clone(&status),
    );

    // Create IPC server wired into the command channel
    let server = Server::new(&config.socket_path, Arc::clone(&status), cmd_tx.clone(), event_tx)?;

    info!("daemon initialized, entering main loop");

    let manager_task = tokio::spawn(async move { manager.run(cmd_rx).await });

    // Main event loop
    tokio::select! {
        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    // Tear the session down through the normal command path so focus and
    // the hotplug watch are released before exit.
    if cmd_tx
        .send(Command::Lifecycle(LifecycleEvent::Destroyed))
        .await
        .is_err()
    {
        error!("session manager unavailable during shutdown");
    }
    if let Err(e) = manager_task.await {
        error!(?e, "session manager task failed");
    }

    server.shutdown().await;

    info!("audio-session-daemon stopped");

    Ok(())
}
