//! Unix domain socket server for IPC
//!
//! Provides request-response communication and push notifications for
//! session events to subscribed clients. Mode and lifecycle requests are
//! forwarded into the session manager's command channel; the server never
//! mutates session state itself.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::events::SessionEvent;
use crate::session::{Command, SessionStatus};

use super::protocol::{DaemonStatus, Notification, Request, Response};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    /// Snapshot written by the session manager, read for status queries
    status: Arc<RwLock<SessionStatus>>,
    /// Command channel into the session manager
    cmd_tx: mpsc::Sender<Command>,
    /// Session events fanned out to subscribed clients
    event_tx: broadcast::Sender<SessionEvent>,
    shutdown_tx: broadcast::Sender<()>,
    start_time: Instant,
}

impl Server {
    /// Create a new IPC server bound to `socket_path`
    pub fn new(
        socket_path: &Path,
        status: Arc<RwLock<SessionStatus>>,
        cmd_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            status,
            cmd_tx,
            event_tx,
            shutdown_tx,
            start_time: Instant::now(),
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let status = Arc::clone(&self.status);
                    let cmd_tx = self.cmd_tx.clone();
                    let events = self.event_tx.subscribe();
                    let start_time = self.start_time;
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, status, cmd_tx, events, start_time) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(
        mut stream: UnixStream,
        status: Arc<RwLock<SessionStatus>>,
        cmd_tx: mpsc::Sender<Command>,
        events: broadcast::Receiver<SessionEvent>,
        start_time: Instant,
    ) -> Result<()> {
        let mut len_buf = [0u8; 4];

        loop {
            // Read message length (4-byte little-endian)
            match stream.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > 1024 * 1024 {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            // Read message body
            let mut msg_buf = vec![0u8; len];
            stream.read_exact(&mut msg_buf).await?;

            // Parse request
            let request: Request =
                serde_json::from_slice(&msg_buf).context("failed to parse request")?;

            debug!(?request, "received request");

            // Process request
            let (response, subscribe) =
                Self::process_request(request, &status, &cmd_tx, start_time).await;

            // Send response
            Self::send_message(&mut stream, &response).await?;

            // A subscribed connection becomes a pure push stream
            if subscribe {
                debug!("client subscribed to notifications");
                return Self::forward_events(stream, events).await;
            }
        }
    }

    /// Push session events to a subscribed client until either side closes
    async fn forward_events(
        mut stream: UnixStream,
        mut events: broadcast::Receiver<SessionEvent>,
    ) -> Result<()> {
        loop {
            match events.recv().await {
                Ok(event) => {
                    debug!(%event, "pushing notification");
                    let notification = Notification::SessionEvent { event };
                    Self::send_message(&mut stream, &notification).await?;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged, notifications dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("event channel closed, ending subscription");
                    return Ok(());
                }
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(
        request: Request,
        status: &Arc<RwLock<SessionStatus>>,
        cmd_tx: &mpsc::Sender<Command>,
        start_time: Instant,
    ) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => {
                let status = status.read().await;
                let snapshot = DaemonStatus {
                    mode: status.mode,
                    has_focus: status.has_focus,
                    uptime_secs: start_time.elapsed().as_secs(),
                    ..DaemonStatus::default()
                };
                (Response::Status(snapshot), false)
            }

            Request::SetMode { mode } => match cmd_tx.send(Command::SetMode(mode)).await {
                Ok(()) => (
                    Response::ModeChange {
                        mode,
                        in_call: mode.is_call(),
                    },
                    false,
                ),
                Err(_) => (Self::manager_gone(), false),
            },

            Request::Lifecycle { event } => match cmd_tx.send(Command::Lifecycle(event)).await {
                Ok(()) => (Response::Accepted, false),
                Err(_) => (Self::manager_gone(), false),
            },

            Request::Subscribe => (Response::Subscribed, true),
        }
    }

    fn manager_gone() -> Response {
        Response::Error {
            code: "unavailable".to_string(),
            message: "session manager is not running".to_string(),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
