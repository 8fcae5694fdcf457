// Copyright 2025 Termbridge (https://github.com/termbridge/termbridge)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Relay session actor.
//!
//! One task owns the socket. Commands arrive on an unbounded channel and
//! are handled one at a time; a connect that supersedes an open session
//! closes it before the new endpoint is dialled. A connect attempt
//! resolves only through the socket's own open/error result; there is no
//! bridge-level timeout on a hung attempt (known limitation).

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use termbridge_core::state::{RelayEvent, RelayState};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Event fanned back to the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// State transition of the session lifecycle.
    State(RelayState),
    /// Module-visible status string ("Connected to <url>" and friends).
    Status(String),
    /// Text received on the socket, forwarded in arrival order.
    Inbound(String),
}

#[derive(Debug)]
enum Command {
    Connect(String),
    Disconnect,
    Send(String),
}

struct Shared {
    state: Mutex<RelayState>,
    url: Mutex<Option<String>>,
}

/// Handle to the relay actor.
///
/// Cheap to clone; all clones address the same single session.
#[derive(Clone)]
pub struct RelayHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    shared: Arc<Shared>,
}

impl RelayHandle {
    /// Request a connection to `url`, superseding any open session.
    pub fn connect(&self, url: &str) {
        if self.cmd_tx.send(Command::Connect(url.to_string())).is_err() {
            tracing::error!("Relay actor is gone; connect dropped");
        }
    }

    /// Close the current session. Idempotent: returns false when nothing
    /// is open or in flight.
    pub fn disconnect(&self) -> bool {
        if !self.shared.state.lock().is_active() {
            tracing::debug!("Disconnect requested with no open session");
            return false;
        }
        self.cmd_tx.send(Command::Disconnect).is_ok()
    }

    /// Send text over the open session. Returns false (and logs) when no
    /// session is connected.
    pub fn send(&self, text: &str) -> bool {
        if !self.is_connected() {
            tracing::warn!("Send attempted while not connected");
            return false;
        }
        self.cmd_tx.send(Command::Send(text.to_string())).is_ok()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.state.lock().is_connected()
    }

    pub fn state(&self) -> RelayState {
        *self.shared.state.lock()
    }

    /// Endpoint of the current (or most recent) session.
    pub fn current_url(&self) -> Option<String> {
        self.shared.url.lock().clone()
    }
}

/// Spawns the session actor.
pub struct RelayManager;

impl RelayManager {
    pub fn spawn() -> (RelayHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            state: Mutex::new(RelayState::Disconnected),
            url: Mutex::new(None),
        });

        let actor = Actor {
            events: event_tx,
            shared: shared.clone(),
            socket: None,
        };
        tokio::spawn(actor.run(cmd_rx));

        (RelayHandle { cmd_tx, shared }, event_rx)
    }
}

struct Actor {
    events: mpsc::UnboundedSender<SessionEvent>,
    shared: Arc<Shared>,
    socket: Option<WsStream>,
}

enum Step {
    Command(Option<Command>),
    Socket(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
}

impl Actor {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
        loop {
            let step = if let Some(ws) = self.socket.as_mut() {
                tokio::select! {
                    cmd = cmd_rx.recv() => Step::Command(cmd),
                    msg = ws.next() => Step::Socket(msg),
                }
            } else {
                Step::Command(cmd_rx.recv().await)
            };

            match step {
                Step::Command(Some(cmd)) => self.handle_command(cmd).await,
                Step::Command(None) => {
                    // All handles dropped; tear down and stop.
                    let _ = self.close_session().await;
                    break;
                }
                Step::Socket(msg) => self.handle_socket(msg).await,
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect(url) => {
                // Teardown of the superseded session strictly precedes the
                // new dial.
                if self.socket.is_some() {
                    let old = self.close_session().await;
                    if let Some(old) = old {
                        self.status(format!("Disconnected from {old}"));
                    }
                }
                self.dial(url).await;
            }
            Command::Disconnect => {
                if self.socket.is_some() {
                    let old = self.close_session().await;
                    if let Some(old) = old {
                        self.status(format!("Disconnected from {old}"));
                    }
                } else {
                    tracing::debug!("Disconnect with no open session; ignoring");
                }
            }
            Command::Send(text) => self.send_text(text).await,
        }
    }

    async fn dial(&mut self, url: String) {
        self.apply(RelayEvent::Dial);
        *self.shared.url.lock() = Some(url.clone());
        tracing::info!(%url, "Connecting to relay endpoint");

        match connect_async(url.as_str()).await {
            Ok((ws, _response)) => {
                self.socket = Some(ws);
                self.apply(RelayEvent::Opened);
                self.status(format!("Connected to {url}"));
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Relay connection failed");
                self.apply(RelayEvent::Failed);
                self.status(format!("Connection to {url} failed: {e}"));
            }
        }
    }

    async fn send_text(&mut self, text: String) {
        let Some(ws) = self.socket.as_mut() else {
            tracing::warn!("Send raced a teardown; message dropped");
            return;
        };
        if let Err(e) = ws.send(Message::Text(text)).await {
            tracing::error!(error = %e, "Relay send failed");
            self.socket = None;
            self.apply(RelayEvent::Failed);
            if let Some(url) = self.shared.url.lock().clone() {
                self.status(format!("Connection to {url} lost: {e}"));
            }
        }
    }

    async fn handle_socket(
        &mut self,
        msg: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>,
    ) {
        match msg {
            Some(Ok(Message::Text(text))) => {
                // Exactly once, in arrival order.
                let _ = self.events.send(SessionEvent::Inbound(text));
            }
            Some(Ok(Message::Ping(payload))) => {
                if let Some(ws) = self.socket.as_mut() {
                    let _ = ws.send(Message::Pong(payload)).await;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                tracing::info!("Relay session closed by peer");
                self.socket = None;
                self.apply(RelayEvent::Closed);
                if let Some(url) = self.shared.url.lock().clone() {
                    self.status(format!("Connection to {url} closed"));
                }
            }
            Some(Ok(other)) => {
                tracing::debug!(?other, "Ignoring non-text relay message");
            }
            Some(Err(e)) => {
                tracing::error!(error = %e, "Relay receive error");
                self.socket = None;
                self.apply(RelayEvent::Failed);
                if let Some(url) = self.shared.url.lock().clone() {
                    self.status(format!("Connection to {url} error: {e}"));
                }
            }
        }
    }

    /// Close the open socket, if any, and report the endpoint it targeted.
    async fn close_session(&mut self) -> Option<String> {
        let mut ws = self.socket.take()?;
        if let Err(e) = ws.close(None).await {
            tracing::debug!(error = %e, "Close handshake failed");
        }
        self.apply(RelayEvent::Closed);
        self.shared.url.lock().clone()
    }

    fn apply(&self, event: RelayEvent) {
        let next = {
            let mut state = self.shared.state.lock();
            match state.transition(event) {
                Ok(next) => {
                    *state = next;
                    next
                }
                Err(e) => {
                    tracing::error!(error = %e, "Relay state machine violation");
                    return;
                }
            }
        };
        let _ = self.events.send(SessionEvent::State(next));
    }

    fn status(&self, text: String) {
        let _ = self.events.send(SessionEvent::Status(text));
    }
}
