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

//! Integration tests for the relay session manager against local
//! WebSocket listeners.

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use termbridge_core::dispatch::ScreenDispatcher;
use termbridge_core::link::RelayLink;
use termbridge_core::state::RelayState;
use termbridge_relay::{MessageRouter, RelayManager, SessionEvent};
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::tungstenite::Message;

/// Echo server accepting any number of connections.
async fn spawn_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                while let Some(Ok(msg)) = ws.next().await {
                    match msg {
                        Message::Text(text) => {
                            if ws.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
            });
        }
    });
    addr
}

/// Single-connection server that records its open and close into `log`.
async fn spawn_observing_server(log: Arc<Mutex<Vec<String>>>, tag: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            log.lock().push(format!("{tag}-open"));
            while let Some(Ok(msg)) = ws.next().await {
                if matches!(msg, Message::Close(_)) {
                    break;
                }
            }
            log.lock().push(format!("{tag}-closed"));
        }
    });
    addr
}

async fn next_event(rx: &mut UnboundedReceiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for relay event")
        .expect("event channel closed")
}

/// Wait until `entry` appears in the shared log.
async fn wait_for(log: &Arc<Mutex<Vec<String>>>, entry: &str) {
    for _ in 0..500 {
        if log.lock().iter().any(|e| e == entry) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("log entry `{entry}` never appeared; log: {:?}", log.lock());
}

#[tokio::test]
async fn connect_reports_status_and_echoes() {
    let addr = spawn_echo_server().await;
    let url = format!("ws://{addr}");
    let (handle, mut events) = RelayManager::spawn();

    handle.connect(&url);

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::State(RelayState::Connecting)
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::State(RelayState::Connected)
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Status(format!("Connected to {url}"))
    );
    assert!(handle.is_connected());
    assert_eq!(handle.current_url(), Some(url.clone()));

    assert!(handle.send("hello"));
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Inbound("hello".to_string())
    );
}

#[tokio::test]
async fn inbound_messages_keep_arrival_order() {
    let addr = spawn_echo_server().await;
    let (handle, mut events) = RelayManager::spawn();

    handle.connect(&format!("ws://{addr}"));
    // Drain Connecting, Connected, Status.
    for _ in 0..3 {
        next_event(&mut events).await;
    }

    for text in ["one", "two", "three"] {
        assert!(handle.send(text));
    }
    for text in ["one", "two", "three"] {
        assert_eq!(
            next_event(&mut events).await,
            SessionEvent::Inbound(text.to_string())
        );
    }
}

#[tokio::test]
async fn failed_connect_returns_to_disconnected() {
    // Bind and drop a listener so the port is very likely refused.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let url = format!("ws://{addr}");
    let (handle, mut events) = RelayManager::spawn();

    handle.connect(&url);

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::State(RelayState::Connecting)
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::State(RelayState::Disconnected)
    );
    match next_event(&mut events).await {
        SessionEvent::Status(status) => {
            assert!(status.starts_with(&format!("Connection to {url} failed")))
        }
        other => panic!("expected failure status, got {other:?}"),
    }
    assert!(!handle.is_connected());
    assert_eq!(handle.state(), RelayState::Disconnected);
}

#[tokio::test]
async fn new_connect_supersedes_open_session() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let addr_a = spawn_observing_server(log.clone(), "a").await;
    let addr_b = spawn_observing_server(log.clone(), "b").await;
    let url_b = format!("ws://{addr_b}");
    let (handle, mut events) = RelayManager::spawn();

    handle.connect(&format!("ws://{addr_a}"));
    // Connecting, Connected, Status for A.
    for _ in 0..3 {
        next_event(&mut events).await;
    }

    handle.connect(&url_b);
    // A is closed before B is dialled: Disconnected + status for A, then
    // Connecting, Connected, Status for B.
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::State(RelayState::Disconnected)
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Status(format!("Disconnected from ws://{addr_a}"))
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::State(RelayState::Connecting)
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::State(RelayState::Connected)
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Status(format!("Connected to {url_b}"))
    );

    // Exactly one session remains and it targets B.
    assert!(handle.is_connected());
    assert_eq!(handle.current_url(), Some(url_b));
    wait_for(&log, "a-closed").await;
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let addr = spawn_echo_server().await;
    let (handle, mut events) = RelayManager::spawn();

    // Nothing open yet.
    assert!(!handle.disconnect());

    handle.connect(&format!("ws://{addr}"));
    for _ in 0..3 {
        next_event(&mut events).await;
    }

    assert!(handle.disconnect());
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::State(RelayState::Disconnected)
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Status(format!("Disconnected from ws://{addr}"))
    );

    // Second disconnect finds nothing open.
    assert!(!handle.disconnect());
}

#[tokio::test]
async fn send_while_disconnected_fails_quietly() {
    let (handle, _events) = RelayManager::spawn();
    assert!(!handle.send("nobody listening"));
}

#[tokio::test]
async fn router_connect_command_opens_session() {
    let addr = spawn_echo_server().await;
    let url = format!("ws://{addr}");
    let (handle, mut events) = RelayManager::spawn();
    let router = MessageRouter::new(handle.clone(), Arc::new(ScreenDispatcher::new()), url.clone());

    // A CONNECT command relayed from the compute module opens a session.
    assert!(router.handle_message(&format!("CONNECT:{url}")));
    for _ in 0..2 {
        next_event(&mut events).await;
    }
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Status(format!("Connected to {url}"))
    );
    assert!(router.is_connected());

    // Payload text now goes over the wire.
    assert!(router.handle_message("over the wire"));
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Inbound("over the wire".to_string())
    );

    // DISCONNECT closes the session.
    assert!(router.handle_message("DISCONNECT"));
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::State(RelayState::Disconnected)
    );
}

#[tokio::test]
async fn router_connect_default_uses_configured_endpoint() {
    let addr = spawn_echo_server().await;
    let url = format!("ws://{addr}");
    let (handle, mut events) = RelayManager::spawn();
    let router = MessageRouter::new(handle.clone(), Arc::new(ScreenDispatcher::new()), url.clone());

    assert!(router.handle_message("CONNECT_DEFAULT"));
    for _ in 0..2 {
        next_event(&mut events).await;
    }
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Status(format!("Connected to {url}"))
    );
    assert_eq!(handle.current_url(), Some(url));
}

#[tokio::test]
async fn router_clear_screen_notifies_handlers() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let (handle, _events) = RelayManager::spawn();
    let screen = Arc::new(ScreenDispatcher::new());
    let cleared = Arc::new(AtomicUsize::new(0));
    let counter = cleared.clone();
    screen.on_clear("test", move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let router = MessageRouter::new(handle, screen, "ws://unused".to_string());

    assert!(router.handle_message("CLEAR_SCREEN"));
    assert_eq!(cleared.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn router_logs_payload_when_disconnected() {
    let (handle, _events) = RelayManager::spawn();
    let router = MessageRouter::new(
        handle,
        Arc::new(ScreenDispatcher::new()),
        "ws://unused".to_string(),
    );

    // Plain text with no session: a log line, no side effect.
    assert!(!router.handle_message("just words"));
    // Case matters: lowercase commands are payload, not control.
    assert!(!router.handle_message("disconnect"));
}
