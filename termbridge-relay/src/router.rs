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

//! Module-to-relay message routing.
//!
//! Control messages act on the session or the screen; payload text is
//! sent when a session is open and otherwise degrades to a log line with
//! no side effect.

use crate::session::RelayHandle;
use std::sync::Arc;
use termbridge_core::command::ControlMessage;
use termbridge_core::dispatch::ScreenDispatcher;
use termbridge_core::link::RelayLink;

/// Routes module-emitted messages to the relay and the screen dispatcher.
pub struct MessageRouter {
    relay: RelayHandle,
    screen: Arc<ScreenDispatcher>,
    default_url: String,
}

impl MessageRouter {
    pub fn new(relay: RelayHandle, screen: Arc<ScreenDispatcher>, default_url: String) -> Self {
        Self {
            relay,
            screen,
            default_url,
        }
    }
}

impl RelayLink for MessageRouter {
    fn handle_message(&self, text: &str) -> bool {
        match ControlMessage::parse(text) {
            Some(ControlMessage::ClearScreen) => {
                self.screen.notify_clear();
                true
            }
            Some(ControlMessage::Connect(url)) => {
                self.relay.connect(&url);
                true
            }
            Some(ControlMessage::ConnectDefault) => {
                self.relay.connect(&self.default_url);
                true
            }
            Some(ControlMessage::Disconnect) => self.relay.disconnect(),
            None => {
                if self.relay.is_connected() {
                    self.relay.send(text)
                } else {
                    tracing::info!("[relay] {}", text);
                    false
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.relay.is_connected()
    }
}
