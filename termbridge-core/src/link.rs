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

//! Relay link seam.
//!
//! The module host talks to the relay through this trait so that the wasm
//! boundary code carries no socket dependency and tests can substitute a
//! recording stub.

/// Handle the module host uses to reach the relay.
pub trait RelayLink: Send + Sync {
    /// Route one module-emitted message: control commands act on the
    /// session, payload text is sent when connected. Returns whether the
    /// message was handled (control action taken or text sent).
    fn handle_message(&self, text: &str) -> bool;

    /// Whether a session is currently open.
    fn is_connected(&self) -> bool;
}

/// Link used when no relay is wired up; every message degrades to a log line.
#[derive(Debug, Default)]
pub struct NullRelayLink;

impl RelayLink for NullRelayLink {
    fn handle_message(&self, text: &str) -> bool {
        tracing::info!(message = %text, "No relay attached, dropping module message");
        false
    }

    fn is_connected(&self) -> bool {
        false
    }
}
