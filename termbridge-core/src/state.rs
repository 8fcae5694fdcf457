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

//! Relay session lifecycle state machine.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl RelayState {
    pub fn is_connected(self) -> bool {
        matches!(self, RelayState::Connected)
    }

    /// A session is in flight or open; a new connect must tear it down first.
    pub fn is_active(self) -> bool {
        matches!(self, RelayState::Connecting | RelayState::Connected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEvent {
    /// A connect attempt begins.
    Dial,
    /// The socket's open event fired.
    Opened,
    /// The attempt failed before opening.
    Failed,
    /// The open session closed or errored.
    Closed,
}

#[derive(Debug, Error)]
#[error("Invalid transition: {current:?} -> {event:?}")]
pub struct InvalidTransition {
    pub current: RelayState,
    pub event: RelayEvent,
}

impl RelayState {
    pub fn transition(self, event: RelayEvent) -> Result<RelayState, InvalidTransition> {
        use RelayEvent::*;
        use RelayState::*;

        let next = match (self, event) {
            (Disconnected, Dial) => Connecting,
            (Connecting, Opened) => Connected,
            (Connecting, Failed) => Disconnected,
            (Connected, Closed) => Disconnected,
            (Connected, Failed) => Disconnected,
            _ => {
                return Err(InvalidTransition {
                    current: self,
                    event,
                })
            }
        };

        Ok(next)
    }
}
