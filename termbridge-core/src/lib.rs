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

//! Termbridge Core
//!
//! Shared types for the terminal bridge: errors, configuration, the relay
//! control vocabulary, the relay session state machine, command history,
//! and the screen-event dispatcher.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod link;
pub mod state;

pub use command::ControlMessage;
pub use config::{
    BridgeConfig, CodecConfig, ModuleConfig, RelayConfig, DEFAULT_MAX_STRING_BYTES,
};
pub use dispatch::ScreenDispatcher;
pub use error::{BridgeError, Result};
pub use history::CommandHistory;
pub use link::{NullRelayLink, RelayLink};
pub use state::{InvalidTransition, RelayEvent, RelayState};
