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

//! Termbridge Relay
//!
//! The relay session manager: at most one open WebSocket session, owned by
//! a single actor task. Commands are processed serially, so tearing down a
//! superseded session always completes before the next one is dialled.
//! Inbound text and status strings fan back to the bridge on an event
//! channel, exactly once per message, in arrival order.

pub mod router;
pub mod session;

pub use router::MessageRouter;
pub use session::{RelayHandle, RelayManager, SessionEvent};
