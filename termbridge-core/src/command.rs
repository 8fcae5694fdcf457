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

//! Relay control vocabulary.
//!
//! Messages on the module-to-relay channel are matched against a small,
//! case-sensitive command set. Everything else is payload text.

const CONNECT_PREFIX: &str = "CONNECT:";

/// A recognised control message on the module-to-relay channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// `CLEAR_SCREEN`: notify screen-clear listeners.
    ClearScreen,
    /// `CONNECT:<url>`: connect to the given endpoint. The URL is
    /// everything after the prefix, taken verbatim.
    Connect(String),
    /// `CONNECT_DEFAULT`: connect to the configured default endpoint.
    ConnectDefault,
    /// `DISCONNECT`: close the current session.
    Disconnect,
}

impl ControlMessage {
    /// Parse a message, returning `None` for plain payload text.
    ///
    /// Matching is exact and case-sensitive; `CONNECT:` is a prefix match.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "CLEAR_SCREEN" => Some(ControlMessage::ClearScreen),
            "CONNECT_DEFAULT" => Some(ControlMessage::ConnectDefault),
            "DISCONNECT" => Some(ControlMessage::Disconnect),
            _ => text
                .strip_prefix(CONNECT_PREFIX)
                .map(|url| ControlMessage::Connect(url.to_string())),
        }
    }
}
