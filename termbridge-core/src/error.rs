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

//! Bridge error types
//!
//! Real `Err` values only flow for module lifecycle failures (bad bytes,
//! missing exports, limit violations) and configuration problems. Codec and
//! relay failures degrade to sentinel values plus a log line instead; they
//! never surface here.

use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur in the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    // Module lifecycle errors
    #[error("Module load failed: {0}")]
    ModuleLoad(String),

    #[error("Module export missing or mistyped: {0}")]
    MissingExport(String),

    #[error("Module call `{entry}` failed: {cause}")]
    ModuleCall { entry: String, cause: String },

    #[error("Failed to register host function `{function}`: {cause}")]
    HostFunction { function: String, cause: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for BridgeError {
    fn from(e: toml::de::Error) -> Self {
        BridgeError::Config(e.to_string())
    }
}
