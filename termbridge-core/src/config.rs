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

//! Termbridge Configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default cap on a single decoded string, in bytes.
///
/// Carried over from the original boundary contract; not a protocol
/// constant, so it stays overridable via `[codec] max_string_bytes`.
pub const DEFAULT_MAX_STRING_BYTES: usize = 1024;

/// Termbridge configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub module: ModuleConfig,
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Compute module runtime limits and location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleConfig {
    /// Path to the compiled terminal module (.wasm)
    pub path: Option<PathBuf>,

    /// Maximum linear memory the module may grow to, in bytes
    #[serde(default = "default_max_memory_bytes")]
    pub max_memory_bytes: u64,

    /// Maximum fuel (instruction count) per entry-point call
    #[serde(default = "default_max_fuel")]
    pub max_fuel: u64,

    /// Debug mode (no fuel limit)
    #[serde(default)]
    pub debug_mode: bool,
}

/// Boundary codec tuning
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CodecConfig {
    /// Cap on a single decoded string, in bytes
    #[serde(default = "default_max_string_bytes")]
    pub max_string_bytes: usize,
}

/// Relay session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Endpoint used by the `CONNECT_DEFAULT` control message
    #[serde(default = "default_relay_url")]
    pub default_url: String,
}

fn default_max_memory_bytes() -> u64 {
    16 * 1024 * 1024 // 16MB
}

fn default_max_fuel() -> u64 {
    10_000_000_000
}

fn default_max_string_bytes() -> usize {
    DEFAULT_MAX_STRING_BYTES
}

fn default_relay_url() -> String {
    "ws://127.0.0.1:9001/terminal".to_string()
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_memory_bytes: default_max_memory_bytes(),
            max_fuel: default_max_fuel(),
            debug_mode: false,
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_string_bytes: default_max_string_bytes(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            default_url: default_relay_url(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            module: ModuleConfig::default(),
            codec: CodecConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file is given
    /// or the given file does not exist.
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        Ok(config)
    }
}
