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

//! Host function bindings for the terminal module.
//!
//! Provides the `term` namespace imports the module can call: logging,
//! relay access, and the abort notification. Every string argument is
//! decoded through the boundary codec; a bad pointer degrades to an empty
//! string, never to a trap.

use crate::codec;
use std::sync::Arc;
use termbridge_core::config::CodecConfig;
use termbridge_core::error::{BridgeError, Result};
use termbridge_core::link::RelayLink;
use wasmtime::{Caller, Extern, Linker, StoreLimits};

/// State owned by the module's store and visible to host functions.
pub struct HostState {
    /// Route to the relay session manager.
    pub(crate) relay: Arc<dyn RelayLink>,
    /// Boundary codec tuning.
    pub(crate) codec: CodecConfig,
    /// Resource limits enforced on the store.
    pub(crate) limits: StoreLimits,
}

impl HostState {
    pub fn new(relay: Arc<dyn RelayLink>, codec: CodecConfig, limits: StoreLimits) -> Self {
        Self {
            relay,
            codec,
            limits,
        }
    }
}

/// Decode a string argument out of the calling module's memory.
///
/// The memory view is re-derived here on every call; the module may have
/// grown its memory since the last host call.
fn read_module_string(caller: &mut Caller<'_, HostState>, ptr: u32, fallback: &str) -> String {
    let config = caller.data().codec;
    let memory = match caller.get_export("memory") {
        Some(Extern::Memory(m)) => m,
        _ => {
            tracing::warn!("Module has no exported memory; dropping string argument");
            return fallback.to_string();
        }
    };
    codec::decode_str(memory.data(&*caller), ptr, fallback, config)
}

/// Register the `term` namespace on a linker.
pub fn register_host_functions(linker: &mut Linker<HostState>) -> Result<()> {
    // log(ptr)
    // Decode and print as info.
    linker
        .func_wrap(
            "term",
            "log",
            |mut caller: Caller<'_, HostState>, ptr: u32| {
                let text = read_module_string(&mut caller, ptr, "");
                tracing::info!("[module] {}", text);
            },
        )
        .map_err(|e| BridgeError::HostFunction {
            function: "term.log".to_string(),
            cause: e.to_string(),
        })?;

    // log_error(ptr)
    // Decode and print as error.
    linker
        .func_wrap(
            "term",
            "log_error",
            |mut caller: Caller<'_, HostState>, ptr: u32| {
                let text = read_module_string(&mut caller, ptr, "");
                tracing::error!("[module] {}", text);
            },
        )
        .map_err(|e| BridgeError::HostFunction {
            function: "term.log_error".to_string(),
            cause: e.to_string(),
        })?;

    // send_to_relay(ptr) -> i32
    // Decode and route through the relay vocabulary. Returns 1 when the
    // message was handled (control action taken or text sent), 0 otherwise.
    linker
        .func_wrap(
            "term",
            "send_to_relay",
            |mut caller: Caller<'_, HostState>, ptr: u32| -> i32 {
                let text = read_module_string(&mut caller, ptr, "");
                if text.is_empty() {
                    return 0;
                }
                caller.data().relay.handle_message(&text) as i32
            },
        )
        .map_err(|e| BridgeError::HostFunction {
            function: "term.send_to_relay".to_string(),
            cause: e.to_string(),
        })?;

    // is_relay_connected() -> i32
    linker
        .func_wrap(
            "term",
            "is_relay_connected",
            |caller: Caller<'_, HostState>| -> i32 { caller.data().relay.is_connected() as i32 },
        )
        .map_err(|e| BridgeError::HostFunction {
            function: "term.is_relay_connected".to_string(),
            cause: e.to_string(),
        })?;

    // abort(msg_ptr, file_ptr, line, col)
    // Fatal module-side fault. Logged with full source location; the host
    // session stays up so the bridge remains usable for diagnostics.
    linker
        .func_wrap(
            "term",
            "abort",
            |mut caller: Caller<'_, HostState>, msg: u32, file: u32, line: u32, col: u32| {
                let message = read_module_string(&mut caller, msg, "unspecified abort");
                let source = read_module_string(&mut caller, file, "<unknown>");
                tracing::error!(source = %source, line, col, "Module abort: {}", message);
            },
        )
        .map_err(|e| BridgeError::HostFunction {
            function: "term.abort".to_string(),
            cause: e.to_string(),
        })?;

    Ok(())
}
