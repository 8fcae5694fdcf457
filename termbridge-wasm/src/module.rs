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

//! Terminal module host.
//!
//! Loads the compute module, wires up the `term` host imports, resolves
//! the allocation capability once, and exposes the two boundary
//! operations: encode (native string into module memory) and decode
//! (module memory into native string), plus the `process_message` entry
//! point that inbound text is pumped through.

use crate::alloc::AllocStrategy;
use crate::codec;
use crate::host::{register_host_functions, HostState};
use std::path::Path;
use std::sync::Arc;
use termbridge_core::config::{CodecConfig, ModuleConfig};
use termbridge_core::error::{BridgeError, Result};
use termbridge_core::link::RelayLink;
use wasmtime::{Config, Engine, Instance, Linker, Memory, Module, Store, StoreLimitsBuilder, TypedFunc};

/// Factory for terminal module instances.
///
/// Owns the engine and the runtime limits; `load` produces a ready
/// [`TerminalModule`]. Loading completes before any message pumping
/// starts: a successful return is the readiness signal, and nothing polls
/// for the module to come up.
pub struct ModuleHost {
    engine: Engine,
    config: ModuleConfig,
}

impl ModuleHost {
    pub fn new(config: ModuleConfig) -> Result<Self> {
        let mut engine_config = Config::new();

        // Fuel metering bounds a single entry-point call.
        if !config.debug_mode {
            engine_config.consume_fuel(true);
        }

        let engine = Engine::new(&engine_config)
            .map_err(|e| BridgeError::ModuleLoad(format!("Failed to create engine: {e}")))?;

        Ok(Self { engine, config })
    }

    /// Instantiate a module from raw bytes.
    pub fn load(
        &self,
        wasm_bytes: &[u8],
        codec: CodecConfig,
        relay: Arc<dyn RelayLink>,
    ) -> Result<TerminalModule> {
        let module = Module::new(&self.engine, wasm_bytes)
            .map_err(|e| BridgeError::ModuleLoad(format!("Failed to compile module: {e}")))?;

        let mut linker: Linker<HostState> = Linker::new(&self.engine);
        register_host_functions(&mut linker)?;

        let limits = StoreLimitsBuilder::new()
            .memory_size(self.config.max_memory_bytes as usize)
            .build();

        let mut store = Store::new(&self.engine, HostState::new(relay, codec, limits));
        store.limiter(|state| &mut state.limits);

        if !self.config.debug_mode {
            store
                .set_fuel(self.config.max_fuel)
                .map_err(|e| BridgeError::ModuleLoad(format!("Failed to set fuel: {e}")))?;
        }

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(|e| BridgeError::ModuleLoad(format!("Failed to instantiate module: {e}")))?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| BridgeError::MissingExport("memory".to_string()))?;

        let process_message = instance
            .get_typed_func::<u32, ()>(&mut store, "process_message")
            .map_err(|e| BridgeError::MissingExport(format!("process_message: {e}")))?;

        let alloc = AllocStrategy::resolve(&mut store, &instance);

        tracing::info!(
            pages = memory.size(&store),
            allocator = alloc.name(),
            "Terminal module loaded"
        );

        Ok(TerminalModule {
            store,
            instance,
            memory,
            process_message,
            alloc,
            codec,
            max_fuel: self.config.max_fuel,
            debug_mode: self.config.debug_mode,
        })
    }

    /// Instantiate a module from a file path.
    pub fn load_from_file(
        &self,
        path: &Path,
        codec: CodecConfig,
        relay: Arc<dyn RelayLink>,
    ) -> Result<TerminalModule> {
        let wasm_bytes = std::fs::read(path)?;
        self.load(&wasm_bytes, codec, relay)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

/// A loaded terminal module instance.
pub struct TerminalModule {
    store: Store<HostState>,
    instance: Instance,
    memory: Memory,
    process_message: TypedFunc<u32, ()>,
    alloc: AllocStrategy,
    codec: CodecConfig,
    max_fuel: u64,
    debug_mode: bool,
}

impl TerminalModule {
    /// Decode a string reference out of module memory.
    ///
    /// The memory view is re-derived on every call; references held across
    /// memory growth stay safe because only the current view is read.
    pub fn decode(&self, ptr: u32, fallback: &str) -> String {
        codec::decode_str(self.memory.data(&self.store), ptr, fallback, self.codec)
    }

    /// Place a native string into module memory and return its pointer.
    ///
    /// Empty input and every failure path (no allocator, allocator trap,
    /// null or out-of-range allocation) yield pointer 0; failures warn but
    /// never propagate.
    pub fn encode(&mut self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }

        let bytes = text.as_bytes();
        let len = bytes.len() as u32;

        let (alloc_fn, total) = match self.alloc {
            AllocStrategy::LengthPrefixed(f) | AllocStrategy::ByteBuffer(f) => (f, len),
            AllocStrategy::RawCopy(f) => (f, len + 1),
            AllocStrategy::Unavailable => {
                tracing::warn!(len, "No allocator available; dropping outbound string");
                return 0;
            }
        };

        let ptr = match alloc_fn.call(&mut self.store, total) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "Module allocator failed");
                return 0;
            }
        };
        if ptr == 0 {
            tracing::warn!(total, "Module allocator returned a null pointer");
            return 0;
        }

        let start = ptr as usize;
        let Some(end) = start.checked_add(total as usize) else {
            tracing::warn!(ptr, total, "Allocation range overflows");
            return 0;
        };

        // Bounds check precedes the write.
        let mem = self.memory.data_mut(&mut self.store);
        let Some(dest) = mem.get_mut(start..end) else {
            tracing::warn!(ptr, total, "Module allocator returned an out-of-range pointer");
            return 0;
        };

        dest[..bytes.len()].copy_from_slice(bytes);
        if matches!(self.alloc, AllocStrategy::RawCopy(_)) {
            dest[bytes.len()] = 0;
        }

        ptr
    }

    /// Encode `text` and hand it to the module's `process_message` entry
    /// point. Exactly one call per message; callers control arrival order.
    pub fn process_text(&mut self, text: &str) -> Result<()> {
        self.refuel()?;

        let ptr = self.encode(text);
        if ptr == 0 && !text.is_empty() {
            tracing::warn!("Message could not be marshalled into module memory; dropped");
            return Ok(());
        }

        self.process_message
            .call(&mut self.store, ptr)
            .map_err(|e| BridgeError::ModuleCall {
                entry: "process_message".to_string(),
                cause: e.to_string(),
            })
    }

    /// Invoke a niladic module export.
    pub fn call_entry(&mut self, name: &str) -> Result<()> {
        self.refuel()?;

        let func = self
            .instance
            .get_typed_func::<(), ()>(&mut self.store, name)
            .map_err(|e| BridgeError::MissingExport(format!("{name}: {e}")))?;

        func.call(&mut self.store, ())
            .map_err(|e| BridgeError::ModuleCall {
                entry: name.to_string(),
                cause: e.to_string(),
            })
    }

    /// Reset the per-call fuel budget.
    fn refuel(&mut self) -> Result<()> {
        if self.debug_mode {
            return Ok(());
        }
        self.store
            .set_fuel(self.max_fuel)
            .map_err(|e| BridgeError::ModuleCall {
                entry: "set_fuel".to_string(),
                cause: e.to_string(),
            })
    }

    /// Current linear memory size in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.memory.data_size(&self.store)
    }

    pub fn alloc_strategy(&self) -> &AllocStrategy {
        &self.alloc
    }
}
