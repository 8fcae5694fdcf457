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

//! Allocation capability of the loaded module.
//!
//! The module may expose any of three allocation entry points. The
//! capability is resolved exactly once, at load time, by probing exports
//! in fixed preference order; it is never re-probed per call.

use wasmtime::{AsContextMut, Instance, TypedFunc};

/// How outbound strings are placed into module memory.
///
/// - `LengthPrefixed`: `new_string(byte_len) -> ptr`; the module
///   initialises the 4-byte prefix before the returned pointer, the host
///   writes the bytes.
/// - `ByteBuffer`: `new_buffer(byte_len) -> ptr`; the host writes the
///   bytes, no prefix, no terminator.
/// - `RawCopy`: `alloc(size) -> ptr`; the host allocates one extra byte,
///   copies the bytes verbatim and writes a trailing NUL.
/// - `Unavailable`: no allocator exported; every encode degrades to a
///   null pointer plus a warning.
#[derive(Clone, Copy)]
pub enum AllocStrategy {
    LengthPrefixed(TypedFunc<u32, u32>),
    ByteBuffer(TypedFunc<u32, u32>),
    RawCopy(TypedFunc<u32, u32>),
    Unavailable,
}

impl AllocStrategy {
    /// Probe the instance's exports, most capable first.
    pub fn resolve(mut store: impl AsContextMut, instance: &Instance) -> Self {
        if let Ok(f) = instance.get_typed_func::<u32, u32>(&mut store, "new_string") {
            return AllocStrategy::LengthPrefixed(f);
        }
        if let Ok(f) = instance.get_typed_func::<u32, u32>(&mut store, "new_buffer") {
            return AllocStrategy::ByteBuffer(f);
        }
        if let Ok(f) = instance.get_typed_func::<u32, u32>(&mut store, "alloc") {
            return AllocStrategy::RawCopy(f);
        }
        tracing::warn!("Module exports no allocation entry point; outbound strings will be dropped");
        AllocStrategy::Unavailable
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, AllocStrategy::Unavailable)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AllocStrategy::LengthPrefixed(_) => "length-prefixed",
            AllocStrategy::ByteBuffer(_) => "byte-buffer",
            AllocStrategy::RawCopy(_) => "raw-copy",
            AllocStrategy::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Debug for AllocStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
