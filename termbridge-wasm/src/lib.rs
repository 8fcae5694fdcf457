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

//! Termbridge WASM host
//!
//! Hosts the terminal compute module and carries strings across its linear
//! memory boundary. The codec layer is pure byte manipulation over a
//! transient memory view; the module layer owns the wasmtime store,
//! resolves the module's allocation capability once at load, and exposes
//! the host functions the module imports.

pub mod alloc;
pub mod codec;
pub mod host;
pub mod module;

pub use alloc::AllocStrategy;
pub use host::HostState;
pub use module::{ModuleHost, TerminalModule};
