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

//! Boundary codec: string decoding out of a linear memory view.
//!
//! A string reference is a bare offset. When the offset is 4-byte aligned
//! the four bytes immediately before it may hold a little-endian length
//! prefix; an implausible prefix demotes the reference to a
//! null-terminated read. Every access is bounds-checked before the read
//! happens; no pointer, prefix, or byte content can make decoding fail
//! loudly.
//!
//! The functions here take a `&[u8]` view rather than a memory handle:
//! linear memory may grow between calls, so callers re-derive the view on
//! each access and the codec never holds one.

use termbridge_core::config::CodecConfig;

/// Decode a string reference out of a memory view.
///
/// A null pointer yields `fallback`. Anything else yields the decoded
/// string, or an empty string when the reference is unusable (offset out
/// of range, nothing to read, or the bytes are not UTF-8).
pub fn decode_str(mem: &[u8], ptr: u32, fallback: &str, config: CodecConfig) -> String {
    if ptr == 0 {
        return fallback.to_string();
    }

    let offset = ptr as usize;
    if offset >= mem.len() {
        tracing::debug!(ptr, mem_len = mem.len(), "String pointer out of range");
        return String::new();
    }

    let cap = config.max_string_bytes;
    let available = mem.len() - offset;

    let candidate = match length_prefix(mem, offset) {
        Some(len) => len,
        None => scan_for_nul(&mem[offset..offset + available.min(cap)]),
    };

    let safe_len = candidate.min(cap).min(available);
    if safe_len == 0 {
        return String::new();
    }

    match std::str::from_utf8(&mem[offset..offset + safe_len]) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::warn!(ptr, safe_len, error = %e, "Module string is not valid UTF-8");
            String::new()
        }
    }
}

/// Read the 4-byte length prefix stored immediately before an aligned
/// offset. Returns `None` when the offset is unaligned, the prefix is out
/// of reach, or the stored value is implausible (non-positive or larger
/// than the whole buffer).
fn length_prefix(mem: &[u8], offset: usize) -> Option<usize> {
    if offset % 4 != 0 || offset < 4 {
        return None;
    }
    let bytes: [u8; 4] = mem[offset - 4..offset].try_into().ok()?;
    let value = i32::from_le_bytes(bytes);
    if value <= 0 || value as usize > mem.len() {
        return None;
    }
    Some(value as usize)
}

/// Length of a null-terminated string within a capped window; the full
/// window length when no terminator is found.
fn scan_for_nul(window: &[u8]) -> usize {
    window.iter().position(|&b| b == 0).unwrap_or(window.len())
}
