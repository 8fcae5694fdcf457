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

//! Command history with shell-style cursor recall.
//!
//! The cursor ranges over `[0, len]`; `len` is the "no selection" position
//! and reads back as an empty input line. Entries are never deduplicated.

#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor position, always within `[0, len]`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Append a submitted command and reset the cursor past the end.
    ///
    /// Blank or whitespace-only commands and commands containing line
    /// breaks are dropped; the cursor still resets so the next recall
    /// starts from the most recent entry.
    pub fn record(&mut self, command: &str) {
        if !command.trim().is_empty() && !command.contains('\n') && !command.contains('\r') {
            self.entries.push(command.to_string());
        }
        self.cursor = self.entries.len();
    }

    /// Step the cursor toward the oldest entry and return the entry there.
    ///
    /// Returns an empty string when the history is empty.
    pub fn previous(&mut self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        self.cursor = self.cursor.saturating_sub(1);
        self.entries[self.cursor].clone()
    }

    /// Step the cursor toward the newest entry and return the entry there.
    ///
    /// Returns an empty string exactly when the cursor lands on `len`,
    /// i.e. past the newest entry.
    pub fn next(&mut self) -> String {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
        if self.cursor == self.entries.len() {
            String::new()
        } else {
            self.entries[self.cursor].clone()
        }
    }
}
