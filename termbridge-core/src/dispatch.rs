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

//! Screen-event dispatcher.
//!
//! Clear-screen notifications fan out to an ordered list of independently
//! registered handlers. Handlers run in registration order; a handler
//! cannot unregister or replace another.

use parking_lot::Mutex;

type ScreenHandler = Box<dyn Fn() + Send + Sync>;

struct RegisteredHandler {
    name: String,
    handler: ScreenHandler,
}

/// Dispatcher for screen-clear notifications.
#[derive(Default)]
pub struct ScreenDispatcher {
    handlers: Mutex<Vec<RegisteredHandler>>,
}

impl ScreenDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clear-screen handler under a diagnostic name.
    pub fn on_clear<F>(&self, name: &str, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.lock().push(RegisteredHandler {
            name: name.to_string(),
            handler: Box::new(handler),
        });
    }

    /// Invoke every registered handler in registration order.
    ///
    /// Returns the number of handlers notified.
    pub fn notify_clear(&self) -> usize {
        let handlers = self.handlers.lock();
        for registered in handlers.iter() {
            tracing::debug!(handler = %registered.name, "Dispatching clear-screen");
            (registered.handler)();
        }
        handlers.len()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }
}
