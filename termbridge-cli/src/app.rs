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

//! Interactive bridge loop.
//!
//! Wires the terminal module, the relay session manager and the command
//! history together: stdin lines feed the module, relay traffic and
//! status strings are pumped into the module in arrival order, and
//! clear-screen notifications reset the terminal.

use anyhow::{anyhow, Result};
use std::io::Write;
use std::sync::Arc;
use termbridge_core::config::BridgeConfig;
use termbridge_core::dispatch::ScreenDispatcher;
use termbridge_core::history::CommandHistory;
use termbridge_core::link::RelayLink;
use termbridge_relay::{MessageRouter, RelayManager, SessionEvent};
use termbridge_wasm::ModuleHost;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub async fn run_bridge(config: BridgeConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "termbridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Termbridge");
    tracing::info!("Configuration: {:#?}", config);

    let module_path = config
        .module
        .path
        .clone()
        .ok_or_else(|| anyhow!("No module configured; pass --module or set [module] path"))?;

    let screen = Arc::new(ScreenDispatcher::new());
    screen.on_clear("terminal", || {
        print!("\x1b[2J\x1b[H");
        let _ = std::io::stdout().flush();
    });

    let (relay, mut events) = RelayManager::spawn();
    let router: Arc<dyn RelayLink> = Arc::new(MessageRouter::new(
        relay.clone(),
        screen.clone(),
        config.relay.default_url.clone(),
    ));

    // Module loading is the readiness gate: awaited exactly once here, and
    // nothing is pumped until it resolves.
    let codec = config.codec;
    let module_config = config.module.clone();
    let module_relay = router.clone();
    let mut module = tokio::task::spawn_blocking(move || {
        let host = ModuleHost::new(module_config)?;
        host.load_from_file(&module_path, codec, module_relay)
    })
    .await??;

    tracing::info!(
        allocator = module.alloc_strategy().name(),
        memory_bytes = module.memory_bytes(),
        "Terminal module ready"
    );

    let mut history = CommandHistory::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("Input closed, shutting down");
                    break;
                };
                handle_input_line(&line, &mut history, &mut module);
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    SessionEvent::Inbound(text) | SessionEvent::Status(text) => {
                        if let Err(e) = module.process_text(&text) {
                            tracing::error!(error = %e, "Module rejected relay message");
                        }
                    }
                    SessionEvent::State(state) => {
                        tracing::debug!(?state, "Relay state changed");
                    }
                }
            }
        }
    }

    relay.disconnect();
    Ok(())
}

/// One submitted line: either a local history-recall command or input for
/// the module.
fn handle_input_line(
    line: &str,
    history: &mut CommandHistory,
    module: &mut termbridge_wasm::TerminalModule,
) {
    match line {
        ":prev" => {
            let entry = history.previous();
            if entry.is_empty() {
                println!("(history empty)");
            } else {
                println!("{entry}");
            }
        }
        ":next" => {
            let entry = history.next();
            if entry.is_empty() {
                println!("(end of history)");
            } else {
                println!("{entry}");
            }
        }
        _ => {
            history.record(line);
            if let Err(e) = module.process_text(line) {
                tracing::error!(error = %e, "Module rejected input");
            }
        }
    }
}
