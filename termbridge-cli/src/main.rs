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

mod app;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use termbridge_core::config::BridgeConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the terminal module (overrides config file)
    #[arg(long, env = "TERMBRIDGE_MODULE")]
    module: Option<PathBuf>,

    /// Default relay endpoint for CONNECT_DEFAULT (overrides config file)
    #[arg(long, env = "TERMBRIDGE_RELAY_URL")]
    relay_url: Option<String>,

    /// Disable fuel metering on module calls
    #[arg(long, env = "TERMBRIDGE_DEBUG_MODE")]
    debug_mode: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = BridgeConfig::load(args.config)?;

    // Apply CLI overrides
    if let Some(module) = args.module {
        config.module.path = Some(module);
    }
    if let Some(url) = args.relay_url {
        config.relay.default_url = url;
    }
    if args.debug_mode {
        config.module.debug_mode = true;
    }

    // Run the bridge
    app::run_bridge(config).await
}
