//! nvim-mcp-server -- MCP server for the Neovim instance in `$NVIM`.
//!
//! Usage: nvim-mcp-server [-v | --version]

use anyhow::Context;
use nvim_mcp_server::{BridgeConfig, SocketSession, ToolRouter, bootstrap};

fn main() -> anyhow::Result<()> {
    // Anything other than --version is ignored.
    if std::env::args_os().skip(1).any(|a| a == "-v" || a == "--version") {
        println!("{}", nvim_mcp_server::VERSION_STRING);
        return Ok(());
    }

    // Initialize tracing to stderr so it does not interfere with MCP stdio.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BridgeConfig::from_env()?;
    tracing::info!(socket = %config.socket_path.display(), "resolved configuration");

    let mut session = SocketSession::connect(&config.socket_path)
        .context("cannot reach Neovim")?;
    if let Some(plugin) = &config.plugin_path {
        bootstrap::try_load_plugin(&mut session, plugin);
    }

    let mut router = ToolRouter::new(session);
    nvim_mcp_server::run_mcp_server(&mut router)
}
