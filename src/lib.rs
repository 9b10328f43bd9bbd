//! `nvim-mcp-server` — MCP tools backed by a running Neovim instance.
//!
//! Exposes Neovim over the Model Context Protocol (MCP) on stdio (JSON-RPC
//! 2.0, newline-delimited). Each tool is one msgpack-RPC call into the Neovim
//! session named by `$NVIM`: either a built-in API function or a function of
//! the `NvimMcpServer` Lua table loaded from `plugin/nvim-mcp-server.lua`.
//!
//! # Tools
//!
//! - `execute_vimscript`, `execute_lua` — run code in the editor
//! - `get_diagnostics` — LSP diagnostics for one file or all open buffers
//! - `get_document_symbols`, `get_workspace_symbols`, `find_symbol`,
//!   `find_referencing_symbols` — symbol overviews and lookups
//! - `replace_symbol_body`, `insert_before_symbol`, `insert_after_symbol`,
//!   `rename_symbol` — symbol-level edits
//! - `format_file`, `restart_language_server`, `get_lsp_client_info`
//!
//! # Architecture
//!
//! ```text
//! stdin (JSON-RPC) → server → ToolRouter → handler → Session ⇄ Neovim
//!                                             ↓
//! stdout (JSON-RPC) ←── Envelope ←── normalize (faults → "<kind>: <tag>: <msg>")
//! ```

pub mod bootstrap;
pub mod config;
pub mod envelope;
pub mod error;
pub mod rpc;
pub mod server;
pub mod tools;

pub use config::BridgeConfig;
pub use envelope::{Envelope, ErrorKind};
pub use error::{BridgeError, BridgeResult};
pub use rpc::{Session, SocketSession};
pub use server::run_mcp_server;
pub use tools::ToolRouter;

/// Text printed by `--version`.
pub const VERSION_STRING: &str = concat!("nvim-mcp-server v", env!("CARGO_PKG_VERSION"));
