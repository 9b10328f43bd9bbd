//! Process configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{BridgeError, BridgeResult};

/// Environment variable Neovim sets to its RPC socket in child processes.
pub const SOCKET_ENV: &str = "NVIM";

/// Companion Lua script loaded into Neovim at startup.
pub const PLUGIN_FILE: &str = "nvim-mcp-server.lua";

/// Resolved startup configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Neovim's msgpack-RPC socket.
    pub socket_path: PathBuf,
    /// Lua script defining the `NvimMcpServer` table. `None` when the
    /// executable's own path is unknown; bootstrap is then skipped.
    pub plugin_path: Option<PathBuf>,
}

impl BridgeConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> BridgeResult<Self> {
        let exe = std::env::current_exe()
            .inspect_err(|e| warn!(error = %e, "cannot locate executable, skipping bootstrap"))
            .ok();
        Self::from_lookup(|key| std::env::var_os(key), exe.as_deref())
    }

    /// Build configuration from an environment lookup and the executable path.
    ///
    /// Fails when `$NVIM` is unset or empty. Nothing else is fatal.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<OsString>,
        exe: Option<&Path>,
    ) -> BridgeResult<Self> {
        let socket_path = lookup(SOCKET_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(BridgeError::MissingSocket { var: SOCKET_ENV })?;
        Ok(Self {
            socket_path,
            plugin_path: exe.map(plugin_path),
        })
    }
}

/// `<exe>/../../../plugin/nvim-mcp-server.lua`
///
/// With a cargo build that is the repository root (`target/<profile>/<exe>`).
pub fn plugin_path(exe: &Path) -> PathBuf {
    exe.ancestors()
        .nth(3)
        .unwrap_or_else(|| Path::new(""))
        .join("plugin")
        .join(PLUGIN_FILE)
}
