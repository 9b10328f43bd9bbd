//! One-shot load of the companion Lua script into Neovim.

use std::path::Path;

use rmpv::Value;
use tracing::{info, warn};

use crate::error::BridgeResult;
use crate::rpc::Session;

/// Ask Neovim to `:luafile` the companion script.
///
/// Not retried. A failure is returned for logging only; tools that rely on the
/// script then fail individually at call time.
pub fn load_plugin<S: Session + ?Sized>(session: &mut S, plugin: &Path) -> BridgeResult<()> {
    info!(plugin = %plugin.display(), "loading companion script");
    let command = format!("luafile {}", escape_path(plugin));
    session.call_api("nvim_command", vec![Value::from(command)])?;
    Ok(())
}

/// Load the companion script, logging instead of failing.
pub fn try_load_plugin<S: Session + ?Sized>(session: &mut S, plugin: &Path) -> bool {
    match load_plugin(session, plugin) {
        Ok(()) => true,
        Err(e) => {
            warn!(
                plugin = %plugin.display(),
                error = %e,
                "failed to load companion script, continuing"
            );
            false
        }
    }
}

/// Escape spaces and backslashes for an Ex command argument.
fn escape_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, ' ' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
