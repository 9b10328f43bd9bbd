//! RPC session with the Neovim instance.
//!
//! [`Session`] is the seam between tool handlers and the editor. The
//! production implementation is [`SocketSession`]; tests substitute their own.
//!
//! All three call shapes bottom out in Neovim API requests:
//!
//! ```text
//! call_api("nvim_exec2", ..)            → nvim_exec2(..)
//! call_extension("Ns", "f", args)       → nvim_exec_lua("return Ns.f(...)", args)
//! execute_script(code)                  → nvim_exec_lua(code, [])
//! ```

pub mod client;
pub mod codec;
pub mod extension;
pub mod value;

pub use client::SocketSession;
pub use rmpv::Value;

use crate::error::BridgeResult;

/// Result of running a Lua chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptOutcome {
    /// The chunk returned a value.
    Value(Value),
    /// The chunk returned nothing (or `nil`).
    NoValue,
}

impl From<Value> for ScriptOutcome {
    fn from(value: Value) -> Self {
        if value.is_nil() {
            Self::NoValue
        } else {
            Self::Value(value)
        }
    }
}

/// A synchronous connection to one Neovim instance.
///
/// Calls take `&mut self`: the remote side multiplexes everything over one
/// ordered stream, so only one request may be in flight at a time. A failed
/// call leaves the session usable for the next one.
pub trait Session {
    /// Call a built-in API function such as `nvim_exec2`.
    fn call_api(&mut self, function: &str, args: Vec<Value>) -> BridgeResult<Value>;

    /// Call `namespace.function(...)` in a Lua table loaded into Neovim.
    fn call_extension(
        &mut self,
        namespace: &str,
        function: &str,
        args: Vec<Value>,
    ) -> BridgeResult<Value> {
        let chunk = format!("return {namespace}.{function}(...)");
        self.call_api("nvim_exec_lua", vec![Value::from(chunk), Value::Array(args)])
    }

    /// Execute a Lua chunk. Prefix an expression with `return` to get its value.
    fn execute_script(&mut self, code: &str) -> BridgeResult<ScriptOutcome> {
        self.call_api("nvim_exec_lua", vec![Value::from(code), Value::Array(Vec::new())])
            .map(ScriptOutcome::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records API calls and answers every one with `reply`.
    struct Recorder {
        calls: Vec<(String, Vec<Value>)>,
        reply: Value,
    }

    impl Session for Recorder {
        fn call_api(&mut self, function: &str, args: Vec<Value>) -> BridgeResult<Value> {
            self.calls.push((function.to_owned(), args));
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn extension_calls_go_through_exec_lua() {
        let mut session = Recorder {
            calls: Vec::new(),
            reply: Value::Array(vec![]),
        };
        session
            .call_extension("NvimMcpServer", "get_diagnostics", vec![Value::from("")])
            .expect("call");

        let (function, args) = &session.calls[0];
        assert_eq!(function, "nvim_exec_lua");
        assert_eq!(args[0].as_str(), Some("return NvimMcpServer.get_diagnostics(...)"));
        assert_eq!(args[1], Value::Array(vec![Value::from("")]));
    }

    #[test]
    fn nil_script_result_is_no_value() {
        let mut session = Recorder {
            calls: Vec::new(),
            reply: Value::Nil,
        };
        let outcome = session.execute_script("local x = 1").expect("call");
        assert_eq!(outcome, ScriptOutcome::NoValue);
        assert_eq!(session.calls[0].1[1], Value::Array(vec![]));
    }
}
