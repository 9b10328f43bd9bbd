//! Shared test doubles.

#![allow(dead_code)]

use nvim_mcp_server::error::{BridgeError, BridgeResult, RemoteErrorKind};
use nvim_mcp_server::rpc::{Session, Value};

/// One recorded API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function: String,
    pub args: Vec<Value>,
}

type Responder = Box<dyn FnMut(&str, &[Value]) -> BridgeResult<Value>>;

/// In-memory stand-in for Neovim that records every call.
pub struct FakeSession {
    pub calls: Vec<Call>,
    responder: Responder,
}

impl FakeSession {
    pub fn new(responder: impl FnMut(&str, &[Value]) -> BridgeResult<Value> + 'static) -> Self {
        Self {
            calls: Vec::new(),
            responder: Box::new(responder),
        }
    }

    /// A fake that evaluates a handful of Lua snippets the way Neovim would,
    /// with the `NvimMcpServer` table loaded and answering `extension_reply`.
    pub fn lua(extension_reply: Value) -> Self {
        Self::new(move |function, args| {
            let code = args.first().and_then(Value::as_str).unwrap_or_default();
            match (function, code) {
                ("nvim_exec_lua", "return 1+1") => Ok(Value::from(2)),
                ("nvim_exec_lua", "return 'hi'") => Ok(Value::from("hi")),
                ("nvim_exec_lua", "local x = 1") => Ok(Value::Nil),
                ("nvim_exec_lua", c) if c.starts_with("return NvimMcpServer.") => {
                    Ok(extension_reply.clone())
                }
                ("nvim_exec_lua", _) => Err(remote(
                    "[string \"<nvim>\"]:1: unexpected symbol near '<eof>'",
                )),
                ("nvim_exec2", _) => Ok(Value::Map(vec![(
                    Value::from("output"),
                    Value::from("hello from vimscript"),
                )])),
                _ => Err(remote("Invalid method")),
            }
        })
    }

    /// A fake where the companion script never loaded.
    pub fn without_extension() -> Self {
        Self::new(|function, args| {
            let code = args.first().and_then(Value::as_str).unwrap_or_default();
            if function == "nvim_exec_lua" && code.starts_with("return NvimMcpServer.") {
                Err(remote(
                    "[string \"<nvim>\"]:1: attempt to index a nil value (global 'NvimMcpServer')",
                ))
            } else if code == "return 1+1" {
                Ok(Value::from(2))
            } else {
                Ok(Value::Nil)
            }
        })
    }
}

impl Session for FakeSession {
    fn call_api(&mut self, function: &str, args: Vec<Value>) -> BridgeResult<Value> {
        let reply = (self.responder)(function, &args);
        self.calls.push(Call {
            function: function.to_owned(),
            args,
        });
        reply
    }
}

pub fn remote(message: &str) -> BridgeError {
    BridgeError::Remote {
        kind: RemoteErrorKind::Exception,
        message: message.to_owned(),
    }
}

/// Summary table as the Lua refactoring functions return it.
pub fn summary(success: bool, detail: &str) -> Value {
    Value::Map(vec![
        (Value::from("success"), Value::from(success)),
        (Value::from("detail"), Value::from(detail)),
    ])
}
