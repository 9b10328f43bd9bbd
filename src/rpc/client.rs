//! msgpack-RPC client over Neovim's Unix socket.

use std::io::BufReader;
use std::os::unix::net::UnixStream;
use std::path::Path;

use rmpv::Value;
use tracing::{debug, info, warn};

use super::Session;
use super::codec::{self, Message};
use super::value::to_text;
use crate::error::{BridgeError, BridgeResult, RemoteErrorKind};

/// Error text sent back when Neovim tries to call into the bridge.
const UNHANDLED_REQUEST: &str = "nvim-mcp-server does not handle requests";

/// One connection to a Neovim instance (the address in `$NVIM`).
///
/// The connection is opened once and never re-established: after a
/// transport fault, later calls report their own faults on the same stream.
#[derive(Debug)]
pub struct SocketSession {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
    next_msgid: u32,
}

impl SocketSession {
    /// Connect to the socket at `path`.
    pub fn connect(path: &Path) -> BridgeResult<Self> {
        let stream = UnixStream::connect(path).map_err(|source| BridgeError::Connect {
            path: path.to_path_buf(),
            source,
        })?;
        let writer = stream.try_clone().map_err(|source| BridgeError::Io {
            context: "failed to clone Neovim socket",
            source,
        })?;
        info!(socket = %path.display(), "connected to Neovim");
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            next_msgid: 0,
        })
    }

    fn alloc_msgid(&mut self) -> u32 {
        let id = self.next_msgid;
        self.next_msgid = self.next_msgid.wrapping_add(1);
        id
    }

    /// Block until the response to `msgid` arrives.
    fn await_response(&mut self, msgid: u32) -> BridgeResult<Value> {
        loop {
            match codec::read_message(&mut self.reader)? {
                Message::Response {
                    msgid: id,
                    error,
                    result,
                } if id == msgid => {
                    return if error.is_nil() {
                        Ok(result)
                    } else {
                        Err(remote_error(&error))
                    };
                }
                Message::Response { msgid: id, .. } => {
                    warn!(expected = msgid, got = id, "discarding stale response");
                }
                Message::Notification { method, .. } => {
                    debug!(method, "ignoring notification from Neovim");
                }
                Message::Request {
                    msgid: id, method, ..
                } => {
                    warn!(method, "rejecting request from Neovim");
                    codec::write_message(
                        &mut self.writer,
                        &Message::Response {
                            msgid: id,
                            error: Value::from(UNHANDLED_REQUEST),
                            result: Value::Nil,
                        },
                    )?;
                }
            }
        }
    }
}

impl Session for SocketSession {
    fn call_api(&mut self, function: &str, args: Vec<Value>) -> BridgeResult<Value> {
        let msgid = self.alloc_msgid();
        debug!(msgid, function, "sending request");
        codec::write_message(
            &mut self.writer,
            &Message::Request {
                msgid,
                method: function.to_owned(),
                params: args,
            },
        )?;
        let result = self.await_response(msgid);
        if let Err(e) = &result {
            debug!(msgid, function, error = %e, "request failed");
        }
        result
    }
}

/// Neovim reports failures as `[type, message]`.
fn remote_error(error: &Value) -> BridgeError {
    if let Some([code, message]) = error.as_array().map(Vec::as_slice) {
        if let (Some(code), Some(message)) = (code.as_i64(), message.as_str()) {
            return BridgeError::Remote {
                kind: RemoteErrorKind::from_code(code),
                message: message.to_owned(),
            };
        }
    }
    BridgeError::Remote {
        kind: RemoteErrorKind::Unknown,
        message: to_text(error),
    }
}
