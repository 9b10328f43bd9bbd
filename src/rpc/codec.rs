//! msgpack-RPC framing.
//!
//! Every frame is a single msgpack array:
//!
//! ```text
//! request       [0, msgid, method, params]
//! response      [1, msgid, error, result]
//! notification  [2, method, params]
//! ```
//!
//! Frames are self-delimiting, so the stream needs no extra length prefix.

use std::io::{ErrorKind, Read, Write};

use rmpv::Value;

use crate::error::{BridgeError, BridgeResult};

const REQUEST: u64 = 0;
const RESPONSE: u64 = 1;
const NOTIFICATION: u64 = 2;

/// A decoded msgpack-RPC frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request {
        msgid: u32,
        method: String,
        params: Vec<Value>,
    },
    Response {
        msgid: u32,
        error: Value,
        result: Value,
    },
    Notification {
        method: String,
        params: Vec<Value>,
    },
}

impl Message {
    /// Build the msgpack array for this frame.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Request {
                msgid,
                method,
                params,
            } => Value::Array(vec![
                Value::from(REQUEST),
                Value::from(*msgid),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
            Self::Response {
                msgid,
                error,
                result,
            } => Value::Array(vec![
                Value::from(RESPONSE),
                Value::from(*msgid),
                error.clone(),
                result.clone(),
            ]),
            Self::Notification { method, params } => Value::Array(vec![
                Value::from(NOTIFICATION),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
        }
    }

    /// Parse a msgpack value into a frame.
    pub fn from_value(value: Value) -> BridgeResult<Self> {
        let Value::Array(items) = value else {
            return Err(malformed("frame is not an array"));
        };
        let mut items = items.into_iter();
        let kind = items
            .next()
            .and_then(|v| v.as_u64())
            .ok_or_else(|| malformed("missing message type"))?;

        match kind {
            REQUEST => {
                let msgid = next_msgid(&mut items)?;
                let method = next_string(&mut items, "request method")?;
                let params = next_params(&mut items)?;
                Ok(Self::Request {
                    msgid,
                    method,
                    params,
                })
            }
            RESPONSE => {
                let msgid = next_msgid(&mut items)?;
                let error = items.next().ok_or_else(|| malformed("response without error slot"))?;
                let result = items.next().ok_or_else(|| malformed("response without result slot"))?;
                Ok(Self::Response {
                    msgid,
                    error,
                    result,
                })
            }
            NOTIFICATION => {
                let method = next_string(&mut items, "notification method")?;
                let params = next_params(&mut items)?;
                Ok(Self::Notification { method, params })
            }
            other => Err(BridgeError::Protocol(format!(
                "malformed msgpack-RPC frame: unknown message type {other}"
            ))),
        }
    }
}

/// Encode and write one frame, flushing the writer.
pub fn write_message(writer: &mut impl Write, message: &Message) -> BridgeResult<()> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &message.to_value())
        .map_err(|e| BridgeError::Protocol(format!("failed to encode request: {e}")))?;
    writer.write_all(&buf).map_err(|source| BridgeError::Io {
        context: "failed to write to Neovim",
        source,
    })?;
    writer.flush().map_err(|source| BridgeError::Io {
        context: "failed to flush Neovim socket",
        source,
    })
}

/// Read and decode one frame. Blocks until a full frame arrives.
pub fn read_message(reader: &mut impl Read) -> BridgeResult<Message> {
    let value = rmpv::decode::read_value(reader).map_err(|e| match e {
        rmpv::decode::Error::InvalidMarkerRead(source)
        | rmpv::decode::Error::InvalidDataRead(source) => {
            if source.kind() == ErrorKind::UnexpectedEof {
                BridgeError::ConnectionClosed
            } else {
                BridgeError::Io {
                    context: "failed to read from Neovim",
                    source,
                }
            }
        }
        other => BridgeError::Protocol(format!("failed to decode response: {other}")),
    })?;
    Message::from_value(value)
}

fn malformed(what: &str) -> BridgeError {
    BridgeError::Protocol(format!("malformed msgpack-RPC frame: {what}"))
}

fn next_msgid(items: &mut impl Iterator<Item = Value>) -> BridgeResult<u32> {
    items
        .next()
        .and_then(|v| v.as_u64())
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| malformed("invalid msgid"))
}

fn next_string(items: &mut impl Iterator<Item = Value>, what: &str) -> BridgeResult<String> {
    items
        .next()
        .and_then(|v| v.as_str().map(str::to_owned))
        .ok_or_else(|| malformed(&format!("{what} is not a string")))
}

fn next_params(items: &mut impl Iterator<Item = Value>) -> BridgeResult<Vec<Value>> {
    match items.next() {
        Some(Value::Array(params)) => Ok(params),
        Some(Value::Nil) | None => Ok(Vec::new()),
        Some(_) => Err(malformed("params is not an array")),
    }
}
