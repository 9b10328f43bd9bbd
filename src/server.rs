//! MCP Server — stdio transport, JSON-RPC 2.0, newline-delimited.
//!
//! Implements the Model Context Protocol (revision 2025-06-18) server over
//! stdin/stdout. Reads JSON-RPC requests from stdin (one per line),
//! dispatches to the tool router, and writes responses to stdout.
//!
//! Protocol flow:
//! 1. Client sends `initialize` → server responds with capabilities
//! 2. Client sends `notifications/initialized`
//! 3. Client sends `tools/list` → server returns tool definitions
//! 4. Client sends `tools/call` → server executes tool and returns result
//! 5. Client closes stdin → server exits
//!
//! Requests are handled strictly one at a time; a `tools/call` blocks the
//! loop until Neovim answers.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::envelope::Envelope;
use crate::rpc::Session;
use crate::tools::ToolRouter;

/// Maximum size of a single JSON-RPC line (10 MiB).
const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Server name reported in `initialize`.
pub const SERVER_NAME: &str = "nvim-mcp-server";

/// Usage hints sent to the client in `initialize`.
pub const INSTRUCTIONS: &str = "If you see this MCP server, it means your user is using Neovim. \
You can use tools provided by this server to interact with the Neovim instance the user is \
using. This server also provides tools to use some language server protocol features, such as \
getting diagnostics and symbols, formatting code, and renaming symbols.";

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 types
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// MCP protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerInfo {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct ServerCapabilities {
    tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolsCapability {
    list_changed: bool,
}

/// MCP initialize result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitializeResult {
    protocol_version: String,
    capabilities: ServerCapabilities,
    server_info: ServerInfo,
    instructions: String,
}

/// MCP tool definition for tools/list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolsListResult {
    tools: Vec<ToolDefinition>,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

/// MCP content item in tools/call response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// MCP tools/call result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ContentItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![ContentItem {
                content_type: "text".to_owned(),
                text,
            }],
            structured_content: None,
            is_error,
        }
    }
}

impl From<Envelope> for ToolCallResult {
    fn from(envelope: Envelope) -> Self {
        match envelope {
            Envelope::Text(text) => Self::text(text, false),
            Envelope::Failure(text) => Self::text(text, true),
            Envelope::Structured(value) => {
                let text =
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                let mut result = Self::text(text, false);
                // structuredContent must be an object.
                if value.is_object() {
                    result.structured_content = Some(value);
                }
                result
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Server main loop
// ---------------------------------------------------------------------------

/// Run the MCP server on stdin/stdout until stdin is closed.
///
/// # Errors
///
/// Returns an error if stdin/stdout I/O fails fatally.
pub fn run_mcp_server<S: Session>(router: &mut ToolRouter<S>) -> Result<()> {
    info!(tools = router.list_tools().len(), "nvim-mcp-server starting");

    let stdin = std::io::stdin();
    let mut reader = std::io::BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();
    serve(router, &mut reader, &mut stdout)?;

    info!("nvim-mcp-server stopped");
    Ok(())
}

/// Serve JSON-RPC requests from `reader`, writing responses to `writer`.
///
/// Returns when `reader` reaches EOF.
pub fn serve<S: Session>(
    router: &mut ToolRouter<S>,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> Result<()> {
    let mut line_buf = String::new();

    loop {
        line_buf.clear();
        let bytes_read = match read_line_limited(reader, &mut line_buf, MAX_LINE_BYTES) {
            Ok(n) => n,
            Err(LineError::TooLong) => {
                warn!(max = MAX_LINE_BYTES, "discarding oversized request");
                let resp = error_response(
                    None,
                    -32600,
                    &format!("invalid request: line exceeds maximum size ({MAX_LINE_BYTES} bytes)"),
                );
                write_response(writer, &resp)?;
                continue;
            }
            Err(LineError::Io(e)) => return Err(e).context("failed to read from stdin"),
        };

        // EOF — client closed stdin, clean exit.
        if bytes_read == 0 {
            info!("stdin closed, shutting down");
            break;
        }

        let trimmed = line_buf.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!(raw = trimmed, "received request");

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC request");
                let resp = error_response(None, -32700, &format!("parse error: {e}"));
                write_response(writer, &resp)?;
                continue;
            }
        };

        // JSON-RPC 2.0: "jsonrpc" MUST be exactly "2.0".
        if request.jsonrpc != "2.0" {
            warn!(
                version = request.jsonrpc,
                "invalid JSON-RPC version (expected \"2.0\")"
            );
            let resp = error_response(
                request.id.clone(),
                -32600,
                &format!(
                    "invalid request: jsonrpc version must be \"2.0\", got \"{}\"",
                    request.jsonrpc
                ),
            );
            write_response(writer, &resp)?;
            continue;
        }

        let is_notification = request.id.is_none();
        let response = dispatch(router, &request);

        // Notifications MUST NOT receive a response.
        if is_notification {
            debug!(method = request.method, "notification handled (no response)");
            continue;
        }

        if let Some(resp) = response {
            write_response(writer, &resp)?;
        }
    }

    Ok(())
}

/// Dispatch a JSON-RPC request to the appropriate handler.
fn dispatch<S: Session>(
    router: &mut ToolRouter<S>,
    req: &JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => Some(handle_initialize(req)),
        "notifications/initialized" => {
            info!("client initialized");
            None
        }
        "tools/list" => Some(handle_tools_list(router, req)),
        "tools/call" => Some(handle_tools_call(router, req)),
        "ping" => Some(handle_ping(req)),
        _ => {
            warn!(method = req.method, "unknown method");
            Some(error_response(
                req.id.clone(),
                -32601,
                &format!("method not found: {}", req.method),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_initialize(req: &JsonRpcRequest) -> JsonRpcResponse {
    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_owned(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability {
                list_changed: false,
            },
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        },
        instructions: INSTRUCTIONS.to_owned(),
    };

    success_response(req.id.clone(), &result)
}

fn handle_tools_list<S: Session>(router: &ToolRouter<S>, req: &JsonRpcRequest) -> JsonRpcResponse {
    let result = ToolsListResult {
        tools: router.list_tools(),
    };
    success_response(req.id.clone(), &result)
}

fn handle_tools_call<S: Session>(
    router: &mut ToolRouter<S>,
    req: &JsonRpcRequest,
) -> JsonRpcResponse {
    let params: ToolCallParams = match serde_json::from_value(req.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return error_response(
                req.id.clone(),
                -32602,
                &format!("invalid tools/call params: {e}"),
            );
        }
    };

    let envelope = router.call_tool(&params.name, params.arguments);
    if let Envelope::Failure(text) = &envelope {
        error!(tool = params.name, error = text, "tool call failed");
    }
    success_response(req.id.clone(), &ToolCallResult::from(envelope))
}

fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
    success_response(req.id.clone(), &serde_json::json!({}))
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn success_response(id: Option<serde_json::Value>, result: &impl Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse {
            jsonrpc: "2.0".to_owned(),
            id,
            result: Some(v),
            error: None,
        },
        Err(e) => {
            error!(error = %e, "failed to serialize success response");
            error_response(
                id,
                -32603,
                &format!("internal error: failed to serialize result: {e}"),
            )
        }
    }
}

fn error_response(id: Option<serde_json::Value>, code: i64, message: &str) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_owned(),
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_owned(),
            data: None,
        }),
    }
}

/// Write a JSON-RPC response as a single line.
fn write_response(out: &mut impl Write, resp: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(resp).context("failed to serialize response")?;
    debug!(response = json, "sending response");
    out.write_all(json.as_bytes())
        .context("failed to write to stdout")?;
    out.write_all(b"\n")
        .context("failed to write newline to stdout")?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

#[derive(Debug)]
enum LineError {
    TooLong,
    Io(std::io::Error),
}

/// Read a line from `reader` into `buf`, stopping at newline or `max_bytes`.
///
/// Returns the number of bytes read (0 = EOF). If the line exceeds
/// `max_bytes`, the rest of it is consumed and discarded.
fn read_line_limited(
    reader: &mut impl BufRead,
    buf: &mut String,
    max_bytes: usize,
) -> Result<usize, LineError> {
    let mut bytes = Vec::new();
    loop {
        let available = reader.fill_buf().map_err(LineError::Io)?;
        if available.is_empty() {
            break;
        }
        let (consumed, found_newline) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        if bytes.len() + consumed > max_bytes {
            reader.consume(consumed);
            if !found_newline {
                skip_line(reader).map_err(LineError::Io)?;
            }
            return Err(LineError::TooLong);
        }
        bytes.extend_from_slice(&available[..consumed]);
        reader.consume(consumed);
        if found_newline {
            break;
        }
    }
    // Decode once so multi-byte characters split across reads survive.
    buf.push_str(&String::from_utf8_lossy(&bytes));
    Ok(bytes.len())
}

/// Consume input up to and including the next newline (or EOF).
fn skip_line(reader: &mut impl BufRead) -> std::io::Result<()> {
    loop {
        let rest = reader.fill_buf()?;
        if rest.is_empty() {
            return Ok(());
        }
        if let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let n = rest.len();
        reader.consume(n);
    }
}
