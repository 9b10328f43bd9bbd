//! Tool router — the registry of MCP tools backed by Neovim.
//!
//! Each tool is a [`ToolDescriptor`]: name, description, ordered parameter
//! list, error label and a handler. The router owns the [`Session`] and runs
//! every handler through [`normalize`], so callers always get an
//! [`Envelope`] back and a fault in one call never leaks into the next.

pub mod diagnostics;
pub mod exec;
pub mod lsp;
pub mod refactor;
pub mod symbols;

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::envelope::{Envelope, ErrorKind, normalize};
use crate::error::BridgeResult;
use crate::rpc::extension::ExtensionCall;
use crate::rpc::value::to_json;
use crate::rpc::{Session, Value};
use crate::server::ToolDefinition;

/// JSON Schema type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
}

impl ParamType {
    const fn schema_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

/// Whether a parameter is required, or its default when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    Required,
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

/// One entry of a tool's parameter list.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub description: &'static str,
    pub default: ParamDefault,
}

/// Handler signature: typed session plus the raw argument object.
pub type Handler<S> = fn(&mut S, serde_json::Value) -> BridgeResult<Envelope>;

/// Immutable description of one tool.
pub struct ToolDescriptor<S> {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub kind: ErrorKind,
    pub handler: Handler<S>,
}

impl<S> ToolDescriptor<S> {
    /// MCP `tools/list` entry, with the input schema built from `params`.
    pub fn definition(&self) -> ToolDefinition {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for param in self.params {
            let mut prop = json!({
                "type": param.ty.schema_name(),
                "description": param.description,
            });
            let default = match param.default {
                ParamDefault::Required => {
                    required.push(param.name);
                    None
                }
                ParamDefault::Str(s) => Some(json!(s)),
                ParamDefault::Int(i) => Some(json!(i)),
                ParamDefault::Bool(b) => Some(json!(b)),
            };
            if let (Some(default), Some(obj)) = (default, prop.as_object_mut()) {
                obj.insert("default".to_owned(), default);
            }
            properties.insert(param.name.to_owned(), prop);
        }

        ToolDefinition {
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// The full tool catalog, in `tools/list` order.
pub fn catalog<S: Session>() -> Vec<ToolDescriptor<S>> {
    vec![
        exec::vimscript_tool(),
        exec::lua_tool(),
        diagnostics::diagnostics_tool(),
        symbols::document_symbols_tool(),
        symbols::workspace_symbols_tool(),
        symbols::find_symbol_tool(),
        symbols::find_referencing_symbols_tool(),
        refactor::replace_symbol_body_tool(),
        refactor::insert_before_symbol_tool(),
        refactor::insert_after_symbol_tool(),
        refactor::rename_symbol_tool(),
        lsp::format_file_tool(),
        lsp::restart_language_server_tool(),
        lsp::client_info_tool(),
    ]
}

/// Tool router that dispatches MCP tool calls to Neovim.
pub struct ToolRouter<S: Session> {
    session: S,
    tools: Vec<ToolDescriptor<S>>,
}

impl<S: Session> ToolRouter<S> {
    /// Create a router over `session` with the full catalog.
    pub fn new(session: S) -> Self {
        let tools = catalog();
        debug_assert_eq!(
            tools.iter().map(|t| t.name).collect::<HashSet<_>>().len(),
            tools.len(),
            "tool names must be unique"
        );
        Self { session, tools }
    }

    /// The session shared by every handler.
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// List all available tools with their JSON Schema definitions.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(ToolDescriptor::definition).collect()
    }

    /// Call a tool by name. Never fails: faults come back as [`Envelope::Failure`].
    pub fn call_tool(&mut self, name: &str, arguments: serde_json::Value) -> Envelope {
        debug!(tool = name, "dispatching tool call");

        let Some(tool) = self.tools.iter().find(|t| t.name == name) else {
            return Envelope::Failure(format!("Unknown tool: {name}"));
        };
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };
        normalize(tool.kind, (tool.handler)(&mut self.session, arguments))
    }
}

/// Deserialize a tool's argument object.
pub(crate) fn parse_args<T: DeserializeOwned>(arguments: serde_json::Value) -> BridgeResult<T> {
    Ok(serde_json::from_value(arguments)?)
}

/// Run an extension call and return what Neovim sent back, as-is.
pub(crate) fn passthrough<S: Session>(
    session: &mut S,
    call: &ExtensionCall,
) -> BridgeResult<Envelope> {
    let value = call.invoke(session)?;
    Ok(match value {
        Value::String(s) => Envelope::Text(String::from_utf8_lossy(s.as_bytes()).into_owned()),
        other => Envelope::Structured(to_json(&other)),
    })
}
