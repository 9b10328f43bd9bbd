//! Symbol tools — overviews and lookups backed by the language server.
//!
//! All four return whatever the Lua side produces (a table of symbols or a
//! message string); faults are labelled `INTERNAL ERROR`.

use serde::Deserialize;

use super::{ParamDefault, ParamSpec, ParamType, ToolDescriptor, parse_args, passthrough};
use crate::envelope::{Envelope, ErrorKind};
use crate::error::BridgeResult;
use crate::rpc::Session;
use crate::rpc::extension::ExtensionCall;

const RELATIVE_PATH_DESC: &str = "The relative path to the file";

#[derive(Debug, Deserialize)]
pub struct DocumentSymbolsParams {
    pub relative_path: String,
    /// How many levels of children to include (0 = top level only).
    #[serde(default)]
    pub depth: u32,
}

#[derive(Debug, Deserialize)]
pub struct WorkspaceSymbolsParams {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub include_external: bool,
}

#[derive(Debug, Deserialize)]
pub struct FindSymbolParams {
    pub name_path_pattern: String,
    #[serde(default)]
    pub relative_path: String,
    #[serde(default)]
    pub depth: u32,
}

#[derive(Debug, Deserialize)]
pub struct ReferencesParams {
    pub name_path: String,
    pub relative_path: String,
}

const DOCUMENT_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "relative_path",
        ty: ParamType::String,
        description: "The relative path to the file to get the overview of",
        default: ParamDefault::Required,
    },
    ParamSpec {
        name: "depth",
        ty: ParamType::Integer,
        description: "Depth of children to include (0 = top-level symbols only)",
        default: ParamDefault::Int(0),
    },
];

const WORKSPACE_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "query",
        ty: ParamType::String,
        description: "The query string to search for in the workspace symbols. If no query is \
            provided, all symbols in the workspace will be returned.",
        default: ParamDefault::Str(""),
    },
    ParamSpec {
        name: "include_external",
        ty: ParamType::Boolean,
        description: "Include symbols from libraries outside the current working directory",
        default: ParamDefault::Bool(false),
    },
];

const FIND_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "name_path_pattern",
        ty: ParamType::String,
        description: "Name path of the symbol, e.g. `MyClass/method`; a single name matches at \
            any nesting level",
        default: ParamDefault::Required,
    },
    ParamSpec {
        name: "relative_path",
        ty: ParamType::String,
        description: "Restrict the search to this file; empty searches all open files",
        default: ParamDefault::Str(""),
    },
    ParamSpec {
        name: "depth",
        ty: ParamType::Integer,
        description: "Depth of children to include for each match",
        default: ParamDefault::Int(0),
    },
];

const REFERENCES_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "name_path",
        ty: ParamType::String,
        description: "Name path of the symbol whose references to find",
        default: ParamDefault::Required,
    },
    ParamSpec {
        name: "relative_path",
        ty: ParamType::String,
        description: RELATIVE_PATH_DESC,
        default: ParamDefault::Required,
    },
];

pub fn document_symbols_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "get_document_symbols",
        description: "Get a high-level understanding of the code symbols in a file. This should \
            be the first tool to call when you want to understand a new file, unless you already \
            know what you are looking for.",
        params: DOCUMENT_PARAMS,
        kind: ErrorKind::Internal,
        handler: get_document_symbols::<S>,
    }
}

pub fn workspace_symbols_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "get_workspace_symbols",
        description: "Search for symbols across the entire workspace. Useful when learning the \
            overall structure of the codebase or when looking for a symbol without knowing where \
            it is defined.",
        params: WORKSPACE_PARAMS,
        kind: ErrorKind::Internal,
        handler: get_workspace_symbols::<S>,
    }
}

pub fn find_symbol_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "find_symbol",
        description: "Find symbols matching a name path pattern, optionally restricted to one \
            file, including their children up to `depth`.",
        params: FIND_PARAMS,
        kind: ErrorKind::Internal,
        handler: find_symbol::<S>,
    }
}

pub fn find_referencing_symbols_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "find_referencing_symbols",
        description: "Find the symbols that reference the given symbol.",
        params: REFERENCES_PARAMS,
        kind: ErrorKind::Internal,
        handler: find_referencing_symbols::<S>,
    }
}

pub fn get_document_symbols<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let params: DocumentSymbolsParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::GetDocumentSymbols {
            relative_path: params.relative_path,
            depth: params.depth,
        },
    )
}

pub fn get_workspace_symbols<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let params: WorkspaceSymbolsParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::GetWorkspaceSymbols {
            query: params.query,
            include_external: params.include_external,
        },
    )
}

pub fn find_symbol<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let params: FindSymbolParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::FindSymbol {
            name_path_pattern: params.name_path_pattern,
            relative_path: params.relative_path,
            depth: params.depth,
        },
    )
}

pub fn find_referencing_symbols<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let params: ReferencesParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::FindReferencingSymbols {
            name_path: params.name_path,
            relative_path: params.relative_path,
        },
    )
}
