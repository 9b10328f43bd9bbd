//! Symbol editing tools: replace/insert bodies and rename.
//!
//! Each returns the Lua side's `{ success, detail }` summary.

use serde::Deserialize;

use super::{ParamDefault, ParamSpec, ParamType, ToolDescriptor, parse_args, passthrough};
use crate::envelope::{Envelope, ErrorKind};
use crate::error::BridgeResult;
use crate::rpc::Session;
use crate::rpc::extension::ExtensionCall;

#[derive(Debug, Deserialize)]
pub struct BodyParams {
    pub name_path: String,
    pub relative_path: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameParams {
    pub name_path: String,
    pub relative_path: String,
    pub new_name: String,
}

const NAME_PATH: ParamSpec = ParamSpec {
    name: "name_path",
    ty: ParamType::String,
    description: "Name path of the target symbol, e.g. `MyClass/method`",
    default: ParamDefault::Required,
};

const RELATIVE_PATH: ParamSpec = ParamSpec {
    name: "relative_path",
    ty: ParamType::String,
    description: "The relative path to the file containing the symbol",
    default: ParamDefault::Required,
};

const REPLACE_PARAMS: &[ParamSpec] = &[
    NAME_PATH,
    RELATIVE_PATH,
    ParamSpec {
        name: "body",
        ty: ParamType::String,
        description: "The new body of the symbol, including its signature line",
        default: ParamDefault::Required,
    },
];

const INSERT_PARAMS: &[ParamSpec] = &[
    NAME_PATH,
    RELATIVE_PATH,
    ParamSpec {
        name: "body",
        ty: ParamType::String,
        description: "The code to insert",
        default: ParamDefault::Required,
    },
];

const RENAME_PARAMS: &[ParamSpec] = &[
    NAME_PATH,
    RELATIVE_PATH,
    ParamSpec {
        name: "new_name",
        ty: ParamType::String,
        description: "The new name for the symbol",
        default: ParamDefault::Required,
    },
];

pub fn replace_symbol_body_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "replace_symbol_body",
        description: "Replace the full definition of a symbol with new code.",
        params: REPLACE_PARAMS,
        kind: ErrorKind::Internal,
        handler: replace_symbol_body::<S>,
    }
}

pub fn insert_before_symbol_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "insert_before_symbol",
        description: "Insert code before the beginning of a symbol's definition.",
        params: INSERT_PARAMS,
        kind: ErrorKind::Internal,
        handler: insert_before_symbol::<S>,
    }
}

pub fn insert_after_symbol_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "insert_after_symbol",
        description: "Insert code after the end of a symbol's definition.",
        params: INSERT_PARAMS,
        kind: ErrorKind::Internal,
        handler: insert_after_symbol::<S>,
    }
}

pub fn rename_symbol_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "rename_symbol",
        description: "Rename a symbol across the workspace using the language server.",
        params: RENAME_PARAMS,
        kind: ErrorKind::Internal,
        handler: rename_symbol::<S>,
    }
}

pub fn replace_symbol_body<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let p: BodyParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::ReplaceSymbolBody {
            name_path: p.name_path,
            relative_path: p.relative_path,
            body: p.body,
        },
    )
}

pub fn insert_before_symbol<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let p: BodyParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::InsertBeforeSymbol {
            name_path: p.name_path,
            relative_path: p.relative_path,
            body: p.body,
        },
    )
}

pub fn insert_after_symbol<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let p: BodyParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::InsertAfterSymbol {
            name_path: p.name_path,
            relative_path: p.relative_path,
            body: p.body,
        },
    )
}

pub fn rename_symbol<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let p: RenameParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::RenameSymbol {
            name_path: p.name_path,
            relative_path: p.relative_path,
            new_name: p.new_name,
        },
    )
}
