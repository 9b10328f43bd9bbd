//! Diagnostics tool.

use serde::Deserialize;

use super::{ParamDefault, ParamSpec, ParamType, ToolDescriptor, parse_args, passthrough};
use crate::envelope::{Envelope, ErrorKind};
use crate::error::BridgeResult;
use crate::rpc::Session;
use crate::rpc::extension::ExtensionCall;

#[derive(Debug, Deserialize)]
pub struct DiagnosticsParams {
    /// File to report on; empty means every open buffer.
    #[serde(default)]
    pub relative_path: String,
}

const PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "relative_path",
    ty: ParamType::String,
    description: "Optional. The relative path to the file to get diagnostics for. If not \
        provided, diagnostics for all open files will be returned.",
    default: ParamDefault::Str(""),
}];

pub fn diagnostics_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "get_diagnostics",
        description: "Get diagnostics for a given file or all open files in Neovim. Use this tool \
            to get information about errors, warnings, and other diagnostics reported by the \
            language server. Call it after performing edits to check for new issues or to verify \
            that existing issues have been resolved.",
        params: PARAMS,
        kind: ErrorKind::Internal,
        handler: get_diagnostics::<S>,
    }
}

pub fn get_diagnostics<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let params: DiagnosticsParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::GetDiagnostics {
            relative_path: params.relative_path,
        },
    )
}
