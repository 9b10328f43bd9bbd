//! Language server housekeeping: formatting, restart, client info.

use serde::Deserialize;

use super::{ParamDefault, ParamSpec, ParamType, ToolDescriptor, parse_args, passthrough};
use crate::envelope::{Envelope, ErrorKind};
use crate::error::BridgeResult;
use crate::rpc::Session;
use crate::rpc::extension::ExtensionCall;

#[derive(Debug, Deserialize)]
pub struct FormatParams {
    pub relative_path: String,
}

const FORMAT_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "relative_path",
    ty: ParamType::String,
    description: "The relative path to the file to format",
    default: ParamDefault::Required,
}];

pub fn format_file_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "format_file",
        description: "Format a file using the attached language server.",
        params: FORMAT_PARAMS,
        kind: ErrorKind::Internal,
        handler: format_file::<S>,
    }
}

pub fn restart_language_server_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "restart_language_server",
        description: "Restart the language servers attached in Neovim. Use this when results \
            look stale or the server stopped responding.",
        params: &[],
        kind: ErrorKind::Internal,
        handler: restart_language_server::<S>,
    }
}

pub fn client_info_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "get_lsp_client_info",
        description: "Get information about the language server clients attached in Neovim.",
        params: &[],
        kind: ErrorKind::Internal,
        handler: get_lsp_client_info::<S>,
    }
}

pub fn format_file<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let params: FormatParams = parse_args(arguments)?;
    passthrough(
        session,
        &ExtensionCall::Format {
            relative_path: params.relative_path,
        },
    )
}

pub fn restart_language_server<S: Session>(
    session: &mut S,
    _arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    passthrough(session, &ExtensionCall::RestartLanguageServer)
}

pub fn get_lsp_client_info<S: Session>(
    session: &mut S,
    _arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    passthrough(session, &ExtensionCall::GetLspClientInfo)
}
