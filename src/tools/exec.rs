//! Script tools — run Vimscript or Lua inside Neovim.
//!
//! Both always answer with text. Faults are labelled `Error`.

use serde::Deserialize;

use super::{ParamDefault, ParamSpec, ParamType, ToolDescriptor, parse_args};
use crate::envelope::{Envelope, ErrorKind};
use crate::error::BridgeResult;
use crate::rpc::value::{map_get, to_text};
use crate::rpc::{ScriptOutcome, Session, Value};

/// Text returned when a Lua chunk produces no value.
pub const NO_VALUE: &str = "nil";

#[derive(Debug, Deserialize)]
pub struct CodeParams {
    /// Source to execute.
    pub code: String,
}

const VIMSCRIPT_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "code",
    ty: ParamType::String,
    description: "Vimscript code to execute",
    default: ParamDefault::Required,
}];

const LUA_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "code",
    ty: ParamType::String,
    description: "The Lua code to execute. To evaluate an expression, prefix it with \
        \"return\": `return my_function(...)`",
    default: ParamDefault::Required,
}];

pub fn vimscript_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "execute_vimscript",
        description: "Execute Vimscript code in the Neovim instance and return the output.",
        params: VIMSCRIPT_PARAMS,
        kind: ErrorKind::Script,
        handler: execute_vimscript::<S>,
    }
}

pub fn lua_tool<S: Session>() -> ToolDescriptor<S> {
    ToolDescriptor {
        name: "execute_lua",
        description: "Executes Lua code in the Neovim instance. Arguments are available as `...` \
            inside the chunk. The chunk can return a value; without `return` only statements are \
            executed and the result is `nil`.",
        params: LUA_PARAMS,
        kind: ErrorKind::Script,
        handler: execute_lua::<S>,
    }
}

/// `nvim_exec2(code, { output = true })`, returning the captured output.
pub fn execute_vimscript<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let params: CodeParams = parse_args(arguments)?;
    let opts = Value::Map(vec![(Value::from("output"), Value::from(true))]);
    let result = session.call_api("nvim_exec2", vec![Value::from(params.code), opts])?;
    let output = map_get(&result, "output").map(to_text).unwrap_or_default();
    Ok(Envelope::Text(output))
}

pub fn execute_lua<S: Session>(
    session: &mut S,
    arguments: serde_json::Value,
) -> BridgeResult<Envelope> {
    let params: CodeParams = parse_args(arguments)?;
    let text = match session.execute_script(&params.code)? {
        ScriptOutcome::Value(value) => to_text(&value),
        ScriptOutcome::NoValue => NO_VALUE.to_owned(),
    };
    Ok(Envelope::Text(text))
}
