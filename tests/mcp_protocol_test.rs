//! MCP protocol and tool dispatch tests against an in-memory Neovim.

mod common;

use std::io::Cursor;

use common::{FakeSession, summary};
use nvim_mcp_server::rpc::Value;
use nvim_mcp_server::server::{self, JsonRpcRequest, JsonRpcResponse};
use nvim_mcp_server::{Envelope, ToolRouter};
use serde_json::json;

fn text(envelope: &Envelope) -> &str {
    match envelope {
        Envelope::Text(t) | Envelope::Failure(t) => t,
        Envelope::Structured(_) => panic!("expected text, got {envelope:?}"),
    }
}

#[test]
fn test_json_rpc_request_parsing() {
    let req: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {"name": "execute_lua", "arguments": {"code": "return 1+1"}}
    }))
    .expect("should parse tools/call request");

    assert_eq!(req.method, "tools/call");
    assert_eq!(req.id, Some(json!(1)));
}

#[test]
fn test_json_rpc_response_serialization() {
    let resp = JsonRpcResponse {
        jsonrpc: "2.0".to_owned(),
        id: Some(json!(1)),
        result: Some(json!({"protocolVersion": "2025-06-18"})),
        error: None,
    };

    let json_str = serde_json::to_string(&resp).expect("should serialize");
    assert!(json_str.contains("2025-06-18"));
    assert!(!json_str.contains("error"));
}

#[test]
fn test_tool_definitions_complete() {
    let router = ToolRouter::new(FakeSession::without_extension());
    let tools = router.list_tools();
    assert_eq!(tools.len(), 14);

    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    for expected in [
        "execute_vimscript",
        "execute_lua",
        "get_diagnostics",
        "get_document_symbols",
        "get_workspace_symbols",
        "find_symbol",
        "find_referencing_symbols",
        "replace_symbol_body",
        "insert_before_symbol",
        "insert_after_symbol",
        "rename_symbol",
        "format_file",
        "restart_language_server",
        "get_lsp_client_info",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }

    for tool in &tools {
        assert!(!tool.description.is_empty(), "tool {} missing description", tool.name);
        assert_eq!(tool.input_schema["type"], "object", "tool {}", tool.name);
    }
}

#[test]
fn test_execute_lua_returns_value() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::Nil));
    let env = router.call_tool("execute_lua", json!({"code": "return 1+1"}));
    assert_eq!(env, Envelope::Text("2".to_owned()));

    let env = router.call_tool("execute_lua", json!({"code": "return 'hi'"}));
    assert_eq!(env, Envelope::Text("hi".to_owned()));
}

#[test]
fn test_execute_lua_without_return_is_nil() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::Nil));
    let env = router.call_tool("execute_lua", json!({"code": "local x = 1"}));
    assert_eq!(env, Envelope::Text("nil".to_owned()));
}

#[test]
fn test_execute_lua_syntax_error() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::Nil));
    let env = router.call_tool("execute_lua", json!({"code": "return 1 +"}));
    assert!(env.is_failure());
    assert_eq!(
        text(&env),
        "Error: NvimError: [string \"<nvim>\"]:1: unexpected symbol near '<eof>'"
    );
}

#[test]
fn test_execute_vimscript_returns_output() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::Nil));
    let env = router.call_tool("execute_vimscript", json!({"code": "echo 'hello'"}));
    assert_eq!(env, Envelope::Text("hello from vimscript".to_owned()));

    let call = &router.session().calls[0];
    assert_eq!(call.function, "nvim_exec2");
    assert_eq!(call.args[0], Value::from("echo 'hello'"));
    assert_eq!(
        call.args[1],
        Value::Map(vec![(Value::from("output"), Value::from(true))])
    );
}

#[test]
fn test_diagnostics_without_extension_is_internal_error() {
    let mut router = ToolRouter::new(FakeSession::without_extension());
    let env = router.call_tool("get_diagnostics", json!({"relative_path": ""}));
    assert!(text(&env).starts_with("INTERNAL ERROR: "));
    assert!(text(&env).contains("NvimError"));
    assert!(text(&env).contains("attempt to index a nil value"));
}

#[test]
fn test_empty_relative_path_is_forwarded() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::Array(vec![])));
    let env = router.call_tool("get_diagnostics", json!({}));
    assert_eq!(env, Envelope::Structured(json!([])));

    let call = &router.session().calls[0];
    assert_eq!(
        call.args[0].as_str(),
        Some("return NvimMcpServer.get_diagnostics(...)")
    );
    assert_eq!(call.args[1], Value::Array(vec![Value::from("")]));
}

#[test]
fn test_symbol_flags_default_to_conservative() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::Array(vec![])));
    router.call_tool("get_workspace_symbols", json!({"query": "Router"}));
    router.call_tool("get_document_symbols", json!({"relative_path": "src/lib.rs"}));

    let calls = &router.session().calls;
    assert_eq!(
        calls[0].args[1],
        Value::Array(vec![Value::from("Router"), Value::from(false)])
    );
    assert_eq!(
        calls[1].args[1],
        Value::Array(vec![Value::from("src/lib.rs"), Value::from(0)])
    );
}

#[test]
fn test_string_reply_is_returned_as_text() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::from("No diagnostics found")));
    let env = router.call_tool("get_diagnostics", json!({"relative_path": "src/main.rs"}));
    assert_eq!(env, Envelope::Text("No diagnostics found".to_owned()));
}

#[test]
fn test_rename_returns_summary() {
    let mut router = ToolRouter::new(FakeSession::lua(summary(true, "renamed 3 occurrences")));
    let env = router.call_tool(
        "rename_symbol",
        json!({"name_path": "Foo/bar", "relative_path": "src/foo.rs", "new_name": "baz"}),
    );
    assert_eq!(
        env,
        Envelope::Structured(json!({"success": true, "detail": "renamed 3 occurrences"}))
    );
    assert_eq!(
        router.session().calls[0].args[0].as_str(),
        Some("return NvimMcpServer.rename_symbol(...)")
    );
}

#[test]
fn test_unexpected_reply_shape_is_internal_error() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::from(42)));
    let env = router.call_tool("format_file", json!({"relative_path": "src/foo.rs"}));
    assert_eq!(
        text(&env),
        concat!(
            "INTERNAL ERROR: ShapeError: format returned integer, ",
            "expected a table with a boolean `success` field"
        )
    );
}

#[test]
fn test_missing_required_argument_is_normalized() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::Nil));
    let env = router.call_tool("rename_symbol", json!({"name_path": "Foo"}));
    assert!(text(&env).starts_with("INTERNAL ERROR: InvalidArguments: missing field"));
    assert!(router.session().calls.is_empty());
}

#[test]
fn test_sequential_calls_share_session_after_fault() {
    let mut router = ToolRouter::new(FakeSession::without_extension());

    let first = router.call_tool("get_diagnostics", json!({}));
    assert!(first.is_failure());

    let second = router.call_tool("execute_lua", json!({"code": "return 1+1"}));
    assert_eq!(second, Envelope::Text("2".to_owned()));

    assert_eq!(router.session().calls.len(), 2);
}

#[test]
fn test_tool_call_unknown() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::Nil));
    let env = router.call_tool("nonexistent_tool", json!({}));
    assert!(env.is_failure());
    assert!(text(&env).contains("Unknown tool"));
    assert!(router.session().calls.is_empty());
}

fn run_lines(
    router: &mut ToolRouter<FakeSession>,
    lines: &[serde_json::Value],
) -> Vec<serde_json::Value> {
    let input: String = lines.iter().map(|l| format!("{l}\n")).collect();
    let mut reader = Cursor::new(input.into_bytes());
    let mut output = Vec::new();
    server::serve(router, &mut reader, &mut output).expect("serve");
    String::from_utf8(output)
        .expect("utf-8 output")
        .lines()
        .map(|l| serde_json::from_str(l).expect("json response"))
        .collect()
}

#[test]
fn test_serve_full_session() {
    let mut router = ToolRouter::new(FakeSession::lua(summary(true, "restarted")));
    let responses = run_lines(
        &mut router,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "execute_lua", "arguments": {"code": "local x = 1"}}}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
                   "params": {"name": "restart_language_server"}}),
            json!({"jsonrpc": "2.0", "id": 5, "method": "ping"}),
        ],
    );

    // The notification gets no reply.
    assert_eq!(responses.len(), 5);

    let init = &responses[0]["result"];
    assert_eq!(init["protocolVersion"], "2025-06-18");
    assert_eq!(init["serverInfo"]["name"], "nvim-mcp-server");
    assert!(init["instructions"].as_str().expect("instructions").contains("Neovim"));

    assert_eq!(responses[1]["result"]["tools"].as_array().map(Vec::len), Some(14));

    let lua = &responses[2]["result"];
    assert_eq!(lua["content"][0]["text"], "nil");
    assert!(lua.get("isError").is_none());

    let restart = &responses[3]["result"];
    assert_eq!(restart["structuredContent"], json!({"success": true, "detail": "restarted"}));

    assert_eq!(responses[4]["id"], 5);
    assert_eq!(responses[4]["result"], json!({}));
}

#[test]
fn test_serve_reports_tool_faults_in_band() {
    let mut router = ToolRouter::new(FakeSession::without_extension());
    let responses = run_lines(
        &mut router,
        &[json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call",
                 "params": {"name": "find_symbol", "arguments": {"name_path_pattern": "main"}}})],
    );

    let result = &responses[0]["result"];
    assert_eq!(result["isError"], true);
    assert!(
        result["content"][0]["text"]
            .as_str()
            .expect("text")
            .starts_with("INTERNAL ERROR: NvimError: ")
    );
}

#[test]
fn test_serve_protocol_errors() {
    let mut router = ToolRouter::new(FakeSession::lua(Value::Nil));
    let input = concat!(
        "not json\n",
        "{\"jsonrpc\":\"1.0\",\"id\":1,\"method\":\"ping\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"resources/list\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"tools/call\",\"params\":{}}\n",
    );
    let mut reader = Cursor::new(input.as_bytes().to_vec());
    let mut output = Vec::new();
    server::serve(&mut router, &mut reader, &mut output).expect("serve");

    let codes: Vec<i64> = String::from_utf8(output)
        .expect("utf-8")
        .lines()
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).expect("json");
            v["error"]["code"].as_i64().expect("error code")
        })
        .collect();
    assert_eq!(codes, vec![-32700, -32600, -32601, -32602]);
}
