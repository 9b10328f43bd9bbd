//! The Lua functions the bridge calls inside Neovim.
//!
//! The bootstrap script defines a global `NvimMcpServer` table. Calls into it
//! are listed here with their positional arguments and the shape the bridge
//! accepts back, so a plugin returning something unexpected surfaces as a
//! [`BridgeError::Shape`] instead of flowing through unchecked.

use rmpv::Value;

use super::Session;
use super::value::{map_get, type_name};
use crate::error::{BridgeError, BridgeResult};

/// Lua table holding the extension functions.
pub const NAMESPACE: &str = "NvimMcpServer";

/// Shape of a value returned by an extension function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// A list or table of results, or a message string.
    Listing,
    /// `{ success = bool, detail = ... }`.
    Summary,
    /// Any table.
    Info,
}

impl ReturnShape {
    const fn describe(self) -> &'static str {
        match self {
            Self::Listing => "a table or string",
            Self::Summary => "a table with a boolean `success` field",
            Self::Info => "a table",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Listing => matches!(value, Value::Array(_) | Value::Map(_) | Value::String(_)),
            Self::Summary => matches!(map_get(value, "success"), Some(Value::Boolean(_))),
            Self::Info => value.is_map() || value.as_array().is_some_and(Vec::is_empty),
        }
    }
}

/// One call into the `NvimMcpServer` Lua table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionCall {
    GetDiagnostics {
        relative_path: String,
    },
    GetDocumentSymbols {
        relative_path: String,
        depth: u32,
    },
    GetWorkspaceSymbols {
        query: String,
        include_external: bool,
    },
    FindSymbol {
        name_path_pattern: String,
        relative_path: String,
        depth: u32,
    },
    FindReferencingSymbols {
        name_path: String,
        relative_path: String,
    },
    ReplaceSymbolBody {
        name_path: String,
        relative_path: String,
        body: String,
    },
    InsertBeforeSymbol {
        name_path: String,
        relative_path: String,
        body: String,
    },
    InsertAfterSymbol {
        name_path: String,
        relative_path: String,
        body: String,
    },
    RenameSymbol {
        name_path: String,
        relative_path: String,
        new_name: String,
    },
    Format {
        relative_path: String,
    },
    RestartLanguageServer,
    GetLspClientInfo,
}

impl ExtensionCall {
    /// Name of the Lua function inside [`NAMESPACE`].
    pub const fn function(&self) -> &'static str {
        match self {
            Self::GetDiagnostics { .. } => "get_diagnostics",
            Self::GetDocumentSymbols { .. } => "get_document_symbols",
            Self::GetWorkspaceSymbols { .. } => "get_workspace_symbols",
            Self::FindSymbol { .. } => "find_symbol",
            Self::FindReferencingSymbols { .. } => "find_referencing_symbols",
            Self::ReplaceSymbolBody { .. } => "replace_symbol_body",
            Self::InsertBeforeSymbol { .. } => "insert_before_symbol",
            Self::InsertAfterSymbol { .. } => "insert_after_symbol",
            Self::RenameSymbol { .. } => "rename_symbol",
            Self::Format { .. } => "format",
            Self::RestartLanguageServer => "restart_language_server",
            Self::GetLspClientInfo => "get_lsp_client_info",
        }
    }

    /// Shape the bridge accepts back from this function.
    pub const fn shape(&self) -> ReturnShape {
        match self {
            Self::GetDiagnostics { .. }
            | Self::GetDocumentSymbols { .. }
            | Self::GetWorkspaceSymbols { .. }
            | Self::FindSymbol { .. }
            | Self::FindReferencingSymbols { .. } => ReturnShape::Listing,
            Self::ReplaceSymbolBody { .. }
            | Self::InsertBeforeSymbol { .. }
            | Self::InsertAfterSymbol { .. }
            | Self::RenameSymbol { .. }
            | Self::Format { .. }
            | Self::RestartLanguageServer => ReturnShape::Summary,
            Self::GetLspClientInfo => ReturnShape::Info,
        }
    }

    /// Positional arguments, in the order the Lua function declares them.
    pub fn args(&self) -> Vec<Value> {
        match self {
            Self::GetDiagnostics { relative_path } | Self::Format { relative_path } => {
                vec![Value::from(relative_path.as_str())]
            }
            Self::GetDocumentSymbols {
                relative_path,
                depth,
            } => vec![Value::from(relative_path.as_str()), Value::from(*depth)],
            Self::GetWorkspaceSymbols {
                query,
                include_external,
            } => vec![Value::from(query.as_str()), Value::from(*include_external)],
            Self::FindSymbol {
                name_path_pattern,
                relative_path,
                depth,
            } => vec![
                Value::from(name_path_pattern.as_str()),
                Value::from(relative_path.as_str()),
                Value::from(*depth),
            ],
            Self::FindReferencingSymbols {
                name_path,
                relative_path,
            } => vec![
                Value::from(name_path.as_str()),
                Value::from(relative_path.as_str()),
            ],
            Self::ReplaceSymbolBody {
                name_path,
                relative_path,
                body,
            }
            | Self::InsertBeforeSymbol {
                name_path,
                relative_path,
                body,
            }
            | Self::InsertAfterSymbol {
                name_path,
                relative_path,
                body,
            } => vec![
                Value::from(name_path.as_str()),
                Value::from(relative_path.as_str()),
                Value::from(body.as_str()),
            ],
            Self::RenameSymbol {
                name_path,
                relative_path,
                new_name,
            } => vec![
                Value::from(name_path.as_str()),
                Value::from(relative_path.as_str()),
                Value::from(new_name.as_str()),
            ],
            Self::RestartLanguageServer | Self::GetLspClientInfo => Vec::new(),
        }
    }

    /// Run the call through `session` and check the returned shape.
    pub fn invoke<S: Session + ?Sized>(&self, session: &mut S) -> BridgeResult<Value> {
        let function = self.function();
        let value = session.call_extension(NAMESPACE, function, self.args())?;
        let shape = self.shape();
        if shape.accepts(&value) {
            Ok(value)
        } else {
            Err(BridgeError::Shape {
                function,
                expected: shape.describe(),
                found: type_name(&value).to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_accepts_tables_and_strings() {
        assert!(ReturnShape::Listing.accepts(&Value::Array(vec![])));
        assert!(ReturnShape::Listing.accepts(&Value::from("no diagnostics")));
        assert!(!ReturnShape::Listing.accepts(&Value::Nil));
        assert!(!ReturnShape::Listing.accepts(&Value::from(3)));
    }

    #[test]
    fn summary_requires_boolean_success() {
        let ok = Value::Map(vec![
            (Value::from("success"), Value::from(false)),
            (Value::from("detail"), Value::from("symbol not found")),
        ]);
        let wrong = Value::Map(vec![(Value::from("success"), Value::from("yes"))]);
        assert!(ReturnShape::Summary.accepts(&ok));
        assert!(!ReturnShape::Summary.accepts(&wrong));
        assert!(!ReturnShape::Summary.accepts(&Value::Array(vec![])));
    }

    #[test]
    fn info_accepts_empty_table() {
        // Lua's `{}` is indistinguishable from an empty list on the wire.
        assert!(ReturnShape::Info.accepts(&Value::Array(vec![])));
        assert!(!ReturnShape::Info.accepts(&Value::Array(vec![Value::from(1)])));
    }

    #[test]
    fn empty_relative_path_is_forwarded() {
        let call = ExtensionCall::GetDiagnostics {
            relative_path: String::new(),
        };
        assert_eq!(call.args(), vec![Value::from("")]);
    }

    #[test]
    fn rename_arguments_keep_declared_order() {
        let call = ExtensionCall::RenameSymbol {
            name_path: "Foo/bar".to_owned(),
            relative_path: "src/foo.rs".to_owned(),
            new_name: "baz".to_owned(),
        };
        assert_eq!(call.function(), "rename_symbol");
        assert_eq!(
            call.args(),
            vec![
                Value::from("Foo/bar"),
                Value::from("src/foo.rs"),
                Value::from("baz"),
            ]
        );
    }
}
