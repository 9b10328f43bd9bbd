//! Error types for the nvim-mcp-server crate.

use std::path::PathBuf;

/// Faults raised while talking to Neovim or handling tool arguments.
///
/// Every variant maps to a stable [`type_tag`](BridgeError::type_tag) that
/// the normalizer embeds in the caller-visible error string.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// `$NVIM` is not set, so there is no editor to connect to.
    #[error("${var} environment variable is not set")]
    MissingSocket { var: &'static str },

    /// Connecting to the Neovim socket failed.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neovim closed the connection while a call was outstanding.
    #[error("connection to Neovim closed")]
    ConnectionClosed,

    /// Reading or writing the socket failed.
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A msgpack-RPC frame could not be encoded or decoded.
    #[error("{0}")]
    Protocol(String),

    /// Neovim executed the call and reported an error.
    #[error("{message}")]
    Remote { kind: RemoteErrorKind, message: String },

    /// The remote value does not have the shape the caller declared.
    #[error("{function} returned {found}, expected {expected}")]
    Shape {
        function: &'static str,
        expected: &'static str,
        found: String,
    },

    /// Tool arguments did not match the tool's parameter schema.
    #[error("{0}")]
    InvalidArguments(#[from] serde_json::Error),
}

/// The error class Neovim attaches to a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Exception,
    Validation,
    Unknown,
}

impl RemoteErrorKind {
    /// Map Neovim's numeric error type.
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Exception,
            1 => Self::Validation,
            _ => Self::Unknown,
        }
    }
}

impl BridgeError {
    /// Short name of the fault class, e.g. `NvimError`.
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::MissingSocket { .. } | Self::Connect { .. } | Self::ConnectionClosed => {
                "ConnectionError"
            }
            Self::Io { .. } => "IoError",
            Self::Protocol(_) => "ProtocolError",
            Self::Remote { .. } => "NvimError",
            Self::Shape { .. } => "ShapeError",
            Self::InvalidArguments(_) => "InvalidArguments",
        }
    }
}

/// Convenience result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_displays_bare_message() {
        let err = BridgeError::Remote {
            kind: RemoteErrorKind::Exception,
            message: "E492: Not an editor command: foo".to_owned(),
        };
        assert_eq!(err.to_string(), "E492: Not an editor command: foo");
        assert_eq!(err.type_tag(), "NvimError");
    }

    #[test]
    fn connection_faults_share_a_tag() {
        assert_eq!(BridgeError::ConnectionClosed.type_tag(), "ConnectionError");
        assert_eq!(
            BridgeError::MissingSocket { var: "NVIM" }.to_string(),
            "$NVIM environment variable is not set"
        );
    }

    #[test]
    fn remote_error_kind_codes() {
        assert_eq!(RemoteErrorKind::from_code(0), RemoteErrorKind::Exception);
        assert_eq!(RemoteErrorKind::from_code(1), RemoteErrorKind::Validation);
        assert_eq!(RemoteErrorKind::from_code(7), RemoteErrorKind::Unknown);
    }
}
