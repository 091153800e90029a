use crate::amount::Amount;
use crate::rpc::types::DaemonResponseError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("daemon connection failure: {0}")]
    Connection(#[from] ConnectionError),

    #[error("daemon error: {0}")]
    Daemon(#[from] DaemonError),

    #[error(transparent)]
    ResponseParse(#[from] ResponseParseError),

    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("insufficient transaction inputs: need {required}, wallet inputs cover {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("unsupported by node: {0}")]
    Capability(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    /// JSON-RPC error code reported by the daemon, if this error carries one.
    pub fn daemon_code(&self) -> Option<i64> {
        match self {
            Self::Daemon(DaemonError::Response(err)) => Some(err.code),
            _ => None,
        }
    }
}

/// The HTTP exchange with the daemon could not complete.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("HTTP transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("daemon reply is not JSON (HTTP {status}): {reason}")]
    NotJson { status: u16, reason: String },
}

/// The daemon answered, but the answer is an error or cannot be trusted.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error(transparent)]
    Response(DaemonResponseError),

    #[error("response does not belong to sent request (sent id `{sent}`, got {received})")]
    IdMismatch { sent: String, received: String },

    #[error("no result received for `{method}`")]
    MissingResult { method: String },

    #[error("`{method}` answered with HTTP status {status}")]
    HttpStatus { method: String, status: u16 },
}

/// A daemon result did not have the shape its parser requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{context}: bad/unexpected value for \"{field}\", expected {expected}, got {got}")]
pub struct ResponseParseError {
    pub context: String,
    pub field: String,
    pub expected: &'static str,
    pub got: &'static str,
}
