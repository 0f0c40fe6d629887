use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown expression operator code: {0}")]
    UnknownOperatorCode(u8),

    #[error("invalid URI: {0}")]
    InvalidUri(String),
}
