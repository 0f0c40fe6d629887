use thiserror::Error;

use crate::message::ErrorCode;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: code={code}, message={message}")]
    Protocol { code: ErrorCode, message: String },

    #[error("validation error: {0}")]
    Validation(#[from] StoreViolation),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(u16),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ArchiveError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The remote error code, for protocol failures.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Precondition violations detected before a store or update is sent.
///
/// Messages are fixed; the fields locate the offending entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreViolation {
    #[error("IdentifierList, ArchiveDetailsList and ElementList must have the same size")]
    ListSizeMismatch {
        identifiers: usize,
        details: usize,
        elements: usize,
    },

    #[error("ObjectType's attributes must not be equal to '0'")]
    ObjectTypeWildcard,

    #[error("IdentifierList elements must not be equal to '*'")]
    IdentifierWildcard { index: usize },

    #[error("ArchiveDetailsList elements must not be equal to '0', '*' or NULL")]
    ArchiveDetailsValue { index: usize, field: &'static str },
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
