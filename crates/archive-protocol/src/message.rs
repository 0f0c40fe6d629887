use std::fmt;

use archive_types::short_form::com;
use serde::{Deserialize, Serialize};

use crate::operation::Operation;

pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Application error code carried by a failure reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Operation-specific invalid request.
    Invalid,
    /// Store found an object that already exists.
    Duplicate,
    Other(u32),
}

impl ErrorCode {
    pub const INVALID: u32 = 70000;
    pub const DUPLICATE: u32 = 70001;

    pub fn from_code(code: u32) -> Self {
        match code {
            Self::INVALID => Self::Invalid,
            Self::DUPLICATE => Self::Duplicate,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Invalid => Self::INVALID,
            Self::Duplicate => Self::DUPLICATE,
            Self::Other(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Duplicate => "DUPLICATE",
            Self::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Application failure signalled by a provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub code: ErrorCode,
    pub message: String,
}

impl Fault {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Invalid, message)
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Duplicate, message)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Position of a reply within an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Ack,
    Update,
    Response,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => f.write_str("ack"),
            Self::Update => f.write_str("update"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// One message from provider to consumer.
///
/// An ack carries an empty body. A failed reply ends the interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub stage: Stage,
    pub body: Result<Vec<u8>, Fault>,
}

impl Reply {
    pub fn ack() -> Self {
        Self {
            stage: Stage::Ack,
            body: Ok(Vec::new()),
        }
    }

    pub fn update(body: Vec<u8>) -> Self {
        Self {
            stage: Stage::Update,
            body: Ok(body),
        }
    }

    pub fn response(body: Vec<u8>) -> Self {
        Self {
            stage: Stage::Response,
            body: Ok(body),
        }
    }

    pub fn failure(stage: Stage, fault: Fault) -> Self {
        Self {
            stage,
            body: Err(fault),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.body.is_err()
    }
}

/// Routing header sent with every interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceHeader {
    pub area: u16,
    pub service: u16,
    pub version: u8,
    pub operation: u16,
}

impl ServiceHeader {
    /// Header of an archive service operation.
    pub fn archive(operation: Operation) -> Self {
        Self {
            area: com::AREA,
            service: com::ARCHIVE_SERVICE,
            version: com::VERSION,
            operation: operation.code(),
        }
    }
}

impl fmt::Display for ServiceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}/op{}",
            self.area, self.service, self.version, self.operation
        )
    }
}
