use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::FieldKind;

/// The six archive operations, numbered as on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum Operation {
    Retrieve = 1,
    Query = 2,
    Count = 3,
    Store = 4,
    Update = 5,
    Delete = 6,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Self::Retrieve,
        Self::Query,
        Self::Count,
        Self::Store,
        Self::Update,
        Self::Delete,
    ];

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    pub const fn code(self) -> u16 {
        self as u16
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Query => "query",
            Self::Count => "count",
            Self::Store => "store",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn descriptor(self) -> &'static OperationDescriptor {
        &DESCRIPTORS[usize::from(self.code()) - 1]
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transport-level exchange shape of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Send, then acknowledge.
    Submit,
    /// Send, then one response.
    Request,
    /// Send, acknowledge, then one response.
    Invoke,
    /// Send, acknowledge, any number of updates, then one response.
    Progress,
}

impl InteractionKind {
    pub const fn has_ack(self) -> bool {
        !matches!(self, Self::Request)
    }

    pub const fn has_response(self) -> bool {
        !matches!(self, Self::Submit)
    }

    pub const fn has_updates(self) -> bool {
        matches!(self, Self::Progress)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Request => "request",
            Self::Invoke => "invoke",
            Self::Progress => "progress",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything that distinguishes one operation from another.
#[derive(Debug, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub operation: Operation,
    pub kind: InteractionKind,
    pub request: &'static [FieldKind],
    /// Empty unless `kind` is progress.
    pub update: &'static [FieldKind],
    /// Empty when `kind` has no response.
    pub response: &'static [FieldKind],
}

const QUERY_TUPLE: &[FieldKind] = &[
    FieldKind::ObjectType,
    FieldKind::IdentifierList,
    FieldKind::ArchiveDetailsList,
    FieldKind::ElementList,
];

/// Descriptor table, indexed by operation code minus one.
pub static DESCRIPTORS: [OperationDescriptor; 6] = [
    OperationDescriptor {
        operation: Operation::Retrieve,
        kind: InteractionKind::Invoke,
        request: &[FieldKind::ObjectType, FieldKind::IdentifierList, FieldKind::LongList],
        update: &[],
        response: &[FieldKind::ArchiveDetailsList, FieldKind::ElementList],
    },
    OperationDescriptor {
        operation: Operation::Query,
        kind: InteractionKind::Progress,
        request: &[
            FieldKind::Boolean,
            FieldKind::ObjectType,
            FieldKind::ArchiveQueryList,
            FieldKind::QueryFilterList,
        ],
        update: QUERY_TUPLE,
        response: QUERY_TUPLE,
    },
    OperationDescriptor {
        operation: Operation::Count,
        kind: InteractionKind::Invoke,
        request: &[FieldKind::ObjectType, FieldKind::ArchiveQueryList, FieldKind::QueryFilterList],
        update: &[],
        response: &[FieldKind::LongList],
    },
    OperationDescriptor {
        operation: Operation::Store,
        kind: InteractionKind::Request,
        request: &[
            FieldKind::Boolean,
            FieldKind::ObjectType,
            FieldKind::IdentifierList,
            FieldKind::ArchiveDetailsList,
            FieldKind::ElementList,
        ],
        update: &[],
        response: &[FieldKind::LongList],
    },
    OperationDescriptor {
        operation: Operation::Update,
        kind: InteractionKind::Submit,
        request: &[
            FieldKind::ObjectType,
            FieldKind::IdentifierList,
            FieldKind::ArchiveDetailsList,
            FieldKind::ElementList,
        ],
        update: &[],
        response: &[],
    },
    OperationDescriptor {
        operation: Operation::Delete,
        kind: InteractionKind::Request,
        request: &[FieldKind::ObjectType, FieldKind::IdentifierList, FieldKind::LongList],
        update: &[],
        response: &[FieldKind::LongList],
    },
];
