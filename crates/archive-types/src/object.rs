use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::IdentifierList;

/// Wildcard value for every [`ObjectType`] attribute.
pub const OBJECT_TYPE_WILDCARD: u16 = 0;

/// Four-part schema identifier tagging the kind of an archived object.
///
/// A zero attribute is a wildcard: it matches any value in a query and is
/// refused by store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectType {
    pub area: u16,
    pub service: u16,
    pub version: u8,
    pub number: u16,
}

impl ObjectType {
    pub const fn new(area: u16, service: u16, version: u8, number: u16) -> Self {
        Self {
            area,
            service,
            version,
            number,
        }
    }

    /// An object type matching every kind of object.
    pub const fn wildcard() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Returns `true` if any attribute is the wildcard value.
    pub fn has_wildcard(&self) -> bool {
        self.area == OBJECT_TYPE_WILDCARD
            || self.service == OBJECT_TYPE_WILDCARD
            || u16::from(self.version) == OBJECT_TYPE_WILDCARD
            || self.number == OBJECT_TYPE_WILDCARD
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectType({self})")
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.area, self.service, self.version, self.number
        )
    }
}

/// Domain-scoped instance key of an archived object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub domain: IdentifierList,
    pub inst_id: i64,
}

/// Composite key of an archived object: its type plus its key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    pub object_type: ObjectType,
    pub key: ObjectKey,
}

impl ObjectId {
    pub fn new(object_type: ObjectType, domain: IdentifierList, inst_id: i64) -> Self {
        Self {
            object_type,
            key: ObjectKey { domain, inst_id },
        }
    }
}
