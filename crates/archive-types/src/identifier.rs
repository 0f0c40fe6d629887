use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Wildcard marker accepted by queries and rejected by store.
pub const WILDCARD: &str = "*";

/// A short name: domain component, network zone, or object label.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier(String);

/// Ordered sequence of identifiers (usually a domain).
pub type IdentifierList = Vec<Identifier>;

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn wildcard() -> Self {
        Self(WILDCARD.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }

    /// `true` for the values store and update refuse: `0` and `*`.
    pub fn is_zero_or_wildcard(&self) -> bool {
        self.is_wildcard() || self.0 == "0"
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An endpoint address of the form `scheme://host:port/name`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uri(String);

impl Uri {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse and check the `scheme://authority` shape.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        match value.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => Ok(Self(value.into())),
            _ => Err(TypeError::InvalidUri(value.into())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first path segment after the authority, if any.
    pub fn endpoint_name(&self) -> Option<&str> {
        let (_, rest) = self.0.split_once("://")?;
        rest.split_once('/')
            .map(|(_, path)| path.trim_end_matches('/'))
            .filter(|path| !path.is_empty())
    }

    /// Append `/name` to this URI.
    pub fn join(&self, name: &str) -> Self {
        Self(format!("{}/{}", self.0.trim_end_matches('/'), name))
    }

    pub fn is_zero_or_wildcard(&self) -> bool {
        self.0 == WILDCARD || self.0 == "0"
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uri({})", self.0)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
