use archive_types::Uri;
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};
use crate::operation::Operation;

/// Default endpoint names, one per operation.
pub mod defaults {
    pub const RETRIEVE: &str = "providerRetrieve";
    pub const QUERY: &str = "providerQuery";
    pub const COUNT: &str = "providerCount";
    pub const STORE: &str = "providerStore";
    pub const UPDATE: &str = "providerUpdate";
    pub const DELETE: &str = "providerDelete";
}

/// Endpoint name of each operation under a provider base URI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub retrieve: String,
    pub query: String,
    pub count: String,
    pub store: String,
    pub update: String,
    pub delete: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            retrieve: defaults::RETRIEVE.into(),
            query: defaults::QUERY.into(),
            count: defaults::COUNT.into(),
            store: defaults::STORE.into(),
            update: defaults::UPDATE.into(),
            delete: defaults::DELETE.into(),
        }
    }
}

impl Endpoints {
    pub fn name(&self, operation: Operation) -> &str {
        match operation {
            Operation::Retrieve => &self.retrieve,
            Operation::Query => &self.query,
            Operation::Count => &self.count,
            Operation::Store => &self.store,
            Operation::Update => &self.update,
            Operation::Delete => &self.delete,
        }
    }

    /// Full address of `operation`'s endpoint under `base`.
    pub fn resolve(&self, base: &Uri, operation: Operation) -> Uri {
        base.join(self.name(operation))
    }

    /// Names must be non-empty, single path segments, and distinct.
    pub fn validate(&self) -> ArchiveResult<()> {
        let mut seen: Vec<&str> = Vec::with_capacity(Operation::ALL.len());
        for op in Operation::ALL {
            let name = self.name(op);
            if name.is_empty() {
                return Err(ArchiveError::Config(format!("empty endpoint name for {op}")));
            }
            if name.contains('/') {
                return Err(ArchiveError::Config(format!(
                    "endpoint name for {op} must not contain '/': {name}"
                )));
            }
            if seen.contains(&name) {
                return Err(ArchiveError::Config(format!("duplicate endpoint name: {name}")));
            }
            seen.push(name);
        }
        Ok(())
    }
}
