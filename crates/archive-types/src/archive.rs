use serde::{Deserialize, Serialize};

use crate::identifier::{Identifier, IdentifierList, Uri};
use crate::object::ObjectId;
use crate::temporal::FineTime;

/// Links from an archived object to other objects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDetails {
    /// Instance id of a related object, if any.
    pub related: Option<i64>,
    /// The object that caused this one to be created.
    pub source: Option<ObjectId>,
}

/// Per-object bookkeeping metadata kept alongside the archived body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDetails {
    /// Instance id; `0` asks the provider to assign one on store.
    pub inst_id: i64,
    pub details: ObjectDetails,
    /// Network zone the object was created in.
    pub network: Option<Identifier>,
    /// Creation or update time.
    pub timestamp: Option<FineTime>,
    /// Provider that created the object.
    pub provider: Option<Uri>,
}

pub type ArchiveDetailsList = Vec<ArchiveDetails>;

impl ArchiveDetails {
    pub fn new(inst_id: i64, network: Identifier, timestamp: FineTime, provider: Uri) -> Self {
        Self {
            inst_id,
            details: ObjectDetails::default(),
            network: Some(network),
            timestamp: Some(timestamp),
            provider: Some(provider),
        }
    }

    /// Name of the first field holding a null, zero or wildcard value.
    pub fn forbidden_field(&self) -> Option<&'static str> {
        match &self.network {
            None => return Some("network"),
            Some(network) if network.is_zero_or_wildcard() => return Some("network"),
            Some(_) => {}
        }
        match self.timestamp {
            None => return Some("timestamp"),
            Some(timestamp) if timestamp.is_zero() => return Some("timestamp"),
            Some(_) => {}
        }
        match &self.provider {
            None => Some("provider"),
            Some(provider) if provider.is_zero_or_wildcard() => Some("provider"),
            Some(_) => None,
        }
    }
}

/// Selection criteria of a query or count call.
///
/// `None` fields and a zero `related` are wildcards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveQuery {
    pub domain: Option<IdentifierList>,
    pub network: Option<Identifier>,
    pub provider: Option<Uri>,
    pub related: i64,
    pub source: Option<ObjectId>,
    pub start_time: Option<FineTime>,
    pub end_time: Option<FineTime>,
    /// `Some(true)` for ascending order on `sort_field_name`.
    pub sort_order: Option<bool>,
    pub sort_field_name: Option<String>,
}

pub type ArchiveQueryList = Vec<ArchiveQuery>;

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ArchiveDetails {
        ArchiveDetails::new(
            0,
            Identifier::new("ground"),
            FineTime::from_nanos(1_000),
            Uri::new("maltcp://127.0.0.1:12400/providerStore"),
        )
    }

    #[test]
    fn valid_details_have_no_forbidden_field() {
        assert_eq!(valid().forbidden_field(), None);
    }

    #[test]
    fn null_network_is_forbidden() {
        let mut d = valid();
        d.network = None;
        assert_eq!(d.forbidden_field(), Some("network"));
    }

    #[test]
    fn wildcard_and_zero_network_are_forbidden() {
        let mut d = valid();
        d.network = Some(Identifier::wildcard());
        assert_eq!(d.forbidden_field(), Some("network"));
        d.network = Some(Identifier::new("0"));
        assert_eq!(d.forbidden_field(), Some("network"));
    }

    #[test]
    fn zero_timestamp_is_forbidden() {
        let mut d = valid();
        d.timestamp = Some(FineTime::zero());
        assert_eq!(d.forbidden_field(), Some("timestamp"));
        d.timestamp = None;
        assert_eq!(d.forbidden_field(), Some("timestamp"));
    }

    #[test]
    fn wildcard_provider_is_forbidden() {
        let mut d = valid();
        d.provider = Some(Uri::new("*"));
        assert_eq!(d.forbidden_field(), Some("provider"));
        d.provider = None;
        assert_eq!(d.forbidden_field(), Some("provider"));
    }

    #[test]
    fn zero_inst_id_is_allowed() {
        // the provider assigns ids for zero
        assert_eq!(valid().inst_id, 0);
        assert!(valid().forbidden_field().is_none());
    }

    #[test]
    fn default_query_is_wildcard() {
        let q = ArchiveQuery::default();
        assert!(q.domain.is_none());
        assert_eq!(q.related, 0);
    }
}
