use archive_protocol::{StoreRequest, StoreViolation, UpdateRequest};
use archive_types::{ArchiveDetailsList, ElementList, IdentifierList};

/// Preconditions of a store call, checked before anything is sent.
///
/// Checks run in order: list sizes, object type, identifiers, archive details.
pub fn validate_store(request: &StoreRequest) -> Result<(), StoreViolation> {
    check_sizes(&request.domain, &request.details, &request.elements)?;

    if request.object_type.has_wildcard() {
        return Err(StoreViolation::ObjectTypeWildcard);
    }

    if let Some(index) = request.domain.iter().position(|id| id.is_wildcard()) {
        return Err(StoreViolation::IdentifierWildcard { index });
    }

    check_details(&request.details)
}

/// Preconditions of an update call: list sizes and archive details.
pub fn validate_update(request: &UpdateRequest) -> Result<(), StoreViolation> {
    check_sizes(&request.domain, &request.details, &request.elements)?;
    check_details(&request.details)
}

fn check_sizes(
    domain: &IdentifierList,
    details: &ArchiveDetailsList,
    elements: &ElementList,
) -> Result<(), StoreViolation> {
    let (identifiers, details, elements) = (domain.len(), details.len(), elements.len());
    if identifiers != details || details != elements {
        return Err(StoreViolation::ListSizeMismatch {
            identifiers,
            details,
            elements,
        });
    }
    Ok(())
}

fn check_details(details: &ArchiveDetailsList) -> Result<(), StoreViolation> {
    for (index, entry) in details.iter().enumerate() {
        if let Some(field) = entry.forbidden_field() {
            return Err(StoreViolation::ArchiveDetailsValue { index, field });
        }
    }
    Ok(())
}
