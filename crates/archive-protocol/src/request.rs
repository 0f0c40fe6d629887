use archive_types::{
    ArchiveDetailsList, ArchiveQueryList, ElementList, IdentifierList, LongList, ObjectType,
    QueryFilterList,
};
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};
use crate::operation::Operation;
use crate::registry::TypeRegistry;
use crate::schema::{decode_fields, encode_fields, Field, FieldKind, FieldReader};

/// A typed value that travels as a positional list of fields.
pub trait FieldSet: Sized {
    fn into_fields(self) -> Vec<Field>;

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self>;
}

/// The request payload of one operation, tied to its response type.
pub trait OperationRequest: FieldSet {
    const OPERATION: Operation;

    type Response: FieldSet;
}

impl FieldSet for LongList {
    fn into_fields(self) -> Vec<Field> {
        vec![Field::LongList(self)]
    }

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self> {
        reader.long_list()
    }
}

impl FieldSet for () {
    fn into_fields(self) -> Vec<Field> {
        Vec::new()
    }

    fn from_fields(_reader: &mut FieldReader) -> ArchiveResult<Self> {
        Ok(())
    }
}

fn required_elements(elements: Option<ElementList>) -> ArchiveResult<ElementList> {
    elements.ok_or_else(|| ArchiveError::Decode("element list must not be null".into()))
}

// ---------------------------------------------------------------------------
// Retrieve
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub object_type: ObjectType,
    pub domain: IdentifierList,
    pub inst_ids: LongList,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub details: ArchiveDetailsList,
    pub elements: Option<ElementList>,
}

impl FieldSet for RetrieveRequest {
    fn into_fields(self) -> Vec<Field> {
        vec![
            Field::ObjectType(self.object_type),
            Field::IdentifierList(self.domain),
            Field::LongList(self.inst_ids),
        ]
    }

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self> {
        Ok(Self {
            object_type: reader.object_type()?,
            domain: reader.identifier_list()?,
            inst_ids: reader.long_list()?,
        })
    }
}

impl FieldSet for RetrieveResponse {
    fn into_fields(self) -> Vec<Field> {
        vec![
            Field::ArchiveDetailsList(self.details),
            Field::ElementList(self.elements),
        ]
    }

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self> {
        Ok(Self {
            details: reader.archive_details_list()?,
            elements: reader.element_list()?,
        })
    }
}

impl OperationRequest for RetrieveRequest {
    const OPERATION: Operation = Operation::Retrieve;
    type Response = RetrieveResponse;
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Ask the provider to include object bodies.
    pub return_body: bool,
    pub object_type: ObjectType,
    pub queries: ArchiveQueryList,
    pub filters: Option<QueryFilterList>,
}

/// One batch of query results: an update or the terminal response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryBatch {
    pub object_type: ObjectType,
    pub domain: IdentifierList,
    pub details: ArchiveDetailsList,
    /// `None` when bodies were not requested.
    pub elements: Option<ElementList>,
}

impl QueryBatch {
    /// A batch carrying no objects.
    pub fn empty(object_type: ObjectType) -> Self {
        Self {
            object_type,
            domain: Vec::new(),
            details: Vec::new(),
            elements: None,
        }
    }
}

impl FieldSet for QueryRequest {
    fn into_fields(self) -> Vec<Field> {
        vec![
            Field::Boolean(self.return_body),
            Field::ObjectType(self.object_type),
            Field::ArchiveQueryList(self.queries),
            Field::QueryFilterList(self.filters),
        ]
    }

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self> {
        Ok(Self {
            return_body: reader.boolean()?,
            object_type: reader.object_type()?,
            queries: reader.archive_query_list()?,
            filters: reader.query_filter_list()?,
        })
    }
}

impl FieldSet for QueryBatch {
    fn into_fields(self) -> Vec<Field> {
        vec![
            Field::ObjectType(self.object_type),
            Field::IdentifierList(self.domain),
            Field::ArchiveDetailsList(self.details),
            Field::ElementList(self.elements),
        ]
    }

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self> {
        Ok(Self {
            object_type: reader.object_type()?,
            domain: reader.identifier_list()?,
            details: reader.archive_details_list()?,
            elements: reader.element_list()?,
        })
    }
}

impl OperationRequest for QueryRequest {
    const OPERATION: Operation = Operation::Query;
    type Response = QueryBatch;
}

// ---------------------------------------------------------------------------
// Count
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountRequest {
    pub object_type: ObjectType,
    pub queries: ArchiveQueryList,
    pub filters: Option<QueryFilterList>,
}

impl FieldSet for CountRequest {
    fn into_fields(self) -> Vec<Field> {
        vec![
            Field::ObjectType(self.object_type),
            Field::ArchiveQueryList(self.queries),
            Field::QueryFilterList(self.filters),
        ]
    }

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self> {
        Ok(Self {
            object_type: reader.object_type()?,
            queries: reader.archive_query_list()?,
            filters: reader.query_filter_list()?,
        })
    }
}

impl OperationRequest for CountRequest {
    const OPERATION: Operation = Operation::Count;
    type Response = LongList;
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreRequest {
    /// Ask the provider to return the assigned instance ids.
    pub return_ids: bool,
    pub object_type: ObjectType,
    pub domain: IdentifierList,
    pub details: ArchiveDetailsList,
    pub elements: ElementList,
}

impl FieldSet for StoreRequest {
    fn into_fields(self) -> Vec<Field> {
        vec![
            Field::Boolean(self.return_ids),
            Field::ObjectType(self.object_type),
            Field::IdentifierList(self.domain),
            Field::ArchiveDetailsList(self.details),
            Field::ElementList(Some(self.elements)),
        ]
    }

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self> {
        Ok(Self {
            return_ids: reader.boolean()?,
            object_type: reader.object_type()?,
            domain: reader.identifier_list()?,
            details: reader.archive_details_list()?,
            elements: required_elements(reader.element_list()?)?,
        })
    }
}

impl OperationRequest for StoreRequest {
    const OPERATION: Operation = Operation::Store;
    type Response = LongList;
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub object_type: ObjectType,
    pub domain: IdentifierList,
    pub details: ArchiveDetailsList,
    pub elements: ElementList,
}

impl FieldSet for UpdateRequest {
    fn into_fields(self) -> Vec<Field> {
        vec![
            Field::ObjectType(self.object_type),
            Field::IdentifierList(self.domain),
            Field::ArchiveDetailsList(self.details),
            Field::ElementList(Some(self.elements)),
        ]
    }

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self> {
        Ok(Self {
            object_type: reader.object_type()?,
            domain: reader.identifier_list()?,
            details: reader.archive_details_list()?,
            elements: required_elements(reader.element_list()?)?,
        })
    }
}

impl OperationRequest for UpdateRequest {
    const OPERATION: Operation = Operation::Update;
    type Response = ();
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub object_type: ObjectType,
    pub domain: IdentifierList,
    pub inst_ids: LongList,
}

impl FieldSet for DeleteRequest {
    fn into_fields(self) -> Vec<Field> {
        vec![
            Field::ObjectType(self.object_type),
            Field::IdentifierList(self.domain),
            Field::LongList(self.inst_ids),
        ]
    }

    fn from_fields(reader: &mut FieldReader) -> ArchiveResult<Self> {
        Ok(Self {
            object_type: reader.object_type()?,
            domain: reader.identifier_list()?,
            inst_ids: reader.long_list()?,
        })
    }
}

impl OperationRequest for DeleteRequest {
    const OPERATION: Operation = Operation::Delete;
    type Response = LongList;
}

/// Encode a typed field set against `schema`.
pub fn encode_set<T: FieldSet>(
    schema: &[FieldKind],
    value: T,
    capacity: usize,
) -> ArchiveResult<Vec<u8>> {
    encode_fields(schema, &value.into_fields(), capacity)
}

/// Decode a whole payload into a typed field set.
pub fn decode_set<T: FieldSet>(
    schema: &[FieldKind],
    body: &[u8],
    types: &TypeRegistry,
) -> ArchiveResult<T> {
    let mut reader = FieldReader::new(decode_fields(schema, body, types)?);
    let value = T::from_fields(&mut reader)?;
    reader.finish()?;
    Ok(value)
}
