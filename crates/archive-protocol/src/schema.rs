use std::fmt;

use archive_types::{
    ArchiveDetailsList, ArchiveQueryList, ElementList, IdentifierList, LongList, ObjectType,
    QueryFilterList,
};

use crate::codec::{PayloadDecoder, PayloadEncoder};
use crate::error::{ArchiveError, ArchiveResult};
use crate::registry::TypeRegistry;

/// Type of one positional field of an operation payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Boolean,
    ObjectType,
    IdentifierList,
    LongList,
    ArchiveDetailsList,
    ArchiveQueryList,
    /// Abstract, nullable.
    ElementList,
    /// Abstract, nullable.
    QueryFilterList,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A decoded or to-be-encoded field value.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    Boolean(bool),
    ObjectType(ObjectType),
    IdentifierList(IdentifierList),
    LongList(LongList),
    ArchiveDetailsList(ArchiveDetailsList),
    ArchiveQueryList(ArchiveQueryList),
    ElementList(Option<ElementList>),
    QueryFilterList(Option<QueryFilterList>),
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Boolean(_) => FieldKind::Boolean,
            Self::ObjectType(_) => FieldKind::ObjectType,
            Self::IdentifierList(_) => FieldKind::IdentifierList,
            Self::LongList(_) => FieldKind::LongList,
            Self::ArchiveDetailsList(_) => FieldKind::ArchiveDetailsList,
            Self::ArchiveQueryList(_) => FieldKind::ArchiveQueryList,
            Self::ElementList(_) => FieldKind::ElementList,
            Self::QueryFilterList(_) => FieldKind::QueryFilterList,
        }
    }

    pub fn encode(&self, encoder: &mut PayloadEncoder) -> ArchiveResult<()> {
        match self {
            Self::Boolean(v) => encoder.encode(v),
            Self::ObjectType(v) => encoder.encode(v),
            Self::IdentifierList(v) => encoder.encode(v),
            Self::LongList(v) => encoder.encode(v),
            Self::ArchiveDetailsList(v) => encoder.encode(v),
            Self::ArchiveQueryList(v) => encoder.encode(v),
            Self::ElementList(v) => encoder.encode_abstract(v.as_ref()),
            Self::QueryFilterList(v) => encoder.encode_abstract(v.as_ref()),
        }
    }

    pub fn decode(
        kind: FieldKind,
        decoder: &mut PayloadDecoder<'_>,
        types: &TypeRegistry,
    ) -> ArchiveResult<Self> {
        Ok(match kind {
            FieldKind::Boolean => Self::Boolean(decoder.decode()?),
            FieldKind::ObjectType => Self::ObjectType(decoder.decode()?),
            FieldKind::IdentifierList => Self::IdentifierList(decoder.decode()?),
            FieldKind::LongList => Self::LongList(decoder.decode()?),
            FieldKind::ArchiveDetailsList => Self::ArchiveDetailsList(decoder.decode()?),
            FieldKind::ArchiveQueryList => Self::ArchiveQueryList(decoder.decode()?),
            FieldKind::ElementList => Self::ElementList(decoder.decode_abstract(&types.elements)?),
            FieldKind::QueryFilterList => {
                Self::QueryFilterList(decoder.decode_abstract(&types.filters)?)
            }
        })
    }
}

/// Encode `fields` after checking them against `schema`, position by position.
pub fn encode_fields(
    schema: &[FieldKind],
    fields: &[Field],
    capacity: usize,
) -> ArchiveResult<Vec<u8>> {
    if schema.len() != fields.len() {
        return Err(ArchiveError::Encode(format!(
            "schema has {} fields, got {}",
            schema.len(),
            fields.len()
        )));
    }
    let mut encoder = PayloadEncoder::with_capacity(capacity);
    for (i, (kind, field)) in schema.iter().zip(fields).enumerate() {
        if field.kind() != *kind {
            return Err(ArchiveError::Encode(format!(
                "field {i}: expected {kind}, got {}",
                field.kind()
            )));
        }
        field.encode(&mut encoder)?;
    }
    encoder.finish()
}

/// Decode a whole payload following `schema`; trailing bytes are an error.
pub fn decode_fields(
    schema: &[FieldKind],
    body: &[u8],
    types: &TypeRegistry,
) -> ArchiveResult<Vec<Field>> {
    let mut decoder = PayloadDecoder::new(body);
    let fields = schema
        .iter()
        .map(|kind| Field::decode(*kind, &mut decoder, types))
        .collect::<ArchiveResult<Vec<_>>>()?;
    decoder.finish()?;
    Ok(fields)
}

/// Takes decoded fields back out, in order and by type.
pub struct FieldReader {
    fields: std::vec::IntoIter<Field>,
}

macro_rules! take_field {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&mut self) -> ArchiveResult<$ty> {
            match self.fields.next() {
                Some(Field::$variant(value)) => Ok(value),
                Some(other) => Err(ArchiveError::Decode(format!(
                    "expected {}, found {}",
                    FieldKind::$variant,
                    other.kind()
                ))),
                None => Err(ArchiveError::Decode(format!(
                    "missing {} field",
                    FieldKind::$variant
                ))),
            }
        }
    };
}

impl FieldReader {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields: fields.into_iter(),
        }
    }

    take_field!(boolean, Boolean, bool);
    take_field!(object_type, ObjectType, ObjectType);
    take_field!(identifier_list, IdentifierList, IdentifierList);
    take_field!(long_list, LongList, LongList);
    take_field!(archive_details_list, ArchiveDetailsList, ArchiveDetailsList);
    take_field!(archive_query_list, ArchiveQueryList, ArchiveQueryList);
    take_field!(element_list, ElementList, Option<ElementList>);
    take_field!(query_filter_list, QueryFilterList, Option<QueryFilterList>);

    /// Fail if any field was left unread.
    pub fn finish(mut self) -> ArchiveResult<()> {
        match self.fields.next() {
            None => Ok(()),
            Some(extra) => Err(ArchiveError::Decode(format!(
                "unexpected extra {} field",
                extra.kind()
            ))),
        }
    }
}
