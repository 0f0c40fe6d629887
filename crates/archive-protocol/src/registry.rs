use std::collections::HashMap;
use std::fmt;

use archive_types::{ElementList, QueryFilterList, ShortForm};

use crate::codec::{AbstractValue, PayloadDecoder, PayloadEncoder};
use crate::error::{ArchiveError, ArchiveResult};

/// Decodes the body of one concrete type of an abstract family.
pub type AbstractDecoder<T> = fn(&mut PayloadDecoder<'_>) -> ArchiveResult<T>;

/// Decoders of an abstract family, indexed by wire type tag.
pub struct AbstractRegistry<T> {
    decoders: HashMap<ShortForm, AbstractDecoder<T>>,
}

impl<T> AbstractRegistry<T> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register a decoder, returning the one it replaces.
    pub fn register(
        &mut self,
        tag: ShortForm,
        decoder: AbstractDecoder<T>,
    ) -> Option<AbstractDecoder<T>> {
        self.decoders.insert(tag, decoder)
    }

    pub fn contains(&self, tag: ShortForm) -> bool {
        self.decoders.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn decode(&self, tag: ShortForm, decoder: &mut PayloadDecoder<'_>) -> ArchiveResult<T> {
        let decode = self
            .decoders
            .get(&tag)
            .ok_or_else(|| ArchiveError::Decode(format!("unknown type tag {tag}")))?;
        decode(decoder)
    }
}

impl<T> Default for AbstractRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for AbstractRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&ShortForm> = self.decoders.keys().collect();
        tags.sort();
        f.debug_struct("AbstractRegistry").field("tags", &tags).finish()
    }
}

impl AbstractRegistry<ElementList> {
    /// Registry of the built-in element list types.
    pub fn elements() -> Self {
        let mut registry = Self::new();
        registry.register(ElementList::BLOB, |d| Ok(ElementList::Blob(d.decode()?)));
        registry.register(ElementList::BOOLEAN, |d| Ok(ElementList::Boolean(d.decode()?)));
        registry.register(ElementList::DOUBLE, |d| Ok(ElementList::Double(d.decode()?)));
        registry.register(ElementList::IDENTIFIER, |d| {
            Ok(ElementList::Identifier(d.decode()?))
        });
        registry.register(ElementList::LONG, |d| Ok(ElementList::Long(d.decode()?)));
        registry.register(ElementList::STRING, |d| Ok(ElementList::String(d.decode()?)));
        registry.register(ElementList::FINE_TIME, |d| {
            Ok(ElementList::FineTime(d.decode()?))
        });
        registry.register(ElementList::URI, |d| Ok(ElementList::Uri(d.decode()?)));
        registry
    }
}

impl AbstractRegistry<QueryFilterList> {
    /// Registry of the built-in query filter list types.
    pub fn filters() -> Self {
        let mut registry = Self::new();
        registry.register(QueryFilterList::COMPOSITE_FILTER_SET, |d| {
            Ok(QueryFilterList::CompositeFilterSet(d.decode()?))
        });
        registry
    }
}

/// Every abstract family a payload may contain.
#[derive(Debug)]
pub struct TypeRegistry {
    pub elements: AbstractRegistry<ElementList>,
    pub filters: AbstractRegistry<QueryFilterList>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self {
            elements: AbstractRegistry::elements(),
            filters: AbstractRegistry::filters(),
        }
    }
}

impl AbstractValue for ElementList {
    fn short_form(&self) -> ShortForm {
        ElementList::short_form(self)
    }

    fn encode_body(&self, encoder: &mut PayloadEncoder) -> ArchiveResult<()> {
        match self {
            Self::Blob(v) => encoder.encode(v),
            Self::Boolean(v) => encoder.encode(v),
            Self::Double(v) => encoder.encode(v),
            Self::Identifier(v) => encoder.encode(v),
            Self::Long(v) => encoder.encode(v),
            Self::String(v) => encoder.encode(v),
            Self::FineTime(v) => encoder.encode(v),
            Self::Uri(v) => encoder.encode(v),
        }
    }
}

impl AbstractValue for QueryFilterList {
    fn short_form(&self) -> ShortForm {
        QueryFilterList::short_form(self)
    }

    fn encode_body(&self, encoder: &mut PayloadEncoder) -> ArchiveResult<()> {
        match self {
            Self::CompositeFilterSet(sets) => encoder.encode(sets),
        }
    }
}
