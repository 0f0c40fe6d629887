use archive_types::ShortForm;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ArchiveError, ArchiveResult};
use crate::message::MAX_MESSAGE_SIZE;
use crate::registry::AbstractRegistry;

/// Default initial capacity of an encode buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// A value whose concrete type is carried on the wire.
pub trait AbstractValue {
    fn short_form(&self) -> ShortForm;

    /// Encode the body only; the tag is written by the encoder.
    fn encode_body(&self, encoder: &mut PayloadEncoder) -> ArchiveResult<()>;
}

/// Appends values to a payload in call order.
///
/// Layout of an abstract value: `[presence: bool][tag: u64][body]`, a null
/// value being a single `false`.
pub struct PayloadEncoder {
    buf: Vec<u8>,
}

impl PayloadEncoder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> ArchiveResult<()> {
        bincode::serialize_into(&mut self.buf, value)
            .map_err(|e| ArchiveError::Encode(e.to_string()))
    }

    pub fn encode_abstract<T: AbstractValue>(&mut self, value: Option<&T>) -> ArchiveResult<()> {
        match value {
            None => self.encode(&false),
            Some(value) => {
                self.encode(&true)?;
                self.encode(&value.short_form().raw())?;
                value.encode_body(self)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the payload, refusing oversized messages.
    pub fn finish(self) -> ArchiveResult<Vec<u8>> {
        if self.buf.len() > MAX_MESSAGE_SIZE {
            return Err(ArchiveError::Encode(format!(
                "message too large: {} bytes (max {})",
                self.buf.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        Ok(self.buf)
    }
}

impl Default for PayloadEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads values from a payload in the order they were encoded.
pub struct PayloadDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PayloadDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Decode the next value. Length prefixes are bounded by the bytes left
    /// in the payload, so a corrupt prefix fails instead of allocating.
    pub fn decode<T: DeserializeOwned>(&mut self) -> ArchiveResult<T> {
        if self.data.len() > MAX_MESSAGE_SIZE {
            return Err(ArchiveError::Decode(format!(
                "message too large: {} bytes (max {})",
                self.data.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        let mut rest = &self.data[self.pos..];
        let before = rest.len();
        let value = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(before as u64)
            .deserialize_from(&mut rest)
            .map_err(|e| ArchiveError::Decode(format!("at byte {}: {e}", self.pos)))?;
        self.pos += before - rest.len();
        Ok(value)
    }

    /// Decode a nullable abstract value, picking the decoder by its tag.
    pub fn decode_abstract<T>(&mut self, registry: &AbstractRegistry<T>) -> ArchiveResult<Option<T>> {
        let present: bool = self.decode()?;
        if !present {
            return Ok(None);
        }
        let tag = ShortForm::from_raw(self.decode()?);
        registry.decode(tag, self).map(Some)
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check that the whole payload was consumed.
    pub fn finish(self) -> ArchiveResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ArchiveError::Decode(format!("{n} trailing bytes"))),
        }
    }
}
