//! Data model for the archive service.
//!
//! Every value exchanged by the six archive operations lives here. All types
//! are plain per-call payloads: they derive `serde` traits so the protocol
//! crate can encode them field by field, and none of them holds shared state.
//!
//! # Key Types
//!
//! - [`ObjectType`] — four-part schema identifier of an archived object
//! - [`Identifier`] / [`IdentifierList`] — domain components and names
//! - [`ArchiveDetails`] — per-object bookkeeping metadata
//! - [`ArchiveQuery`] — selection criteria for query and count
//! - [`ElementList`] — polymorphic list of object bodies
//! - [`QueryFilterList`] — polymorphic list of filter predicates
//! - [`ExpressionOperator`] — comparison operator vocabulary
//! - [`ShortForm`] — wire-level type tag

pub mod archive;
pub mod element;
pub mod error;
pub mod filter;
pub mod identifier;
pub mod object;
pub mod operator;
pub mod short_form;
pub mod temporal;

pub use archive::{ArchiveDetails, ArchiveDetailsList, ArchiveQuery, ArchiveQueryList, ObjectDetails};
pub use element::{Attribute, ElementList};
pub use error::TypeError;
pub use filter::{CompositeFilter, CompositeFilterSet, QueryFilterList};
pub use identifier::{Identifier, IdentifierList, Uri, WILDCARD};
pub use object::{ObjectId, ObjectKey, ObjectType, OBJECT_TYPE_WILDCARD};
pub use operator::{translate_operator, ExpressionOperator};
pub use short_form::ShortForm;
pub use temporal::FineTime;

/// Ordered sequence of 64-bit instance identifiers.
pub type LongList = Vec<i64>;
