//! Operation protocol of the archive service.
//!
//! Defines the payload codec, the positional field schema of every operation,
//! the four interaction patterns, and the transport contracts both consumers
//! and providers are written against.
//!
//! Each operation is described by one [`OperationDescriptor`]: its interaction
//! kind and the ordered field kinds of its request, update and response
//! payloads. Drivers and dispatchers read the table instead of hard-coding a
//! sequence per operation.

pub mod channel;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod operation;
pub mod registry;
pub mod request;
pub mod schema;

pub use channel::{Channel, Interaction, Listener, ReplySink, Transport};
pub use codec::{AbstractValue, PayloadDecoder, PayloadEncoder, DEFAULT_BUFFER_CAPACITY};
pub use endpoint::Endpoints;
pub use error::{ArchiveError, ArchiveResult, StoreViolation};
pub use message::{ErrorCode, Fault, Reply, ServiceHeader, Stage, MAX_MESSAGE_SIZE};
pub use operation::{InteractionKind, Operation, OperationDescriptor, DESCRIPTORS};
pub use registry::{AbstractDecoder, AbstractRegistry, TypeRegistry};
pub use request::{
    decode_set, encode_set, CountRequest, DeleteRequest, FieldSet, OperationRequest, QueryBatch,
    QueryRequest, RetrieveRequest, RetrieveResponse, StoreRequest, UpdateRequest,
};
pub use schema::{decode_fields, encode_fields, Field, FieldKind, FieldReader};
