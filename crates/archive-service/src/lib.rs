//! Archive service facade.
//!
//! Runs archive providers and one-shot archive consumers over any
//! [`archive_protocol::Transport`]. Consumers validate store and update
//! requests before anything is sent, drive the interaction pattern of their
//! operation, and always close their channel. Providers serve one operation
//! endpoint for a bounded period through an [`ArchiveHandler`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use archive_service::{ArchiveService, LoopbackTransport, ServiceConfig};
//! use archive_protocol::DeleteRequest;
//! use archive_types::{Identifier, ObjectType};
//!
//! # async fn run() -> archive_protocol::ArchiveResult<()> {
//! let service = ArchiveService::new(ServiceConfig::default(), Arc::new(LoopbackTransport::new()))?;
//! let deleted = service
//!     .launch_delete_consumer(DeleteRequest {
//!         object_type: ObjectType::new(4, 2, 1, 3),
//!         domain: vec![Identifier::new("esa")],
//!         inst_ids: vec![1, 2],
//!     })
//!     .await?;
//! # let _ = deleted;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod consumer;
pub mod driver;
pub mod loopback;
pub mod provider;
pub mod service;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ServiceConfig;
pub use consumer::ArchiveConsumer;
pub use driver::{call, exchange, Exchange, Outcome};
pub use loopback::LoopbackTransport;
pub use provider::{ArchiveHandler, Dispatcher, QueryOutcome};
pub use service::{ArchiveService, RunningProvider};
pub use validation::{validate_store, validate_update};
