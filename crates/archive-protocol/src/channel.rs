use async_trait::async_trait;
use archive_types::Uri;

use crate::error::ArchiveResult;
use crate::message::{Reply, ServiceHeader};
use crate::operation::InteractionKind;

/// Consumer side of one interaction with a provider endpoint.
///
/// `send` returns the first reply of the pattern: the ack for submit, invoke
/// and progress, the response for request. A channel is used by one
/// operation at a time.
#[async_trait]
pub trait Channel: Send {
    fn kind(&self) -> InteractionKind;

    async fn send(&mut self, payload: Vec<u8>) -> ArchiveResult<Reply>;

    /// Next update of a progress interaction, `None` once updates are over.
    async fn next_update(&mut self) -> ArchiveResult<Option<Reply>>;

    /// Terminal response of an invoke or progress interaction.
    async fn response(&mut self) -> ArchiveResult<Reply>;

    /// Release the channel. Idempotent.
    async fn close(&mut self);
}

/// Provider side return path of one interaction.
#[async_trait]
pub trait ReplySink: Send {
    async fn reply(&mut self, reply: Reply) -> ArchiveResult<()>;
}

/// An incoming interaction, as seen by a provider.
pub struct Interaction {
    /// Endpoint of the consumer that opened the interaction.
    pub source: Uri,
    pub header: ServiceHeader,
    pub kind: InteractionKind,
    pub body: Vec<u8>,
    pub replies: Box<dyn ReplySink>,
}

impl std::fmt::Debug for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction")
            .field("source", &self.source)
            .field("header", &self.header)
            .field("kind", &self.kind)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// A bound provider endpoint.
#[async_trait]
pub trait Listener: Send {
    /// Wait for the next interaction; `None` once the listener is closed.
    async fn accept(&mut self) -> Option<Interaction>;

    async fn close(&mut self);
}

/// Opens consumer channels and binds provider endpoints.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a channel from the `consumer` endpoint to `provider`.
    async fn open_channel(
        &self,
        kind: InteractionKind,
        consumer: &Uri,
        provider: &Uri,
        header: ServiceHeader,
    ) -> ArchiveResult<Box<dyn Channel>>;

    async fn bind(&self, uri: &Uri, header: ServiceHeader) -> ArchiveResult<Box<dyn Listener>>;
}
