use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use archive_protocol::{
    ArchiveError, ArchiveResult, Channel, CountRequest, DeleteRequest, Listener, Operation,
    QueryBatch, QueryRequest, RetrieveRequest, RetrieveResponse, ServiceHeader, StoreRequest,
    Transport, TypeRegistry, UpdateRequest,
};
use archive_types::{LongList, Uri};

use crate::config::ServiceConfig;
use crate::consumer::ArchiveConsumer;
use crate::provider::{ArchiveHandler, Dispatcher};
use crate::validation::{validate_store, validate_update};

/// Entry point for running archive providers and one-shot consumers.
///
/// Cheap to clone; clones share configuration, transport and type registry.
#[derive(Clone)]
pub struct ArchiveService {
    config: Arc<ServiceConfig>,
    transport: Arc<dyn Transport>,
    types: Arc<TypeRegistry>,
}

impl ArchiveService {
    pub fn new(config: ServiceConfig, transport: Arc<dyn Transport>) -> ArchiveResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport,
            types: Arc::new(TypeRegistry::default()),
        })
    }

    /// Replace the abstract type registry, e.g. to add element list types.
    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = Arc::new(types);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    // -----------------------------------------------------------------------
    // Provider side
    // -----------------------------------------------------------------------

    /// Bind the endpoint of operation `code` without serving yet.
    pub async fn start_provider(
        &self,
        code: u16,
        handler: Arc<dyn ArchiveHandler>,
    ) -> ArchiveResult<RunningProvider> {
        let operation = Operation::from_code(code).ok_or(ArchiveError::UnknownOperation(code))?;
        let uri = self.config.endpoint_uri(operation);
        let listener = self
            .transport
            .bind(&uri, ServiceHeader::archive(operation))
            .await?;
        tracing::info!(%operation, %uri, "archive provider bound");
        Ok(RunningProvider {
            uri,
            listener: CloseGuard::new(listener),
            dispatcher: Dispatcher::new(
                operation,
                handler,
                Arc::clone(&self.types),
                self.config.buffer_capacity,
            ),
            period: self.config.serving_period(),
        })
    }

    /// Serve operation `code` for the configured serving period, then close
    /// the endpoint. Returns the number of interactions served.
    pub async fn launch_provider(
        &self,
        code: u16,
        handler: Arc<dyn ArchiveHandler>,
    ) -> ArchiveResult<usize> {
        Ok(self.start_provider(code, handler).await?.serve().await)
    }

    // -----------------------------------------------------------------------
    // Consumer side
    // -----------------------------------------------------------------------

    async fn open(&self, operation: Operation) -> ArchiveResult<CloseGuard<Box<dyn Channel>>> {
        let uri = self.config.endpoint_uri(operation);
        tracing::debug!(%operation, %uri, consumer = %self.config.consumer_uri, "opening consumer");
        self.transport
            .open_channel(
                operation.descriptor().kind,
                &self.config.consumer_uri,
                &uri,
                ServiceHeader::archive(operation),
            )
            .await
            .map(CloseGuard::new)
    }

    fn consumer<'a>(
        &'a self,
        channel: &'a mut CloseGuard<Box<dyn Channel>>,
    ) -> ArchiveResult<ArchiveConsumer<'a>> {
        Ok(ArchiveConsumer::new(
            channel.get()?.as_mut(),
            &self.types,
            self.config.buffer_capacity,
        ))
    }

    /// Close `channel`, then hand back the operation's result.
    async fn finish<T>(
        &self,
        operation: Operation,
        mut channel: CloseGuard<Box<dyn Channel>>,
        result: ArchiveResult<T>,
    ) -> ArchiveResult<T> {
        channel.close().await;
        match &result {
            Ok(_) => tracing::debug!(%operation, "consumer finished"),
            Err(error) => tracing::warn!(%operation, %error, "consumer failed"),
        }
        result
    }

    pub async fn launch_retrieve_consumer(
        &self,
        request: RetrieveRequest,
    ) -> ArchiveResult<RetrieveResponse> {
        let mut channel = self.open(Operation::Retrieve).await?;
        let result = async { self.consumer(&mut channel)?.retrieve(request).await }.await;
        self.finish(Operation::Retrieve, channel, result).await
    }

    pub async fn launch_query_consumer(&self, request: QueryRequest) -> ArchiveResult<Vec<QueryBatch>> {
        let mut channel = self.open(Operation::Query).await?;
        let result = async { self.consumer(&mut channel)?.query(request).await }.await;
        self.finish(Operation::Query, channel, result).await
    }

    pub async fn launch_count_consumer(&self, request: CountRequest) -> ArchiveResult<LongList> {
        let mut channel = self.open(Operation::Count).await?;
        let result = async { self.consumer(&mut channel)?.count(request).await }.await;
        self.finish(Operation::Count, channel, result).await
    }

    /// Validation failures are reported before any channel is opened.
    pub async fn launch_store_consumer(&self, request: StoreRequest) -> ArchiveResult<LongList> {
        validate_store(&request)?;
        let mut channel = self.open(Operation::Store).await?;
        let result = async { self.consumer(&mut channel)?.store(request).await }.await;
        self.finish(Operation::Store, channel, result).await
    }

    pub async fn launch_update_consumer(&self, request: UpdateRequest) -> ArchiveResult<()> {
        validate_update(&request)?;
        let mut channel = self.open(Operation::Update).await?;
        let result = async { self.consumer(&mut channel)?.update(request).await }.await;
        self.finish(Operation::Update, channel, result).await
    }

    pub async fn launch_delete_consumer(&self, request: DeleteRequest) -> ArchiveResult<LongList> {
        let mut channel = self.open(Operation::Delete).await?;
        let result = async { self.consumer(&mut channel)?.delete(request).await }.await;
        self.finish(Operation::Delete, channel, result).await
    }
}

/// A bound provider endpoint waiting to serve.
///
/// The listener is closed once serving ends, or when the provider is dropped
/// or its serve task aborted.
pub struct RunningProvider {
    uri: Uri,
    listener: CloseGuard<Box<dyn Listener>>,
    dispatcher: Dispatcher,
    period: Duration,
}

impl RunningProvider {
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn operation(&self) -> Operation {
        self.dispatcher.operation()
    }

    /// Serve interactions one at a time until the serving period elapses or
    /// the listener is closed, then close the listener.
    pub async fn serve(mut self) -> usize {
        let operation = self.dispatcher.operation();
        let mut served = 0;
        let dispatcher = &self.dispatcher;
        if let Ok(listener) = self.listener.get() {
            let serving = async {
                while let Some(interaction) = listener.accept().await {
                    if let Err(error) = dispatcher.serve(interaction).await {
                        tracing::warn!(%operation, %error, "reply not delivered");
                    }
                    served += 1;
                }
            };
            if tokio::time::timeout(self.period, serving).await.is_err() {
                tracing::debug!(%operation, "serving period elapsed");
            }
        }
        self.listener.close().await;
        tracing::info!(%operation, uri = %self.uri, served, "archive provider closed");
        served
    }
}

/// An endpoint resource released by an async close.
#[async_trait]
trait Closable: Send + 'static {
    async fn close_now(&mut self);
}

#[async_trait]
impl Closable for Box<dyn Channel> {
    async fn close_now(&mut self) {
        self.close().await;
    }
}

#[async_trait]
impl Closable for Box<dyn Listener> {
    async fn close_now(&mut self) {
        self.close().await;
    }
}

/// Closes what it holds exactly once: through [`CloseGuard::close`], or from
/// a spawned task when dropped first, as happens when a caller cancels.
struct CloseGuard<T: Closable> {
    inner: Option<T>,
}

impl<T: Closable> CloseGuard<T> {
    fn new(inner: T) -> Self {
        Self { inner: Some(inner) }
    }

    fn get(&mut self) -> ArchiveResult<&mut T> {
        self.inner
            .as_mut()
            .ok_or_else(|| ArchiveError::Transport("already closed".into()))
    }

    async fn close(&mut self) {
        if let Some(inner) = self.inner.as_mut() {
            inner.close_now().await;
            self.inner = None;
        }
    }
}

impl<T: Closable> Drop for CloseGuard<T> {
    fn drop(&mut self) {
        let Some(mut inner) = self.inner.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::debug!("closing endpoint dropped before it finished");
                runtime.spawn(async move { inner.close_now().await });
            }
            Err(_) => tracing::warn!("endpoint dropped outside a runtime, close skipped"),
        }
    }
}
