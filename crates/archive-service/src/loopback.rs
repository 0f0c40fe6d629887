use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::mpsc;

use archive_protocol::{
    ArchiveError, ArchiveResult, Channel, Interaction, InteractionKind, Listener, Reply, ReplySink,
    ServiceHeader, Stage, Transport,
};
use archive_types::Uri;

const ACCEPT_QUEUE: usize = 32;

struct Route {
    header: ServiceHeader,
    sender: mpsc::Sender<Interaction>,
}

type Routes = Arc<RwLock<HashMap<String, Route>>>;

fn poisoned() -> ArchiveError {
    ArchiveError::Transport("loopback route table lock poisoned".into())
}

/// In-process transport: consumers and providers of one process talk over
/// tokio queues, addressed by URI.
///
/// Cloning shares the route table.
#[derive(Clone, Default)]
pub struct LoopbackTransport {
    routes: Routes,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently bound endpoints.
    pub fn bound(&self) -> usize {
        self.routes.read().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn open_channel(
        &self,
        kind: InteractionKind,
        consumer: &Uri,
        provider: &Uri,
        header: ServiceHeader,
    ) -> ArchiveResult<Box<dyn Channel>> {
        let routes = self.routes.read().map_err(|_| poisoned())?;
        let route = routes
            .get(provider.as_str())
            .ok_or_else(|| ArchiveError::Transport(format!("no provider bound at {provider}")))?;
        if route.header != header {
            return Err(ArchiveError::Transport(format!(
                "{provider} serves {}, not {header}",
                route.header
            )));
        }
        Ok(Box::new(LoopbackChannel {
            kind,
            header,
            consumer: consumer.clone(),
            provider: provider.clone(),
            sender: route.sender.clone(),
            replies: None,
            pending: None,
            closed: false,
        }))
    }

    async fn bind(&self, uri: &Uri, header: ServiceHeader) -> ArchiveResult<Box<dyn Listener>> {
        let mut routes = self.routes.write().map_err(|_| poisoned())?;
        if routes.contains_key(uri.as_str()) {
            return Err(ArchiveError::Transport(format!("{uri} is already bound")));
        }
        let (sender, receiver) = mpsc::channel(ACCEPT_QUEUE);
        routes.insert(uri.as_str().to_owned(), Route { header, sender });
        tracing::debug!(%uri, %header, "loopback endpoint bound");
        Ok(Box::new(LoopbackListener {
            uri: uri.clone(),
            receiver,
            routes: Arc::clone(&self.routes),
            closed: false,
        }))
    }
}

struct LoopbackChannel {
    kind: InteractionKind,
    header: ServiceHeader,
    consumer: Uri,
    provider: Uri,
    sender: mpsc::Sender<Interaction>,
    replies: Option<mpsc::UnboundedReceiver<Reply>>,
    /// A terminal reply seen while waiting for updates.
    pending: Option<Reply>,
    closed: bool,
}

impl LoopbackChannel {
    async fn receive(&mut self) -> ArchiveResult<Reply> {
        let replies = self
            .replies
            .as_mut()
            .ok_or_else(|| ArchiveError::Transport("nothing sent on this channel".into()))?;
        replies.recv().await.ok_or_else(|| {
            ArchiveError::Transport(format!("{} dropped the interaction", self.provider))
        })
    }
}

#[async_trait]
impl Channel for LoopbackChannel {
    fn kind(&self) -> InteractionKind {
        self.kind
    }

    async fn send(&mut self, payload: Vec<u8>) -> ArchiveResult<Reply> {
        if self.closed {
            return Err(ArchiveError::Transport("channel is closed".into()));
        }
        if self.replies.is_some() {
            return Err(ArchiveError::Transport("channel already carries an interaction".into()));
        }
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let interaction = Interaction {
            source: self.consumer.clone(),
            header: self.header,
            kind: self.kind,
            body: payload,
            replies: Box::new(LoopbackSink { sender: reply_tx }),
        };
        self.sender
            .send(interaction)
            .await
            .map_err(|_| ArchiveError::Transport(format!("{} is no longer listening", self.provider)))?;
        self.replies = Some(reply_rx);
        self.receive().await
    }

    async fn next_update(&mut self) -> ArchiveResult<Option<Reply>> {
        if self.pending.is_some() {
            return Ok(None);
        }
        let reply = self.receive().await?;
        if reply.stage == Stage::Update {
            return Ok(Some(reply));
        }
        self.pending = Some(reply);
        Ok(None)
    }

    async fn response(&mut self) -> ArchiveResult<Reply> {
        match self.pending.take() {
            Some(reply) => Ok(reply),
            None => self.receive().await,
        }
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.replies = None;
            self.pending = None;
        }
    }
}

struct LoopbackSink {
    sender: mpsc::UnboundedSender<Reply>,
}

#[async_trait]
impl ReplySink for LoopbackSink {
    async fn reply(&mut self, reply: Reply) -> ArchiveResult<()> {
        self.sender
            .send(reply)
            .map_err(|_| ArchiveError::Transport("consumer went away".into()))
    }
}

struct LoopbackListener {
    uri: Uri,
    receiver: mpsc::Receiver<Interaction>,
    routes: Routes,
    closed: bool,
}

impl LoopbackListener {
    fn unbind(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.receiver.close();
        if let Ok(mut routes) = self.routes.write() {
            routes.remove(self.uri.as_str());
        }
        tracing::debug!(uri = %self.uri, "loopback endpoint unbound");
    }
}

#[async_trait]
impl Listener for LoopbackListener {
    async fn accept(&mut self) -> Option<Interaction> {
        if self.closed {
            return None;
        }
        self.receiver.recv().await
    }

    async fn close(&mut self) {
        self.unbind();
    }
}

impl Drop for LoopbackListener {
    fn drop(&mut self) {
        self.unbind();
    }
}
