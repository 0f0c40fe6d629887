//! Scripted transport doubles and a canned handler shared by unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use archive_protocol::{
    encode_set, ArchiveError, ArchiveResult, Channel, CountRequest, DeleteRequest, FieldSet,
    Fault, Interaction, InteractionKind, Listener, Operation, OperationRequest, QueryBatch,
    QueryRequest, Reply, ReplySink, RetrieveRequest, RetrieveResponse, ServiceHeader, Stage,
    StoreRequest, Transport, UpdateRequest,
};
use archive_types::{ArchiveDetails, ElementList, FineTime, Identifier, LongList, ObjectType, Uri};

use crate::provider::{ArchiveHandler, QueryOutcome};

pub fn object_type() -> ObjectType {
    ObjectType::new(4, 2, 1, 3)
}

pub fn details(inst_id: i64) -> ArchiveDetails {
    ArchiveDetails::new(
        inst_id,
        Identifier::new("ground"),
        FineTime::from_nanos(1_700_000_000_000_000_000),
        Uri::new("maltcp://127.0.0.1:12400/providerStore"),
    )
}

pub fn encode_request<R: OperationRequest>(request: R) -> Vec<u8> {
    encode_set(R::OPERATION.descriptor().request, request, 1024).unwrap()
}

/// Encode a response (or query update) payload of `operation`.
pub fn encode_reply<T: FieldSet>(operation: Operation, value: T) -> Vec<u8> {
    encode_set(operation.descriptor().response, value, 1024).unwrap()
}

type Script = VecDeque<ArchiveResult<Reply>>;

/// A channel replaying a fixed reply script, recording sends and closes.
///
/// A stalled channel never answers a send.
pub struct ScriptedChannel {
    kind: InteractionKind,
    script: Script,
    stalled: bool,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    closes: Arc<AtomicUsize>,
}

impl ScriptedChannel {
    pub fn new(kind: InteractionKind, script: Vec<ArchiveResult<Reply>>) -> Self {
        Self {
            kind,
            script: script.into(),
            stalled: false,
            sent: Arc::default(),
            closes: Arc::default(),
        }
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    fn next(&mut self) -> ArchiveResult<Reply> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(ArchiveError::Transport("script exhausted".into())))
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    fn kind(&self) -> InteractionKind {
        self.kind
    }

    async fn send(&mut self, payload: Vec<u8>) -> ArchiveResult<Reply> {
        self.sent.lock().unwrap().push(payload);
        if self.stalled {
            std::future::pending::<()>().await;
        }
        self.next()
    }

    async fn next_update(&mut self) -> ArchiveResult<Option<Reply>> {
        let update_next = match self.script.front() {
            Some(Ok(reply)) => reply.stage == Stage::Update,
            Some(Err(_)) => true,
            None => false,
        };
        if update_next {
            self.next().map(Some)
        } else {
            Ok(None)
        }
    }

    async fn response(&mut self) -> ArchiveResult<Reply> {
        self.next()
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out one [`ScriptedChannel`] and empty listeners, counting calls.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Vec<ArchiveResult<Reply>>>,
    fail_open: bool,
    stalled: bool,
    pub consumers: Mutex<Vec<Uri>>,
    pub opens: AtomicUsize,
    pub binds: AtomicUsize,
    pub sent: Arc<Mutex<Vec<Vec<u8>>>>,
    pub channel_closes: Arc<AtomicUsize>,
    pub listener_closes: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<ArchiveResult<Reply>>) -> Self {
        Self {
            script: Mutex::new(script),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Channels never reply and listeners never accept or end.
    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Self::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn binds(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }

    pub fn channel_closes(&self) -> usize {
        self.channel_closes.load(Ordering::SeqCst)
    }

    pub fn listener_closes(&self) -> usize {
        self.listener_closes.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open_channel(
        &self,
        kind: InteractionKind,
        consumer: &Uri,
        _provider: &Uri,
        _header: ServiceHeader,
    ) -> ArchiveResult<Box<dyn Channel>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.consumers.lock().unwrap().push(consumer.clone());
        if self.fail_open {
            return Err(ArchiveError::Transport("connection refused".into()));
        }
        let script = std::mem::take(&mut *self.script.lock().unwrap());
        Ok(Box::new(ScriptedChannel {
            kind,
            script: script.into(),
            stalled: self.stalled,
            sent: Arc::clone(&self.sent),
            closes: Arc::clone(&self.channel_closes),
        }))
    }

    async fn bind(&self, _uri: &Uri, _header: ServiceHeader) -> ArchiveResult<Box<dyn Listener>> {
        self.binds.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(EmptyListener {
            stalled: self.stalled,
            closes: Arc::clone(&self.listener_closes),
        }))
    }
}

/// A listener that never receives anything.
struct EmptyListener {
    stalled: bool,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Listener for EmptyListener {
    async fn accept(&mut self) -> Option<Interaction> {
        if self.stalled {
            std::future::pending::<()>().await;
        }
        None
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collects provider replies.
#[derive(Clone, Default)]
pub struct RecordingSink {
    replies: Arc<Mutex<Vec<Reply>>>,
}

impl RecordingSink {
    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn reply(&mut self, reply: Reply) -> ArchiveResult<()> {
        self.replies.lock().unwrap().push(reply);
        Ok(())
    }
}

/// Handler with predictable answers.
///
/// Store assigns ids from 100 upwards for `inst_id == 0` and refuses known
/// non-zero ids as duplicates. Query answers one batch per archive query,
/// the last one as the final batch.
#[derive(Default)]
pub struct CannedArchive {
    known: Mutex<HashSet<i64>>,
    next_id: AtomicUsize,
    pub updates: AtomicUsize,
}

#[async_trait]
impl ArchiveHandler for CannedArchive {
    async fn retrieve(&self, request: RetrieveRequest) -> Result<RetrieveResponse, Fault> {
        Ok(RetrieveResponse {
            details: request.inst_ids.iter().map(|id| details(*id)).collect(),
            elements: Some(ElementList::Long(request.inst_ids.into_iter().map(Some).collect())),
        })
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryOutcome, Fault> {
        let mut batches: Vec<QueryBatch> = (1..=request.queries.len() as i64)
            .map(|n| QueryBatch {
                object_type: request.object_type,
                domain: vec![Identifier::new("esa")],
                details: vec![details(n)],
                elements: request
                    .return_body
                    .then(|| ElementList::Long(vec![Some(n)])),
            })
            .collect();
        let last = batches
            .pop()
            .unwrap_or_else(|| QueryBatch::empty(request.object_type));
        Ok(QueryOutcome {
            updates: batches,
            last,
        })
    }

    async fn count(&self, request: CountRequest) -> Result<LongList, Fault> {
        Ok(request.queries.iter().map(|_| 3).collect())
    }

    async fn store(&self, request: StoreRequest) -> Result<LongList, Fault> {
        let mut known = self.known.lock().unwrap();
        let mut ids = Vec::with_capacity(request.details.len());
        for entry in &request.details {
            let id = match entry.inst_id {
                0 => 100 + self.next_id.fetch_add(1, Ordering::SeqCst) as i64,
                id if known.contains(&id) => {
                    return Err(Fault::duplicate(format!("instance {id} already stored")))
                }
                id => id,
            };
            known.insert(id);
            ids.push(id);
        }
        Ok(if request.return_ids { ids } else { Vec::new() })
    }

    async fn update(&self, _request: UpdateRequest) -> Result<(), Fault> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, request: DeleteRequest) -> Result<LongList, Fault> {
        let mut known = self.known.lock().unwrap();
        Ok(request
            .inst_ids
            .into_iter()
            .filter(|id| known.remove(id))
            .collect())
    }
}
