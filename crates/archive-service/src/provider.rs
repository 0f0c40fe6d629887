use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use archive_protocol::{
    decode_set, encode_set, ArchiveResult, CountRequest, DeleteRequest, FieldSet, Fault,
    FieldKind, Interaction, InteractionKind, Operation, OperationRequest, QueryBatch, QueryRequest,
    Reply, ReplySink, RetrieveRequest, RetrieveResponse, Stage, StoreRequest, TypeRegistry,
    UpdateRequest,
};
use archive_types::LongList;

/// Everything a query handler sends back: zero or more update batches, then
/// the final batch.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryOutcome {
    pub updates: Vec<QueryBatch>,
    pub last: QueryBatch,
}

impl QueryOutcome {
    /// All results in a single final batch.
    pub fn single(last: QueryBatch) -> Self {
        Self {
            updates: Vec::new(),
            last,
        }
    }
}

/// Application side of a provider.
///
/// Every method has a default that refuses the operation, so a handler only
/// implements what its endpoints serve.
#[async_trait]
pub trait ArchiveHandler: Send + Sync {
    async fn retrieve(&self, _request: RetrieveRequest) -> Result<RetrieveResponse, Fault> {
        Err(unsupported(Operation::Retrieve))
    }

    async fn query(&self, _request: QueryRequest) -> Result<QueryOutcome, Fault> {
        Err(unsupported(Operation::Query))
    }

    async fn count(&self, _request: CountRequest) -> Result<LongList, Fault> {
        Err(unsupported(Operation::Count))
    }

    async fn store(&self, _request: StoreRequest) -> Result<LongList, Fault> {
        Err(unsupported(Operation::Store))
    }

    async fn update(&self, _request: UpdateRequest) -> Result<(), Fault> {
        Err(unsupported(Operation::Update))
    }

    async fn delete(&self, _request: DeleteRequest) -> Result<LongList, Fault> {
        Err(unsupported(Operation::Delete))
    }
}

fn unsupported(operation: Operation) -> Fault {
    Fault::invalid(format!("{operation} is not supported by this provider"))
}

/// Serves interactions of one operation through an [`ArchiveHandler`].
pub struct Dispatcher {
    operation: Operation,
    handler: Arc<dyn ArchiveHandler>,
    types: Arc<TypeRegistry>,
    capacity: usize,
}

impl Dispatcher {
    pub fn new(
        operation: Operation,
        handler: Arc<dyn ArchiveHandler>,
        types: Arc<TypeRegistry>,
        capacity: usize,
    ) -> Self {
        Self {
            operation,
            handler,
            types,
            capacity,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Decode one interaction, run the handler, and send the replies its
    /// pattern calls for. Errors are failures of the reply path only.
    pub async fn serve(&self, interaction: Interaction) -> ArchiveResult<()> {
        let Interaction {
            source,
            header,
            kind,
            body,
            mut replies,
        } = interaction;
        let descriptor = self.operation.descriptor();
        tracing::debug!(operation = %self.operation, %source, %header, bytes = body.len(), "interaction");

        if header.operation != self.operation.code() || kind != descriptor.kind {
            let fault = Fault::invalid(format!(
                "endpoint serves {} ({}), got op{} ({kind})",
                self.operation, descriptor.kind, header.operation
            ));
            return replies.reply(Reply::failure(first_stage(kind), fault)).await;
        }

        let handler = self.handler.as_ref();
        let sink = replies.as_mut();
        match self.operation {
            Operation::Retrieve => {
                self.unary::<RetrieveRequest, _, _>(sink, &body, |r| handler.retrieve(r))
                    .await
            }
            Operation::Query => self.progress(sink, &body).await,
            Operation::Count => {
                self.unary::<CountRequest, _, _>(sink, &body, |r| handler.count(r))
                    .await
            }
            Operation::Store => {
                self.unary::<StoreRequest, _, _>(sink, &body, |r| handler.store(r))
                    .await
            }
            Operation::Update => {
                self.unary::<UpdateRequest, _, _>(sink, &body, |r| handler.update(r))
                    .await
            }
            Operation::Delete => {
                self.unary::<DeleteRequest, _, _>(sink, &body, |r| handler.delete(r))
                    .await
            }
        }
    }

    fn decode<R: OperationRequest>(&self, body: &[u8]) -> Result<R, Fault> {
        decode_set(R::OPERATION.descriptor().request, body, &self.types).map_err(|e| {
            tracing::warn!(operation = %R::OPERATION, error = %e, "rejecting undecodable request");
            Fault::invalid(e.to_string())
        })
    }

    fn encode<T: FieldSet>(&self, schema: &[FieldKind], value: T) -> Result<Vec<u8>, Fault> {
        encode_set(schema, value, self.capacity).map_err(|e| Fault::invalid(e.to_string()))
    }

    /// Submit, request and invoke: at most one handler result to deliver.
    async fn unary<R, F, Fut>(&self, sink: &mut dyn ReplySink, body: &[u8], run: F) -> ArchiveResult<()>
    where
        R: OperationRequest,
        F: FnOnce(R) -> Fut,
        Fut: Future<Output = Result<R::Response, Fault>>,
    {
        let descriptor = R::OPERATION.descriptor();
        let kind = descriptor.kind;
        let request = match self.decode::<R>(body) {
            Ok(request) => request,
            Err(fault) => return sink.reply(Reply::failure(first_stage(kind), fault)).await,
        };

        if kind == InteractionKind::Invoke {
            sink.reply(Reply::ack()).await?;
        }

        let outcome = run(request).await;
        if let Err(fault) = &outcome {
            tracing::warn!(operation = %R::OPERATION, %fault, "handler failed");
        }

        let reply = match (kind.has_response(), outcome) {
            (false, Ok(_)) => Reply::ack(),
            (false, Err(fault)) => Reply::failure(Stage::Ack, fault),
            (true, Ok(response)) => match self.encode(descriptor.response, response) {
                Ok(body) => Reply::response(body),
                Err(fault) => Reply::failure(Stage::Response, fault),
            },
            (true, Err(fault)) => Reply::failure(Stage::Response, fault),
        };
        sink.reply(reply).await
    }

    async fn progress(&self, sink: &mut dyn ReplySink, body: &[u8]) -> ArchiveResult<()> {
        let request = match self.decode::<QueryRequest>(body) {
            Ok(request) => request,
            Err(fault) => return sink.reply(Reply::failure(Stage::Ack, fault)).await,
        };
        sink.reply(Reply::ack()).await?;

        let outcome = match self.handler.query(request).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                tracing::warn!(operation = %Operation::Query, %fault, "handler failed");
                return sink.reply(Reply::failure(Stage::Response, fault)).await;
            }
        };

        let descriptor = Operation::Query.descriptor();
        let updates = outcome.updates.len();
        for batch in outcome.updates {
            match self.encode(descriptor.update, batch) {
                Ok(body) => sink.reply(Reply::update(body)).await?,
                Err(fault) => return sink.reply(Reply::failure(Stage::Response, fault)).await,
            }
        }
        tracing::debug!(operation = %Operation::Query, updates, "updates sent");

        let reply = match self.encode(descriptor.response, outcome.last) {
            Ok(body) => Reply::response(body),
            Err(fault) => Reply::failure(Stage::Response, fault),
        };
        sink.reply(reply).await
    }
}

fn first_stage(kind: InteractionKind) -> Stage {
    if kind.has_ack() {
        Stage::Ack
    } else {
        Stage::Response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{details, encode_request, object_type, CannedArchive, RecordingSink};
    use archive_protocol::{ErrorCode, ServiceHeader};
    use archive_types::{ArchiveQuery, ElementList, Identifier, Uri};

    fn dispatcher(operation: Operation) -> Dispatcher {
        Dispatcher::new(
            operation,
            Arc::new(CannedArchive::default()),
            Arc::new(TypeRegistry::default()),
            1024,
        )
    }

    fn interaction(operation: Operation, body: Vec<u8>, sink: &RecordingSink) -> Interaction {
        Interaction {
            source: Uri::new("maltcp://127.0.0.1:14200"),
            header: ServiceHeader::archive(operation),
            kind: operation.descriptor().kind,
            body,
            replies: Box::new(sink.clone()),
        }
    }

    fn store_body(inst_ids: &[i64]) -> Vec<u8> {
        encode_request(StoreRequest {
            return_ids: true,
            object_type: object_type(),
            domain: inst_ids.iter().map(|_| Identifier::new("esa")).collect(),
            details: inst_ids.iter().map(|id| details(*id)).collect(),
            elements: ElementList::Long(inst_ids.iter().map(|id| Some(*id)).collect()),
        })
    }

    #[tokio::test]
    async fn invoke_acks_then_responds() {
        let sink = RecordingSink::default();
        let body = encode_request(CountRequest {
            object_type: object_type(),
            queries: vec![ArchiveQuery::default(), ArchiveQuery::default()],
            filters: None,
        });
        dispatcher(Operation::Count)
            .serve(interaction(Operation::Count, body, &sink))
            .await
            .unwrap();
        let stages: Vec<Stage> = sink.replies().iter().map(|r| r.stage).collect();
        assert_eq!(stages, vec![Stage::Ack, Stage::Response]);
    }

    #[tokio::test]
    async fn request_responds_once() {
        let sink = RecordingSink::default();
        dispatcher(Operation::Store)
            .serve(interaction(Operation::Store, store_body(&[0, 0]), &sink))
            .await
            .unwrap();
        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].stage, Stage::Response);
        assert!(!replies[0].is_failure());
    }

    #[tokio::test]
    async fn submit_only_acks() {
        let sink = RecordingSink::default();
        let body = encode_request(UpdateRequest {
            object_type: object_type(),
            domain: vec![Identifier::new("esa")],
            details: vec![details(3)],
            elements: ElementList::Long(vec![Some(3)]),
        });
        dispatcher(Operation::Update)
            .serve(interaction(Operation::Update, body, &sink))
            .await
            .unwrap();
        assert_eq!(sink.replies(), vec![Reply::ack()]);
    }

    #[tokio::test]
    async fn progress_sends_updates_before_response() {
        let sink = RecordingSink::default();
        let body = encode_request(QueryRequest {
            return_body: true,
            object_type: object_type(),
            queries: vec![ArchiveQuery::default(); 3],
            filters: None,
        });
        dispatcher(Operation::Query)
            .serve(interaction(Operation::Query, body, &sink))
            .await
            .unwrap();
        let stages: Vec<Stage> = sink.replies().iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Ack, Stage::Update, Stage::Update, Stage::Response]
        );
    }

    #[tokio::test]
    async fn undecodable_request_is_invalid_at_first_stage() {
        let sink = RecordingSink::default();
        dispatcher(Operation::Retrieve)
            .serve(interaction(Operation::Retrieve, vec![1, 2, 3], &sink))
            .await
            .unwrap();
        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].stage, Stage::Ack);
        assert_eq!(replies[0].body.as_ref().unwrap_err().code, ErrorCode::Invalid);
    }

    #[tokio::test]
    async fn huge_length_prefix_is_refused_not_allocated() {
        let mut body = store_body(&[7]);
        let mut prefixed = 3_u64.to_le_bytes().to_vec();
        prefixed.extend_from_slice(b"esa");
        let at = body
            .windows(prefixed.len())
            .position(|w| w == prefixed.as_slice())
            .unwrap();
        body[at..at + 8].copy_from_slice(&(1_u64 << 40).to_le_bytes());

        let sink = RecordingSink::default();
        dispatcher(Operation::Store)
            .serve(interaction(Operation::Store, body, &sink))
            .await
            .unwrap();
        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].body.as_ref().unwrap_err().code, ErrorCode::Invalid);
    }

    #[tokio::test]
    async fn handler_fault_carries_code() {
        let sink = RecordingSink::default();
        let d = dispatcher(Operation::Store);
        d.serve(interaction(Operation::Store, store_body(&[7]), &sink))
            .await
            .unwrap();
        d.serve(interaction(Operation::Store, store_body(&[7]), &sink))
            .await
            .unwrap();
        let replies = sink.replies();
        assert!(!replies[0].is_failure());
        assert_eq!(replies[1].body.as_ref().unwrap_err().code, ErrorCode::Duplicate);
    }

    #[tokio::test]
    async fn wrong_operation_is_refused() {
        let sink = RecordingSink::default();
        let mut wrong = interaction(Operation::Delete, vec![], &sink);
        wrong.kind = InteractionKind::Request;
        dispatcher(Operation::Store).serve(wrong).await.unwrap();
        assert!(sink.replies()[0].is_failure());
    }

    #[tokio::test]
    async fn default_handler_refuses_everything() {
        struct Nothing;
        impl ArchiveHandler for Nothing {}

        let sink = RecordingSink::default();
        let d = Dispatcher::new(
            Operation::Delete,
            Arc::new(Nothing),
            Arc::new(TypeRegistry::default()),
            256,
        );
        let body = encode_request(DeleteRequest {
            object_type: object_type(),
            domain: vec![],
            inst_ids: vec![1],
        });
        d.serve(interaction(Operation::Delete, body, &sink)).await.unwrap();
        let fault = sink.replies()[0].body.clone().unwrap_err();
        assert!(fault.message.contains("delete is not supported"));
    }
}
