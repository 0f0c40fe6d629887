use archive_protocol::{
    ArchiveError, ArchiveResult, Channel, CountRequest, DeleteRequest, OperationRequest,
    QueryBatch, QueryRequest, RetrieveRequest, RetrieveResponse, StoreRequest, TypeRegistry,
    UpdateRequest,
};
use archive_types::LongList;

use crate::driver::{call, Outcome};
use crate::validation::{validate_store, validate_update};

/// Typed archive operations over one open channel.
///
/// The consumer borrows the channel; whoever opened it closes it.
pub struct ArchiveConsumer<'a> {
    channel: &'a mut dyn Channel,
    types: &'a TypeRegistry,
    capacity: usize,
}

impl<'a> ArchiveConsumer<'a> {
    pub fn new(channel: &'a mut dyn Channel, types: &'a TypeRegistry, capacity: usize) -> Self {
        Self {
            channel,
            types,
            capacity,
        }
    }

    async fn call<R: OperationRequest>(&mut self, request: R) -> ArchiveResult<Outcome<R::Response>> {
        call(&mut *self.channel, request, self.types, self.capacity).await
    }

    async fn single<R: OperationRequest>(&mut self, request: R) -> ArchiveResult<R::Response> {
        self.call(request).await?.response.ok_or_else(|| {
            ArchiveError::Decode(format!("{} reply carried no response", R::OPERATION))
        })
    }

    /// Fetch objects by instance id.
    pub async fn retrieve(&mut self, request: RetrieveRequest) -> ArchiveResult<RetrieveResponse> {
        self.single(request).await
    }

    /// Run a query; returns every update batch followed by the final one.
    pub async fn query(&mut self, request: QueryRequest) -> ArchiveResult<Vec<QueryBatch>> {
        let Outcome { mut updates, response } = self.call(request).await?;
        let last = response.ok_or_else(|| ArchiveError::Decode("query reply carried no response".into()))?;
        updates.push(last);
        Ok(updates)
    }

    /// One count per archive query.
    pub async fn count(&mut self, request: CountRequest) -> ArchiveResult<LongList> {
        self.single(request).await
    }

    /// Store objects, returning the assigned instance ids.
    ///
    /// Fails with a validation error before anything is sent if the request
    /// is malformed.
    pub async fn store(&mut self, request: StoreRequest) -> ArchiveResult<LongList> {
        validate_store(&request)?;
        let expected = request.elements.len();
        let return_ids = request.return_ids;
        let ids = self.single(request).await?;
        if return_ids && ids.len() != expected {
            return Err(ArchiveError::Decode(format!(
                "store returned {} ids for {expected} objects",
                ids.len()
            )));
        }
        Ok(ids)
    }

    pub async fn update(&mut self, request: UpdateRequest) -> ArchiveResult<()> {
        validate_update(&request)?;
        self.call(request).await?;
        Ok(())
    }

    /// Delete objects; returns the ids the provider actually removed.
    pub async fn delete(&mut self, request: DeleteRequest) -> ArchiveResult<LongList> {
        self.single(request).await
    }
}
