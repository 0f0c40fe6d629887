use archive_protocol::{
    decode_set, encode_set, ArchiveError, ArchiveResult, Channel, InteractionKind,
    OperationRequest, Reply, Stage, TypeRegistry,
};

/// Raw reply bodies collected over one interaction.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Exchange {
    pub updates: Vec<Vec<u8>>,
    /// `None` for submit, which ends at the ack.
    pub response: Option<Vec<u8>>,
}

/// Decoded replies of one interaction.
#[derive(Debug, PartialEq)]
pub struct Outcome<T> {
    pub updates: Vec<T>,
    pub response: Option<T>,
}

/// Body of a reply at the expected stage; failures become protocol errors.
fn accept(reply: Reply, expected: Stage) -> ArchiveResult<Vec<u8>> {
    let body = reply.body.map_err(|fault| ArchiveError::Protocol {
        code: fault.code,
        message: fault.message,
    })?;
    if reply.stage != expected {
        return Err(ArchiveError::Transport(format!(
            "expected {expected} reply, got {}",
            reply.stage
        )));
    }
    Ok(body)
}

/// Send `payload` and walk the reply sequence of `kind`.
pub async fn exchange(
    channel: &mut dyn Channel,
    kind: InteractionKind,
    payload: Vec<u8>,
) -> ArchiveResult<Exchange> {
    if channel.kind() != kind {
        return Err(ArchiveError::Transport(format!(
            "channel opened for {}, operation needs {kind}",
            channel.kind()
        )));
    }

    let first = channel.send(payload).await?;
    if !kind.has_ack() {
        let response = accept(first, Stage::Response)?;
        return Ok(Exchange {
            updates: Vec::new(),
            response: Some(response),
        });
    }
    accept(first, Stage::Ack)?;
    if !kind.has_response() {
        return Ok(Exchange::default());
    }

    let mut updates = Vec::new();
    if kind.has_updates() {
        while let Some(update) = channel.next_update().await? {
            updates.push(accept(update, Stage::Update)?);
        }
        tracing::debug!(updates = updates.len(), "updates complete");
    }

    let response = accept(channel.response().await?, Stage::Response)?;
    Ok(Exchange {
        updates,
        response: Some(response),
    })
}

/// Encode `request`, run its interaction, and decode every reply.
pub async fn call<R: OperationRequest>(
    channel: &mut dyn Channel,
    request: R,
    types: &TypeRegistry,
    capacity: usize,
) -> ArchiveResult<Outcome<R::Response>> {
    let descriptor = R::OPERATION.descriptor();
    let payload = encode_set(descriptor.request, request, capacity)?;
    tracing::debug!(operation = %R::OPERATION, bytes = payload.len(), "sending request");

    let exchange = exchange(channel, descriptor.kind, payload).await?;
    let updates = exchange
        .updates
        .iter()
        .map(|body| decode_set(descriptor.update, body, types))
        .collect::<ArchiveResult<Vec<_>>>()?;
    let response = exchange
        .response
        .map(|body| decode_set(descriptor.response, &body, types))
        .transpose()?;
    Ok(Outcome { updates, response })
}
