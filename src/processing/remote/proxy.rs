// Remote query proxy.
//
// Purpose
// - Stand in for a local handler when a query is answered by an out-of-process endpoint.
//
// Responsibilities
// - Encode the query with the backend's serializer.
// - Call the operation through the transport, presenting the backend's credential.
// - Decode the response into the query's result type.
// - Report every problem as RemoteQueryFailure so policies classify it like a handler failure.

use crate::processing::core::errors::{QueryError, RemoteQueryFailure};
use crate::processing::core::query::{Query, QueryContext};
use crate::processing::remote::serializer::{self, RemoteQuerySerializer};
use crate::shared::infrastructure::transport::{Credential, RemoteCall, RemoteTransport};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

/// Where a remote backend lives and how it authenticates callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBackend {
    pub name: String,
    pub base_uri: String,
    pub credential: Credential,
}

pub struct RemoteQueryProxy<Q: Query> {
    backend: Arc<RemoteBackend>,
    operation: String,
    serializer: Arc<dyn RemoteQuerySerializer>,
    transport: Arc<dyn RemoteTransport>,
    _query: PhantomData<fn(Q)>,
}

impl<Q> RemoteQueryProxy<Q>
where
    Q: Query,
    Q::Result: DeserializeOwned,
{
    pub fn new(
        backend: Arc<RemoteBackend>,
        operation: impl Into<String>,
        serializer: Arc<dyn RemoteQuerySerializer>,
        transport: Arc<dyn RemoteTransport>,
    ) -> Self {
        Self {
            backend,
            operation: operation.into(),
            serializer,
            transport,
            _query: PhantomData,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn backend(&self) -> &RemoteBackend {
        &self.backend
    }

    pub async fn execute(&self, query: &Q, context: &QueryContext) -> Result<Q::Result, QueryError> {
        let payload = serializer::serialize(self.serializer.as_ref(), query).map_err(|e| {
            RemoteQueryFailure::Encode {
                operation: self.operation.clone(),
                reason: e.to_string(),
            }
        })?;

        tracing::debug!(
            context_id = %context.id(),
            backend = %self.backend.name,
            operation = %self.operation,
            "dispatching remote query"
        );

        let body = self
            .transport
            .call(RemoteCall {
                endpoint_uri: &self.backend.base_uri,
                operation: &self.operation,
                content_type: self.serializer.content_type(),
                payload: &payload,
                credential: &self.backend.credential,
            })
            .await
            .map_err(|failure| RemoteQueryFailure::Transport {
                operation: self.operation.clone(),
                failure,
            })?;

        let result = serializer::deserialize(self.serializer.as_ref(), &body).map_err(|e| {
            RemoteQueryFailure::Decode {
                operation: self.operation.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(result)
    }
}
