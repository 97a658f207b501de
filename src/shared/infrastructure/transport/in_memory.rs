// In memory implementation of the RemoteTransport port.
//
// Purpose
// - Stand in for remote backends in tests and local development.
//
// Responsibilities
// - Route each operation to a scripted responder.
// - Record every call so tests can assert on payloads and credentials.
// - Simulate an unreachable backend with toggle_offline.

use crate::processing::core::errors::TransportFailure;
use crate::shared::infrastructure::transport::{Credential, RemoteCall, RemoteTransport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&[u8]) -> Result<Vec<u8>, TransportFailure> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub endpoint_uri: String,
    pub operation: String,
    pub payload: Vec<u8>,
    pub credential: Credential,
}

#[derive(Default)]
pub struct InMemoryTransport {
    responders: HashMap<String, Responder>,
    calls: Mutex<Vec<RecordedCall>>,
    offline: bool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond<F>(mut self, operation: impl Into<String>, responder: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, TransportFailure> + Send + Sync + 'static,
    {
        self.responders.insert(operation.into(), Box::new(responder));
        self
    }

    pub fn respond_json(self, operation: impl Into<String>, body: serde_json::Value) -> Self {
        let bytes = body.to_string().into_bytes();
        self.respond(operation, move |_| Ok(bytes.clone()))
    }

    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RemoteTransport for InMemoryTransport {
    async fn call(&self, call: RemoteCall<'_>) -> Result<Vec<u8>, TransportFailure> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(RecordedCall {
                endpoint_uri: call.endpoint_uri.to_string(),
                operation: call.operation.to_string(),
                payload: call.payload.to_vec(),
                credential: call.credential.clone(),
            });
        if self.offline {
            return Err(TransportFailure::Unreachable("Remote backend offline".into()));
        }
        match self.responders.get(call.operation) {
            Some(responder) => responder(call.payload),
            None => Err(TransportFailure::Status {
                status: 404,
                body: format!("no operation named '{}'", call.operation),
            }),
        }
    }
}

#[cfg(test)]
mod in_memory_transport_tests {
    use super::*;
    use rstest::rstest;

    fn call<'a>(operation: &'a str, credential: &'a Credential) -> RemoteCall<'a> {
        RemoteCall {
            endpoint_uri: "memory://backend",
            operation,
            content_type: "application/json",
            payload: b"{}",
            credential,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_route_to_the_responder_and_record_the_call() {
        let transport = InMemoryTransport::new().respond_json("Echo", serde_json::json!("hi"));
        let credential = Credential::header("x-api-key", "secret");
        let body = transport.call(call("Echo", &credential)).await.unwrap();
        assert_eq!(body, b"\"hi\"".to_vec());
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].credential, credential);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_with_404_for_unknown_operations() {
        let transport = InMemoryTransport::new();
        let result = transport.call(call("Missing", &Credential::None)).await;
        assert!(matches!(result, Err(TransportFailure::Status { status: 404, .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_when_offline() {
        let mut transport = InMemoryTransport::new().respond_json("Echo", serde_json::json!(1));
        transport.toggle_offline();
        let result = transport.call(call("Echo", &Credential::None)).await;
        assert_eq!(
            result,
            Err(TransportFailure::Unreachable("Remote backend offline".into()))
        );
    }
}
