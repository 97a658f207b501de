// Transport port for remote queries.
//
// Purpose
// - Carry an encoded query to a named remote operation and bring the encoded result back.
//
// Boundaries
// - No retries here. Retrying is the decorator chain's job, so a call must be safe to repeat.

pub mod http;
pub mod in_memory;

use crate::processing::core::errors::TransportFailure;
use async_trait::async_trait;

/// How a backend expects its credential to be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    None,
    Header { name: String, value: String },
}

impl Credential {
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Credential::Header {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RemoteCall<'a> {
    pub endpoint_uri: &'a str,
    pub operation: &'a str,
    pub content_type: &'a str,
    pub payload: &'a [u8],
    pub credential: &'a Credential,
}

#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn call(&self, call: RemoteCall<'_>) -> Result<Vec<u8>, TransportFailure>;
}
