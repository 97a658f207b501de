use crate::processing::core::errors::TransportFailure;
use crate::shared::infrastructure::transport::{Credential, RemoteCall, RemoteTransport};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// Posts the payload to `{endpoint_uri}/{operation}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportFailure::Unreachable(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn operation_url(endpoint_uri: &str, operation: &str) -> String {
        format!(
            "{}/{}",
            endpoint_uri.trim_end_matches('/'),
            operation.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl RemoteTransport for HttpTransport {
    async fn call(&self, call: RemoteCall<'_>) -> Result<Vec<u8>, TransportFailure> {
        let url = Self::operation_url(call.endpoint_uri, call.operation);
        debug!(url = %url, bytes = call.payload.len(), "calling remote query endpoint");

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, call.content_type)
            .body(call.payload.to_vec());
        if let Credential::Header { name, value } = call.credential {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::Timeout
            } else {
                TransportFailure::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportFailure::Unreachable(e.to_string()))?;
        if !status.is_success() {
            return Err(TransportFailure::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body.to_vec())
    }
}
