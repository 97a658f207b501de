// Remote query registry.
//
// Purpose
// - Collect the queries answered by one remote backend (one registry per backend).
//
// Responsibilities
// - Build a RemoteQueryProxy per query type, sharing the backend's serializer and transport.
// - Reject a query type registered twice within the backend. Collisions across backends are
//   rejected when the registries are merged into the QueryRegistry.

use crate::processing::core::errors::ConfigurationError;
use crate::processing::core::query::Query;
use crate::processing::registry::{QueryRegistration, RegisteredQuery};
use crate::processing::remote::proxy::{RemoteBackend, RemoteQueryProxy};
use crate::processing::remote::serializer::RemoteQuerySerializer;
use crate::shared::infrastructure::configuration::{self, Configuration};
use crate::shared::infrastructure::transport::{Credential, RemoteTransport};
use serde::de::DeserializeOwned;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Header Azure Functions reads the function key from.
pub const AZURE_FUNCTIONS_KEY_HEADER: &str = "x-functions-key";

/// Header API Gateway reads the API key from when fronting AWS Lambda.
pub const AWS_API_KEY_HEADER: &str = "x-api-key";

pub struct RemoteQueryRegistry {
    backend: Arc<RemoteBackend>,
    serializer: Arc<dyn RemoteQuerySerializer>,
    transport: Arc<dyn RemoteTransport>,
    entries: HashMap<TypeId, RegisteredQuery>,
}

impl RemoteQueryRegistry {
    pub fn new(
        backend: RemoteBackend,
        serializer: Arc<dyn RemoteQuerySerializer>,
        transport: Arc<dyn RemoteTransport>,
    ) -> Self {
        Self {
            backend: Arc::new(backend),
            serializer,
            transport,
            entries: HashMap::new(),
        }
    }

    pub fn azure_functions(
        serializer: Arc<dyn RemoteQuerySerializer>,
        transport: Arc<dyn RemoteTransport>,
        base_uri: impl Into<String>,
        functions_key: impl Into<String>,
    ) -> Self {
        Self::new(
            RemoteBackend {
                name: "azure".into(),
                base_uri: base_uri.into(),
                credential: Credential::header(AZURE_FUNCTIONS_KEY_HEADER, functions_key),
            },
            serializer,
            transport,
        )
    }

    pub fn aws_lambda(
        serializer: Arc<dyn RemoteQuerySerializer>,
        transport: Arc<dyn RemoteTransport>,
        base_uri: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::new(
            RemoteBackend {
                name: "aws".into(),
                base_uri: base_uri.into(),
                credential: Credential::header(AWS_API_KEY_HEADER, api_key),
            },
            serializer,
            transport,
        )
    }

    /// Reads `{prefix}:baseUri` and `{prefix}:{credential_key}` from `section`.
    pub fn backend_from_configuration(
        configuration: &dyn Configuration,
        section: &str,
        prefix: &str,
        credential_key: &str,
        credential_header: &str,
    ) -> Result<RemoteBackend, ConfigurationError> {
        let base_uri = configuration::required(configuration, section, &format!("{prefix}:baseUri"))?;
        let credential = configuration::required(
            configuration,
            section,
            &format!("{prefix}:{credential_key}"),
        )?;
        Ok(RemoteBackend {
            name: prefix.to_ascii_lowercase(),
            base_uri,
            credential: Credential::header(credential_header, credential),
        })
    }

    pub fn backend(&self) -> &RemoteBackend {
        &self.backend
    }

    pub fn register<Q>(&mut self, operation: impl Into<String>) -> Result<&mut Self, ConfigurationError>
    where
        Q: Query,
        Q::Result: DeserializeOwned,
    {
        self.register_with::<Q, _>(operation, |registration| registration)
    }

    /// Registers `Q` and lets the caller adjust its fallback and decorator settings.
    pub fn register_with<Q, F>(
        &mut self,
        operation: impl Into<String>,
        configure: F,
    ) -> Result<&mut Self, ConfigurationError>
    where
        Q: Query,
        Q::Result: DeserializeOwned,
        F: FnOnce(QueryRegistration<Q>) -> QueryRegistration<Q>,
    {
        let type_id = TypeId::of::<Q>();
        if self.entries.contains_key(&type_id) {
            return Err(ConfigurationError::DuplicateRegistration { query: Q::name() });
        }
        let proxy = RemoteQueryProxy::<Q>::new(
            self.backend.clone(),
            operation,
            self.serializer.clone(),
            self.transport.clone(),
        );
        let registration = configure(QueryRegistration::to_target(Arc::new(proxy)));
        self.entries.insert(type_id, RegisteredQuery::new(registration));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> HashMap<TypeId, RegisteredQuery> {
        self.entries
    }
}
