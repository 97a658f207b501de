// Query registry.
//
// Purpose
// - Bind every query type to exactly one target: a local handler or a remote proxy.
//
// Responsibilities
// - Reject a second registration for the same query type, local or remote.
// - Keep the per-query decorator settings and fallback next to the target.
// - Replace assembly scanning with explicit HandlerModule lists.

pub mod remote;

use crate::processing::core::errors::{ConfigurationError, QueryError};
use crate::processing::core::query::{Query, QueryContext, QueryHandler};
use crate::processing::decorators::DecoratorKind;
use crate::processing::policies::registry::{CIRCUIT_BREAKER_POLICY_NAME, RETRY_POLICY_NAME};
use crate::processing::registry::remote::RemoteQueryRegistry;
use crate::processing::remote::proxy::RemoteQueryProxy;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Local,
    Remote,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Local => write!(f, "local"),
            TargetKind::Remote => write!(f, "remote"),
        }
    }
}

/// The innermost stage of a pipeline.
#[async_trait]
pub trait QueryTarget<Q: Query>: Send + Sync {
    fn kind(&self) -> TargetKind;
    async fn invoke(&self, query: &Q, context: &QueryContext) -> Result<Q::Result, QueryError>;
}

struct LocalTarget<Q: Query> {
    handler: Arc<dyn QueryHandler<Q>>,
}

#[async_trait]
impl<Q: Query> QueryTarget<Q> for LocalTarget<Q> {
    fn kind(&self) -> TargetKind {
        TargetKind::Local
    }

    async fn invoke(&self, query: &Q, context: &QueryContext) -> Result<Q::Result, QueryError> {
        Ok(self.handler.execute(query, context).await?)
    }
}

#[async_trait]
impl<Q> QueryTarget<Q> for RemoteQueryProxy<Q>
where
    Q: Query,
    Q::Result: DeserializeOwned,
{
    fn kind(&self) -> TargetKind {
        TargetKind::Remote
    }

    async fn invoke(&self, query: &Q, context: &QueryContext) -> Result<Q::Result, QueryError> {
        self.execute(query, context).await
    }
}

pub type Fallback<Q> = Arc<dyn Fn(&Q, &QueryError) -> <Q as Query>::Result + Send + Sync>;

/// Which decorators run for one query type and which policies they use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorSettings {
    pub disabled: HashSet<DecoratorKind>,
    pub retry_policy: String,
    pub circuit_breakers: Vec<String>,
}

impl Default for DecoratorSettings {
    fn default() -> Self {
        Self {
            disabled: HashSet::new(),
            retry_policy: RETRY_POLICY_NAME.to_string(),
            circuit_breakers: vec![CIRCUIT_BREAKER_POLICY_NAME.to_string()],
        }
    }
}

impl DecoratorSettings {
    pub fn is_enabled(&self, kind: DecoratorKind) -> bool {
        !self.disabled.contains(&kind)
    }
}

pub struct QueryRegistration<Q: Query> {
    target: Arc<dyn QueryTarget<Q>>,
    fallback: Option<Fallback<Q>>,
    settings: DecoratorSettings,
}

impl<Q: Query> QueryRegistration<Q> {
    pub fn local<H>(handler: H) -> Self
    where
        H: QueryHandler<Q> + 'static,
    {
        Self::to_target(Arc::new(LocalTarget {
            handler: Arc::new(handler) as Arc<dyn QueryHandler<Q>>,
        }))
    }

    pub fn to_target(target: Arc<dyn QueryTarget<Q>>) -> Self {
        Self {
            target,
            fallback: None,
            settings: DecoratorSettings::default(),
        }
    }

    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&Q, &QueryError) -> Q::Result + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    pub fn without(mut self, kind: DecoratorKind) -> Self {
        self.settings.disabled.insert(kind);
        self
    }

    pub fn with_retry_policy(mut self, name: impl Into<String>) -> Self {
        self.settings.retry_policy = name.into();
        self
    }

    /// Runs the query under an additional named breaker, after the ones already attached.
    pub fn with_circuit_breaker(mut self, name: impl Into<String>) -> Self {
        self.settings.circuit_breakers.push(name.into());
        self
    }

    pub fn with_circuit_breakers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.circuit_breakers = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn target(&self) -> &Arc<dyn QueryTarget<Q>> {
        &self.target
    }

    pub fn fallback(&self) -> Option<&Fallback<Q>> {
        self.fallback.as_ref()
    }

    pub fn settings(&self) -> &DecoratorSettings {
        &self.settings
    }
}

/// A registration with its query type erased, as stored in the registry.
#[derive(Clone)]
pub(crate) struct RegisteredQuery {
    pub(crate) query: &'static str,
    pub(crate) target_kind: TargetKind,
    pub(crate) settings: DecoratorSettings,
    pub(crate) registration: Arc<dyn Any + Send + Sync>,
}

impl RegisteredQuery {
    pub(crate) fn new<Q: Query>(registration: QueryRegistration<Q>) -> Self {
        Self {
            query: Q::name(),
            target_kind: registration.target.kind(),
            settings: registration.settings.clone(),
            registration: Arc::new(registration),
        }
    }

    pub(crate) fn downcast<Q: Query>(&self) -> Option<&QueryRegistration<Q>> {
        self.registration.downcast_ref::<QueryRegistration<Q>>()
    }
}

/// A group of local handlers registered together, standing in for assembly scanning.
pub trait HandlerModule {
    fn register_handlers(&self, registry: &mut QueryRegistry) -> Result<(), ConfigurationError>;
}

#[derive(Default)]
pub struct QueryRegistry {
    entries: HashMap<TypeId, RegisteredQuery>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<Q: Query>(
        &mut self,
        registration: QueryRegistration<Q>,
    ) -> Result<&mut Self, ConfigurationError> {
        self.insert(TypeId::of::<Q>(), RegisteredQuery::new(registration))?;
        Ok(self)
    }

    pub fn register_handler<Q, H>(&mut self, handler: H) -> Result<&mut Self, ConfigurationError>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        self.register(QueryRegistration::local(handler))
    }

    pub fn with_handlers_from(
        &mut self,
        module: &dyn HandlerModule,
    ) -> Result<&mut Self, ConfigurationError> {
        module.register_handlers(self)?;
        Ok(self)
    }

    pub fn add_remote_queries(
        &mut self,
        remote: RemoteQueryRegistry,
    ) -> Result<&mut Self, ConfigurationError> {
        for (type_id, entry) in remote.into_entries() {
            self.insert(type_id, entry)?;
        }
        Ok(self)
    }

    pub fn target_kind<Q: Query>(&self) -> Option<TargetKind> {
        self.entries
            .get(&TypeId::of::<Q>())
            .map(|entry| entry.target_kind)
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

    fn insert(&mut self, type_id: TypeId, entry: RegisteredQuery) -> Result<(), ConfigurationError> {
        if self.entries.contains_key(&type_id) {
            return Err(ConfigurationError::DuplicateRegistration { query: entry.query });
        }
        self.entries.insert(type_id, entry);
        Ok(())
    }
}
