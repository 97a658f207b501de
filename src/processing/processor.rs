// Query processor.
//
// Purpose
// - The single entry point hosts call: execute a query, get its typed result or failure.
//
// Responsibilities
// - Build one pipeline per registered query at startup and validate it (targets, policies).
// - Route each execution to its pipeline and run the decorator stages around the target.
//
// Boundaries
// - Nothing is registered or resolved after build(). Unknown queries fail with NotRegistered.

use crate::processing::core::errors::{ConfigurationError, QueryError};
use crate::processing::core::query::{Query, QueryContext};
use crate::processing::decorators::{DecoratorChain, DecoratorKind, Stage, run_stages};
use crate::processing::policies::registry::PolicyRegistry;
use crate::processing::registry::{QueryRegistry, RegisteredQuery, TargetKind};
use crate::shared::infrastructure::query_log::QueryLogSink;
use crate::shared::infrastructure::query_log::tracing_sink::TracingQueryLogSink;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

struct Pipeline {
    entry: RegisteredQuery,
    stages: Vec<Stage>,
}

pub struct QueryProcessor {
    pipelines: HashMap<TypeId, Pipeline>,
}

impl QueryProcessor {
    pub fn builder() -> QueryProcessorBuilder {
        QueryProcessorBuilder::default()
    }

    pub async fn execute<Q: Query>(&self, query: Q) -> Result<Q::Result, QueryError> {
        self.execute_in(&query, &QueryContext::new()).await
    }

    /// Executes under a caller-supplied context, for cancellation, deadlines and inspecting
    /// attempts or an applied fallback afterwards.
    pub async fn execute_in<Q: Query>(
        &self,
        query: &Q,
        context: &QueryContext,
    ) -> Result<Q::Result, QueryError> {
        let not_registered = || QueryError::NotRegistered { query: Q::name() };
        let pipeline = self
            .pipelines
            .get(&TypeId::of::<Q>())
            .ok_or_else(not_registered)?;
        let registration = pipeline.entry.downcast::<Q>().ok_or_else(not_registered)?;
        run_stages(&pipeline.stages, registration, query, context).await
    }

    pub fn is_registered<Q: Query>(&self) -> bool {
        self.pipelines.contains_key(&TypeId::of::<Q>())
    }

    pub fn target_kind<Q: Query>(&self) -> Option<TargetKind> {
        self.pipelines
            .get(&TypeId::of::<Q>())
            .map(|pipeline| pipeline.entry.target_kind)
    }

    /// The decorators a query runs through, outermost first.
    pub fn decorators<Q: Query>(&self) -> Option<Vec<DecoratorKind>> {
        self.pipelines
            .get(&TypeId::of::<Q>())
            .map(|pipeline| pipeline.stages.iter().map(Stage::kind).collect())
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

#[derive(Default)]
pub struct QueryProcessorBuilder {
    registry: QueryRegistry,
    policies: PolicyRegistry,
    chain: DecoratorChain,
    log_sink: Option<Arc<dyn QueryLogSink>>,
    required: Vec<(TypeId, &'static str)>,
}

impl QueryProcessorBuilder {
    pub fn queries(mut self, registry: QueryRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn policies(mut self, policies: PolicyRegistry) -> Self {
        self.policies = policies;
        self
    }

    pub fn decorators(mut self, chain: DecoratorChain) -> Self {
        self.chain = chain;
        self
    }

    /// Defaults to [`TracingQueryLogSink`].
    pub fn log_sink(mut self, sink: Arc<dyn QueryLogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Declares a query the host depends on; build() fails if nothing answers it.
    pub fn require<Q: Query>(mut self) -> Self {
        self.required.push((TypeId::of::<Q>(), Q::name()));
        self
    }

    pub fn build(self) -> Result<QueryProcessor, ConfigurationError> {
        let log_sink = self
            .log_sink
            .unwrap_or_else(|| Arc::new(TracingQueryLogSink) as Arc<dyn QueryLogSink>);
        let entries = self.registry.into_entries();

        for &(type_id, query) in &self.required {
            if !entries.contains_key(&type_id) {
                return Err(ConfigurationError::UnresolvedQuery { query });
            }
        }

        let mut pipelines = HashMap::with_capacity(entries.len());
        for (type_id, entry) in entries {
            let stages = self.chain.resolve(&entry.settings, &self.policies, &log_sink)?;
            info!(
                query = entry.query,
                target = %entry.target_kind,
                decorators = ?stages.iter().map(Stage::kind).collect::<Vec<_>>(),
                "query pipeline ready"
            );
            pipelines.insert(type_id, Pipeline { entry, stages });
        }
        Ok(QueryProcessor { pipelines })
    }
}

#[cfg(test)]
mod query_processor_tests {
    use super::*;
    use crate::processing::core::errors::HandlerFailure;
    use crate::processing::core::query::QueryHandler;
    use crate::processing::policies::predicate::FailurePredicate;
    use crate::processing::policies::registry::{
        CIRCUIT_BREAKER_POLICY_NAME, Policy, RETRY_POLICY_NAME,
    };
    use crate::processing::registry::QueryRegistration;
    use crate::shared::infrastructure::query_log::in_memory::InMemoryQueryLogSink;
    use async_trait::async_trait;
    use rstest::{fixture, rstest};
    use serde::Serialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Serialize)]
    struct Double(u32);

    impl Query for Double {
        type Result = u32;
    }

    #[derive(Debug, Serialize)]
    struct Unregistered;

    impl Query for Unregistered {
        type Result = ();
    }

    /// Fails the first `failures` calls, then doubles.
    struct FlakyDoubler {
        failures: usize,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QueryHandler<Double> for FlakyDoubler {
        async fn execute(&self, query: &Double, _: &QueryContext) -> Result<u32, HandlerFailure> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(HandlerFailure::new("not yet"));
            }
            Ok(query.0 * 2)
        }
    }

    fn policies() -> PolicyRegistry {
        let mut policies = PolicyRegistry::new();
        policies
            .register(
                RETRY_POLICY_NAME,
                Policy::retry(FailurePredicate::any(), [5, 5].map(Duration::from_millis)),
            )
            .unwrap()
            .register(
                CIRCUIT_BREAKER_POLICY_NAME,
                Policy::circuit_breaker(FailurePredicate::any(), 5, Duration::from_millis(100)),
            )
            .unwrap();
        policies
    }

    #[fixture]
    fn before_each() -> (Arc<AtomicUsize>, Arc<InMemoryQueryLogSink>) {
        (
            Arc::new(AtomicUsize::new(0)),
            Arc::new(InMemoryQueryLogSink::new()),
        )
    }

    fn processor(
        failures: usize,
        calls: &Arc<AtomicUsize>,
        sink: &Arc<InMemoryQueryLogSink>,
    ) -> QueryProcessor {
        let mut registry = QueryRegistry::new();
        registry
            .register_handler::<Double, _>(FlakyDoubler {
                failures,
                calls: calls.clone(),
            })
            .unwrap();
        QueryProcessor::builder()
            .queries(registry)
            .policies(policies())
            .log_sink(sink.clone())
            .build()
            .unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_execute_a_registered_query(
        before_each: (Arc<AtomicUsize>, Arc<InMemoryQueryLogSink>),
    ) {
        let (calls, sink) = before_each;
        let processor = processor(0, &calls, &sink);
        assert_eq!(processor.execute(Double(21)).await, Ok(42));
        assert_eq!(processor.target_kind::<Double>(), Some(TargetKind::Local));
        assert_eq!(
            processor.decorators::<Double>(),
            Some(DecoratorKind::ALL.to_vec())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_retry_and_log_once(before_each: (Arc<AtomicUsize>, Arc<InMemoryQueryLogSink>)) {
        let (calls, sink) = before_each;
        let processor = processor(2, &calls, &sink);
        let context = QueryContext::new();

        assert_eq!(processor.execute_in(&Double(2), &context).await, Ok(4));
        assert_eq!(context.attempts(), 3);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attempts, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_on_a_query_nobody_registered(
        before_each: (Arc<AtomicUsize>, Arc<InMemoryQueryLogSink>),
    ) {
        let (calls, sink) = before_each;
        let processor = processor(0, &calls, &sink);
        assert!(!processor.is_registered::<Unregistered>());
        assert_eq!(
            processor.execute(Unregistered).await,
            Err(QueryError::NotRegistered {
                query: Unregistered::name()
            })
        );
    }

    #[rstest]
    fn it_should_fail_the_build_for_a_required_but_unresolved_query() {
        let result = QueryProcessor::builder()
            .policies(policies())
            .require::<Unregistered>()
            .build();
        assert!(matches!(
            result,
            Err(ConfigurationError::UnresolvedQuery { query }) if query == Unregistered::name()
        ));
    }

    #[rstest]
    fn it_should_fail_the_build_when_a_policy_is_missing(
        before_each: (Arc<AtomicUsize>, Arc<InMemoryQueryLogSink>),
    ) {
        let (calls, _) = before_each;
        let mut registry = QueryRegistry::new();
        registry
            .register(
                QueryRegistration::<Double>::local(FlakyDoubler { failures: 0, calls })
                    .with_retry_policy("nowhere"),
            )
            .unwrap();
        let result = QueryProcessor::builder()
            .queries(registry)
            .policies(policies())
            .build();
        assert!(matches!(
            result,
            Err(ConfigurationError::UnknownPolicy { name }) if name == "nowhere"
        ));
    }

    #[rstest]
    fn it_should_not_need_policies_for_disabled_decorators(
        before_each: (Arc<AtomicUsize>, Arc<InMemoryQueryLogSink>),
    ) {
        let (calls, _) = before_each;
        let mut registry = QueryRegistry::new();
        registry
            .register(
                QueryRegistration::<Double>::local(FlakyDoubler { failures: 0, calls })
                    .without(DecoratorKind::Retry)
                    .without(DecoratorKind::CircuitBreaker),
            )
            .unwrap();
        let processor = QueryProcessor::builder().queries(registry).build().unwrap();
        assert_eq!(
            processor.decorators::<Double>(),
            Some(vec![DecoratorKind::Logging, DecoratorKind::Fallback])
        );
    }
}
