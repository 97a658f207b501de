// Decorator chain.
//
// Purpose
// - Wrap every query target in the same ordered stages of cross-cutting behaviour.
//
// Responsibilities
// - Hold the configured outer-to-inner order of decorator kinds (total, no repeats).
// - Resolve each registration's stages once, when the processor is built.
// - Run the stages for one execution, innermost stage last, then the target.
//
// Boundaries
// - Policies are looked up by name at build time only; nothing is resolved per call.

pub mod circuit_breaker;
pub mod fallback;
pub mod logging;
pub mod retry;

use crate::processing::core::errors::{ConfigurationError, QueryError};
use crate::processing::core::query::{Query, QueryContext};
use crate::processing::policies::registry::PolicyRegistry;
use crate::processing::policies::retry::RetryPolicy;
use crate::processing::registry::{DecoratorSettings, QueryRegistration};
use crate::shared::infrastructure::query_log::QueryLogSink;
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use self::circuit_breaker::NamedBreaker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    Logging,
    Fallback,
    CircuitBreaker,
    Retry,
}

impl DecoratorKind {
    pub const ALL: [DecoratorKind; 4] = [
        DecoratorKind::Logging,
        DecoratorKind::Fallback,
        DecoratorKind::CircuitBreaker,
        DecoratorKind::Retry,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DecoratorKind::Logging => "logging",
            DecoratorKind::Fallback => "fallback",
            DecoratorKind::Retry => "retry",
            DecoratorKind::CircuitBreaker => "circuit_breaker",
        }
    }
}

impl fmt::Display for DecoratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outer-to-inner order of the decorators every query runs through.
///
/// Kinds left out of the order never run. A kind may appear at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorChain {
    order: Vec<DecoratorKind>,
}

impl Default for DecoratorChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl DecoratorChain {
    pub fn new(order: impl IntoIterator<Item = DecoratorKind>) -> Result<Self, ConfigurationError> {
        let order: Vec<DecoratorKind> = order.into_iter().collect();
        let mut seen = HashSet::new();
        for kind in &order {
            if !seen.insert(*kind) {
                return Err(ConfigurationError::DuplicateDecorator {
                    decorator: kind.name(),
                });
            }
        }
        Ok(Self { order })
    }

    /// Logging, fallback, the breakers, then retry right in front of the target.
    ///
    /// Breakers count a query once its retries are used up, so a failure that a retry
    /// recovers never trips them.
    pub fn standard() -> Self {
        Self {
            order: DecoratorKind::ALL.to_vec(),
        }
    }

    pub fn order(&self) -> &[DecoratorKind] {
        &self.order
    }

    /// Turns the chain into the concrete stages of one registration.
    pub(crate) fn resolve(
        &self,
        settings: &DecoratorSettings,
        policies: &PolicyRegistry,
        log_sink: &Arc<dyn QueryLogSink>,
    ) -> Result<Vec<Stage>, ConfigurationError> {
        let mut stages = Vec::with_capacity(self.order.len());
        for kind in &self.order {
            if !settings.is_enabled(*kind) {
                continue;
            }
            let stage = match kind {
                DecoratorKind::Logging => Stage::Logging(log_sink.clone()),
                DecoratorKind::Fallback => Stage::Fallback,
                DecoratorKind::Retry => Stage::Retry(policies.retry(&settings.retry_policy)?),
                DecoratorKind::CircuitBreaker => {
                    let breakers = settings
                        .circuit_breakers
                        .iter()
                        .map(|name| {
                            policies
                                .circuit_breaker(name)
                                .map(|breaker| NamedBreaker::new(name.clone(), breaker))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    if breakers.is_empty() {
                        continue;
                    }
                    Stage::CircuitBreakers(breakers)
                }
            };
            stages.push(stage);
        }
        Ok(stages)
    }
}

/// One resolved decorator of a pipeline.
#[derive(Clone)]
pub(crate) enum Stage {
    Logging(Arc<dyn QueryLogSink>),
    Fallback,
    Retry(Arc<RetryPolicy>),
    CircuitBreakers(Vec<NamedBreaker>),
}

impl Stage {
    pub(crate) fn kind(&self) -> DecoratorKind {
        match self {
            Stage::Logging(_) => DecoratorKind::Logging,
            Stage::Fallback => DecoratorKind::Fallback,
            Stage::Retry(_) => DecoratorKind::Retry,
            Stage::CircuitBreakers(_) => DecoratorKind::CircuitBreaker,
        }
    }
}

/// Runs `stages` outer to inner around the registration's target.
pub(crate) fn run_stages<'a, Q: Query>(
    stages: &'a [Stage],
    registration: &'a QueryRegistration<Q>,
    query: &'a Q,
    context: &'a QueryContext,
) -> BoxFuture<'a, Result<Q::Result, QueryError>> {
    let Some((stage, inner)) = stages.split_first() else {
        return Box::pin(async move {
            context.record_attempt();
            context
                .guard(registration.target().invoke(query, context))
                .await
        });
    };
    let next = move || run_stages(inner, registration, query, context);
    match stage {
        Stage::Logging(sink) => Box::pin(logging::around(sink.as_ref(), query, context, next)),
        Stage::Fallback => Box::pin(fallback::around(
            registration.fallback(),
            query,
            context,
            next,
        )),
        Stage::Retry(policy) => Box::pin(retry::around(policy, Q::name(), context, next)),
        Stage::CircuitBreakers(breakers) => circuit_breaker::around(breakers, next),
    }
}
