// Named resilience policies.
//
// Purpose
// - Let decorators refer to policies by a well-known name chosen at composition time.
//
// Responsibilities
// - A name is registered once and never replaced.
// - Lookups of unknown names fail fast with UnknownPolicy.
// - Circuit breakers are shared by reference so one name is one logical breaker.

use crate::processing::core::errors::ConfigurationError;
use crate::processing::policies::circuit_breaker::CircuitBreaker;
use crate::processing::policies::predicate::FailurePredicate;
use crate::processing::policies::retry::RetryPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Name of the retry policy the retry decorator uses unless told otherwise.
pub const RETRY_POLICY_NAME: &str = "query_pipeline.retry";

/// Name of the circuit breaker every query runs under unless told otherwise.
pub const CIRCUIT_BREAKER_POLICY_NAME: &str = "query_pipeline.circuit_breaker";

#[derive(Debug, Clone)]
pub enum Policy {
    Retry(Arc<RetryPolicy>),
    CircuitBreaker(Arc<CircuitBreaker>),
}

impl Policy {
    pub fn retry(predicate: FailurePredicate, delays: impl IntoIterator<Item = Duration>) -> Self {
        Policy::Retry(Arc::new(RetryPolicy::new(predicate, delays)))
    }

    pub fn circuit_breaker(
        predicate: FailurePredicate,
        failure_threshold: u32,
        open_duration: Duration,
    ) -> Self {
        Policy::CircuitBreaker(Arc::new(CircuitBreaker::new(
            predicate,
            failure_threshold,
            open_duration,
        )))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Policy::Retry(_) => "retry",
            Policy::CircuitBreaker(_) => "circuit breaker",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct PolicyRegistry {
    policies: HashMap<String, Policy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        policy: Policy,
    ) -> Result<&mut Self, ConfigurationError> {
        let name = name.into();
        if self.policies.contains_key(&name) {
            return Err(ConfigurationError::DuplicatePolicy { name });
        }
        self.policies.insert(name, policy);
        Ok(self)
    }

    pub fn resolve(&self, name: &str) -> Result<Policy, ConfigurationError> {
        self.policies
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownPolicy {
                name: name.to_string(),
            })
    }

    pub fn retry(&self, name: &str) -> Result<Arc<RetryPolicy>, ConfigurationError> {
        match self.resolve(name)? {
            Policy::Retry(policy) => Ok(policy),
            other => Err(ConfigurationError::PolicyKindMismatch {
                name: name.to_string(),
                expected: "retry",
                actual: other.kind(),
            }),
        }
    }

    pub fn circuit_breaker(&self, name: &str) -> Result<Arc<CircuitBreaker>, ConfigurationError> {
        match self.resolve(name)? {
            Policy::CircuitBreaker(breaker) => Ok(breaker),
            other => Err(ConfigurationError::PolicyKindMismatch {
                name: name.to_string(),
                expected: "circuit breaker",
                actual: other.kind(),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
