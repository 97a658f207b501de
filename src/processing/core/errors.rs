use thiserror::Error;

/// Failure kind used when a handler does not classify its failure.
pub const GENERAL_FAILURE: &str = "general";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct HandlerFailure {
    kind: String,
    message: String,
}

impl HandlerFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self::of_kind(GENERAL_FAILURE, message)
    }

    pub fn of_kind(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("endpoint responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("endpoint timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteQueryFailure {
    #[error("remote call to '{operation}' failed: {failure}")]
    Transport {
        operation: String,
        failure: TransportFailure,
    },

    #[error("could not encode query for '{operation}': {reason}")]
    Encode { operation: String, reason: String },

    #[error("could not decode result of '{operation}': {reason}")]
    Decode { operation: String, reason: String },
}

/// Per-call failures surfaced by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("handler failed: {0}")]
    Handler(#[from] HandlerFailure),

    #[error(transparent)]
    Remote(#[from] RemoteQueryFailure),

    #[error("circuit breaker '{policy}' is open")]
    CircuitOpen { policy: String },

    #[error("retry exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: usize,
        last: Box<QueryError>,
    },

    #[error("no handler or remote endpoint registered for query '{query}'")]
    NotRegistered { query: &'static str },

    #[error("query execution was cancelled")]
    Cancelled,

    #[error("query deadline exceeded")]
    DeadlineExceeded,
}

impl QueryError {
    /// The failure underneath any `RetryExhausted` wrapping.
    pub fn root_cause(&self) -> &QueryError {
        match self {
            QueryError::RetryExhausted { last, .. } => last.root_cause(),
            other => other,
        }
    }

    /// True when the caller gave up, either explicitly or through its deadline.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self.root_cause(),
            QueryError::Cancelled | QueryError::DeadlineExceeded
        )
    }

    pub fn handler_kind(&self) -> Option<&str> {
        match self.root_cause() {
            QueryError::Handler(failure) => Some(failure.kind()),
            _ => None,
        }
    }
}

/// Startup failures. These abort composition and are never recovered at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("query '{query}' is registered more than once")]
    DuplicateRegistration { query: &'static str },

    #[error("query '{query}' has no resolvable handler or remote endpoint")]
    UnresolvedQuery { query: &'static str },

    #[error("unknown policy '{name}'")]
    UnknownPolicy { name: String },

    #[error("policy '{name}' is a {actual} policy, expected a {expected} policy")]
    PolicyKindMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("policy '{name}' is already registered")]
    DuplicatePolicy { name: String },

    #[error("decorator '{decorator}' appears more than once in the chain")]
    DuplicateDecorator { decorator: &'static str },

    #[error("missing configuration value '{section}:{key}'")]
    MissingSetting { section: String, key: String },

    #[error("invalid configuration value for '{section}:{key}': {reason}")]
    InvalidSetting {
        section: String,
        key: String,
        reason: String,
    },
}
