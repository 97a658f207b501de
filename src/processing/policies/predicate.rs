use crate::processing::core::errors::QueryError;
use std::fmt;
use std::sync::Arc;

type Matcher = Arc<dyn Fn(&QueryError) -> bool + Send + Sync>;

/// Decides which failures a policy reacts to.
///
/// Matching is done against [`QueryError::root_cause`]. Cancellations never qualify unless the
/// predicate was built with [`FailurePredicate::counting_cancellation`].
#[derive(Clone)]
pub struct FailurePredicate {
    description: String,
    matcher: Matcher,
    counts_cancellation: bool,
}

impl fmt::Debug for FailurePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailurePredicate")
            .field("description", &self.description)
            .field("counts_cancellation", &self.counts_cancellation)
            .finish()
    }
}

impl FailurePredicate {
    pub fn custom<F>(description: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&QueryError) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            matcher: Arc::new(matcher),
            counts_cancellation: false,
        }
    }

    pub fn any() -> Self {
        Self::custom("any failure", |_| true)
    }

    pub fn handler_kind(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self::custom(format!("handler failure of kind '{kind}'"), move |error| {
            error.handler_kind() == Some(kind.as_str())
        })
    }

    pub fn remote() -> Self {
        Self::custom("remote query failure", |error| {
            matches!(error, QueryError::Remote(_))
        })
    }

    /// Narrows the predicate so handler failures of `kind` no longer match.
    pub fn except_handler_kind(self, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        let inner = self.matcher;
        Self {
            description: format!("{} except '{kind}'", self.description),
            matcher: Arc::new(move |error| {
                error.handler_kind() != Some(kind.as_str()) && inner(error)
            }),
            counts_cancellation: self.counts_cancellation,
        }
    }

    pub fn counting_cancellation(mut self) -> Self {
        self.counts_cancellation = true;
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn qualifies(&self, error: &QueryError) -> bool {
        if error.is_cancellation() {
            return self.counts_cancellation;
        }
        (self.matcher)(error.root_cause())
    }
}
