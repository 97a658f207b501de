use crate::processing::core::query::Query;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRandomQuote;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, async_graphql::SimpleObject)]
pub struct RandomQuote {
    pub quote: String,
    pub author: String,
}

impl RandomQuote {
    /// Served when the quote backend cannot be reached.
    pub fn fallback() -> Self {
        Self {
            quote: "Everything is going to be fine in the end. If it's not fine, it's not the end."
                .into(),
            author: "Oscar Wilde".into(),
        }
    }
}

impl Query for GetRandomQuote {
    type Result = RandomQuote;
}
