use serde::{Deserialize, Serialize};

/// Failure kind for a person id nobody holds.
pub const PERSON_NOT_FOUND: &str = "not_found";

/// Failure kind for a people store that can no longer be trusted.
pub const SOMETHING_WENT_TERRIBLY_WRONG: &str = "something_went_terribly_wrong";

/// Breaker policy that trips only on [`SOMETHING_WENT_TERRIBLY_WRONG`].
pub const SOMETHING_WENT_TERRIBLY_WRONG_CIRCUIT_BREAKER: &str =
    "SomethingWentTerriblyWrongCircuitBreaker";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, async_graphql::SimpleObject)]
pub struct Person {
    pub id: u32,
    pub name: String,
}

impl Person {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
