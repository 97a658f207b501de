use crate::processing::core::query::Query;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPersonName {
    pub person_id: u32,
}

impl GetPersonName {
    pub fn new(person_id: u32) -> Self {
        Self { person_id }
    }
}

impl Query for GetPersonName {
    type Result = String;
}
