use crate::modules::people::core::person::Person;
use crate::processing::core::query::Query;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPeople;

impl Query for GetPeople {
    type Result = Vec<Person>;
}
