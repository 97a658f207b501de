use crate::processing::core::query::Query;
use serde::{Deserialize, Serialize};

/// Greeting produced by the Azure Functions backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAzureGreeting {
    pub name: String,
}

/// Greeting produced by the AWS Lambda backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAwsGreeting {
    pub name: String,
}

impl Query for GetAzureGreeting {
    type Result = String;
}

impl Query for GetAwsGreeting {
    type Result = String;
}
