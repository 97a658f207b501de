// Remote queries of the greetings context.
//
// Purpose
// - Bind the greetings queries to the operations the cloud backends expose.
//
// Boundaries
// - Backend addresses and credentials come from the composition root, not from here.

use crate::modules::greetings::use_cases::get_greeting::query::{GetAwsGreeting, GetAzureGreeting};
use crate::modules::greetings::use_cases::get_random_quote::query::{GetRandomQuote, RandomQuote};
use crate::processing::core::errors::ConfigurationError;
use crate::processing::registry::remote::RemoteQueryRegistry;

pub const RANDOM_QUOTE_OPERATION: &str = "RandomQuote";
pub const AZURE_GREETING_OPERATION: &str = "DarkerGreeting";
pub const AWS_GREETING_OPERATION: &str = "darkerHelloWorld";

pub fn register_azure_queries(azure: &mut RemoteQueryRegistry) -> Result<(), ConfigurationError> {
    azure
        .register_with::<GetRandomQuote, _>(RANDOM_QUOTE_OPERATION, |registration| {
            registration.with_fallback(|_, _| RandomQuote::fallback())
        })?
        .register::<GetAzureGreeting>(AZURE_GREETING_OPERATION)?;
    Ok(())
}

pub fn register_aws_queries(aws: &mut RemoteQueryRegistry) -> Result<(), ConfigurationError> {
    aws.register::<GetAwsGreeting>(AWS_GREETING_OPERATION)?;
    Ok(())
}
