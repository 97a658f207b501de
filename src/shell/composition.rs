// Composition root.
//
// Purpose
// - Build the one QueryProcessor the sample API serves, once, at startup.
//
// Responsibilities
// - Register the resilience policies under their well-known names.
// - Register the local people handlers and the remote greetings queries per backend.
// - Declare every query the inbound adapters call so a missing one fails startup.
//
// Boundaries
// - Collaborators (configuration, transport, people store, log sink) are passed in, so tests
//   compose the same processor over in-memory adapters.

use crate::modules::greetings::remote::{register_aws_queries, register_azure_queries};
use crate::modules::greetings::use_cases::get_greeting::query::{GetAwsGreeting, GetAzureGreeting};
use crate::modules::greetings::use_cases::get_random_quote::query::GetRandomQuote;
use crate::modules::people::core::person::{
    PERSON_NOT_FOUND, SOMETHING_WENT_TERRIBLY_WRONG, SOMETHING_WENT_TERRIBLY_WRONG_CIRCUIT_BREAKER,
};
use crate::modules::people::core::ports::PeopleStore;
use crate::modules::people::module::PeopleModule;
use crate::modules::people::use_cases::get_people::query::GetPeople;
use crate::modules::people::use_cases::get_person_name::query::GetPersonName;
use crate::processing::core::errors::ConfigurationError;
use crate::processing::policies::predicate::FailurePredicate;
use crate::processing::policies::registry::{
    CIRCUIT_BREAKER_POLICY_NAME, Policy, PolicyRegistry, RETRY_POLICY_NAME,
};
use crate::processing::processor::QueryProcessor;
use crate::processing::registry::QueryRegistry;
use crate::processing::registry::remote::{
    AWS_API_KEY_HEADER, AZURE_FUNCTIONS_KEY_HEADER, RemoteQueryRegistry,
};
use crate::processing::remote::serializer::{JsonRemoteQuerySerializer, RemoteQuerySerializer};
use crate::shared::infrastructure::configuration::Configuration;
use crate::shared::infrastructure::query_log::QueryLogSink;
use crate::shared::infrastructure::transport::RemoteTransport;
use std::sync::Arc;
use std::time::Duration;

pub const REMOTE_QUERIES_SECTION: &str = "RemoteQueries";

pub fn configure_policies() -> Result<PolicyRegistry, ConfigurationError> {
    // A person that does not exist stays missing however often we ask.
    let transient = FailurePredicate::any().except_handler_kind(PERSON_NOT_FOUND);

    let mut policies = PolicyRegistry::new();
    policies
        .register(
            RETRY_POLICY_NAME,
            Policy::retry(transient.clone(), [50, 100, 150].map(Duration::from_millis)),
        )?
        .register(
            CIRCUIT_BREAKER_POLICY_NAME,
            Policy::circuit_breaker(transient, 1, Duration::from_millis(500)),
        )?
        .register(
            SOMETHING_WENT_TERRIBLY_WRONG_CIRCUIT_BREAKER,
            Policy::circuit_breaker(
                FailurePredicate::handler_kind(SOMETHING_WENT_TERRIBLY_WRONG),
                1,
                Duration::from_secs(5),
            ),
        )?;
    Ok(policies)
}

pub fn configure_remote_queries(
    configuration: &dyn Configuration,
    transport: Arc<dyn RemoteTransport>,
) -> Result<Vec<RemoteQueryRegistry>, ConfigurationError> {
    let serializer: Arc<dyn RemoteQuerySerializer> = Arc::new(JsonRemoteQuerySerializer);

    let mut azure = RemoteQueryRegistry::new(
        RemoteQueryRegistry::backend_from_configuration(
            configuration,
            REMOTE_QUERIES_SECTION,
            "Azure",
            "functionsKey",
            AZURE_FUNCTIONS_KEY_HEADER,
        )?,
        serializer.clone(),
        transport.clone(),
    );
    register_azure_queries(&mut azure)?;

    let mut aws = RemoteQueryRegistry::new(
        RemoteQueryRegistry::backend_from_configuration(
            configuration,
            REMOTE_QUERIES_SECTION,
            "AWS",
            "apiKey",
            AWS_API_KEY_HEADER,
        )?,
        serializer,
        transport,
    );
    register_aws_queries(&mut aws)?;

    Ok(vec![azure, aws])
}

pub fn configure_query_processor(
    configuration: &dyn Configuration,
    transport: Arc<dyn RemoteTransport>,
    people: Arc<dyn PeopleStore>,
    log_sink: Arc<dyn QueryLogSink>,
) -> Result<QueryProcessor, ConfigurationError> {
    let mut registry = QueryRegistry::new();
    registry.with_handlers_from(&PeopleModule::new(people))?;
    for remote in configure_remote_queries(configuration, transport)? {
        registry.add_remote_queries(remote)?;
    }

    QueryProcessor::builder()
        .queries(registry)
        .policies(configure_policies()?)
        .log_sink(log_sink)
        .require::<GetPeople>()
        .require::<GetPersonName>()
        .require::<GetRandomQuote>()
        .require::<GetAzureGreeting>()
        .require::<GetAwsGreeting>()
        .build()
}

#[cfg(test)]
mod composition_tests {
    use super::*;
    use crate::modules::people::adapters::outbound::people_in_memory::InMemoryPeople;
    use crate::processing::core::query::QueryContext;
    use crate::processing::decorators::DecoratorKind;
    use crate::processing::registry::TargetKind;
    use crate::shared::infrastructure::configuration::in_memory::InMemoryConfiguration;
    use crate::shared::infrastructure::query_log::in_memory::InMemoryQueryLogSink;
    use crate::shared::infrastructure::transport::in_memory::InMemoryTransport;
    use crate::tests::fixtures::remote_configuration;
    use rstest::rstest;

    fn compose(configuration: &dyn Configuration) -> Result<QueryProcessor, ConfigurationError> {
        configure_query_processor(
            configuration,
            Arc::new(InMemoryTransport::new()),
            Arc::new(InMemoryPeople::seeded()),
            Arc::new(InMemoryQueryLogSink::new()),
        )
    }

    #[rstest]
    fn it_should_register_the_sample_policies() {
        let policies = configure_policies().unwrap();
        assert_eq!(policies.len(), 3);
        assert_eq!(policies.retry(RETRY_POLICY_NAME).unwrap().max_attempts(), 4);
        assert_eq!(
            policies
                .circuit_breaker(SOMETHING_WENT_TERRIBLY_WRONG_CIRCUIT_BREAKER)
                .unwrap()
                .open_duration(),
            Duration::from_secs(5)
        );
    }

    #[rstest]
    fn it_should_route_people_locally_and_greetings_remotely() {
        let processor = compose(&remote_configuration()).unwrap();
        assert_eq!(processor.len(), 5);
        assert_eq!(processor.target_kind::<GetPeople>(), Some(TargetKind::Local));
        assert_eq!(processor.target_kind::<GetRandomQuote>(), Some(TargetKind::Remote));
        assert_eq!(processor.target_kind::<GetAwsGreeting>(), Some(TargetKind::Remote));
        assert_eq!(
            processor.decorators::<GetPersonName>(),
            Some(vec![
                DecoratorKind::Logging,
                DecoratorKind::CircuitBreaker,
                DecoratorKind::Retry
            ])
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_recover_from_a_single_failure_with_a_real_answer() {
        let people = Arc::new(InMemoryPeople::seeded());
        let processor = configure_query_processor(
            &remote_configuration(),
            Arc::new(InMemoryTransport::new()),
            people.clone(),
            Arc::new(InMemoryQueryLogSink::new()),
        )
        .unwrap();
        people.fail_next(1);

        let context = QueryContext::new();
        let result = processor.execute_in(&GetPersonName::new(2), &context).await;

        assert_eq!(result, Ok("Mary".to_string()));
        assert_eq!(context.attempts(), 2);
        assert!(!context.fallback_applied());

        // The recovered failure left the shared breaker closed for everyone else.
        people.fail_next(1);
        let context = QueryContext::new();
        let people_result = processor.execute_in(&GetPeople, &context).await;
        assert_eq!(people_result.map(|people| people.len()), Ok(3));
        assert!(!context.fallback_applied());
    }

    #[rstest]
    fn it_should_refuse_to_start_without_remote_settings() {
        let configuration = InMemoryConfiguration::new()
            .with(REMOTE_QUERIES_SECTION, "Azure:baseUri", "https://functions.example/api")
            .with(REMOTE_QUERIES_SECTION, "Azure:functionsKey", "key");
        assert!(matches!(
            compose(&configuration),
            Err(ConfigurationError::MissingSetting { key, .. }) if key == "AWS:baseUri"
        ));
    }
}
