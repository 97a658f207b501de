// Local handlers of the people context.
//
// Purpose
// - Register every people query with the handler, fallback and breakers it runs with.

use crate::modules::people::core::ports::PeopleStore;
use crate::modules::people::use_cases::get_people::handler::GetPeopleHandler;
use crate::modules::people::use_cases::get_people::query::GetPeople;
use crate::modules::people::use_cases::get_person_name::handler::GetPersonNameHandler;
use crate::modules::people::use_cases::get_person_name::query::GetPersonName;
use crate::processing::core::errors::ConfigurationError;
use crate::processing::decorators::DecoratorKind;
use crate::processing::registry::{HandlerModule, QueryRegistration, QueryRegistry};
use crate::modules::people::core::person::SOMETHING_WENT_TERRIBLY_WRONG_CIRCUIT_BREAKER;
use std::sync::Arc;

pub struct PeopleModule {
    store: Arc<dyn PeopleStore>,
}

impl PeopleModule {
    pub fn new(store: Arc<dyn PeopleStore>) -> Self {
        Self { store }
    }
}

impl HandlerModule for PeopleModule {
    fn register_handlers(&self, registry: &mut QueryRegistry) -> Result<(), ConfigurationError> {
        registry
            .register(
                QueryRegistration::<GetPeople>::local(GetPeopleHandler::new(self.store.clone()))
                    .with_fallback(|_, _| Vec::new())
                    .with_circuit_breaker(SOMETHING_WENT_TERRIBLY_WRONG_CIRCUIT_BREAKER),
            )?
            .register(
                // A missing person is an answer, not an outage.
                QueryRegistration::<GetPersonName>::local(GetPersonNameHandler::new(
                    self.store.clone(),
                ))
                .without(DecoratorKind::Fallback),
            )?;
        Ok(())
    }
}
