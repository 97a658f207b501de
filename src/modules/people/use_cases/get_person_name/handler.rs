use crate::modules::people::core::person::PERSON_NOT_FOUND;
use crate::modules::people::core::ports::PeopleStore;
use crate::modules::people::use_cases::get_person_name::query::GetPersonName;
use crate::processing::core::errors::HandlerFailure;
use crate::processing::core::query::{QueryContext, QueryHandler};
use async_trait::async_trait;
use std::sync::Arc;

pub struct GetPersonNameHandler {
    store: Arc<dyn PeopleStore>,
}

impl GetPersonNameHandler {
    pub fn new(store: Arc<dyn PeopleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QueryHandler<GetPersonName> for GetPersonNameHandler {
    async fn execute(
        &self,
        query: &GetPersonName,
        _: &QueryContext,
    ) -> Result<String, HandlerFailure> {
        match self.store.find(query.person_id).await? {
            Some(person) => Ok(person.name),
            None => Err(HandlerFailure::of_kind(
                PERSON_NOT_FOUND,
                format!("Person {} not found", query.person_id),
            )),
        }
    }
}
