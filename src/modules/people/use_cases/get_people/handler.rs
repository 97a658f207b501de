use crate::modules::people::core::person::Person;
use crate::modules::people::core::ports::PeopleStore;
use crate::modules::people::use_cases::get_people::query::GetPeople;
use crate::processing::core::errors::HandlerFailure;
use crate::processing::core::query::{QueryContext, QueryHandler};
use async_trait::async_trait;
use std::sync::Arc;

pub struct GetPeopleHandler {
    store: Arc<dyn PeopleStore>,
}

impl GetPeopleHandler {
    pub fn new(store: Arc<dyn PeopleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QueryHandler<GetPeople> for GetPeopleHandler {
    async fn execute(&self, _: &GetPeople, _: &QueryContext) -> Result<Vec<Person>, HandlerFailure> {
        Ok(self.store.all().await?)
    }
}
