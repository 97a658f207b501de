use crate::modules::people::core::person::{Person, SOMETHING_WENT_TERRIBLY_WRONG};
use crate::processing::core::errors::HandlerFailure;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeopleStoreError {
    #[error("People store offline")]
    Offline,

    #[error("People store corrupted: {0}")]
    Corrupted(String),
}

#[async_trait]
pub trait PeopleStore: Send + Sync {
    async fn all(&self) -> Result<Vec<Person>, PeopleStoreError>;
    async fn find(&self, id: u32) -> Result<Option<Person>, PeopleStoreError>;
}

impl From<PeopleStoreError> for HandlerFailure {
    fn from(error: PeopleStoreError) -> Self {
        match error {
            PeopleStoreError::Offline => HandlerFailure::new(error.to_string()),
            PeopleStoreError::Corrupted(_) => {
                HandlerFailure::of_kind(SOMETHING_WENT_TERRIBLY_WRONG, error.to_string())
            }
        }
    }
}
