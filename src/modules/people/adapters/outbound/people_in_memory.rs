// In memory implementation of the PeopleStore port.
//
// Purpose
// - Serve the sample people without a database.
//
// Responsibilities
// - Keep people ordered by id.
// - Simulate an unavailable store (toggle_offline), a corrupted one (toggle_corrupted) and a
//   number of transient failures (fail_next).

use crate::modules::people::core::person::Person;
use crate::modules::people::core::ports::{PeopleStore, PeopleStoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryPeople {
    people: RwLock<BTreeMap<u32, String>>,
    is_offline: AtomicBool,
    is_corrupted: AtomicBool,
    transient_failures: AtomicUsize,
}

impl InMemoryPeople {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_people<I, S>(people: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            people: RwLock::new(
                people
                    .into_iter()
                    .map(|(id, name)| (id, name.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// The people the sample API starts with.
    pub fn seeded() -> Self {
        Self::with_people([(1, "Jonny"), (2, "Mary"), (3, "Steve")])
    }

    pub async fn insert(&self, person: Person) {
        self.people.write().await.insert(person.id, person.name);
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn toggle_corrupted(&self) {
        self.is_corrupted.fetch_xor(true, Ordering::SeqCst);
    }

    /// Makes the next `count` reads fail as if the store were offline.
    pub fn fail_next(&self, count: usize) {
        self.transient_failures.store(count, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), PeopleStoreError> {
        if self.is_corrupted.load(Ordering::SeqCst) {
            return Err(PeopleStoreError::Corrupted(
                "checksum mismatch in people index".into(),
            ));
        }
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(PeopleStoreError::Offline);
        }
        let consumed = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if consumed.is_ok() {
            return Err(PeopleStoreError::Offline);
        }
        Ok(())
    }
}

#[async_trait]
impl PeopleStore for InMemoryPeople {
    async fn all(&self) -> Result<Vec<Person>, PeopleStoreError> {
        self.check_available()?;
        Ok(self
            .people
            .read()
            .await
            .iter()
            .map(|(id, name)| Person::new(*id, name.clone()))
            .collect())
    }

    async fn find(&self, id: u32) -> Result<Option<Person>, PeopleStoreError> {
        self.check_available()?;
        Ok(self
            .people
            .read()
            .await
            .get(&id)
            .map(|name| Person::new(id, name.clone())))
    }
}
