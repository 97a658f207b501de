use crate::shared::infrastructure::configuration::Configuration;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct InMemoryConfiguration {
    values: HashMap<(String, String), String>,
}

impl InMemoryConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.values
            .insert((section.into(), key.into()), value.into());
        self
    }
}

impl Configuration for InMemoryConfiguration {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.values
            .get(&(section.to_string(), key.to_string()))
            .cloned()
    }
}
