// Environment backed configuration.
//
// Responsibilities
// - Snapshot the environment once at startup.
// - Map `Section` + `Key:Sub` onto `Section__Key__Sub`, compared case-insensitively.

use crate::shared::infrastructure::configuration::Configuration;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct EnvConfiguration {
    variables: HashMap<String, String>,
}

impl EnvConfiguration {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            variables: vars
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_ascii_uppercase(), value.into()))
                .collect(),
        }
    }

    pub fn variable_name(section: &str, key: &str) -> String {
        format!("{section}__{}", key.replace(':', "__")).to_ascii_uppercase()
    }
}

impl Configuration for EnvConfiguration {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.variables
            .get(&Self::variable_name(section, key))
            .cloned()
    }
}
