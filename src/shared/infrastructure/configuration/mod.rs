// Configuration port.
//
// Purpose
// - Read startup settings (remote endpoints, credentials, bind address) without knowing where
//   they live.
//
// Boundaries
// - Read once during composition. Nothing reads configuration per call.

pub mod env;
pub mod in_memory;

use crate::processing::core::errors::ConfigurationError;

pub trait Configuration: Send + Sync {
    /// `key` may be nested with `:`, for example `Azure:baseUri`.
    fn get(&self, section: &str, key: &str) -> Option<String>;
}

pub fn required(
    configuration: &dyn Configuration,
    section: &str,
    key: &str,
) -> Result<String, ConfigurationError> {
    configuration
        .get(section, key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigurationError::MissingSetting {
            section: section.to_string(),
            key: key.to_string(),
        })
}

pub fn parsed_or<T>(
    configuration: &dyn Configuration,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, ConfigurationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match configuration.get(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigurationError::InvalidSetting {
                section: section.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            }),
    }
}
