//! Flat key-value configuration snapshot.

use std::collections::BTreeMap;

/// Merged configuration as seen by extensions.
///
/// Keys are dot-separated (`edc.api.port`). Values are kept as strings;
/// interpreting them is up to the extension reading them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    entries: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Build a configuration from environment variables, translating
    /// `EDC_API_PORT` style keys into `edc.api.port`.
    pub fn from_environment<K, V>(variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            entries: variables
                .into_iter()
                .map(|(key, value)| (env_key_to_config_key(key.as_ref()), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Merge `other` on top of `self`. Keys present in both take the value
    /// from `other`.
    pub fn merge(mut self, other: Config) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Translate an environment variable name into a configuration key.
pub fn env_key_to_config_key(key: &str) -> String {
    key.to_lowercase().replace('_', ".")
}
