//! Settings sources consulted by the configuration loader.

use std::collections::HashMap;

use thiserror::Error;

use crate::config::APP_NAMESPACE;

/// Key/value lookup keyed by an application namespace.
///
/// A source reports `None` for a missing key. Empty strings are returned as
/// found; the loader is responsible for treating them as unset.
pub trait SettingsSource {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String>;
}

impl<S: SettingsSource + ?Sized> SettingsSource for &S {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String> {
        (**self).lookup(namespace, key)
    }
}

/// A settings source could not be constructed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("malformed settings document: {0}")]
    Malformed(String),

    #[error("settings namespace '{0}' is not a table")]
    NotATable(String),
}

/// In-memory settings, for hosts that already parsed their configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSettings {
    values: HashMap<(String, String), String>,
}

impl MapSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under the `krb5-sync` namespace.
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_namespaced(APP_NAMESPACE, key, value)
    }

    pub fn with_namespaced(
        mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(namespace, key, value);
        self
    }

    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.values
            .insert((namespace.into(), key.into()), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsSource for MapSettings {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String> {
        self.values
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }
}
