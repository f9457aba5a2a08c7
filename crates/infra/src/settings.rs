//! Settings sources backed by the process environment or a JSON document.

use core::str::FromStr;

use serde_json::{Map, Value as JsonValue};

use krb5_sync_core::{SettingsError, SettingsSource};

/// Reads settings from environment variables.
///
/// `ad_realm` in the `krb5-sync` namespace is read from `KRB5_SYNC_AD_REALM`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl EnvSettings {
    pub fn new() -> Self {
        Self
    }

    /// Environment variable holding `key` within `namespace`.
    pub fn variable_name(namespace: &str, key: &str) -> String {
        format!("{namespace}_{key}")
            .chars()
            .map(|c| match c {
                '-' | '.' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl SettingsSource for EnvSettings {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String> {
        std::env::var(Self::variable_name(namespace, key)).ok()
    }
}

/// Settings held in a decoded JSON document.
///
/// The document is an object of namespaces, each an object of string
/// values: `{"krb5-sync": {"ad_realm": "EXAMPLE.COM"}}`. Non-string values
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonSettings {
    namespaces: Map<String, JsonValue>,
}

impl JsonSettings {
    pub fn from_value(value: JsonValue) -> Result<Self, SettingsError> {
        let JsonValue::Object(namespaces) = value else {
            return Err(SettingsError::Malformed(
                "top-level value must be an object".to_string(),
            ));
        };

        for (name, table) in &namespaces {
            if !table.is_object() {
                return Err(SettingsError::NotATable(name.clone()));
            }
        }

        Ok(Self { namespaces })
    }
}

impl FromStr for JsonSettings {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: JsonValue = serde_json::from_str(s)
            .map_err(|e| SettingsError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }
}

impl SettingsSource for JsonSettings {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String> {
        self.namespaces
            .get(namespace)?
            .get(key)?
            .as_str()
            .map(str::to_string)
    }
}
