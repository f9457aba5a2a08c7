//! Propagation configuration and its loader.
//!
//! The configuration is built once when the host loads the hooks and is
//! read-only afterwards. Every field is optional: an absent or empty setting
//! is stored as `None`, never as an empty string.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::settings::SettingsSource;

/// Application namespace the settings are read from.
pub const APP_NAMESPACE: &str = "krb5-sync";

/// Setting names read by [`SyncConfig::load`].
pub mod keys {
    pub const AD_KEYTAB: &str = "ad_keytab";
    pub const AD_PRINCIPAL: &str = "ad_principal";
    pub const AD_REALM: &str = "ad_realm";
    pub const AD_ADMIN_SERVER: &str = "ad_admin_server";
    pub const AFS_SRVTAB: &str = "afs_srvtab";
    pub const AFS_PRINCIPAL: &str = "afs_principal";
    pub const AFS_REALM: &str = "afs_realm";

    pub const ALL: [&str; 7] = [
        AD_KEYTAB,
        AD_PRINCIPAL,
        AD_REALM,
        AD_ADMIN_SERVER,
        AFS_SRVTAB,
        AFS_PRINCIPAL,
        AFS_REALM,
    ];
}

/// Settings for the directory service (propagated in precommit).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Keytab used to authenticate as `principal`.
    #[serde(default, deserialize_with = "non_empty")]
    pub keytab: Option<String>,

    /// Administrator principal used for the password change.
    #[serde(default, deserialize_with = "non_empty")]
    pub principal: Option<String>,

    /// Directory realm. Its presence alone enables propagation.
    #[serde(default, deserialize_with = "non_empty")]
    pub realm: Option<String>,

    /// Admin server address (host or host:port).
    #[serde(default, deserialize_with = "non_empty")]
    pub admin_server: Option<String>,
}

impl DirectoryConfig {
    /// Whether precommit should attempt propagation.
    ///
    /// Only the realm is required; missing credentials surface as a
    /// collaborator failure, which blocks the change.
    pub fn is_active(&self) -> bool {
        self.realm.is_some()
    }
}

/// Settings for the legacy authentication server (propagated in postcommit).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyConfig {
    /// Srvtab holding the key for `principal`.
    #[serde(default, deserialize_with = "non_empty")]
    pub srvtab: Option<String>,

    #[serde(default, deserialize_with = "non_empty")]
    pub principal: Option<String>,

    #[serde(default, deserialize_with = "non_empty")]
    pub realm: Option<String>,
}

impl LegacyConfig {
    /// Whether postcommit should attempt propagation (all three fields set).
    pub fn is_active(&self) -> bool {
        self.realm.is_some() && self.srvtab.is_some() && self.principal.is_some()
    }
}

/// Immutable configuration shared by every hook invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub legacy: LegacyConfig,
}

impl SyncConfig {
    /// Build the configuration from the `krb5-sync` settings namespace.
    ///
    /// Missing settings are not errors; they leave the field unset.
    pub fn load<S: SettingsSource + ?Sized>(source: &S) -> Self {
        let setting = |key: &str| {
            source
                .lookup(APP_NAMESPACE, key)
                .filter(|value| !value.is_empty())
        };

        let config = Self {
            directory: DirectoryConfig {
                keytab: setting(keys::AD_KEYTAB),
                principal: setting(keys::AD_PRINCIPAL),
                realm: setting(keys::AD_REALM),
                admin_server: setting(keys::AD_ADMIN_SERVER),
            },
            legacy: LegacyConfig {
                srvtab: setting(keys::AFS_SRVTAB),
                principal: setting(keys::AFS_PRINCIPAL),
                realm: setting(keys::AFS_REALM),
            },
        };

        debug!(
            directory_active = config.directory.is_active(),
            legacy_active = config.legacy.is_active(),
            "loaded password synchronization configuration"
        );
        config
    }

    pub fn with_directory(mut self, directory: DirectoryConfig) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_legacy(mut self, legacy: LegacyConfig) -> Self {
        self.legacy = legacy;
        self
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}
