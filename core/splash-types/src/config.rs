//! Bridge settings shared with the sync engine.
//!
//! The core treats most of these values as opaque: it only reads the
//! operating user (the origin stamped on commit notifications) and the
//! feature flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Configuration values for one bridge installation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server identifier issued by the sync engine.
    pub server_id: String,
    /// Shared encryption key for the engine's transport.
    pub encryption_key: String,
    /// Local user the bridge acts as; used as commit origin.
    pub operating_user: String,
    /// Optional behaviours.
    pub features: FeatureFlags,
}

/// Feature switches read by the object adapters and the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Expose every unmapped metadata key as a `meta_*` field.
    pub custom_fields: bool,
    /// Register the order and order-address object types.
    pub orders: bool,
    /// Forward commit notifications at all.
    pub commits: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            custom_fields: false,
            orders: true,
            commits: true,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_id: String::new(),
            encryption_key: String::new(),
            operating_user: "admin".to_string(),
            features: FeatureFlags::default(),
        }
    }
}

impl Settings {
    /// Parses settings from a JSON document. Missing keys take defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads settings from a JSON file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Writes settings to a JSON file.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// True once the engine has issued credentials.
    pub fn is_configured(&self) -> bool {
        !self.server_id.is_empty() && !self.encryption_key.is_empty()
    }
}

// The key never lands in logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("server_id", &self.server_id)
            .field("encryption_key", &"<redacted>")
            .field("operating_user", &self.operating_user)
            .field("features", &self.features)
            .finish()
    }
}
