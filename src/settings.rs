use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::util::{read_json, write_json};

// ── Device configuration ─────────────────────────────────────────

/// User-editable configuration: where the device lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeviceConfig {
    /// IP address or hostname of the device, optionally with `http://` or
    /// `https://` and a port.
    #[schemars(title = "Target IP / Hostname")]
    #[serde(default)]
    pub host: String,
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

/// JSON schema of [`DeviceConfig`], used by hosts to render the config form.
pub fn config_schema() -> Value {
    let root = schemars::schema_for!(DeviceConfig);
    serde_json::to_value(root).unwrap_or_else(|_| serde_json::json!({ "type": "object" }))
}

/// Load the config from the app config directory. A missing file yields the
/// default (empty host); an unreadable or malformed one is an error.
pub fn load_config(app_config_dir: &Path) -> Result<DeviceConfig, AppError> {
    let path = crate::paths::config_path(app_config_dir);
    if !path.exists() {
        return Ok(DeviceConfig::default());
    }
    read_json(&path)
}

/// Save the config to the app config directory (atomic write).
pub fn save_config(app_config_dir: &Path, config: &DeviceConfig) -> Result<(), AppError> {
    let save = || -> Result<(), AppError> {
        std::fs::create_dir_all(app_config_dir)?;
        write_json(&crate::paths::config_path(app_config_dir), config)
    };
    save().map_err(|e| AppError::SettingsSaveError {
        message: e.to_string(),
    })
}
