//! Config file loading.

use std::path::Path;

use super::{
    ConfigError,
    WorkbenchSettings,
};

/// Name of the config file looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".l10n-workbench.json";

/// Loads settings from the workspace root.
///
/// # Returns
/// - `Ok(Some(settings))`: the config file exists and parses
/// - `Ok(None)`: there is no config file
/// - `Err(ConfigError)`: read or parse failure
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<WorkbenchSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: WorkbenchSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}
