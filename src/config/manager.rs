//! Settings lifecycle: load, override, validate.

use std::path::PathBuf;

use super::{
    ConfigError,
    SettingsOverrides,
    WorkbenchSettings,
    loader,
};

/// Holds the active workbench settings.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Active settings
    current_settings: WorkbenchSettings,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: WorkbenchSettings::default() }
    }

    /// Loads the workspace config file, applies `overrides` and validates.
    /// Relative paths resolve against `workspace_root`. On error the active
    /// settings are left unchanged.
    ///
    /// # Errors
    /// - Config file read error
    /// - JSON parse error
    /// - Validation errors
    pub fn load_settings(
        &mut self,
        workspace_root: Option<PathBuf>,
        overrides: &SettingsOverrides,
    ) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for workspace: {:?}", workspace_root);

        let settings = if let Some(root) = &workspace_root {
            loader::load_from_workspace(root)?.map_or_else(WorkbenchSettings::default, |ws| {
                tracing::debug!("Loaded workspace settings: {:?}", ws);
                ws
            })
        } else {
            WorkbenchSettings::default()
        };

        let mut settings = overrides.apply(settings);
        if let Some(root) = &workspace_root {
            settings.resolve_paths(root);
        }

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &WorkbenchSettings {
        &self.current_settings
    }
}
