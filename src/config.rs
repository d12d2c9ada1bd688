//! Workbench configuration.

/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Configuration types and settings
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    IndexingConfig,
    ServerConfig,
    SettingsOverrides,
    ValidationError,
    WorkbenchSettings,
};
