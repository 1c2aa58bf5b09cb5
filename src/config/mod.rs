//! Configuration module.
//!
//! Handles the TOML config file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, ExportFormat, ExportSettings, LoggingSettings, MetadataSettings,
    RenderSettings, ResolveSettings, Settings, SettingsError,
};
