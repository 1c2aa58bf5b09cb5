//! TOML-based configuration for lineage runs.
//!
//! Supports a config file (lineage.toml) with environment variable expansion
//! in path values.
//!
//! Example configuration:
//! ```toml
//! [metadata]
//! workbooks = "${LINEAGE_DATA}/workbooks.json"
//! calculated_fields = "${LINEAGE_DATA}/calculated_fields.json"
//! workbook_names = ["Superstore", "Executive Overview"]
//!
//! [resolve]
//! visited_scope = "root"      # or "workbook"
//! flatten = "cartesian"       # or "paired"
//! no_dashboard_label = "NoDashboard"
//!
//! [export]
//! dedup = true
//! sheet_name_limit = 31
//! format = "json"             # "tsv", "dot"
//!
//! [render]
//! theme = "default"           # "blue", "dark"
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::MIN_SHEET_NAME_LIMIT;
use crate::lineage::{FlattenMode, VisitedScope};
use crate::render::ThemeName;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub metadata: MetadataSettings,
    pub resolve: ResolveSettings,
    pub export: ExportSettings,
    pub render: RenderSettings,
    pub logging: LoggingSettings,
}

/// Where pre-fetched metadata documents live.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Workbook document path (supports ${ENV_VAR} expansion).
    pub workbooks: Option<String>,

    /// Calculated-field batch document path (supports ${ENV_VAR} expansion).
    pub calculated_fields: Option<String>,

    /// Workbooks to resolve. Empty means every workbook in the document.
    pub workbook_names: Vec<String>,
}

impl MetadataSettings {
    pub fn workbooks_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        expand_path(self.workbooks.as_deref())
    }

    pub fn calculated_fields_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        expand_path(self.calculated_fields.as_deref())
    }
}

fn expand_path(value: Option<&str>) -> Result<Option<PathBuf>, SettingsError> {
    value
        .map(|v| expand_env_vars(v).map(PathBuf::from))
        .transpose()
}

/// Traversal settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolveSettings {
    /// Lifetime of the visited set.
    pub visited_scope: VisitedScope,

    /// How multi-valued physical references become rows.
    pub flatten: FlattenMode,

    /// Dashboard label for sheets not placed on any dashboard.
    pub no_dashboard_label: String,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            visited_scope: VisitedScope::Root,
            flatten: FlattenMode::Cartesian,
            no_dashboard_label: "NoDashboard".to_string(),
        }
    }
}

/// Output format of resolved rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Sheets of rows, one per workbook.
    #[default]
    Json,
    Tsv,
    /// Rows merged into a lineage graph, rendered with `[render].theme`.
    Dot,
}

/// Tabular export settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Drop rows that are structurally identical.
    pub dedup: bool,

    /// Maximum sheet name length in characters.
    pub sheet_name_limit: usize,

    pub format: ExportFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dedup: true,
            sheet_name_limit: 31,
            format: ExportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSettings {
    pub theme: ThemeName,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `LINEAGE_CONFIG`
    /// 2. `./lineage.toml`
    /// 3. `~/.config/lineage/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("LINEAGE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("lineage.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("lineage").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.export.sheet_name_limit < MIN_SHEET_NAME_LIMIT {
            return Err(SettingsError::InvalidConfig(format!(
                "export.sheet_name_limit must be at least {}",
                MIN_SHEET_NAME_LIMIT
            )));
        }
        if self.resolve.no_dashboard_label.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "resolve.no_dashboard_label must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    var_name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if var_name.is_empty() {
                // Lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
