//! Configuration management
//!
//! Reads and writes `settings.json` in the data directory:
//! ```json
//! {
//!   "import": { "earningsColumn": "revenue", "skipHeader": false },
//!   "catalog": { "buyers": { ... }, "sites": { ... }, "series": { ... } }
//! }
//! ```
//! Keys this crate does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::CatalogOverrides;
use crate::ingest::EarningsColumn;

/// Environment variable overriding `import.earningsColumn`
pub const EARNINGS_COLUMN_ENV: &str = "BUYERDASH_EARNINGS_COLUMN";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    import: ImportSettings,
    #[serde(default, skip_serializing_if = "CatalogOverrides::is_empty")]
    catalog: CatalogOverrides,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Import defaults, overridable per run from the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSettings {
    #[serde(default)]
    pub earnings_column: EarningsColumn,
    #[serde(default)]
    pub skip_header: bool,
}

/// Buyerdash configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub import: ImportSettings,
    pub catalog: CatalogOverrides,
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing or unreadable settings file yields defaults. The earnings
    /// column can be overridden with `BUYERDASH_EARNINGS_COLUMN`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let mut import = raw.import;
        if let Some(column) = earnings_override(std::env::var(EARNINGS_COLUMN_ENV).ok().as_deref())
        {
            import.earnings_column = column;
        }

        Ok(Self {
            import,
            catalog: raw.catalog,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");

        // Load existing settings to preserve fields we don't manage
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.import = self.import.clone();
        settings.catalog = self.catalog.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

/// Unrecognized values are ignored rather than failing every command
fn earnings_override(value: Option<&str>) -> Option<EarningsColumn> {
    value.and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path()).unwrap();
        assert!(!config.import.skip_header);
        assert!(config.catalog.is_empty());
    }

    #[test]
    fn test_load_camel_case_settings() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{
                "import": { "skipHeader": true },
                "catalog": { "series": { "NEW": "Série Nova" } }
            }"#,
        )
        .unwrap();

        let config = Config::load(temp_dir.path()).unwrap();
        assert!(config.import.skip_header);
        assert_eq!(config.catalog.series["NEW"], "Série Nova");
    }

    #[test]
    fn test_invalid_settings_fall_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("settings.json"), "{ not json").unwrap();

        let config = Config::load(temp_dir.path()).unwrap();
        assert!(!config.import.skip_header);
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "theme": "dark", "import": { "skipHeader": false } }"#).unwrap();

        let mut config = Config::load(temp_dir.path()).unwrap();
        config.import.skip_header = true;
        config.import.earnings_column = EarningsColumn::Profit;
        config.save(temp_dir.path()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["import"]["skipHeader"], true);
        assert_eq!(saved["import"]["earningsColumn"], "profit");
        assert!(saved.get("catalog").is_none());
    }

    #[test]
    fn test_earnings_override() {
        assert_eq!(earnings_override(Some("profit")), Some(EarningsColumn::Profit));
        assert_eq!(earnings_override(Some("REVENUE")), Some(EarningsColumn::Revenue));
        assert_eq!(earnings_override(Some("net")), None);
        assert_eq!(earnings_override(None), None);
    }
}
