use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::check::alert::AlertConfig;
use crate::check::schedule::CheckPolicy;

// =============================================================================
// Time-related constants
// =============================================================================

pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Connect timeout for the manifest request in milliseconds (10 seconds)
pub const FETCH_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Read timeout for the manifest request in milliseconds (10 seconds)
pub const FETCH_READ_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// Persisted state keys
// =============================================================================

pub const KEY_LAST_CHECK_DATE: &str = "last_check_date";
pub const KEY_SKIPPED_VERSION: &str = "skipped_version";

/// Store page opened on "update" when no `storeUrl` is configured; the app
/// identifier is appended
pub const STORE_PAGE_URL: &str = "https://play.google.com/store/apps/details?id=";

/// Checker configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerConfig {
    pub check_policy: CheckPolicy,
    pub alerts: AlertConfig,
    /// Name shown in the alert message
    pub app_name: Option<String>,
    pub store_url: Option<String>,
}

impl CheckerConfig {
    /// Read a JSON config file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}

/// Returns the path to the data directory for update-siren.
/// Uses $XDG_DATA_HOME/update-siren if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/update-siren,
/// or ./update-siren if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the state database inside `data_dir`.
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("state.db")
}

/// Returns the path to the log file inside `data_dir`.
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("update-siren.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("update-siren")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::alert::AlertDirective;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn checker_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<CheckerConfig>(json!({
            "checkPolicy": "weekly"
        }))
        .unwrap();

        assert_eq!(result.check_policy, CheckPolicy::Weekly);
        assert_eq!(result.alerts, AlertConfig::default());
        assert_eq!(result.app_name, None);
        assert_eq!(result.store_url, None);
    }

    #[test]
    fn checker_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<CheckerConfig>(json!({
            "checkPolicy": "daily",
            "alerts": {
                "major": "force",
                "minor": "skip",
                "patch": "option",
                "revision": "none",
                "versionCode": "force"
            },
            "appName": "Notes",
            "storeUrl": "https://example.com/notes"
        }))
        .unwrap();

        assert_eq!(
            result,
            CheckerConfig {
                check_policy: CheckPolicy::Daily,
                alerts: AlertConfig {
                    major: AlertDirective::Force,
                    minor: AlertDirective::Skip,
                    patch: AlertDirective::Option,
                    revision: AlertDirective::None,
                    version_code: AlertDirective::Force,
                },
                app_name: Some("Notes".to_string()),
                store_url: Some("https://example.com/notes".to_string()),
            }
        );
    }

    #[test]
    fn checker_config_rejects_unknown_directive() {
        let result = serde_json::from_value::<CheckerConfig>(json!({
            "alerts": { "major": "sometimes" }
        }));

        assert!(result.is_err());
    }

    #[test]
    fn load_reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"appName": "Notes"}}"#).unwrap();

        let config = CheckerConfig::load(file.path()).unwrap();
        assert_eq!(config.app_name.as_deref(), Some("Notes"));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/update-siren"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/update-siren"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./update-siren"));
    }
}
