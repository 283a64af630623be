use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Environment variable naming the API base URL.
pub const SERVER_ENV: &str = "BUGTRACK_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: Option<String>,
}

/// Load `<config_dir>/bugtrack/config.toml`, or defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_client_config() -> Result<ClientConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ClientConfig::default());
    };

    load_client_config_from(&config_dir.join("bugtrack/config.toml"))
}

/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_client_config_from(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ClientConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Pick the API base URL: flag, then environment, then user config, then
/// the default.
#[must_use]
pub fn resolve_server_url(
    flag: Option<&str>,
    env_value: Option<&str>,
    config: &ClientConfig,
) -> String {
    [flag, env_value, config.server.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_SERVER_URL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, DEFAULT_SERVER_URL, load_client_config_from, resolve_server_url};

    #[test]
    fn precedence_is_flag_env_file_default() {
        let config = ClientConfig {
            server: Some("http://file:1".to_string()),
        };

        assert_eq!(
            resolve_server_url(Some("http://flag:1"), Some("http://env:1"), &config),
            "http://flag:1"
        );
        assert_eq!(
            resolve_server_url(None, Some("http://env:1"), &config),
            "http://env:1"
        );
        assert_eq!(resolve_server_url(None, Some("  "), &config), "http://file:1");
        assert_eq!(
            resolve_server_url(None, None, &ClientConfig::default()),
            DEFAULT_SERVER_URL
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = load_client_config_from(&dir.path().join("config.toml")).expect("load");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn file_sets_server() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server = \"http://bugs.internal:8080\"\n").expect("write");

        let config = load_client_config_from(&path).expect("load");
        assert_eq!(config.server.as_deref(), Some("http://bugs.internal:8080"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server = [").expect("write");
        assert!(load_client_config_from(&path).is_err());
    }
}
