use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::path::Path;
use thiserror::Error;

use crate::error::ErrorCode;
use crate::gateway::GatewayOptions;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "bugtrack.toml";

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DATABASE_URL is not defined")]
    MissingDatabaseUrl,

    #[error("invalid port '{0}': expected an integer in 0..=65535")]
    InvalidPort(String),

    #[error("invalid host '{0}': expected an IP address or host name")]
    InvalidHost(String),
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingDatabaseUrl => ErrorCode::ConfigMissing,
            Self::InvalidPort(_) | Self::InvalidHost(_) => ErrorCode::ConfigParseError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: default_host(),
            port: default_port(),
            debug: DebugConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    #[serde(default)]
    pub force_create_failure: bool,
}

impl ServerConfig {
    /// Overlay environment values. `lookup` is `std::env::var` in the binary
    /// and a map lookup in tests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] when `PORT` is not a port number.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(host) = lookup("HOST").filter(|host| !host.trim().is_empty()) {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup("PORT").filter(|port| !port.trim().is_empty()) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(flag) = lookup("DEBUG_FORCE_CREATE_FAILURE") {
            self.debug.force_create_failure = flag.trim() == "true";
        }
        Ok(())
    }

    /// The configured connection string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when no source set one.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHost`] when `host` is neither an IP
    /// address nor a resolvable host name.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.host.trim();
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }

        let invalid = || ConfigError::InvalidHost(self.host.clone());
        if host.is_empty() || host.contains(|c: char| c == ':' || c.is_whitespace()) {
            return Err(invalid());
        }
        (host, self.port)
            .to_socket_addrs()
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }

    #[must_use]
    pub const fn gateway_options(&self) -> GatewayOptions {
        GatewayOptions {
            force_create_failure: self.debug.force_create_failure,
        }
    }
}

/// Load the server config file.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
/// read if present and defaults are used otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_server_config(path: Option<&Path>) -> Result<ServerConfig> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(ServerConfig::default());
            }
            default
        }
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ServerConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_host() -> String {
    Ipv4Addr::UNSPECIFIED.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}
