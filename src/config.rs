//! Server configuration.
//!
//! Three layers, lowest priority first: built-in defaults, an optional TOML
//! configuration file, CLI flags. The base directory for saved files is part
//! of this value and is injected into the store at startup; nothing reads it
//! from ambient process state afterwards.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::HeaderValue;
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_DIR: &str = "SavedFiles";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface the HTTP listener binds to.
    pub bind_address: String,
    pub port: u16,
    /// Base directory for saved XML files.
    pub data_dir: PathBuf,
    /// The single origin allowed to call the API cross-origin.
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl ServerConfig {
    /// Resolve the effective configuration from an optional TOML file and
    /// CLI overrides.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(bind_address) = &cli.bind {
            config.bind_address = bind_address.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(data_dir) = &cli.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(origin) = &cli.origin {
            config.allowed_origin = origin.clone();
        }

        Ok(config)
    }

    /// Load configuration from a TOML file. Missing keys fall back to the
    /// defaults; unknown keys are rejected.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::InvalidFormat {
            details: source.to_string(),
        })
    }

    /// Socket address the listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddress {
                address: format!("{}:{}", self.bind_address, self.port),
                reason: format!("{source}"),
            })
    }

    /// The allowed origin as a header value for the CORS layer.
    pub fn cors_origin(&self) -> Result<HeaderValue, ConfigError> {
        HeaderValue::from_str(&self.allowed_origin).map_err(|_| ConfigError::InvalidOrigin {
            origin: self.allowed_origin.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli_from(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.data_dir, PathBuf::from("SavedFiles"));
        assert_eq!(config.allowed_origin, "http://localhost:3000");
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = cli_from(&[
            "edit-xml",
            "--port",
            "8080",
            "--data-dir",
            "/tmp/xml",
            "--origin",
            "http://localhost:5173",
        ]);
        let config = ServerConfig::from_cli(&cli).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/xml"));
        assert_eq!(config.allowed_origin, "http://localhost:5173");
        assert_eq!(config.bind_address, "127.0.0.1");
    }

    #[test]
    fn test_partial_toml_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 9000").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.data_dir, PathBuf::from("SavedFiles"));
    }

    #[test]
    fn test_cli_overrides_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 9000").unwrap();
        writeln!(file, "data_dir = \"/from/file\"").unwrap();

        let path = file.path().to_string_lossy().into_owned();
        let cli = cli_from(&["edit-xml", "--config", &path, "--port", "9100"]);
        let config = ServerConfig::from_cli(&cli).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.data_dir, PathBuf::from("/from/file"));
    }

    #[test]
    fn test_unknown_toml_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prot = 9000").unwrap();

        let error = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let error = ServerConfig::from_file(Path::new("/no/such/file.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_socket_addr_resolution() {
        let config = ServerConfig::default();
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:5000".parse().unwrap()
        );

        let bad = ServerConfig {
            bind_address: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_cors_origin_resolution() {
        let config = ServerConfig::default();
        assert_eq!(
            config.cors_origin().unwrap(),
            HeaderValue::from_static("http://localhost:3000")
        );

        let bad = ServerConfig {
            allowed_origin: "bad\norigin".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            bad.cors_origin().unwrap_err(),
            ConfigError::InvalidOrigin { .. }
        ));
    }
}
