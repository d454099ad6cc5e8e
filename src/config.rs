use config::{Config, Environment, File};
use log::debug;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{FetchError, Result};

const DEFAULT_SERVER_PORT: u16 = 21;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Configuration for the ftp-fetch client, layered from built-in defaults,
/// an optional `config.toml`, and `FTP_FETCH_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// FTP server control port
    pub server_port: u16,

    /// Timeout for connects and socket reads/writes, in seconds
    pub timeout_secs: u64,

    /// Local directory downloaded files are written to
    pub download_dir: String,
}

impl ClientConfig {
    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from the named file (extension optional), which
    /// may be absent
    pub fn load_from(config_file: &str) -> Result<Self> {
        let builder = Config::builder()
            .set_default("server_port", i64::from(DEFAULT_SERVER_PORT))
            .map_err(config_error)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)
            .map_err(config_error)?
            .set_default("download_dir", DEFAULT_DOWNLOAD_DIR)
            .map_err(config_error)?
            .add_source(File::with_name(config_file).required(false))
            .add_source(Environment::with_prefix("FTP_FETCH"));

        let config: ClientConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)?;

        config.validate()?;
        debug!("Loaded configuration: {config}");
        Ok(config)
    }

    /// Validate the basic configuration
    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(FetchError::InvalidConfig(
                "server_port cannot be 0".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(FetchError::InvalidConfig(
                "timeout_secs cannot be 0".to_string(),
            ));
        }

        if self.download_dir.is_empty() {
            return Err(FetchError::InvalidConfig(
                "download_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Timeout bound as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn config_error(e: config::ConfigError) -> FetchError {
    FetchError::InvalidConfig(e.to_string())
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            download_dir: DEFAULT_DOWNLOAD_DIR.to_string(),
        }
    }
}

impl std::fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "port: {}, timeout: {}s, download dir: {}",
            self.server_port, self.timeout_secs, self.download_dir
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_standard_ftp_port() {
        let config = ClientConfig::default();
        assert_eq!(config.server_port, 21);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.download_dir, "downloads");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn timeout_converts_to_duration() {
        let config = ClientConfig {
            timeout_secs: 5,
            ..ClientConfig::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn validate_rejects_zero_port() {
        let config = ClientConfig {
            server_port: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_download_dir() {
        let config = ClientConfig {
            download_dir: String::new(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
