use std::{env, path::PathBuf};

use crate::error::{Result, ShiptivityError};

/// Server configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            db_path: PathBuf::from("shiptivity.db"),
        }
    }
}

impl ServerConfig {
    /// Reads `SHIPTIVITY_HOST`, `SHIPTIVITY_PORT` and `SHIPTIVITY_DB`,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(host) = env::var("SHIPTIVITY_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("SHIPTIVITY_PORT") {
            config.port = port.parse().map_err(|_| {
                ShiptivityError::ConfigError(format!("invalid SHIPTIVITY_PORT '{port}'"))
            })?;
        }
        if let Ok(path) = env::var("SHIPTIVITY_DB") {
            config.db_path = PathBuf::from(path);
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.bind_addr(), "127.0.0.1:3001");
        assert_eq!(config.db_path, PathBuf::from("shiptivity.db"));
    }

    #[test]
    fn test_from_env_overrides() {
        env::set_var("SHIPTIVITY_HOST", "0.0.0.0");
        env::set_var("SHIPTIVITY_PORT", "8080");
        env::set_var("SHIPTIVITY_DB", "/tmp/board.db");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.db_path, PathBuf::from("/tmp/board.db"));

        env::remove_var("SHIPTIVITY_HOST");
        env::remove_var("SHIPTIVITY_PORT");
        env::remove_var("SHIPTIVITY_DB");
    }
}
