use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

use crate::error::ConfigError;

pub const DEFAULT_ADDRESS: &str = "https://127.0.0.1:8200";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const TOKEN_FILE_NAME: &str = ".vault-token";

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub address: String,
    pub token: String,
    pub log_level: Level,
    pub timeout_seconds: u64,
}

/// One source of settings; unset fields fall through to the next layer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigLayer {
    pub address: Option<String>,
    pub token: Option<String>,
    pub log_level: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl ConfigLayer {
    /// Load a layer from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fill unset fields of `self` from `lower`
    pub fn or(self, lower: ConfigLayer) -> Self {
        Self {
            address: self.address.or(lower.address),
            token: self.token.or(lower.token),
            log_level: self.log_level.or(lower.log_level),
            timeout_seconds: self.timeout_seconds.or(lower.timeout_seconds),
        }
    }
}

impl Config {
    /// Resolve settings from the command line layer, an optional config file
    /// and the token file in `home`
    pub fn resolve(
        cli: ConfigLayer,
        config_file: Option<&Path>,
        home: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => {
                debug!("Loading config file {:?}", path);
                ConfigLayer::from_file(path)?
            }
            None => ConfigLayer::default(),
        };
        let layer = cli.or(file);

        let log_level = parse_log_level(layer.log_level.as_deref().unwrap_or("info"))?;
        let token = match layer.token {
            Some(token) => token,
            None => home.and_then(vault_token_from_disk).unwrap_or_default(),
        };

        Ok(Self {
            address: layer
                .address
                .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            token,
            log_level,
            timeout_seconds: layer.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        })
    }
}

/// The user's home directory, taken from `HOME`
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Read the token left behind by `vault login`, if any
pub fn vault_token_from_disk(home: &Path) -> Option<String> {
    let path = home.join(TOKEN_FILE_NAME);
    match fs::read_to_string(&path) {
        Ok(contents) => Some(contents.trim().to_string()),
        Err(e) => {
            debug!("No token read from {:?}: {}", path, e);
            None
        }
    }
}

/// Parse a log verbosity name
pub fn parse_log_level(name: &str) -> Result<Level, ConfigError> {
    match name.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" | "fatal" | "panic" => Ok(Level::ERROR),
        _ => Err(ConfigError::InvalidLogLevel(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let home = TempDir::new().unwrap();
        let config = Config::resolve(ConfigLayer::default(), None, Some(home.path())).unwrap();

        assert_eq!(config.address, "https://127.0.0.1:8200");
        assert_eq!(config.token, "");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.timeout_seconds, 60);
    }

    #[test]
    fn test_token_from_disk_is_trimmed() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join(".vault-token"), "s.abcdef\n").unwrap();

        let config = Config::resolve(ConfigLayer::default(), None, Some(home.path())).unwrap();
        assert_eq!(config.token, "s.abcdef");
    }

    #[test]
    fn test_explicit_token_beats_disk() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join(".vault-token"), "from-disk").unwrap();

        let cli = ConfigLayer {
            token: Some("from-flag".to_string()),
            ..Default::default()
        };
        let config = Config::resolve(cli, None, Some(home.path())).unwrap();
        assert_eq!(config.token, "from-flag");
    }

    #[test]
    fn test_no_home_means_empty_token() {
        let config = Config::resolve(ConfigLayer::default(), None, None).unwrap();
        assert_eq!(config.token, "");
    }

    #[test]
    fn test_config_file_fills_gaps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault-patch.toml");
        fs::write(
            &path,
            "address = \"http://vault.internal:8200\"\nlog_level = \"debug\"\ntimeout_seconds = 5\n",
        )
        .unwrap();

        let cli = ConfigLayer {
            log_level: Some("error".to_string()),
            ..Default::default()
        };
        let config = Config::resolve(cli, Some(&path), None).unwrap();

        assert_eq!(config.address, "http://vault.internal:8200");
        assert_eq!(config.log_level, Level::ERROR);
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_bad_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "address = [").unwrap();

        let err = Config::resolve(ConfigLayer::default(), Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::resolve(
            ConfigLayer::default(),
            Some(Path::new("/nonexistent/vault-patch.toml")),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("WARNING").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("fatal").unwrap(), Level::ERROR);
        assert!(matches!(
            parse_log_level("chatty"),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_invalid_log_level_fails_resolve() {
        let cli = ConfigLayer {
            log_level: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(Config::resolve(cli, None, None).is_err());
    }
}
