use std::{fs::OpenOptions, io::Write, path::Path};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("file not found")]
    NotFound,

    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("deserialization error")]
    DeserializationError(#[from] toml::de::Error),

    #[error("serialization error")]
    SerializationError(#[from] toml::ser::Error),
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: Defaults,
    pub query: Query,
}

impl Config {
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let out = toml::to_string_pretty(self)?;
        let mut file = OpenOptions::new().create_new(true).write(true).open(path)?;
        file.write_all(out.as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Server list ping port.
    pub port: u16,
    pub timeout_secs: u64,
    pub log_level: LevelFilter,
}

impl Default for Defaults {
    fn default() -> Defaults {
        Defaults {
            port: 25565,
            timeout_secs: 5,
            log_level: LevelFilter::Info,
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub port: u16,
}

impl Default for Query {
    fn default() -> Query {
        Query { port: 25565 }
    }
}

pub fn read(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let bytes = std::fs::read(path)?;
    let config = toml::from_slice(&bytes)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("mcquery-{}-{name}.toml", std::process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config: Config = toml::from_str("[defaults]\nport = 19132\n").unwrap();

        assert_eq!(config.defaults.port, 19132);
        assert_eq!(config.defaults.timeout_secs, 5);
        assert_eq!(config.defaults.log_level, LevelFilter::Info);
        assert_eq!(config.query.port, 25565);
    }

    #[test]
    fn written_default_reads_back() {
        let path = scratch_path("roundtrip");
        Config::default().write(&path).unwrap();

        assert_eq!(read(&path).unwrap(), Config::default());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn write_never_overwrites() {
        let path = scratch_path("existing");
        fs::write(&path, "[query]\nport = 1\n").unwrap();

        assert!(matches!(
            Config::default().write(&path),
            Err(ConfigError::Io(_))
        ));
        assert_eq!(read(&path).unwrap().query.port, 1);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read(&scratch_path("missing")),
            Err(ConfigError::NotFound)
        ));
    }

    #[test]
    fn invalid_file() {
        let path = scratch_path("invalid");
        fs::write(&path, "defaults = 3").unwrap();

        assert!(matches!(
            read(&path),
            Err(ConfigError::DeserializationError(_))
        ));
        fs::remove_file(&path).unwrap();
    }
}
