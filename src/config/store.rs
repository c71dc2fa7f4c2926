use super::{Config, ConfigError};
use crate::shared::fs_atomic::{atomic_write_file, create_private_dir_all};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_MODE: u32 = 0o700;
const CONFIG_FILE_MODE: u32 = 0o600;

/// File-backed persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty config, not an error.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Config::default())
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: self.path.display().to_string(),
            source,
        })
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            create_private_dir_all(parent, CONFIG_DIR_MODE).map_err(|source| {
                ConfigError::CreateDir {
                    path: parent.display().to_string(),
                    source,
                }
            })?;
        }
        let body = serde_json::to_vec_pretty(config).map_err(|source| ConfigError::Encode {
            path: self.path.display().to_string(),
            source,
        })?;
        atomic_write_file(&self.path, &body, CONFIG_FILE_MODE).map_err(|source| {
            ConfigError::Write {
                path: self.path.display().to_string(),
                source,
            }
        })
    }
}
