use crate::config::ConfigError;
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "JUST_UI_CONFIG";
pub const CONFIG_DIR_NAME: &str = "just-ui";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(explicit) = non_empty_env(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(explicit));
    }
    let config_home = match non_empty_env("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let home = non_empty_env("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
