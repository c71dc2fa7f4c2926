use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const LOG_FILE_ENV: &str = "JUST_UI_LOG_FILE";
const LOG_DIR_NAME: &str = "just-ui";
const LOG_FILE_NAME: &str = "just-ui.log";

/// Resolves the log file location: `JUST_UI_LOG_FILE`, then
/// `$XDG_STATE_HOME/just-ui/just-ui.log`, then `$HOME/.local/state/...`.
pub fn default_log_path() -> Option<PathBuf> {
    if let Some(explicit) = non_empty_env(LOG_FILE_ENV) {
        return Some(PathBuf::from(explicit));
    }
    let state_home = non_empty_env("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty_env("HOME").map(|home| PathBuf::from(home).join(".local/state")))?;
    Some(state_home.join(LOG_DIR_NAME).join(LOG_FILE_NAME))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Appends one JSON object per line. Write failures are swallowed: the
/// terminal belongs to the UI, so there is nowhere to report them.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    path: Option<PathBuf>,
}

impl Logger {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.append("info", event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.append("warn", event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.append("error", event, message);
    }

    fn append(&self, level: &str, event: &str, message: &str) {
        let Some(path) = &self.path else {
            return;
        };
        let payload = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "level": level,
            "event": event,
            "message": message,
        });
        let Ok(line) = serde_json::to_string(&payload) else {
            return;
        };
        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}
