use crate::shared::logging::Logger;
use std::process::{Command, Stdio};

pub const DEFAULT_PICKER: &str = "fzf";
pub const PICKER_ENV: &str = "JUST_UI_PICKER";

/// Runs the picker on the real terminal and returns its trimmed stdout.
/// A non-zero exit (the usual way pickers report a cancel) or a spawn
/// failure yields `None`. The caller must release the terminal first.
pub fn capture_picker_output(binary: &str, logger: &Logger) -> Option<String> {
    let output = match Command::new(binary)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
    {
        Ok(output) => output,
        Err(err) => {
            logger.error("picker.spawn.failed", &format!("{binary}: {err}"));
            return None;
        }
    };
    if !output.status.success() {
        logger.info("picker.exit", &format!("{binary}: {}", output.status));
        return None;
    }
    let selected = String::from_utf8_lossy(&output.stdout).trim().to_string();
    logger.info("picker.exit", &format!("{binary}: selected {selected}"));
    Some(selected)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn write_script(path: &Path, body: &str) {
        fs::write(path, body).expect("write script");
        let mut perms = fs::metadata(path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).expect("chmod");
    }

    #[test]
    fn clean_exit_returns_trimmed_stdout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let picker = dir.path().join("picker");
        write_script(&picker, "#!/bin/sh\nprintf '  src/lib.rs\\n'\n");
        assert_eq!(
            capture_picker_output(&picker.display().to_string(), &Logger::disabled()),
            Some("src/lib.rs".to_string())
        );
    }

    #[test]
    fn cancelled_picker_yields_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let picker = dir.path().join("picker");
        write_script(&picker, "#!/bin/sh\necho partial\nexit 130\n");
        assert_eq!(
            capture_picker_output(&picker.display().to_string(), &Logger::disabled()),
            None
        );
    }

    #[test]
    fn missing_picker_yields_nothing() {
        assert_eq!(
            capture_picker_output("just-ui-missing-picker-binary", &Logger::disabled()),
            None
        );
    }
}
