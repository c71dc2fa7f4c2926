use std::path::PathBuf;
use std::process::Command;

/// The argument vector the interactive session settles on. Once built it is
/// never modified; `argv[0]` is resolved on `PATH` at handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalCommand(Vec<String>);

impl FinalCommand {
    pub fn new(argv: Vec<String>) -> Self {
        Self(argv)
    }

    pub fn argv(&self) -> &[String] {
        &self.0
    }

    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn display(&self) -> String {
        self.0.join(" ")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("final command is empty")]
    EmptyCommand,
    #[error("executable `{program}` not found on PATH: {source}")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("failed to execute {path}: {source}")]
    Exec {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn resolve_executable(command: &FinalCommand) -> Result<PathBuf, HandoffError> {
    let program = command.program().ok_or(HandoffError::EmptyCommand)?;
    which::which(program).map_err(|source| HandoffError::NotFound {
        program: program.to_string(),
        source,
    })
}

/// Replaces the current process with the command. Only returns on failure.
#[cfg(unix)]
pub fn exec(command: &FinalCommand) -> HandoffError {
    use std::os::unix::process::CommandExt;

    let path = match resolve_executable(command) {
        Ok(path) => path,
        Err(err) => return err,
    };
    let source = Command::new(&path)
        .arg0(&command.argv()[0])
        .args(&command.argv()[1..])
        .exec();
    HandoffError::Exec {
        path: path.display().to_string(),
        source,
    }
}

/// Without process replacement the command runs as a child with inherited
/// stdio, and this process exits with the child's status.
#[cfg(not(unix))]
pub fn exec(command: &FinalCommand) -> HandoffError {
    let path = match resolve_executable(command) {
        Ok(path) => path,
        Err(err) => return err,
    };
    match Command::new(&path).args(&command.argv()[1..]).status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(source) => HandoffError::Exec {
            path: path.display().to_string(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_does_not_resolve() {
        let err = resolve_executable(&FinalCommand::new(Vec::new())).expect_err("empty");
        assert!(matches!(err, HandoffError::EmptyCommand));
    }

    #[test]
    fn unknown_program_reports_not_found() {
        let command = FinalCommand::new(vec!["just-ui-definitely-missing-binary".to_string()]);
        let err = resolve_executable(&command).expect_err("missing");
        assert!(err.to_string().contains("just-ui-definitely-missing-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn shell_resolves_on_path() {
        let command = FinalCommand::new(vec!["sh".to_string(), "-c".to_string()]);
        let path = resolve_executable(&command).expect("sh on PATH");
        assert!(path.is_absolute());
    }
}
