use super::{parse_dump, Catalog, CatalogError};
use std::path::PathBuf;
use std::process::{Command, Output};

pub const DEFAULT_RUNNER: &str = "just";

/// How to invoke the task runner: the binary plus the global flags
/// (`--justfile`, `--working-directory`) every invocation shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSpec {
    pub binary: String,
    pub justfile: Option<PathBuf>,
    pub working_directory: Option<PathBuf>,
}

impl Default for RunnerSpec {
    fn default() -> Self {
        Self {
            binary: DEFAULT_RUNNER.to_string(),
            justfile: None,
            working_directory: None,
        }
    }
}

impl RunnerSpec {
    pub fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(justfile) = &self.justfile {
            args.push("--justfile".to_string());
            args.push(justfile.display().to_string());
        }
        if let Some(dir) = &self.working_directory {
            args.push("--working-directory".to_string());
            args.push(dir.display().to_string());
        }
        args
    }

    /// `[binary, global args..., task, args...]`
    pub fn task_argv(&self, task: &str, args: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut argv = vec![self.binary.clone()];
        argv.extend(self.global_args());
        argv.push(task.to_string());
        argv.extend(args);
        argv
    }

    pub fn dump_args(&self) -> Vec<String> {
        let mut args = self.global_args();
        args.extend(["--dump", "--dump-format", "json"].map(str::to_string));
        args
    }

    pub fn show_args(&self, task: &str) -> Vec<String> {
        let mut args = self.global_args();
        args.extend(["--color", "always", "--show", task].map(str::to_string));
        args
    }

    fn command_form(&self, args: &[String]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    fn run(&self, args: &[String]) -> Result<Output, CatalogError> {
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    CatalogError::MissingRunner {
                        binary: self.binary.clone(),
                    }
                } else {
                    CatalogError::Spawn {
                        command: self.command_form(args),
                        source,
                    }
                }
            })
    }

    /// Loads every task the runner knows about. Any failure here is fatal to
    /// the caller.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        let args = self.dump_args();
        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(CatalogError::NonZeroExit {
                command: self.command_form(&args),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_dump(&String::from_utf8_lossy(&output.stdout))
    }

    /// Renders one task's source. Failures come back as displayable text,
    /// not errors: the detail pane shows whatever this returns.
    pub fn show_task(&self, task: &str) -> String {
        let args = self.show_args(task);
        match self.run(&args) {
            Ok(output) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                if output.status.success() {
                    combined
                } else {
                    let mut message = format!("Error fetching details: {}", output.status);
                    if !combined.trim().is_empty() {
                        message.push_str("\n\n");
                        message.push_str(&combined);
                    }
                    message
                }
            }
            Err(err) => format!("Error fetching details: {err}"),
        }
    }
}
