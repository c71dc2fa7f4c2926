use crate::ai::{AiBackend, AiClient};
use crate::app::{App, AppContext};
use crate::catalog::{RunnerSpec, DEFAULT_RUNNER};
use crate::config::{default_config_path, ConfigStore, ProviderEnv};
use crate::handoff::FinalCommand;
use crate::shared::logging::{default_log_path, Logger};
use crate::tui::picker::{DEFAULT_PICKER, PICKER_ENV};
use crate::tui::{self, scripted, Workers};
use std::path::PathBuf;
use std::sync::Arc;

pub const RUNNER_ENV: &str = "JUST_UI_RUNNER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub runner: RunnerSpec,
    pub picker: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    Version,
    Run(CliOptions),
}

/// What the binary does after the UI is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliOutcome {
    Print(String),
    /// `None` when the operator quit without choosing anything.
    Handoff(Option<FinalCommand>),
}

pub fn help_text() -> String {
    [
        "just-ui: browse, filter and run just recipes",
        "",
        "Usage: just-ui [options]",
        "",
        "Options:",
        "  --justfile <path>           Justfile passed to every runner call",
        "  --working-directory <dir>   Working directory passed to every runner call",
        "  --runner <binary>           Task runner binary (env JUST_UI_RUNNER, default just)",
        "  --picker <binary>           File picker for ctrl+f (env JUST_UI_PICKER, default fzf)",
        "  -h, --help                  Show this help",
        "  -V, --version               Show the version",
        "",
        "Environment:",
        "  GOOGLE_API_KEY, OPENAI_API_KEY   Provider keys for AI command generation",
        "  JUST_UI_CONFIG                   Config file path",
        "  JUST_UI_LOG_FILE                 Log file path",
    ]
    .join("\n")
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Splits `--flag=value` and reads `--flag value` forms alike.
fn flag_value(
    args: &[String],
    index: &mut usize,
    flag: &str,
    inline: Option<&str>,
) -> Result<String, String> {
    if let Some(value) = inline {
        return Ok(value.to_string());
    }
    *index += 1;
    args.get(*index)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

pub fn parse_args(args: &[String]) -> Result<CliCommand, String> {
    let mut runner = RunnerSpec {
        binary: env_or(RUNNER_ENV, DEFAULT_RUNNER),
        ..RunnerSpec::default()
    };
    let mut picker = env_or(PICKER_ENV, DEFAULT_PICKER);
    let mut index = 0usize;
    while index < args.len() {
        let (flag, inline) = match args[index].split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (args[index].as_str(), None),
        };
        match flag {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "--justfile" => {
                let value = flag_value(args, &mut index, flag, inline)?;
                runner.justfile = Some(PathBuf::from(value));
            }
            "--working-directory" => {
                let value = flag_value(args, &mut index, flag, inline)?;
                runner.working_directory = Some(PathBuf::from(value));
            }
            "--runner" => runner.binary = flag_value(args, &mut index, flag, inline)?,
            "--picker" => picker = flag_value(args, &mut index, flag, inline)?,
            other if other.starts_with('-') => {
                return Err(format!("unknown flag `{other}`; see --help"));
            }
            other => return Err(format!("unexpected argument `{other}`; see --help")),
        }
        index += 1;
    }
    Ok(CliCommand::Run(CliOptions { runner, picker }))
}

pub fn run_cli(args: Vec<String>) -> Result<CliOutcome, String> {
    let options = match parse_args(&args)? {
        CliCommand::Help => return Ok(CliOutcome::Print(help_text())),
        CliCommand::Version => {
            return Ok(CliOutcome::Print(format!(
                "just-ui {}",
                env!("CARGO_PKG_VERSION")
            )))
        }
        CliCommand::Run(options) => options,
    };
    let logger = Logger::new(default_log_path());
    logger.info("startup", &format!("runner={}", options.runner.binary));
    run_session(options, logger).map(CliOutcome::Handoff)
}

fn run_session(options: CliOptions, logger: Logger) -> Result<Option<FinalCommand>, String> {
    let catalog = options.runner.load_catalog().map_err(|e| {
        logger.error("catalog.load.failed", &e.to_string());
        format!("Error fetching recipes: {e}")
    })?;
    logger.info("catalog.loaded", &format!("tasks={}", catalog.len()));

    let config_path =
        default_config_path().map_err(|e| format!("failed to resolve config path: {e}"))?;
    let store = ConfigStore::new(config_path);
    let config = store.load().unwrap_or_else(|err| {
        logger.warn("config.load.failed", &err.to_string());
        Default::default()
    });

    let backend: Arc<dyn AiBackend> = Arc::new(AiClient::from_env());
    let (mut app, effects) = App::new(
        catalog,
        AppContext {
            runner: options.runner.clone(),
            store,
            config,
            env: ProviderEnv::from_process_env(),
            logger: logger.clone(),
        },
    );

    if let Some(script) = scripted::load_script_keys()? {
        return scripted::run_scripted(&mut app, effects, script, &options.runner, backend);
    }
    if !tui::is_interactive() {
        return Err(format!(
            "just-ui needs an interactive terminal (or set {})",
            scripted::SCRIPT_KEYS_ENV
        ));
    }
    let mut workers = Workers::new(options.runner, backend, logger.clone());
    tui::run_tui(&mut app, effects, &mut workers, &options.picker, &logger)
}
