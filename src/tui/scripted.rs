use crate::ai::{spawn_generation, worker_exited, AiBackend};
use crate::app::{App, AppEvent, Effect};
use crate::catalog::RunnerSpec;
use crate::handoff::FinalCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;
use std::sync::Arc;

pub const SCRIPT_KEYS_ENV: &str = "JUST_UI_SCRIPT_KEYS";

const VALID_TOKENS: &str = "up,down,left,right,enter,esc,tab,backtab,backspace,delete,home,end,pgup,pgdn,space,ctrl-c,ctrl-p,ctrl-f,resize,<single char>,type:<text>,paste:<text>";

/// Reads the key script from `JUST_UI_SCRIPT_KEYS`, if set.
pub fn load_script_keys() -> Result<Option<Vec<AppEvent>>, String> {
    let Ok(raw) = std::env::var(SCRIPT_KEYS_ENV) else {
        return Ok(None);
    };
    parse_script_keys(&raw).map(Some)
}

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl(ch: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
}

/// Comma-separated tokens. `type:` expands to one key per character and
/// keeps its text verbatim; other tokens are case-insensitive.
pub fn parse_script_keys(raw: &str) -> Result<Vec<AppEvent>, String> {
    let mut events = Vec::new();
    for token in raw.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(text) = trimmed.strip_prefix("type:") {
            events.extend(text.chars().map(|ch| key(KeyCode::Char(ch))));
            continue;
        }
        if let Some(text) = trimmed.strip_prefix("paste:") {
            events.push(AppEvent::Paste(text.to_string()));
            continue;
        }
        let mut chars = trimmed.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            events.push(key(KeyCode::Char(ch)));
            continue;
        }
        let event = match trimmed.to_ascii_lowercase().as_str() {
            "up" => key(KeyCode::Up),
            "down" => key(KeyCode::Down),
            "left" => key(KeyCode::Left),
            "right" => key(KeyCode::Right),
            "enter" => key(KeyCode::Enter),
            "esc" => key(KeyCode::Esc),
            "tab" => key(KeyCode::Tab),
            "backtab" => AppEvent::Key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
            "backspace" => key(KeyCode::Backspace),
            "delete" => key(KeyCode::Delete),
            "home" => key(KeyCode::Home),
            "end" => key(KeyCode::End),
            "pgup" => key(KeyCode::PageUp),
            "pgdn" => key(KeyCode::PageDown),
            "space" => key(KeyCode::Char(' ')),
            "ctrl-c" => ctrl('c'),
            "ctrl-p" => ctrl('p'),
            "ctrl-f" => ctrl('f'),
            "resize" => AppEvent::Resize,
            other => {
                return Err(format!(
                    "invalid {SCRIPT_KEYS_ENV} token `{other}`; valid tokens: {VALID_TOKENS}"
                ));
            }
        };
        events.push(event);
    }
    Ok(events)
}

/// Drives the state machine without a terminal. Every effect runs to
/// completion before the next scripted key; the picker always reports a
/// cancel.
pub fn run_scripted(
    app: &mut App,
    initial_effects: Vec<Effect>,
    script: Vec<AppEvent>,
    runner: &RunnerSpec,
    backend: Arc<dyn AiBackend>,
) -> Result<Option<FinalCommand>, String> {
    let mut pending = VecDeque::new();
    run_effects(initial_effects, runner, &backend, &mut pending);
    drain(app, &mut pending, runner, &backend);
    for event in script {
        if app.is_finished() {
            break;
        }
        pending.push_back(event);
        drain(app, &mut pending, runner, &backend);
    }
    if !app.is_finished() {
        return Err(format!(
            "scripted session did not finish in view `{}`; end {SCRIPT_KEYS_ENV} with a key that runs or quits",
            app.view().as_str()
        ));
    }
    Ok(app.final_command().cloned())
}

fn drain(
    app: &mut App,
    pending: &mut VecDeque<AppEvent>,
    runner: &RunnerSpec,
    backend: &Arc<dyn AiBackend>,
) {
    while let Some(event) = pending.pop_front() {
        let effects = app.handle(event);
        run_effects(effects, runner, backend, pending);
    }
}

fn run_effects(
    effects: Vec<Effect>,
    runner: &RunnerSpec,
    backend: &Arc<dyn AiBackend>,
    pending: &mut VecDeque<AppEvent>,
) {
    for effect in effects {
        match effect {
            Effect::FetchDetail(task) => {
                let content = runner.show_task(&task);
                pending.push_back(AppEvent::DetailLoaded { task, content });
            }
            Effect::ListModels { provider, api_key } => {
                let result = backend
                    .list_models(provider, &api_key)
                    .map_err(|err| err.to_string());
                pending.push_back(AppEvent::ModelsListed { provider, result });
            }
            Effect::StartGeneration(request) => {
                let rx = spawn_generation(Arc::clone(backend), request);
                let mut ended = false;
                for message in rx.iter() {
                    ended = message.is_terminal();
                    pending.push_back(AppEvent::Stream(message));
                }
                if !ended {
                    pending.push_back(AppEvent::Stream(worker_exited()));
                }
            }
            Effect::LaunchPicker => pending.push_back(AppEvent::PickerFinished(None)),
        }
    }
}
