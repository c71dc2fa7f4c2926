//! Terminal host for the state machine: owns the terminal, runs effects on
//! background workers, and feeds their results back one event at a time.

pub mod draw;
pub mod picker;
pub mod scripted;
pub mod workers;

pub use workers::Workers;

use crate::app::{App, AppEvent, Effect};
use crate::handoff::FinalCommand;
use crate::shared::logging::Logger;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, IsTerminal, Stdout};
use std::time::{Duration, Instant};

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
const UI_POLL_INTERVAL: Duration = Duration::from_millis(60);
const SPINNER_TICK_INTERVAL: Duration = Duration::from_millis(120);

pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance_if_needed(&mut self, active: bool) {
        if active && self.last_tick.elapsed() >= SPINNER_TICK_INTERVAL {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = Instant::now();
        }
    }
}

/// Runs the interactive session until the operator picks a command or
/// quits. The terminal is restored before returning either way.
pub fn run_tui(
    app: &mut App,
    initial_effects: Vec<Effect>,
    workers: &mut Workers,
    picker: &str,
    logger: &Logger,
) -> Result<Option<FinalCommand>, String> {
    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, app, initial_effects, workers, picker, logger);
    teardown_terminal(&mut terminal)?;
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    initial_effects: Vec<Effect>,
    workers: &mut Workers,
    picker: &str,
    logger: &Logger,
) -> Result<Option<FinalCommand>, String> {
    let mut spinner = Spinner::new();
    apply_effects(terminal, app, initial_effects, workers, picker, logger)?;
    while !app.is_finished() {
        spinner.advance_if_needed(app.busy().is_some());
        for event in workers.poll() {
            let effects = app.handle(event);
            apply_effects(terminal, app, effects, workers, picker, logger)?;
        }
        if app.is_finished() {
            break;
        }
        terminal
            .draw(|frame| draw::draw_app(frame, app, spinner.frame()))
            .map_err(|e| format!("failed to render UI: {e}"))?;

        if !event::poll(UI_POLL_INTERVAL).map_err(|e| format!("failed to poll events: {e}"))? {
            continue;
        }
        let event = match event::read().map_err(|e| format!("failed to read event: {e}"))? {
            Event::Key(key) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
            Event::Paste(text) => AppEvent::Paste(text),
            Event::Resize(_, _) => AppEvent::Resize,
            _ => continue,
        };
        let effects = app.handle(event);
        apply_effects(terminal, app, effects, workers, picker, logger)?;
    }
    Ok(app.final_command().cloned())
}

fn apply_effects(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    effects: Vec<Effect>,
    workers: &mut Workers,
    picker: &str,
    logger: &Logger,
) -> Result<(), String> {
    for effect in effects {
        match effect {
            Effect::LaunchPicker => {
                let selected = with_terminal_released(terminal, || {
                    picker::capture_picker_output(picker, logger)
                })?;
                let follow_up = app.handle(AppEvent::PickerFinished(selected));
                apply_effects(terminal, app, follow_up, workers, picker, logger)?;
            }
            other => workers.spawn(other),
        }
    }
    Ok(())
}

/// Hands the terminal to a foreign full-screen process and takes it back.
fn with_terminal_released<T>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    run: impl FnOnce() -> T,
) -> Result<T, String> {
    teardown_terminal(terminal)?;
    let value = run();
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    execute!(
        terminal.backend_mut(),
        EnterAlternateScreen,
        EnableBracketedPaste,
        cursor::Hide
    )
    .map_err(|e| format!("failed to enter alternate screen: {e}"))?;
    terminal
        .clear()
        .map_err(|e| format!("failed to clear terminal: {e}"))?;
    Ok(value)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, String> {
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste, cursor::Hide)
        .map_err(|e| format!("failed to enter alternate screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| format!("failed to initialize terminal: {e}"))
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), String> {
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen,
        cursor::Show
    )
    .map_err(|e| format!("failed to leave alternate screen: {e}"))?;
    terminal
        .show_cursor()
        .map_err(|e| format!("failed to restore cursor: {e}"))?;
    Ok(())
}
