//! The view state machine: owns all UI state, turns events into state
//! changes plus [`Effect`]s for the host to run.

pub mod event;
pub mod keys;
mod negotiation;

pub use event::{AppEvent, Effect};
pub use keys::{action_from_key, Action};

use crate::ai::Provider;
use crate::catalog::{Catalog, DisplayEntry, RunnerSpec};
use crate::config::{Config, ConfigStore, ProviderEnv, SessionKeys};
use crate::form::{ParamForm, SubmitOutcome, TextInput};
use crate::handoff::FinalCommand;
use crate::list::FilterList;
use crate::shared::logging::Logger;

pub const AI_ENTRY_DETAIL: &str =
    "Select to generate a command using AI based on your search text.";
pub const DISMISS_HINT: &str = "Press any key to dismiss.";
const DETAIL_SCROLL_STEP: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    ParameterInput,
    Generating,
    ProviderSelect,
    ApiKeyInput,
    ModelInput,
    ModelSelect,
}

impl View {
    pub const ALL: [View; 7] = [
        View::List,
        View::ParameterInput,
        View::Generating,
        View::ProviderSelect,
        View::ApiKeyInput,
        View::ModelInput,
        View::ModelSelect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            View::List => "list",
            View::ParameterInput => "parameter_input",
            View::Generating => "generating",
            View::ProviderSelect => "provider_select",
            View::ApiKeyInput => "api_key_input",
            View::ModelInput => "model_input",
            View::ModelSelect => "model_select",
        }
    }
}

/// What the `Generating` view is waiting on. Results for anything else are
/// stale and get dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Busy {
    Generation,
    ModelListing(Provider),
}

/// Collaborators and persisted state the machine starts from.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub runner: RunnerSpec,
    pub store: ConfigStore,
    pub config: Config,
    pub env: ProviderEnv,
    pub logger: Logger,
}

#[derive(Debug)]
pub struct App {
    catalog: Catalog,
    runner: RunnerSpec,
    store: ConfigStore,
    config: Config,
    env: ProviderEnv,
    session_keys: SessionKeys,
    logger: Logger,

    view: View,
    list: FilterList<DisplayEntry>,
    detail: String,
    detail_task: Option<String>,
    detail_scroll: u16,
    form: Option<ParamForm>,

    ai_prompt: String,
    generated: String,
    busy: Option<Busy>,
    /// Provider picked in this session's settings; tried first.
    active_provider: Option<Provider>,
    provider_cursor: usize,
    pending_provider: Provider,
    key_input: TextInput,
    model_input: TextInput,
    model_list: FilterList<String>,

    banner: Option<String>,
    final_command: Option<FinalCommand>,
    finished: bool,
}

impl App {
    /// Builds the machine in `List` along with the first detail fetch.
    pub fn new(catalog: Catalog, context: AppContext) -> (Self, Vec<Effect>) {
        let list = FilterList::with_pinned_last(catalog.display_entries());
        let mut app = Self {
            catalog,
            runner: context.runner,
            store: context.store,
            config: context.config,
            env: context.env,
            session_keys: SessionKeys::default(),
            logger: context.logger,
            view: View::List,
            list,
            detail: String::new(),
            detail_task: None,
            detail_scroll: 0,
            form: None,
            ai_prompt: String::new(),
            generated: String::new(),
            busy: None,
            active_provider: None,
            provider_cursor: 0,
            pending_provider: Provider::Google,
            key_input: TextInput::new(),
            model_input: TextInput::new(),
            model_list: FilterList::new(Vec::new()),
            banner: None,
            final_command: None,
            finished: false,
        };
        let mut effects = Vec::new();
        app.sync_detail(false, &mut effects);
        (app, effects)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn runner(&self) -> &RunnerSpec {
        &self.runner
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn list(&self) -> &FilterList<DisplayEntry> {
        &self.list
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn detail_scroll(&self) -> u16 {
        self.detail_scroll
    }

    pub fn form(&self) -> Option<&ParamForm> {
        self.form.as_ref()
    }

    pub fn ai_prompt(&self) -> &str {
        &self.ai_prompt
    }

    pub fn generated(&self) -> &str {
        &self.generated
    }

    pub fn busy(&self) -> Option<Busy> {
        self.busy
    }

    pub fn active_provider(&self) -> Option<Provider> {
        self.active_provider
    }

    pub fn provider_cursor(&self) -> usize {
        self.provider_cursor
    }

    pub fn pending_provider(&self) -> Provider {
        self.pending_provider
    }

    pub fn key_input(&self) -> &TextInput {
        &self.key_input
    }

    pub fn model_input(&self) -> &TextInput {
        &self.model_input
    }

    pub fn model_list(&self) -> &FilterList<String> {
        &self.model_list
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn final_command(&self) -> Option<&FinalCommand> {
        self.final_command.as_ref()
    }

    /// True once a command is chosen or the operator quit.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_final_command(self) -> Option<FinalCommand> {
        self.final_command
    }

    /// Title shown for a list row. The AI entry echoes the filter it will
    /// use as its prompt.
    pub fn entry_title(&self, entry: &DisplayEntry) -> String {
        match entry {
            DisplayEntry::Task { name, .. } => name.clone(),
            DisplayEntry::Generate if self.list.filter_text().is_empty() => {
                "Generate command with AI".to_string()
            }
            DisplayEntry::Generate => {
                format!("Generate command for: {}", self.list.filter_text())
            }
        }
    }

    pub fn handle(&mut self, event: AppEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.finished {
            return effects;
        }
        match event {
            AppEvent::Key(key) => {
                let filtering = self.list.is_filtering();
                let Some(action) = action_from_key(self.view, filtering, key) else {
                    if self.banner.is_some() && key.kind != crossterm::event::KeyEventKind::Release {
                        self.banner = None;
                    }
                    return effects;
                };
                if action != Action::Interrupt && self.banner.take().is_some() {
                    return effects;
                }
                self.apply_action(action, &mut effects);
            }
            AppEvent::Paste(text) => self.paste(&text, &mut effects),
            AppEvent::Resize => self.sync_detail(true, &mut effects),
            AppEvent::DetailLoaded { task, content } => {
                if self.detail_task.as_deref() == Some(task.as_str()) {
                    self.detail = content;
                }
            }
            AppEvent::ModelsListed { provider, result } => {
                self.on_models_listed(provider, result);
            }
            AppEvent::PickerFinished(output) => self.on_picker_finished(output),
            AppEvent::Stream(message) => self.on_stream_message(message),
        }
        effects
    }

    fn apply_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        if action == Action::Interrupt {
            self.logger.info("ui.interrupt", self.view.as_str());
            self.finish(None);
            return;
        }
        match self.view {
            View::List => self.list_action(action, effects),
            View::ParameterInput => self.form_action(action, effects),
            View::Generating => {
                if action == Action::Cancel {
                    self.busy = None;
                    self.view = View::List;
                }
            }
            View::ProviderSelect => self.provider_select_action(action, effects),
            View::ApiKeyInput => self.api_key_action(action, effects),
            View::ModelInput => self.model_input_action(action, effects),
            View::ModelSelect => self.model_select_action(action),
        }
    }

    fn list_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        match action {
            Action::Quit => self.finish(None),
            Action::Cancel => {
                if self.list.is_filtering() || !self.list.filter_text().is_empty() {
                    self.list.reset_filter();
                    self.sync_detail(false, effects);
                } else {
                    self.finish(None);
                }
            }
            Action::MoveUp => {
                self.list.select_prev();
                self.sync_detail(false, effects);
            }
            Action::MoveDown => {
                self.list.select_next();
                self.sync_detail(false, effects);
            }
            Action::Insert(ch) => {
                self.list.push_filter_char(ch);
                self.sync_detail(false, effects);
            }
            Action::Backspace => {
                self.list.pop_filter_char();
                self.sync_detail(false, effects);
            }
            Action::ScrollUp => {
                self.detail_scroll = self.detail_scroll.saturating_sub(DETAIL_SCROLL_STEP);
            }
            Action::ScrollDown => {
                self.detail_scroll = self.detail_scroll.saturating_add(DETAIL_SCROLL_STEP);
            }
            Action::OpenSettings => self.open_provider_select(),
            Action::Confirm => self.confirm_list_selection(effects),
            _ => {}
        }
    }

    fn confirm_list_selection(&mut self, effects: &mut Vec<Effect>) {
        let Some(entry) = self.list.selected().cloned() else {
            return;
        };
        match entry {
            DisplayEntry::Generate => {
                self.ai_prompt = self.list.filter_text().to_string();
                self.start_generation(effects);
            }
            DisplayEntry::Task { name, .. } => {
                let Some(task) = self.catalog.get(&name) else {
                    return;
                };
                match ParamForm::for_task(task) {
                    Some(form) => {
                        self.form = Some(form);
                        self.view = View::ParameterInput;
                    }
                    None => {
                        let argv = self.runner.task_argv(&name, Vec::new());
                        self.finish(Some(FinalCommand::new(argv)));
                    }
                }
            }
        }
    }

    fn form_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        let Some(form) = self.form.as_mut() else {
            self.view = View::List;
            return;
        };
        match action {
            Action::Cancel => {
                self.form = None;
                self.view = View::List;
            }
            Action::FocusNext => form.focus_next(),
            Action::FocusPrev => form.focus_prev(),
            Action::OpenPicker => effects.push(Effect::LaunchPicker),
            Action::Confirm => {
                if let SubmitOutcome::Finished(command) = form.submit(&self.runner) {
                    self.finish(Some(command));
                }
            }
            other => edit_input(form.focused_input_mut(), other),
        }
    }

    fn paste(&mut self, text: &str, effects: &mut Vec<Effect>) {
        self.banner = None;
        if self.view == View::List {
            for ch in text.chars().filter(|ch| !ch.is_control()) {
                self.list.push_filter_char(ch);
            }
            self.sync_detail(false, effects);
            return;
        }
        if let Some(input) = self.focused_input_mut() {
            input.insert_str(text);
        }
    }

    fn on_picker_finished(&mut self, output: Option<String>) {
        let Some(text) = output else {
            self.logger.info("picker.cancelled", self.view.as_str());
            return;
        };
        if let Some(input) = self.focused_input_mut() {
            input.insert_str(&text);
        }
    }

    fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        match self.view {
            View::ParameterInput => self.form.as_mut().map(ParamForm::focused_input_mut),
            View::ApiKeyInput => Some(&mut self.key_input),
            View::ModelInput => Some(&mut self.model_input),
            _ => None,
        }
    }

    /// Keeps the detail pane in step with the selection. Fetches only when
    /// the selected task name changed, unless `force` is set.
    fn sync_detail(&mut self, force: bool, effects: &mut Vec<Effect>) {
        match self.list.selected() {
            Some(DisplayEntry::Task { name, .. }) => {
                if force || self.detail_task.as_deref() != Some(name.as_str()) {
                    self.detail_task = Some(name.clone());
                    self.detail_scroll = 0;
                    effects.push(Effect::FetchDetail(name.clone()));
                }
            }
            Some(DisplayEntry::Generate) | None => {
                self.detail_task = None;
                self.detail_scroll = 0;
                self.detail = AI_ENTRY_DETAIL.to_string();
            }
        }
    }

    fn show_banner(&mut self, message: String) {
        self.banner = Some(message);
    }

    fn finish(&mut self, command: Option<FinalCommand>) {
        if let Some(command) = &command {
            self.logger.info("ui.final_command", &command.display());
        }
        self.final_command = command;
        self.finished = true;
    }
}

/// Applies an editing action to a text field; other actions are ignored.
fn edit_input(input: &mut TextInput, action: Action) {
    match action {
        Action::Insert(ch) => input.insert_char(ch),
        Action::Backspace => input.backspace(),
        Action::Delete => input.delete(),
        Action::CursorLeft => input.move_left(),
        Action::CursorRight => input.move_right(),
        Action::CursorHome => input.move_home(),
        Action::CursorEnd => input.move_end(),
        _ => {}
    }
}
