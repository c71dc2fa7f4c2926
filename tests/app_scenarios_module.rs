use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use just_ui::ai::{
    AiBackend, AiError, GenerationRequest, Provider, ProviderCredential, StreamError,
    StreamMessage, WORKER_EXITED,
};
use just_ui::app::{App, AppContext, AppEvent, Effect, View};
use just_ui::catalog::{parse_dump, Catalog, RunnerSpec};
use just_ui::config::{Config, ConfigStore, ProviderEnv};
use just_ui::shared::logging::Logger;
use just_ui::tui::scripted::{parse_script_keys, run_scripted};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const DUMP: &str = r#"{
  "recipes": {
    "hello": {"name": "hello", "doc": "Greet someone", "dependencies": [],
              "parameters": [{"name": "name", "default": "World", "kind": "singular"}]},
    "diff": {"name": "diff", "doc": null, "dependencies": [],
             "parameters": [{"name": "left", "default": null, "kind": "singular"},
                            {"name": "right", "default": null, "kind": "singular"}]},
    "lint": {"name": "lint", "doc": null, "dependencies": [], "parameters": []},
    "tag": {"name": "tag", "doc": null, "dependencies": [],
            "parameters": [{"name": "version", "default": null, "kind": "singular"},
                           {"name": "targets", "default": null, "kind": "star"}]}
  }
}"#;

fn catalog() -> Catalog {
    parse_dump(DUMP).expect("dump")
}

fn context(config_dir: &Path, env: ProviderEnv) -> AppContext {
    AppContext {
        runner: RunnerSpec::default(),
        store: ConfigStore::new(config_dir.join("just-ui/config.json")),
        config: Config::default(),
        env,
        logger: Logger::disabled(),
    }
}

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(app: &mut App, text: &str) -> Vec<Effect> {
    let mut effects = Vec::new();
    for ch in text.chars() {
        effects.extend(app.handle(key(KeyCode::Char(ch))));
    }
    effects
}

fn argv(app: &App) -> Vec<String> {
    app.final_command()
        .map(|command| command.argv().to_vec())
        .unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[derive(Default)]
struct ScriptedBackend {
    chunks: Vec<&'static str>,
    models: Vec<&'static str>,
    prompts: Mutex<Vec<String>>,
    credentials: Mutex<Vec<ProviderCredential>>,
}

impl AiBackend for ScriptedBackend {
    fn generate(
        &self,
        credential: &ProviderCredential,
        prompt: &str,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, AiError> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        self.credentials
            .lock()
            .expect("lock")
            .push(credential.clone());
        for chunk in &self.chunks {
            on_chunk(chunk);
        }
        Ok(self.chunks.concat())
    }

    fn list_models(&self, provider: Provider, _api_key: &str) -> Result<Vec<String>, AiError> {
        if self.models.is_empty() {
            return Err(AiError::NoModels { provider });
        }
        Ok(self.models.iter().map(|m| m.to_string()).collect())
    }
}

struct CrashingBackend;

impl AiBackend for CrashingBackend {
    fn generate(
        &self,
        _credential: &ProviderCredential,
        _prompt: &str,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, AiError> {
        on_chunk("ls ");
        panic!("provider client crashed");
    }

    fn list_models(&self, _provider: Provider, _api_key: &str) -> Result<Vec<String>, AiError> {
        Ok(Vec::new())
    }
}

#[test]
fn scenario_a_empty_field_takes_the_default() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    type_text(&mut app, "hello");
    app.handle(key(KeyCode::Enter));
    assert_eq!(app.view(), View::ParameterInput);
    assert_eq!(app.form().expect("form").title(), "Run Task: hello");

    app.handle(key(KeyCode::Enter));
    assert!(app.is_finished());
    assert_eq!(argv(&app), strings(&["just", "hello", "World"]));
}

#[test]
fn scenario_b_two_fields_in_order() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    app.handle(key(KeyCode::Enter));
    assert_eq!(app.form().expect("form").title(), "Run Task: diff");
    type_text(&mut app, "a.txt");
    app.handle(key(KeyCode::Enter));
    assert!(!app.is_finished());
    assert_eq!(app.form().expect("form").focus(), 1);
    type_text(&mut app, "b.txt");
    app.handle(key(KeyCode::Enter));

    assert_eq!(argv(&app), strings(&["just", "diff", "a.txt", "b.txt"]));
}

#[test]
fn missing_value_without_default_becomes_empty_argument() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    type_text(&mut app, "tag");
    app.handle(key(KeyCode::Enter));
    app.handle(key(KeyCode::Tab));
    type_text(&mut app, "web  api");
    app.handle(key(KeyCode::Enter));

    assert_eq!(argv(&app), strings(&["just", "tag", "", "web", "api"]));
}

#[test]
fn task_without_parameters_runs_directly() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    type_text(&mut app, "lint");
    app.handle(key(KeyCode::Enter));
    assert_eq!(argv(&app), strings(&["just", "lint"]));
}

#[test]
fn selection_changes_fetch_details_once_per_task() {
    let dir = tempdir().expect("tempdir");
    let (mut app, initial) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));
    assert_eq!(initial, vec![Effect::FetchDetail("diff".to_string())]);

    assert_eq!(
        app.handle(key(KeyCode::Down)),
        vec![Effect::FetchDetail("hello".to_string())]
    );
    assert_eq!(
        app.handle(key(KeyCode::Up)),
        vec![Effect::FetchDetail("diff".to_string())]
    );
    assert!(app.handle(key(KeyCode::Up)).is_empty());
}

#[test]
fn ai_entry_stays_last_under_any_filter() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    let last_title = |app: &App| {
        app.list()
            .visible()
            .last()
            .map(|(entry, _)| app.entry_title(entry))
            .expect("ai entry")
    };
    assert_eq!(last_title(&app), "Generate command with AI");

    for filter in ["h", "t", "zzz"] {
        type_text(&mut app, filter);
        assert_eq!(
            last_title(&app),
            format!("Generate command for: {filter}")
        );
        app.handle(key(KeyCode::Esc));
        assert!(!app.is_finished());
    }
}

#[test]
fn scenario_c_missing_credential_collects_and_persists_a_key() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    type_text(&mut app, "zzz");
    let effects = app.handle(key(KeyCode::Enter));
    assert_eq!(
        effects,
        vec![Effect::StartGeneration(GenerationRequest {
            prompt: "zzz".to_string(),
            credential: None,
        })]
    );
    assert_eq!(app.view(), View::Generating);

    app.handle(AppEvent::Stream(StreamMessage::Error(
        StreamError::MissingCredential,
    )));
    assert_eq!(app.view(), View::ProviderSelect);

    app.handle(key(KeyCode::Enter));
    assert_eq!(app.view(), View::ApiKeyInput);
    assert!(app.key_input().is_masked());

    type_text(&mut app, "AIza-test");
    assert_eq!(app.key_input().display_value(), "•••••••••");
    let effects = app.handle(key(KeyCode::Enter));
    assert_eq!(
        effects,
        vec![Effect::ListModels {
            provider: Provider::Google,
            api_key: "AIza-test".to_string(),
        }]
    );

    let stored = ConfigStore::new(dir.path().join("just-ui/config.json"))
        .load()
        .expect("stored config");
    assert_eq!(stored.api_key(Provider::Google), Some("AIza-test"));

    app.handle(AppEvent::ModelsListed {
        provider: Provider::Google,
        result: Ok(strings(&["gemini-1.5-pro", "gemini-2.0-flash"])),
    });
    assert_eq!(app.view(), View::ModelSelect);
    app.handle(key(KeyCode::Down));
    app.handle(key(KeyCode::Enter));
    assert_eq!(app.view(), View::List);

    let effects = app.handle(key(KeyCode::Enter));
    assert_eq!(
        effects,
        vec![Effect::StartGeneration(GenerationRequest {
            prompt: "zzz".to_string(),
            credential: Some(ProviderCredential {
                provider: Provider::Google,
                api_key: "AIza-test".to_string(),
                model: "gemini-2.0-flash".to_string(),
            }),
        })]
    );
}

#[test]
fn empty_api_key_is_not_accepted() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    app.handle(AppEvent::Key(KeyEvent::new(
        KeyCode::Char('p'),
        KeyModifiers::CONTROL,
    )));
    app.handle(key(KeyCode::Enter));
    type_text(&mut app, "   ");
    let effects = app.handle(key(KeyCode::Enter));
    assert!(effects.is_empty());
    assert_eq!(app.view(), View::ApiKeyInput);
}

#[test]
fn scenario_d_streamed_chunks_seed_the_command_form() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    type_text(&mut app, "list everything");
    app.handle(key(KeyCode::Enter));
    for message in [
        StreamMessage::Chunk("ls ".to_string()),
        StreamMessage::Chunk("-la".to_string()),
    ] {
        app.handle(AppEvent::Stream(message));
    }
    assert_eq!(app.generated(), "ls -la");
    app.handle(AppEvent::Stream(StreamMessage::Done));

    assert_eq!(app.view(), View::ParameterInput);
    let form = app.form().expect("form");
    assert_eq!(form.title(), "Run Task: AI Command");
    assert_eq!(form.fields().len(), 1);
    assert_eq!(form.fields()[0].input.value(), "ls -la");

    app.handle(key(KeyCode::Enter));
    assert_eq!(argv(&app), strings(&["sh", "-c", "ls -la"]));
}

#[test]
fn streamed_whitespace_reaches_the_shell_command() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    type_text(&mut app, "count lines");
    app.handle(key(KeyCode::Enter));
    for chunk in ["wc -l *.rs", " \n"] {
        app.handle(AppEvent::Stream(StreamMessage::Chunk(chunk.to_string())));
    }
    app.handle(AppEvent::Stream(StreamMessage::Done));
    assert_eq!(
        app.form().expect("form").fields()[0].input.value(),
        app.generated()
    );

    app.handle(key(KeyCode::Enter));
    assert_eq!(argv(&app), strings(&["sh", "-c", "wc -l *.rs \n"]));
}

#[test]
fn backspace_without_a_filter_keeps_the_selected_task() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    app.handle(key(KeyCode::Down));
    assert!(app.handle(key(KeyCode::Backspace)).is_empty());
    app.handle(key(KeyCode::Enter));
    assert_eq!(app.form().expect("form").title(), "Run Task: hello");
}

#[test]
fn hard_interrupt_ends_any_view_without_a_command() {
    let dir = tempdir().expect("tempdir");
    let (mut app, _) = App::new(catalog(), context(dir.path(), ProviderEnv::default()));

    type_text(&mut app, "hello");
    app.handle(key(KeyCode::Enter));
    assert_eq!(app.view(), View::ParameterInput);
    app.handle(AppEvent::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )));
    assert!(app.is_finished());
    assert!(app.final_command().is_none());
}

#[test]
fn scripted_session_generates_and_runs_through_the_shell() {
    let dir = tempdir().expect("tempdir");
    let env = ProviderEnv::default().with_key(Provider::OpenAi, "sk-env");
    let (mut app, effects) = App::new(Catalog::default(), context(dir.path(), env));
    let backend = Arc::new(ScriptedBackend {
        chunks: vec!["ls ", "-la"],
        ..ScriptedBackend::default()
    });

    let script = parse_script_keys("type:list files,enter,end,type: | head,enter").expect("keys");
    let command = run_scripted(
        &mut app,
        effects,
        script,
        &RunnerSpec::default(),
        backend.clone(),
    )
    .expect("scripted run")
    .expect("final command");

    assert_eq!(command.argv(), &strings(&["sh", "-c", "ls -la | head"])[..]);
    assert_eq!(
        *backend.prompts.lock().expect("lock"),
        vec!["list files".to_string()]
    );
    let credentials = backend.credentials.lock().expect("lock");
    assert_eq!(credentials[0].provider, Provider::OpenAi);
    assert_eq!(credentials[0].model, "gpt-4o");
}

#[test]
fn scripted_model_listing_failure_falls_back_to_typed_model() {
    let dir = tempdir().expect("tempdir");
    let env = ProviderEnv::default().with_key(Provider::Google, "g-env");
    let (mut app, effects) = App::new(Catalog::default(), context(dir.path(), env));
    let backend = Arc::new(ScriptedBackend::default());

    let script =
        parse_script_keys("ctrl-p,enter,type:gemini-exp,enter,q").expect("keys");
    let command = run_scripted(&mut app, effects, script, &RunnerSpec::default(), backend)
        .expect("scripted run");
    assert!(command.is_none());

    let stored = ConfigStore::new(dir.path().join("just-ui/config.json"))
        .load()
        .expect("stored config");
    assert_eq!(stored.model(Provider::Google), Some("gemini-exp"));
    assert_eq!(stored.api_key(Provider::Google), None);
}

#[test]
fn scripted_session_that_never_finishes_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let (mut app, effects) = App::new(Catalog::default(), context(dir.path(), ProviderEnv::default()));
    let backend = Arc::new(ScriptedBackend::default());

    let err = run_scripted(
        &mut app,
        effects,
        parse_script_keys("down").expect("keys"),
        &RunnerSpec::default(),
        backend,
    )
    .expect_err("unfinished");
    assert!(err.contains("did not finish"));
}

#[test]
fn crashed_generation_returns_to_the_list_with_a_banner() {
    let dir = tempdir().expect("tempdir");
    let env = ProviderEnv::default().with_key(Provider::OpenAi, "sk-env");
    let (mut app, effects) = App::new(Catalog::default(), context(dir.path(), env));

    let err = run_scripted(
        &mut app,
        effects,
        parse_script_keys("type:list files,enter").expect("keys"),
        &RunnerSpec::default(),
        Arc::new(CrashingBackend),
    )
    .expect_err("session left open");
    assert!(err.contains("`list`"));

    assert_eq!(app.view(), View::List);
    assert!(app.busy().is_none());
    assert_eq!(app.banner(), Some(format!("AI Error: {WORKER_EXITED}").as_str()));
}
