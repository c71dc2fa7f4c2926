use super::{edit_input, Action, App, Busy, Effect, View};
use crate::ai::{GenerationRequest, Provider, ProviderCredential, StreamError, StreamMessage};
use crate::config::resolve_api_key;
use crate::form::{ParamForm, TextInput};
use crate::list::FilterList;

impl App {
    /// Providers in the order generation tries them: the one picked in this
    /// session first, then the fixed order.
    fn provider_preference(&self) -> Vec<Provider> {
        let mut order = Vec::with_capacity(Provider::ALL.len());
        if let Some(active) = self.active_provider {
            order.push(active);
        }
        for provider in Provider::ALL {
            if !order.contains(&provider) {
                order.push(provider);
            }
        }
        order
    }

    /// First provider with a resolvable key, with its configured or default
    /// model.
    pub(super) fn generation_credential(&self) -> Option<ProviderCredential> {
        self.provider_preference().into_iter().find_map(|provider| {
            let (api_key, _) =
                resolve_api_key(provider, &self.session_keys, &self.env, &self.config)?;
            Some(ProviderCredential {
                provider,
                api_key,
                model: self.config.model_or_default(provider),
            })
        })
    }

    pub(super) fn start_generation(&mut self, effects: &mut Vec<Effect>) {
        let credential = self.generation_credential();
        match &credential {
            Some(credential) => self.logger.info(
                "ai.generation.started",
                &format!(
                    "provider={} model={}",
                    credential.provider.as_str(),
                    credential.model
                ),
            ),
            None => self
                .logger
                .info("ai.generation.started", "no credential resolvable"),
        }
        self.generated.clear();
        self.busy = Some(Busy::Generation);
        self.view = View::Generating;
        effects.push(Effect::StartGeneration(GenerationRequest {
            prompt: self.ai_prompt.clone(),
            credential,
        }));
    }

    pub(super) fn on_stream_message(&mut self, message: StreamMessage) {
        if self.view != View::Generating || self.busy != Some(Busy::Generation) {
            return;
        }
        match message {
            StreamMessage::Chunk(text) => self.generated.push_str(&text),
            StreamMessage::Done => {
                self.busy = None;
                self.logger.info("ai.generation.finished", &self.generated);
                self.form = Some(ParamForm::for_generated_command(&self.generated));
                self.view = View::ParameterInput;
            }
            StreamMessage::Error(StreamError::MissingCredential) => {
                self.busy = None;
                self.logger
                    .info("ai.generation.redirect", "missing credential");
                self.open_provider_select();
            }
            StreamMessage::Error(StreamError::Failed(reason)) => {
                self.busy = None;
                self.logger.error("ai.generation.failed", &reason);
                self.show_banner(format!("AI Error: {reason}"));
                self.view = View::List;
            }
        }
    }

    pub(super) fn open_provider_select(&mut self) {
        self.provider_cursor = 0;
        self.view = View::ProviderSelect;
    }

    pub(super) fn provider_select_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        match action {
            Action::Cancel => self.view = View::List,
            Action::MoveUp => self.provider_cursor = self.provider_cursor.saturating_sub(1),
            Action::MoveDown => {
                self.provider_cursor = (self.provider_cursor + 1).min(Provider::ALL.len() - 1);
            }
            Action::Confirm => {
                let provider = Provider::ALL[self.provider_cursor.min(Provider::ALL.len() - 1)];
                self.pending_provider = provider;
                self.active_provider = Some(provider);
                match resolve_api_key(provider, &self.session_keys, &self.env, &self.config) {
                    Some((api_key, source)) => {
                        self.logger.info(
                            "config.credential.resolved",
                            &format!("provider={} source={}", provider.as_str(), source.as_str()),
                        );
                        self.begin_model_listing(provider, api_key, effects);
                    }
                    None => {
                        self.key_input = TextInput::new()
                            .masked()
                            .with_placeholder(&format!("{} or paste key", provider.api_key_env()));
                        self.view = View::ApiKeyInput;
                    }
                }
            }
            _ => {}
        }
    }

    pub(super) fn api_key_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        match action {
            Action::Cancel => self.view = View::List,
            Action::OpenPicker => effects.push(Effect::LaunchPicker),
            Action::Confirm => {
                let api_key = self.key_input.value().trim().to_string();
                if api_key.is_empty() {
                    return;
                }
                let provider = self.pending_provider;
                self.session_keys.set(provider, &api_key);
                self.config.set_api_key(provider, &api_key);
                self.persist_config();
                self.key_input = TextInput::new().masked();
                self.begin_model_listing(provider, api_key, effects);
            }
            other => edit_input(&mut self.key_input, other),
        }
    }

    fn begin_model_listing(
        &mut self,
        provider: Provider,
        api_key: String,
        effects: &mut Vec<Effect>,
    ) {
        self.generated.clear();
        self.busy = Some(Busy::ModelListing(provider));
        self.view = View::Generating;
        effects.push(Effect::ListModels { provider, api_key });
    }

    pub(super) fn on_models_listed(
        &mut self,
        provider: Provider,
        result: Result<Vec<String>, String>,
    ) {
        if self.view != View::Generating || self.busy != Some(Busy::ModelListing(provider)) {
            return;
        }
        self.busy = None;
        match result {
            Ok(models) if !models.is_empty() => {
                self.logger.info(
                    "ai.models.listed",
                    &format!("provider={} count={}", provider.as_str(), models.len()),
                );
                self.model_list = FilterList::new(models);
                self.view = View::ModelSelect;
            }
            Ok(_) => self.fall_back_to_model_input(provider, "no models returned"),
            Err(reason) => self.fall_back_to_model_input(provider, &reason),
        }
    }

    fn fall_back_to_model_input(&mut self, provider: Provider, reason: &str) {
        self.logger.warn(
            "ai.models.fallback",
            &format!("provider={} reason={reason}", provider.as_str()),
        );
        self.model_input = TextInput::new()
            .with_placeholder(&format!("Model ID (e.g. {})", provider.default_model()));
        self.view = View::ModelInput;
    }

    pub(super) fn model_select_action(&mut self, action: Action) {
        match action {
            Action::Cancel => self.view = View::List,
            Action::MoveUp => self.model_list.select_prev(),
            Action::MoveDown => self.model_list.select_next(),
            Action::Insert(ch) => self.model_list.push_filter_char(ch),
            Action::Backspace => self.model_list.pop_filter_char(),
            Action::Confirm => {
                let Some(model) = self.model_list.selected().cloned() else {
                    return;
                };
                self.config.set_model(self.pending_provider, &model);
                self.persist_config();
                self.view = View::List;
            }
            _ => {}
        }
    }

    pub(super) fn model_input_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        match action {
            Action::Cancel => self.view = View::List,
            Action::OpenPicker => effects.push(Effect::LaunchPicker),
            Action::Confirm => {
                let model = self.model_input.value().trim().to_string();
                if !model.is_empty() {
                    self.config.set_model(self.pending_provider, &model);
                    self.persist_config();
                }
                self.view = View::List;
            }
            other => edit_input(&mut self.model_input, other),
        }
    }

    fn persist_config(&mut self) {
        if let Err(err) = self.store.save(&self.config) {
            self.logger.error("config.save.failed", &err.to_string());
            self.show_banner(format!("failed to save config: {err}"));
        }
    }
}
