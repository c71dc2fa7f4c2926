use super::sse::{chunk_text, read_events, SseEvent};
use super::stream::AiBackend;
use super::{
    user_prompt, AiError, Provider, ProviderCredential, GENERATION_MAX_TOKENS,
    GENERATION_TEMPERATURE, SYSTEM_INSTRUCTION,
};
use serde::Deserialize;
use serde_json::json;
use std::io::BufReader;
use std::time::Duration;

pub const GOOGLE_API_BASE_ENV: &str = "JUST_UI_GOOGLE_API_BASE";
pub const OPENAI_API_BASE_ENV: &str = "JUST_UI_OPENAI_API_BASE";
const DEFAULT_GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const GOOGLE_MODEL_PAGE_SIZE: &str = "1000";
const MAX_MODEL_PAGES: usize = 20;

/// Blocking HTTP client for the Gemini and OpenAI REST APIs.
#[derive(Debug, Clone)]
pub struct AiClient {
    google_base: String,
    openai_base: String,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct GoogleModelPage {
    #[serde(default)]
    models: Vec<GoogleModel>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiModelList {
    #[serde(default)]
    data: Vec<OpenAiModel>,
}

#[derive(Debug, Deserialize)]
struct OpenAiModel {
    id: String,
}

impl AiClient {
    pub fn new(google_base: &str, openai_base: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .build();
        Self {
            google_base: google_base.trim_end_matches('/').to_string(),
            openai_base: openai_base.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// Uses the public endpoints unless `JUST_UI_GOOGLE_API_BASE` /
    /// `JUST_UI_OPENAI_API_BASE` point elsewhere.
    pub fn from_env() -> Self {
        let base = |key: &str, default: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self::new(
            &base(GOOGLE_API_BASE_ENV, DEFAULT_GOOGLE_API_BASE),
            &base(OPENAI_API_BASE_ENV, DEFAULT_OPENAI_API_BASE),
        )
    }

    fn stream_request(
        &self,
        credential: &ProviderCredential,
        prompt: &str,
    ) -> Result<ureq::Response, AiError> {
        let provider = credential.provider;
        let result = match provider {
            Provider::Google => {
                let url = format!(
                    "{}/models/{}:streamGenerateContent",
                    self.google_base,
                    urlencoding::encode(&credential.model)
                );
                self.agent
                    .post(&url)
                    .query("alt", "sse")
                    .set("x-goog-api-key", &credential.api_key)
                    .send_json(json!({
                        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
                        "contents": [{ "role": "user", "parts": [{ "text": user_prompt(prompt) }] }],
                        "generationConfig": {
                            "temperature": GENERATION_TEMPERATURE,
                            "maxOutputTokens": GENERATION_MAX_TOKENS,
                        },
                    }))
            }
            Provider::OpenAi => {
                let url = format!("{}/chat/completions", self.openai_base);
                self.agent
                    .post(&url)
                    .set("Authorization", &format!("Bearer {}", credential.api_key))
                    .send_json(json!({
                        "model": credential.model,
                        "stream": true,
                        "temperature": GENERATION_TEMPERATURE,
                        "max_tokens": GENERATION_MAX_TOKENS,
                        "messages": [
                            { "role": "system", "content": SYSTEM_INSTRUCTION },
                            { "role": "user", "content": user_prompt(prompt) },
                        ],
                    }))
            }
        };
        result.map_err(|err| request_error(provider, err))
    }

    fn list_google_models(&self, api_key: &str) -> Result<Vec<String>, AiError> {
        let provider = Provider::Google;
        let url = format!("{}/models", self.google_base);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        for _ in 0..MAX_MODEL_PAGES {
            let mut request = self
                .agent
                .get(&url)
                .query("pageSize", GOOGLE_MODEL_PAGE_SIZE)
                .set("x-goog-api-key", api_key);
            if let Some(token) = &page_token {
                request = request.query("pageToken", token);
            }
            let page: GoogleModelPage = request
                .call()
                .map_err(|err| request_error(provider, err))?
                .into_json()
                .map_err(|e| AiError::Decode {
                    provider,
                    reason: e.to_string(),
                })?;
            models.extend(google_generation_models(
                page.models.into_iter().map(|m| m.name),
            ));
            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }
        Ok(models)
    }

    fn list_openai_models(&self, api_key: &str) -> Result<Vec<String>, AiError> {
        let provider = Provider::OpenAi;
        let list: OpenAiModelList = self
            .agent
            .get(&format!("{}/models", self.openai_base))
            .set("Authorization", &format!("Bearer {api_key}"))
            .call()
            .map_err(|err| request_error(provider, err))?
            .into_json()
            .map_err(|e| AiError::Decode {
                provider,
                reason: e.to_string(),
            })?;
        Ok(openai_chat_models(list.data.into_iter().map(|m| m.id)))
    }
}

impl AiBackend for AiClient {
    fn generate(
        &self,
        credential: &ProviderCredential,
        prompt: &str,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, AiError> {
        let provider = credential.provider;
        let response = self.stream_request(credential, prompt)?;
        let reader = BufReader::new(response.into_reader());
        let mut full = String::new();
        read_events(reader, provider, |event| {
            if let SseEvent::Data(payload) = event {
                let text = chunk_text(provider, &payload)?;
                if !text.is_empty() {
                    on_chunk(&text);
                    full.push_str(&text);
                }
            }
            Ok(())
        })?;
        if full.is_empty() {
            return Err(AiError::EmptyResponse { provider });
        }
        Ok(full)
    }

    fn list_models(&self, provider: Provider, api_key: &str) -> Result<Vec<String>, AiError> {
        let models = match provider {
            Provider::Google => self.list_google_models(api_key)?,
            Provider::OpenAi => self.list_openai_models(api_key)?,
        };
        if models.is_empty() {
            return Err(AiError::NoModels { provider });
        }
        Ok(models)
    }
}

fn request_error(provider: Provider, err: ureq::Error) -> AiError {
    match err {
        ureq::Error::Status(status, response) => AiError::Status {
            provider,
            status,
            body: response.into_string().unwrap_or_default().trim().to_string(),
        },
        ureq::Error::Transport(transport) => AiError::Transport {
            provider,
            reason: transport.to_string(),
        },
    }
}

/// Gemini names arrive as `models/<id>`; only the gemini family generates text.
pub fn google_generation_models(names: impl IntoIterator<Item = String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| name.contains("gemini"))
        .map(|name| {
            name.strip_prefix("models/")
                .map(str::to_string)
                .unwrap_or(name)
        })
        .collect()
}

pub fn openai_chat_models(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut models: Vec<String> = ids.into_iter().filter(|id| id.starts_with("gpt")).collect();
    models.sort();
    models
}
