use std::fmt;

pub mod client;
pub mod sse;
pub mod stream;

pub use client::{AiClient, GOOGLE_API_BASE_ENV, OPENAI_API_BASE_ENV};
pub use stream::{spawn_generation, worker_exited, AiBackend, WORKER_EXITED};

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that converts natural language requests into a single shell command. Respond with only the command: no markdown code blocks, no explanations, no quotes.";
pub const GENERATION_TEMPERATURE: f64 = 0.0;
pub const GENERATION_MAX_TOKENS: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Provider {
    Google,
    OpenAi,
}

impl Provider {
    /// Display and fallback order.
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::OpenAi];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAi => "openai",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Google => "Google Gemini",
            Provider::OpenAi => "OpenAI",
        }
    }

    pub fn api_key_env(self) -> &'static str {
        match self {
            Provider::Google => "GOOGLE_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Google => "gemini-2.0-flash",
            Provider::OpenAi => "gpt-4o",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
}

/// Everything a generation worker needs, captured by value when it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// `None` when no provider has a resolvable key; the worker reports
    /// [`StreamError::MissingCredential`] instead of calling out.
    pub credential: Option<ProviderCredential>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    MissingCredential,
    Failed(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::MissingCredential => f.write_str("no API key configured"),
            StreamError::Failed(reason) => f.write_str(reason),
        }
    }
}

/// One message of a generation stream. A generation produces any number of
/// chunks followed by exactly one `Error` or `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Error(StreamError),
    Done,
}

impl StreamMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamMessage::Chunk(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("{provider} request failed: {reason}")]
    Transport { provider: Provider, reason: String },
    #[error("{provider} API returned status {status}: {body}")]
    Status {
        provider: Provider,
        status: u16,
        body: String,
    },
    #[error("{provider} API error: {message}")]
    Api { provider: Provider, message: String },
    #[error("failed to decode {provider} response: {reason}")]
    Decode { provider: Provider, reason: String },
    #[error("{provider} returned no models")]
    NoModels { provider: Provider },
    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: Provider },
}

pub fn user_prompt(request: &str) -> String {
    format!("Request: {request}\nCommand:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_error_and_done_are_terminal() {
        assert!(!StreamMessage::Chunk("ls".to_string()).is_terminal());
        assert!(StreamMessage::Done.is_terminal());
        assert!(StreamMessage::Error(StreamError::MissingCredential).is_terminal());
    }
}
