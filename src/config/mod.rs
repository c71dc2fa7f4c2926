pub mod credentials;
pub mod error;
pub mod paths;
pub mod store;

pub use credentials::{
    resolve_api_key, resolve_layered, CredentialSource, ProviderEnv, SessionKeys,
};
pub use error::ConfigError;
pub use paths::{default_config_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV};
pub use store::ConfigStore;

use crate::ai::Provider;
use serde::{Deserialize, Serialize};

/// Persisted provider credentials and model choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
}

impl Config {
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        let value = match provider {
            Provider::Google => &self.google_api_key,
            Provider::OpenAi => &self.openai_api_key,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn set_api_key(&mut self, provider: Provider, key: &str) {
        let slot = match provider {
            Provider::Google => &mut self.google_api_key,
            Provider::OpenAi => &mut self.openai_api_key,
        };
        *slot = Some(key.to_string());
    }

    pub fn model(&self, provider: Provider) -> Option<&str> {
        let value = match provider {
            Provider::Google => &self.google_model,
            Provider::OpenAi => &self.openai_model,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn set_model(&mut self, provider: Provider, model: &str) {
        let slot = match provider {
            Provider::Google => &mut self.google_model,
            Provider::OpenAi => &mut self.openai_model,
        };
        *slot = Some(model.to_string());
    }

    /// Configured model for `provider`, or the provider default.
    pub fn model_or_default(&self, provider: Provider) -> String {
        self.model(provider)
            .unwrap_or(provider.default_model())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_in_file_count_as_absent() {
        let config: Config =
            serde_json::from_str(r#"{"google_api_key":"","google_model":""}"#).expect("parse");
        assert_eq!(config.api_key(Provider::Google), None);
        assert_eq!(config.model_or_default(Provider::Google), "gemini-2.0-flash");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let config: Config =
            serde_json::from_str(r#"{"openai_model":"gpt-4o-mini","theme":"dark"}"#)
                .expect("parse");
        assert_eq!(config.model_or_default(Provider::OpenAi), "gpt-4o-mini");
    }
}
