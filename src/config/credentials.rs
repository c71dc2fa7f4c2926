use super::Config;
use crate::ai::Provider;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Session,
    Environment,
    ConfigFile,
}

impl CredentialSource {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialSource::Session => "session",
            CredentialSource::Environment => "environment",
            CredentialSource::ConfigFile => "config file",
        }
    }
}

/// First non-empty value wins: session, then environment, then file.
pub fn resolve_layered(
    session: Option<&str>,
    environment: Option<&str>,
    file: Option<&str>,
) -> Option<(String, CredentialSource)> {
    [
        (session, CredentialSource::Session),
        (environment, CredentialSource::Environment),
        (file, CredentialSource::ConfigFile),
    ]
    .into_iter()
    .find_map(|(value, source)| {
        value
            .filter(|v| !v.is_empty())
            .map(|v| (v.to_string(), source))
    })
}

/// Snapshot of the provider key environment variables, taken once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderEnv {
    keys: BTreeMap<Provider, String>,
}

impl ProviderEnv {
    pub fn from_process_env() -> Self {
        let mut keys = BTreeMap::new();
        for provider in Provider::ALL {
            if let Ok(value) = std::env::var(provider.api_key_env()) {
                keys.insert(provider, value);
            }
        }
        Self { keys }
    }

    pub fn with_key(mut self, provider: Provider, value: &str) -> Self {
        self.keys.insert(provider, value.to_string());
        self
    }

    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        self.keys.get(&provider).map(String::as_str)
    }
}

/// Keys typed into the UI during this run.
#[derive(Debug, Clone, Default)]
pub struct SessionKeys {
    keys: BTreeMap<Provider, String>,
}

impl SessionKeys {
    pub fn set(&mut self, provider: Provider, value: &str) {
        self.keys.insert(provider, value.to_string());
    }

    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        self.keys.get(&provider).map(String::as_str)
    }
}

pub fn resolve_api_key(
    provider: Provider,
    session: &SessionKeys,
    env: &ProviderEnv,
    config: &Config,
) -> Option<(String, CredentialSource)> {
    resolve_layered(
        session.api_key(provider),
        env.api_key(provider),
        config.api_key(provider),
    )
}
