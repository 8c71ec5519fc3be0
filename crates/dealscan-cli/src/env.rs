//! Environment overrides and resolution of the effective settings.

use crate::config::{Config, ProviderKind};
use crate::error::Result;
use dealscan_auth::{AuthConfig, ClientCredentials, PasswordCredentials};
use dealscan_crm::CrmConfig;
use dealscan_extractor::ExtractorConfig;
use dealscan_llm::{AwsCredentials, BedrockConfig};
use std::collections::HashMap;
use std::time::Duration;

/// Variables read from the process environment
pub const ENV_KEYS: &[&str] = &[
    "SALESFORCE_CONSUMER_KEY",
    "SALESFORCE_CONSUMER_SECRET",
    "SALESFORCE_INSTANCE_URL",
    "SALESFORCE_ACCESS_TOKEN",
    "SALESFORCE_USERNAME",
    "SALESFORCE_PASSWORD",
    "SALESFORCE_SECURITY_TOKEN",
    "SALESFORCE_DOMAIN",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "AWS_REGION",
    "BEDROCK_MODEL_ID",
];

/// Snapshot of the relevant environment variables
#[derive(Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Read [`ENV_KEYS`] from the process environment
    pub fn from_process() -> Self {
        Self::from_pairs(
            ENV_KEYS
                .iter()
                .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value))),
        )
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.vars.keys().collect();
        keys.sort();
        f.debug_struct("Environment").field("keys", &keys).finish()
    }
}

/// Effective settings: config file values overridden by the environment
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Token manager configuration
    pub auth: AuthConfig,
    /// Externally obtained access token to seed the store with
    pub access_token: Option<String>,
    /// CRM client configuration
    pub crm: CrmConfig,
    /// Selected model backend
    pub provider: ProviderKind,
    /// Bedrock configuration
    pub bedrock: BedrockConfig,
    /// Ollama endpoint
    pub ollama_endpoint: String,
    /// Ollama model
    pub ollama_model: String,
    /// Extraction settings
    pub extraction: ExtractorConfig,
}

impl Config {
    /// Resolve the effective settings for the active profile
    pub fn resolve(&self, env: &Environment) -> Result<Resolved> {
        let profile = self.get_active_profile()?;
        let timeout = Duration::from_secs(self.http.timeout_secs);
        let connect_timeout = Duration::from_secs(self.http.connect_timeout_secs);

        let mut auth = AuthConfig::default()
            .with_login_domain(
                env.owned("SALESFORCE_DOMAIN")
                    .unwrap_or_else(|| profile.login_domain.clone()),
            )
            .with_timeouts(timeout, connect_timeout);

        if let Some(url) = env
            .owned("SALESFORCE_INSTANCE_URL")
            .or_else(|| profile.instance_url.clone())
        {
            auth = auth.with_instance_url(url);
        }
        if let (Some(key), Some(secret)) = (
            env.get("SALESFORCE_CONSUMER_KEY"),
            env.get("SALESFORCE_CONSUMER_SECRET"),
        ) {
            auth = auth.with_client_credentials(ClientCredentials::new(key, secret));
        }
        if let (Some(username), Some(password)) = (
            env.get("SALESFORCE_USERNAME"),
            env.get("SALESFORCE_PASSWORD"),
        ) {
            auth = auth.with_password_credentials(PasswordCredentials::new(
                username,
                password,
                env.owned("SALESFORCE_SECURITY_TOKEN"),
            ));
        }

        let crm = CrmConfig {
            api_version: profile.api_version.clone(),
            timeout,
            connect_timeout,
        };

        let credentials = match (
            env.get("AWS_ACCESS_KEY_ID"),
            env.get("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(AwsCredentials {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
                session_token: env.owned("AWS_SESSION_TOKEN"),
            }),
            _ => None,
        };

        let extraction = self.model.extraction.clone();
        let bedrock = BedrockConfig {
            model_id: env
                .owned("BEDROCK_MODEL_ID")
                .unwrap_or_else(|| self.model.bedrock_model_id.clone()),
            region: env
                .owned("AWS_REGION")
                .unwrap_or_else(|| self.model.aws_region.clone()),
            credentials,
            timeout: extraction.timeout(),
            connect_timeout,
        };

        Ok(Resolved {
            auth,
            access_token: env.owned("SALESFORCE_ACCESS_TOKEN"),
            crm,
            provider: self.model.provider,
            bedrock,
            ollama_endpoint: self.model.ollama_endpoint.clone(),
            ollama_model: self.model.ollama_model.clone(),
            extraction,
        })
    }
}
