//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use dealscan_crm::DEFAULT_API_VERSION;
use dealscan_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// Secrets are never stored here; they come from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub active_profile: String,

    /// Available org profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, OrgProfile>,

    /// Model provider settings
    #[serde(default)]
    pub model: ModelSettings,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// File this configuration was loaded from
    #[serde(skip)]
    path: Option<PathBuf>,
}

/// Connection settings for one CRM org.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgProfile {
    /// Instance URL, e.g. `https://acme.my.salesforce.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_url: Option<String>,

    /// Login domain used when no instance URL is known (`login` or `test`)
    #[serde(default = "default_login_domain")]
    pub login_domain: String,

    /// REST API version
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for OrgProfile {
    fn default() -> Self {
        Self {
            instance_url: None,
            login_domain: default_login_domain(),
            api_version: default_api_version(),
        }
    }
}

/// Which model backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// AWS Bedrock Converse
    Bedrock,
    /// Local Ollama
    Ollama,
}

/// Model provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Backend used for extraction
    pub provider: ProviderKind,

    /// Bedrock model or inference profile id
    pub bedrock_model_id: String,

    /// AWS region for Bedrock
    pub aws_region: String,

    /// Ollama endpoint
    pub ollama_endpoint: String,

    /// Ollama model
    pub ollama_model: String,

    /// Decoding and timeout settings
    pub extraction: ExtractorConfig,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Bedrock,
            bedrock_model_id: dealscan_llm::bedrock::DEFAULT_MODEL_ID.to_string(),
            aws_region: dealscan_llm::bedrock::DEFAULT_REGION.to_string(),
            ollama_endpoint: dealscan_llm::ollama::DEFAULT_ENDPOINT.to_string(),
            ollama_model: "llama3".to_string(),
            extraction: ExtractorConfig::default(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Total request timeout (seconds)
    pub timeout_secs: u64,

    /// Connect timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Default number of opportunities to list
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".dealscan").join("config.toml"))
    }

    /// Load configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load configuration from `path`, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str::<Config>(&contents)?
        } else {
            Self::default()
        };
        config.model.extraction.validate()?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Save configuration back to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::default_path()?,
        };
        self.save_to(&path)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the active profile.
    pub fn get_active_profile(&self) -> Result<&OrgProfile> {
        self.profiles.get(&self.active_profile).ok_or_else(|| {
            CliError::Config(format!("Profile '{}' not found", self.active_profile))
        })
    }

    /// Add or update a profile.
    pub fn set_profile(&mut self, name: String, profile: OrgProfile) {
        self.profiles.insert(name, profile);
    }

    /// Switch to a different profile.
    pub fn switch_profile(&mut self, name: String) -> Result<()> {
        if !self.profiles.contains_key(&name) {
            return Err(CliError::Config(format!("Profile '{}' does not exist", name)));
        }
        self.active_profile = name;
        Ok(())
    }

    /// Delete a profile other than the active one.
    pub fn delete_profile(&mut self, name: &str) -> Result<OrgProfile> {
        if name == self.active_profile {
            return Err(CliError::InvalidInput(format!(
                "Cannot delete the active profile '{}'",
                name
            )));
        }
        self.profiles
            .remove(name)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' does not exist", name)))
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("default".to_string(), OrgProfile::default());

        Self {
            active_profile: "default".to_string(),
            profiles,
            model: ModelSettings::default(),
            http: HttpSettings::default(),
            settings: Settings::default(),
            path: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            default_limit: default_limit(),
        }
    }
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_login_domain() -> String {
    dealscan_auth::DEFAULT_LOGIN_DOMAIN.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_limit() -> usize {
    10
}
