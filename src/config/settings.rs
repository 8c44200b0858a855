//! Configuration settings for docsage.

use crate::error::{DocsageError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub corpus: CorpusSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub chat: ChatSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level without -v flags (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Model server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the Ollama server (without the `/v1` suffix).
    pub host: String,
    /// API key sent to the OpenAI-compatible endpoint.
    pub api_key: String,
    /// Timeout for embedding and completion requests, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            api_key: "ollama".to_string(),
            request_timeout_secs: 300,
        }
    }
}

impl ServerSettings {
    /// Base URL of the OpenAI-compatible API.
    pub fn api_base(&self) -> String {
        format!("{}/v1", self.host.trim_end_matches('/'))
    }

    /// Base URL of the native Ollama API.
    pub fn native_base(&self) -> String {
        self.host.trim_end_matches('/').to_string()
    }
}

/// Reference corpus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// Pages fetched and indexed at startup, in corpus order.
    pub urls: Vec<String>,
    /// Per-page fetch timeout, in seconds.
    pub fetch_timeout_secs: u64,
    /// Maximum pages fetched at once.
    pub max_concurrent_fetches: usize,
    /// User agent sent with page fetches.
    pub user_agent: String,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            urls: vec![
                "https://docs.oracle.com/en/java/javase/21/migrate/migrating-jdk-8-later-jdk-releases.html".to_string(),
                "https://goatswitch.ai/java-21-migration-guide-master-the-upgrade-from-java-8/".to_string(),
                "https://github.com/spring-projects/spring-batch/wiki/Spring-Batch-5.0-Migration-Guide/".to_string(),
                "https://github-wiki-see.page/m/micrometer-metrics/tracing/wiki/Spring-Cloud-Sleuth-3.1-Migration-Guide".to_string(),
                "https://www.springcloud.io/post/2022-11/springboot3-upgrade-guide/".to_string(),
                "https://github.com/spring-projects/spring-boot/wiki/Spring-Boot-3.0-Migration-Guide".to_string(),
            ],
            fetch_timeout_secs: 30,
            max_concurrent_fetches: 4,
            user_agent: concat!("docsage/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model served by the model server.
    pub model: String,
    /// Expected embedding dimensions. Learned from the first response if unset.
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            dimensions: Some(384),
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Completion model used for answers.
    pub model: String,
    /// Maximum tokens per answer.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Context passages longer than this many characters are cut.
    pub max_context_chars: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "llama3".to_string(),
            max_tokens: 150,
            temperature: 0.7,
            max_context_chars: 12_000,
        }
    }
}

/// Interactive chat settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Chat model.
    pub model: String,
    /// Maximum number of user/assistant messages kept in history.
    pub max_history: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "llama3".to_string(),
            max_history: 20,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DocsageError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docsage")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Check that configured URLs are usable.
    pub fn validate(&self) -> Result<()> {
        parse_http_url(&self.server.host)
            .map_err(|e| DocsageError::Config(format!("server.host: {}", e)))?;

        if self.corpus.urls.is_empty() {
            return Err(DocsageError::Config("corpus.urls is empty".to_string()));
        }
        for url in &self.corpus.urls {
            parse_http_url(url).map_err(|e| DocsageError::Config(format!("corpus.urls: {}", e)))?;
        }

        if self.corpus.max_concurrent_fetches == 0 {
            return Err(DocsageError::Config(
                "corpus.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a URL and require an http or https scheme.
pub fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| DocsageError::InvalidInput(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DocsageError::InvalidInput(format!(
            "{}: unsupported scheme '{}'",
            raw, other
        ))),
    }
}
