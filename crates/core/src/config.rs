//! Configuration management for docqa.
//!
//! This module handles loading and merging configuration from multiple sources,
//! in increasing order of precedence:
//! - Built-in defaults
//! - A YAML config file (`--config`, `DOCQA_CONFIG`, or `./docqa.yaml`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "docqa.yaml";

const KNOWN_LLM_PROVIDERS: [&str; 2] = ["ollama", "openai"];
const KNOWN_EMBEDDING_PROVIDERS: [&str; 3] = ["mock", "ollama", "openai"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file the values were merged from, if any
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log line format ("text" or "json")
    pub log_format: String,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Token issuance settings
    pub auth: AuthConfig,

    /// Generation backend
    pub llm: LlmSettings,

    /// Embedding backend
    pub embedding: EmbeddingSettings,

    /// Chunking and retrieval parameters
    pub rag: RagSettings,

    /// Document registry location (`:memory:`, `sqlite://path`, or a plain path)
    pub database_url: String,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Token issuance and verification settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,

    /// Lifetime of issued tokens
    pub token_expiry_minutes: i64,

    /// The single accepted username
    pub username: String,

    /// The single accepted password
    pub password: String,

    /// Require a bearer token on document and question routes
    pub required: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "secret".to_string(),
            token_expiry_minutes: 30,
            username: "admin".to_string(),
            password: "secret".to_string(),
            required: false,
        }
    }
}

/// Generation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name ("ollama", "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom endpoint URL
    pub endpoint: Option<String>,

    /// API key for hosted providers
    pub api_key: Option<String>,

    /// HTTP request timeout
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key: None,
            timeout_secs: 120,
            temperature: 0.0,
            max_tokens: 256,
        }
    }
}

/// Embedding backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider name ("mock", "ollama", "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Vector dimension produced by the model
    pub dimensions: usize,

    /// Custom endpoint URL
    pub endpoint: Option<String>,

    /// API key for hosted providers
    pub api_key: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            api_key: None,
        }
    }
}

/// Chunking and retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagSettings {
    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    pub top_k: usize,

    /// Handlebars template with `question` and `context` variables
    pub prompt_template: Option<String>,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 4,
            prompt_template: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    server: Option<ServerConfig>,
    auth: Option<AuthConfig>,
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    rag: Option<RagSettings>,
    database_url: Option<String>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            log_level: None,
            log_format: "text".to_string(),
            verbose: false,
            no_color: false,
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            rag: RagSettings::default(),
            database_url: ":memory:".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, environment variables and defaults.
    ///
    /// When `config_file` is `None`, `DOCQA_CONFIG` is consulted, then
    /// `./docqa.yaml` if it exists. An explicitly named file must exist.
    ///
    /// Environment variables:
    /// - `LOG_LEVEL`: Log level
    /// - `OPENAI_API_KEY`: API key for OpenAI backends
    /// - `DATABASE_URL`: Document registry location
    /// - `JWT_SECRET`: Token signing secret
    /// - `DOCQA_PROVIDER` / `DOCQA_MODEL`: Generation backend
    /// - `DOCQA_EMBEDDING_PROVIDER`: Embedding backend
    /// - `OLLAMA_URL`: Endpoint for Ollama backends
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Listening on {}:{}", config.server.host, config.server.port);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("DOCQA_CONFIG").ok().map(PathBuf::from));

        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                fallback.exists().then_some(fallback)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        // Environment variables override YAML config
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut result = self.merge_yaml_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        result.config_file = Some(path.to_path_buf());

        Ok(result)
    }

    /// Merge YAML text into this config. Sections present replace defaults.
    fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        // An empty document parses as unit, treat it as "nothing to merge"
        let config_file: ConfigFile = if contents.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        let mut result = self.clone();

        if let Some(server) = config_file.server {
            result.server = server;
        }
        if let Some(auth) = config_file.auth {
            result.auth = auth;
        }
        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(rag) = config_file.rag {
            result.rag = rag;
        }
        if let Some(database_url) = config_file.database_url {
            result.database_url = database_url;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        Ok(result)
    }

    /// Apply environment overrides using the given variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = Some(level);
        }

        if let Some(key) = lookup("OPENAI_API_KEY") {
            if self.llm.api_key.is_none() {
                self.llm.api_key = Some(key.clone());
            }
            if self.embedding.api_key.is_none() {
                self.embedding.api_key = Some(key);
            }
        }

        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }

        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(provider) = lookup("DOCQA_PROVIDER") {
            self.llm.provider = provider;
        }

        if let Some(model) = lookup("DOCQA_MODEL") {
            self.llm.model = model;
        }

        if let Some(provider) = lookup("DOCQA_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }

        if let Some(url) = lookup("OLLAMA_URL") {
            if self.llm.provider == "ollama" && self.llm.endpoint.is_none() {
                self.llm.endpoint = Some(url.clone());
            }
            if self.embedding.provider == "ollama" && self.embedding.endpoint.is_none() {
                self.embedding.endpoint = Some(url);
            }
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate configuration for the active providers and RAG parameters.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.llm.provider == "openai" && self.llm.api_key.is_none() {
            return Err(AppError::Config(
                "API key not found for provider openai (set OPENAI_API_KEY)".to_string(),
            ));
        }

        if self.embedding.provider == "openai" && self.embedding.api_key.is_none() {
            return Err(AppError::Config(
                "API key not found for embedding provider openai (set OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.rag.chunk_size == 0 {
            return Err(AppError::Config(
                "Chunk size must be greater than zero".to_string(),
            ));
        }

        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }

        if self.rag.top_k == 0 {
            return Err(AppError::Config(
                "top_k must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.embedding.provider, "mock");
        assert_eq!(config.rag.chunk_size, 500);
        assert_eq!(config.rag.chunk_overlap, 50);
        assert_eq!(config.rag.top_k, 4);
        assert_eq!(config.database_url, ":memory:");
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("openai".to_string()),
            Some("gpt-4o-mini".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.llm.provider, "openai");
        assert_eq!(overridden.llm.model, "gpt-4o-mini");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_partial_sections() {
        let yaml = r#"
rag:
  chunk_size: 200
server:
  port: 9000
logging:
  level: warn
  color: false
  format: json
"#;
        let merged = AppConfig::default().merge_yaml_str(yaml).unwrap();

        assert_eq!(merged.rag.chunk_size, 200);
        // Unspecified fields within a section keep their defaults
        assert_eq!(merged.rag.chunk_overlap, 50);
        assert_eq!(merged.server.port, 9000);
        assert_eq!(merged.server.host, "127.0.0.1");
        assert_eq!(merged.log_level, Some("warn".to_string()));
        assert_eq!(merged.log_format, "json");
        assert!(merged.no_color);
    }

    #[test]
    fn test_merge_empty_yaml() {
        let merged = AppConfig::default().merge_yaml_str("").unwrap();
        assert_eq!(merged.rag, RagSettings::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docqa.yaml");
        std::fs::write(&path, "database_url: sqlite://docs.db\n").unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.database_url, "sqlite://docs.db");
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/here.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_env() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "sqlite://x.db"),
            ("LOG_LEVEL", "debug"),
            ("OLLAMA_URL", "http://gpu-box:11434"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.database_url, "sqlite://x.db");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        // Only the ollama-backed section picks up OLLAMA_URL
        assert_eq!(config.llm.endpoint.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.embedding.endpoint, None);
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.llm.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_openai_requires_key() {
        let mut config = AppConfig::default();
        config.llm.provider = "openai".to_string();
        assert!(config.validate().is_err());

        config.llm.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_chunk_parameters() {
        let mut config = AppConfig::default();
        config.rag.chunk_overlap = config.rag.chunk_size;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.rag.chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.rag.top_k = 0;
        assert!(config.validate().is_err());
    }
}
