//! Configuration management for the MedRAG backend.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`MEDRAG_CONFIG` or `./medrag.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Config file looked up in the working directory when `MEDRAG_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "medrag.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Optional config file path (not read from YAML)
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Vector index artifacts and search limits
    pub vector: VectorConfig,

    /// Lexical engine connection
    pub lexical: LexicalConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Query embedding collaborator
    pub embedder: EmbedderConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Vector index artifacts and search limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// Serialized FAISS flat index
    pub index_path: PathBuf,

    /// CSV table with `Index` and `ID` columns
    pub mapping_path: PathBuf,

    /// Neighbors per query when the request omits `k`
    pub default_k: usize,

    /// Largest `k` a request may ask for
    pub max_k: usize,

    /// Base URL of a running vector search server (used by clients)
    pub service_url: String,

    /// Client timeout for calls to `service_url`, in seconds
    pub timeout_secs: u64,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("faiss_indices/faiss_index.index"),
            mapping_path: PathBuf::from("faiss_indices/faiss_csv.csv"),
            default_k: 5,
            max_k: 1024,
            service_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Lexical engine connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    /// Elasticsearch base URL
    pub url: String,

    /// Name of the full-text index
    pub index: String,

    /// Upper bound on one round trip, in seconds
    pub timeout_secs: u64,

    /// Hits requested when the caller does not specify `k`
    pub default_k: usize,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "injury_prevent_index".to_string(),
            timeout_secs: 60,
            default_k: 10,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 5000)),
        }
    }
}

/// Query embedding collaborator (Ollama-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive override
    pub level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `MEDRAG_CONFIG`: Path to config file
    /// - `MEDRAG_INDEX_PATH`: Vector index file
    /// - `MEDRAG_MAPPING_PATH`: Position to identifier CSV
    /// - `MEDRAG_LISTEN`: Server listen address
    /// - `MEDRAG_VECTOR_URL`: Vector search server URL
    /// - `ELASTIC_URL`: Lexical engine URL
    /// - `MEDRAG_LEXICAL_INDEX`: Lexical index name
    /// - `OLLAMA_URL`: Embedding endpoint
    /// - `MEDRAG_EMBED_MODEL`: Embedding model
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use medrag_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {:?}", config.vector.index_path);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `env` to resolve environment variables.
    pub fn load_with<F>(env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = env("MEDRAG_CONFIG").map(PathBuf::from);

        let mut config = match &explicit {
            Some(path) => Self::from_yaml_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_yaml_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.config_file = explicit;

        config.apply_env(env)?;
        Ok(config)
    }

    /// Read a YAML config file. Missing sections keep their defaults.
    pub fn from_yaml_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut config: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.config_file = Some(path.to_path_buf());

        Ok(config)
    }

    /// Environment variables override YAML config.
    fn apply_env<F>(&mut self, env: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env("MEDRAG_INDEX_PATH") {
            self.vector.index_path = PathBuf::from(path);
        }

        if let Some(path) = env("MEDRAG_MAPPING_PATH") {
            self.vector.mapping_path = PathBuf::from(path);
        }

        if let Some(url) = env("MEDRAG_VECTOR_URL") {
            self.vector.service_url = url;
        }

        if let Some(listen) = env("MEDRAG_LISTEN") {
            self.server.listen = listen.parse().map_err(|e| {
                AppError::Config(format!("Invalid MEDRAG_LISTEN '{}': {}", listen, e))
            })?;
        }

        if let Some(url) = env("ELASTIC_URL") {
            self.lexical.url = url;
        }

        if let Some(index) = env("MEDRAG_LEXICAL_INDEX") {
            self.lexical.index = index;
        }

        if let Some(url) = env("OLLAMA_URL") {
            self.embedder.endpoint = url;
        }

        if let Some(model) = env("MEDRAG_EMBED_MODEL") {
            self.embedder.model = model;
        }

        if let Some(level) = env("RUST_LOG") {
            self.logging.level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            self.logging.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over the config file and environment.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.logging.level = Some(log_level);
        }

        if verbose {
            self.logging.verbose = true;
            // Verbose mode implies debug logging
            if self.logging.level.is_none() {
                self.logging.level = Some("debug".to_string());
            }
        }

        if no_color {
            self.logging.no_color = true;
        }

        self
    }

    /// Validate limits and connection settings.
    pub fn validate(&self) -> AppResult<()> {
        if self.vector.default_k == 0 {
            return Err(AppError::Config("vector.default_k must be positive".into()));
        }

        if self.vector.max_k < self.vector.default_k {
            return Err(AppError::Config(format!(
                "vector.max_k ({}) must be at least vector.default_k ({})",
                self.vector.max_k, self.vector.default_k
            )));
        }

        if self.lexical.default_k == 0 {
            return Err(AppError::Config("lexical.default_k must be positive".into()));
        }

        if self.vector.timeout_secs == 0
            || self.lexical.timeout_secs == 0
            || self.embedder.timeout_secs == 0
        {
            return Err(AppError::Config("Timeouts must be positive".into()));
        }

        for (name, value) in [
            ("vector.service_url", &self.vector.service_url),
            ("lexical.url", &self.lexical.url),
            ("lexical.index", &self.lexical.index),
            ("embedder.endpoint", &self.embedder.endpoint),
            ("embedder.model", &self.embedder.model),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }
}
