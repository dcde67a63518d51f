//! Configuration management for Ragline.
//!
//! This module handles loading and merging configuration from multiple sources,
//! lowest precedence first:
//! - Built-in defaults
//! - A YAML config file (`ragline.yaml` or `RAGLINE_CONFIG`)
//! - Environment variables (a `.env` file is loaded into the environment first)
//! - Command-line flags (`with_overrides`)
//!
//! Credentials are only ever read from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ragline.yaml";

/// Generation providers known to the factory.
pub const KNOWN_PROVIDERS: [&str; 2] = ["groq", "mock"];

/// Search providers known to the factory.
pub const KNOWN_SEARCH_PROVIDERS: [&str; 2] = ["tavily", "static"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Generation provider ("groq", "mock")
    pub provider: String,

    /// Model identifier passed to the generation provider
    pub model: String,

    /// Override for the provider's base URL (any OpenAI-compatible server)
    pub llm_endpoint: Option<String>,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,

    /// Generation provider credential
    #[serde(skip_serializing)]
    pub groq_api_key: Option<String>,

    /// Search provider ("tavily", "static")
    pub search_provider: String,

    /// Maximum results requested from the search provider
    pub max_search_results: u32,

    /// Search provider credential
    #[serde(skip_serializing)]
    pub tavily_api_key: Option<String>,

    /// Deadline for each provider call, in seconds
    pub request_timeout_secs: u64,

    /// Bind address for the HTTP server
    pub host: String,

    /// Bind port for the HTTP server
    pub port: u16,

    /// Allowed CORS origins ("*" allows any)
    pub cors_origins: Vec<String>,

    /// Optional YAML file overriding the prompt templates
    pub prompts_file: Option<PathBuf>,

    /// Debug mode (implies debug logging)
    pub debug: bool,

    /// Log level / filter override
    pub log_level: Option<String>,

    /// Log output format ("text" or "json")
    pub log_format: String,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    search: Option<SearchSection>,
    server: Option<ServerSection>,
    prompts: Option<PromptsSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSection {
    provider: Option<String>,
    max_results: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerSection {
    host: Option<String>,
    port: Option<u16>,
    timeout_secs: Option<u64>,
    cors_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptsSection {
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    format: Option<String>,
    debug: Option<bool>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "groq".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            llm_endpoint: None,
            max_tokens: 1000,
            temperature: 0.7,
            groq_api_key: None,
            search_provider: "tavily".to_string(),
            max_search_results: 5,
            tavily_api_key: None,
            request_timeout_secs: 60,
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            prompts_file: None,
            debug: false,
            log_level: None,
            log_format: "text".to_string(),
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and the environment.
    ///
    /// Environment variables:
    /// - `RAGLINE_CONFIG`: Path to config file
    /// - `GROQ_API_KEY`, `TAVILY_API_KEY`: Provider credentials
    /// - `RAGLINE_PROVIDER`, `GROQ_MODEL`, `RAGLINE_LLM_ENDPOINT`
    /// - `MAX_TOKENS`, `TEMPERATURE`
    /// - `RAGLINE_SEARCH_PROVIDER`, `TAVILY_MAX_RESULTS`
    /// - `RAGLINE_TIMEOUT_SECS`, `HOST`, `PORT`, `CORS_ORIGINS`
    /// - `RAGLINE_PROMPTS`, `DEBUG`, `RUST_LOG`, `RAGLINE_LOG_FORMAT`, `NO_COLOR`
    ///
    /// # Example
    /// ```no_run
    /// use ragline_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Model: {}", config.model);
    /// ```
    pub fn load(config_file: Option<PathBuf>) -> AppResult<Self> {
        // A missing .env is normal outside development
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AppError::Config(format!("Failed to load .env file: {}", e)));
            }
        }

        Self::from_sources(config_file, |key| std::env::var(key).ok())
    }

    /// Build a configuration from an explicit config file and variable lookup.
    pub fn from_sources<F>(config_file: Option<PathBuf>, env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let config_path = config_file
            .or_else(|| env("RAGLINE_CONFIG").map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            config = config.merge_yaml(&path)?;
        }

        config.merge_env(&env)?;

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.llm_endpoint = llm.endpoint;
            }
            if let Some(max_tokens) = llm.max_tokens {
                result.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                result.temperature = temperature;
            }
        }

        if let Some(search) = config_file.search {
            if let Some(provider) = search.provider {
                result.search_provider = provider;
            }
            if let Some(max_results) = search.max_results {
                result.max_search_results = max_results;
            }
        }

        if let Some(server) = config_file.server {
            if let Some(host) = server.host {
                result.host = host;
            }
            if let Some(port) = server.port {
                result.port = port;
            }
            if let Some(timeout) = server.timeout_secs {
                result.request_timeout_secs = timeout;
            }
            if let Some(origins) = server.cors_origins {
                result.cors_origins = origins;
            }
        }

        if let Some(prompts) = config_file.prompts {
            if let Some(file) = prompts.file {
                // Relative prompt paths are resolved against the config file
                result.prompts_file = Some(match path.parent() {
                    Some(dir) if file.is_relative() => dir.join(file),
                    _ => file,
                });
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
            if let Some(debug) = logging.debug {
                result.debug = debug;
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Environment variables override YAML config.
    fn merge_env<F>(&mut self, env: &F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.groq_api_key = env("GROQ_API_KEY");
        self.tavily_api_key = env("TAVILY_API_KEY");

        if let Some(provider) = env("RAGLINE_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = env("GROQ_MODEL") {
            self.model = model;
        }
        if let Some(endpoint) = env("RAGLINE_LLM_ENDPOINT") {
            self.llm_endpoint = Some(endpoint);
        }
        if let Some(max_tokens) = parse_env(env, "MAX_TOKENS")? {
            self.max_tokens = max_tokens;
        }
        if let Some(temperature) = parse_env(env, "TEMPERATURE")? {
            self.temperature = temperature;
        }
        if let Some(provider) = env("RAGLINE_SEARCH_PROVIDER") {
            self.search_provider = provider;
        }
        if let Some(max_results) = parse_env(env, "TAVILY_MAX_RESULTS")? {
            self.max_search_results = max_results;
        }
        if let Some(timeout) = parse_env(env, "RAGLINE_TIMEOUT_SECS")? {
            self.request_timeout_secs = timeout;
        }
        if let Some(host) = env("HOST") {
            self.host = host;
        }
        if let Some(port) = parse_env(env, "PORT")? {
            self.port = port;
        }
        if let Some(origins) = env("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(prompts) = env("RAGLINE_PROMPTS") {
            self.prompts_file = Some(PathBuf::from(prompts));
        }
        if let Some(debug) = env("DEBUG") {
            self.debug = parse_bool("DEBUG", &debug)?;
        }
        if let Some(level) = env("RUST_LOG") {
            self.log_level = Some(level);
        }
        if let Some(format) = env("RAGLINE_LOG_FORMAT") {
            self.log_format = format;
        }
        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.debug = true;
        }

        // Debug mode implies debug logging
        if self.debug && self.log_level.is_none() {
            self.log_level = Some("debug".to_string());
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate value ranges and provider names.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_SEARCH_PROVIDERS.contains(&self.search_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown search provider: {}. Supported: {}",
                self.search_provider,
                KNOWN_SEARCH_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(AppError::Config("max_tokens must be positive".to_string()));
        }

        if !(1..=20).contains(&self.max_search_results) {
            return Err(AppError::Config(format!(
                "max_search_results must be between 1 and 20, got {}",
                self.max_search_results
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }

        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(AppError::Config(format!(
                "Unknown log format: {}. Supported: text, json",
                self.log_format
            )));
        }

        Ok(())
    }

    /// Provider call deadline.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    /// Socket address string for the HTTP server.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<F, T>(env: &F, key: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("Invalid value for {}: {:?} ({})", key, raw, e))),
        None => Ok(None),
    }
}

fn parse_bool(key: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Config(format!(
            "Invalid value for {}: {:?} (expected a boolean)",
            key, other
        ))),
    }
}
