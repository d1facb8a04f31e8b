// Application configuration from the environment (and `.env`)

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use crate::llm::core::config::DEFAULT_MAX_TOKENS;
use crate::llm::GeminiModel;

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";
pub const MODELS_VAR: &str = "CONTENT_CREW_MODELS";
pub const BIND_VAR: &str = "CONTENT_CREW_BIND";
pub const MAX_TOKENS_VAR: &str = "CONTENT_CREW_MAX_TOKENS";
pub const TEMPERATURE_VAR: &str = "CONTENT_CREW_TEMPERATURE";
pub const SEARCH_RESULTS_VAR: &str = "CONTENT_CREW_SEARCH_RESULTS";
pub const MAX_ITERATIONS_VAR: &str = "CONTENT_CREW_MAX_ITERATIONS";

pub const DEFAULT_BIND: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3030));
pub const DEFAULT_SEARCH_RESULTS: usize = 5;
pub const DEFAULT_MAX_ITERATIONS: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set; add it to your .env file")]
    MissingVar(&'static str),

    #[error("Invalid value for {var} ({value:?}): {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub tavily_api_key: Option<String>,
    pub models: Vec<GeminiModel>,
    pub bind: SocketAddr,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub search_results: usize,
    pub max_iterations: usize,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini_api_key = get(GEMINI_API_KEY).ok_or(ConfigError::MissingVar(GEMINI_API_KEY))?;
        let tavily_api_key = get(TAVILY_API_KEY);

        let models = match get(MODELS_VAR) {
            Some(raw) => parse_models(&raw)?,
            None => GeminiModel::default_cascade(),
        };

        let bind = parse_or(get(BIND_VAR), BIND_VAR, || DEFAULT_BIND)?;
        let max_tokens = parse_or(get(MAX_TOKENS_VAR), MAX_TOKENS_VAR, || DEFAULT_MAX_TOKENS)?;
        let temperature = get(TEMPERATURE_VAR)
            .map(|raw| parse_var::<f32>(TEMPERATURE_VAR, &raw))
            .transpose()?;
        let search_results =
            parse_or(get(SEARCH_RESULTS_VAR), SEARCH_RESULTS_VAR, || DEFAULT_SEARCH_RESULTS)?;
        let max_iterations =
            parse_or(get(MAX_ITERATIONS_VAR), MAX_ITERATIONS_VAR, || DEFAULT_MAX_ITERATIONS)?;

        let config = Self {
            gemini_api_key,
            tavily_api_key,
            models,
            bind,
            max_tokens,
            temperature,
            search_results,
            max_iterations,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn research_enabled(&self) -> bool {
        self.tavily_api_key.is_some()
    }

    /// Model ids in cascade order
    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.to_string()).collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(invalid(MAX_TOKENS_VAR, "0", "must be greater than 0"));
        }
        if self.search_results == 0 {
            return Err(invalid(SEARCH_RESULTS_VAR, "0", "must be greater than 0"));
        }
        if self.max_iterations == 0 {
            return Err(invalid(MAX_ITERATIONS_VAR, "0", "must be greater than 0"));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(invalid(
                    TEMPERATURE_VAR,
                    &t.to_string(),
                    "must be between 0.0 and 2.0",
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("gemini_api_key", &"[redacted]")
            .field(
                "tavily_api_key",
                &self.tavily_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("models", &self.model_names())
            .field("bind", &self.bind)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("search_results", &self.search_results)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>().map_err(|e| invalid(var, raw, e.to_string()))
}

fn parse_or<T, D>(raw: Option<String>, var: &'static str, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    D: FnOnce() -> T,
{
    match raw {
        Some(raw) => parse_var(var, &raw),
        None => Ok(default()),
    }
}

fn parse_models(raw: &str) -> Result<Vec<GeminiModel>, ConfigError> {
    let models = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_var::<GeminiModel>(MODELS_VAR, s))
        .collect::<Result<Vec<_>, _>>()?;

    if models.is_empty() {
        return Err(invalid(MODELS_VAR, raw, "at least one model is required"));
    }
    Ok(models)
}
