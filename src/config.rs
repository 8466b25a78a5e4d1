use std::env;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the knowledge-base query service.
///
/// Resolved once at process start and passed down explicitly; nothing reads
/// the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the knowledge-base retrieval service.
    pub retrieval_url: String,
    /// Base URL of the foundation-model invocation service.
    pub generation_url: String,
    /// Identifier of the knowledge base to retrieve from. May be empty when
    /// the deployment left it unset; the client rejects requests in that case
    /// with a structured configuration error instead of failing at startup.
    pub knowledge_base_id: String,
    /// Identifier of the foundation model used for generation. Loaded with
    /// the same leniency as the knowledge-base identifier.
    pub model_id: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            retrieval_url: load_env("RETRIEVAL_URL")?,
            generation_url: load_env("GENERATION_URL")?,
            knowledge_base_id: load_env_optional("KNOWLEDGE_BASE_ID").unwrap_or_default(),
            model_id: load_env_optional("MODEL_ID").unwrap_or_default(),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Load environment files and build the configuration, logging a summary.
pub fn init_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        retrieval_url = %config.retrieval_url,
        generation_url = %config.generation_url,
        has_knowledge_base_id = !config.knowledge_base_id.is_empty(),
        has_model_id = !config.model_id.is_empty(),
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(config)
}
