use crate::cli::Args;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:7070/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid endpoint URL '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported endpoint scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
    #[error("Model name must not be empty")]
    EmptyModel,
    #[error("Timeout must be greater than zero")]
    ZeroTimeout,
}

/// Everything the chat client needs to know about the remote endpoint.
/// Built once at startup and handed to the client by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub endpoint: Url,
    pub model: String,
    pub timeout_ms: u64,
}

impl ChatConfig {
    pub fn new(endpoint: &str, model: &str, timeout_ms: u64) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|source| ConfigError::InvalidEndpoint {
            url: endpoint.to_string(),
            source,
        })?;
        match endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::UnsupportedScheme(other.to_string()));
            }
        }
        let model = model.trim();
        if model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self { endpoint, model: model.to_string(), timeout_ms })
    }

    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Self::new(&args.endpoint, &args.model, args.timeout_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_local_server() {
        let config = ChatConfig::default();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn rejects_relative_endpoint() {
        let err = ChatConfig::new("/v1/chat/completions", "gpt-4", 1000).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }), "got {:?}", err);
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ChatConfig::new("ftp://localhost/chat", "gpt-4", 1000).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(ref s) if s == "ftp"));
    }

    #[test]
    fn rejects_blank_model_and_zero_timeout() {
        assert!(matches!(ChatConfig::new(DEFAULT_ENDPOINT, "  ", 1000), Err(ConfigError::EmptyModel)));
        assert!(matches!(ChatConfig::new(DEFAULT_ENDPOINT, "gpt-4", 0), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn trims_model_name() {
        let config = ChatConfig::new(DEFAULT_ENDPOINT, " llama3 ", 5).unwrap();
        assert_eq!(config.model, "llama3");
    }
}
