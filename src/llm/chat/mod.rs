pub mod openai;

use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::config::ChatConfig;
use crate::models::chat::{ flatten_history, CompletionRequest, CompletionResponse, Turn };
use self::openai::OpenAICompatTransport;

/// Upper bound on how much of an error body is echoed back in a failure detail.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Raw reply as seen on the wire, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

/// Delivers one completion request to the configured endpoint.
///
/// Implementations own the endpoint address and the timeout; they only report
/// what happened on the wire. Status handling and body parsing belong to
/// [`ChatClient`].
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn post(&self, request: &CompletionRequest) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connectivity,
    Timeout,
    Request,
    Parse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Connectivity => "connectivity",
            FailureKind::Timeout => "timeout",
            FailureKind::Request => "request",
            FailureKind::Parse => "parse",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("cannot connect to {endpoint}: {detail}")]
    Connect {
        endpoint: Url,
        detail: String,
    },
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        timeout_ms: u64,
    },
    #[error("request failed: {detail}")]
    Request {
        status: Option<u16>,
        detail: String,
    },
    #[error("invalid response: {detail}")]
    Parse {
        detail: String,
    },
}

impl ChatError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ChatError::Connect { .. } => FailureKind::Connectivity,
            ChatError::Timeout { .. } => FailureKind::Timeout,
            ChatError::Request { .. } => FailureKind::Request,
            ChatError::Parse { .. } => FailureKind::Parse,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ChatError::Connect { detail, .. } => detail.clone(),
            ChatError::Timeout { timeout_ms } => format!("no reply within {} ms", timeout_ms),
            ChatError::Request { detail, .. } => detail.clone(),
            ChatError::Parse { detail } => detail.clone(),
        }
    }

    /// HTTP status of the reply, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Request { status, .. } => *status,
            _ => None,
        }
    }
}

/// Stateless chat completion client. Every call carries the full history it
/// should be answered against.
#[derive(Clone)]
pub struct ChatClient {
    config: ChatConfig,
    transport: Arc<dyn CompletionTransport>,
}

impl ChatClient {
    pub fn new(config: ChatConfig, transport: Arc<dyn CompletionTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn build_request(&self, message: &str, history: &[Turn]) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            messages: flatten_history(history, message),
        }
    }

    pub async fn send(&self, message: &str, history: &[Turn]) -> Result<String, ChatError> {
        let request = self.build_request(message, history);
        debug!(
            "Sending {} message(s) to {} with model {}",
            request.messages.len(),
            self.config.endpoint,
            request.model
        );

        let result = match self.transport.post(&request).await {
            Ok(response) => self.interpret(response),
            Err(e) => Err(self.map_transport_error(e)),
        };

        match &result {
            Ok(content) => debug!("Received reply ({} chars)", content.chars().count()),
            Err(e) => warn!("Chat request failed [{}]: {}", e.kind(), e),
        }
        result
    }

    fn interpret(&self, response: TransportResponse) -> Result<String, ChatError> {
        if !(200..300).contains(&response.status) {
            return Err(ChatError::Request {
                status: Some(response.status),
                detail: describe_status(response.status, &self.config.endpoint, &response.body),
            });
        }

        let parsed: CompletionResponse = serde_json
            ::from_str(&response.body)
            .map_err(|e| ChatError::Parse { detail: e.to_string() })?;

        parsed.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ChatError::Parse {
                detail: "response contained no choices".to_string(),
            })
    }

    fn map_transport_error(&self, err: TransportError) -> ChatError {
        match err {
            TransportError::Connect(detail) =>
                ChatError::Connect {
                    endpoint: self.config.endpoint.clone(),
                    detail,
                },
            TransportError::Timeout => ChatError::Timeout { timeout_ms: self.config.timeout_ms },
            TransportError::Other(detail) => ChatError::Request { status: None, detail },
        }
    }
}

fn describe_status(status: u16, endpoint: &Url, body: &str) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status");
    let kind = if status >= 500 { "Server Error" } else { "Client Error" };
    let mut detail = format!("{} {}: {} for url: {}", status, kind, reason, endpoint);

    let body = body.trim();
    if !body.is_empty() {
        detail.push_str(" (");
        if body.chars().count() > MAX_ERROR_BODY_CHARS {
            detail.extend(body.chars().take(MAX_ERROR_BODY_CHARS));
            detail.push_str("...");
        } else {
            detail.push_str(body);
        }
        detail.push(')');
    }
    detail
}

pub fn new_client(config: &ChatConfig) -> Result<ChatClient, Box<dyn StdError + Send + Sync>> {
    let transport = OpenAICompatTransport::from_config(config)?;
    Ok(ChatClient::new(config.clone(), Arc::new(transport)))
}
