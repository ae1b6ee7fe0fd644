use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE } };
use std::error::Error as StdError;
use std::time::Duration;
use url::Url;

use super::{ CompletionTransport, TransportError, TransportResponse };
use crate::config::ChatConfig;
use crate::models::chat::CompletionRequest;

/// Head start the connect deadline gets over the whole-request deadline, so an
/// endpoint that never completes the handshake is reported as unreachable
/// rather than slow.
const CONNECT_DEADLINE_MARGIN: Duration = Duration::from_millis(50);

/// HTTP transport for OpenAI-compatible `/v1/chat/completions` endpoints.
///
/// One POST per request, bounded by the configured timeout, never retried.
pub struct OpenAICompatTransport {
    http: HttpClient,
    endpoint: Url,
}

impl OpenAICompatTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .default_headers(headers)
            .connect_timeout(timeout)
            .timeout(timeout + CONNECT_DEADLINE_MARGIN)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self { http, endpoint })
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Self::new(config.endpoint.clone(), config.timeout())
    }
}

#[async_trait]
impl CompletionTransport for OpenAICompatTransport {
    async fn post(&self, request: &CompletionRequest) -> Result<TransportResponse, TransportError> {
        let resp = self.http
            .post(self.endpoint.clone())
            .json(request)
            .send().await
            .map_err(classify)?;

        let status = resp.status().as_u16();
        debug!("Completion endpoint answered with status {}", status);
        let body = resp.text().await.map_err(classify)?;

        Ok(TransportResponse { status, body })
    }
}

/// A connect-phase timeout counts as a connection failure, not a timeout.
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connect(error_chain(&err))
    } else if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Other(error_chain(&err))
    }
}

/// reqwest hides the useful part ("Connection refused", "dns error") in the
/// source chain, so flatten it into one line.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn error_chain_joins_causes() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer("client error (Connect)", Some(Box::new(Layer("Connection refused", None))))))
        );
        assert_eq!(
            error_chain(&err),
            "error sending request: client error (Connect): Connection refused"
        );
    }

    #[test]
    fn error_chain_skips_repeated_text() {
        let err = Layer("timed out: operation timed out", Some(Box::new(Layer("operation timed out", None))));
        assert_eq!(error_chain(&err), "timed out: operation timed out");
    }

    #[test]
    fn builds_from_config() {
        let config = ChatConfig::default();
        let transport = OpenAICompatTransport::from_config(&config).unwrap();
        assert_eq!(transport.endpoint, config.endpoint);
    }
}
