use crate::llm::chat::{ ChatClient, ChatError };
use crate::models::chat::Turn;
use log::info;

pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "What products does Insurellm offer?",
    "Tell me about the company history",
    "How many employees does Insurellm have?",
    "What is Markellm?",
    "Who founded Insurellm?",
];

/// Turns a client result into the text shown as the assistant's reply.
pub fn render_reply(result: &Result<String, ChatError>) -> String {
    match result {
        Ok(content) => content.clone(),
        Err(ChatError::Connect { endpoint, .. }) =>
            format!(
                "❌ Error: Cannot connect to Tichy server. Make sure it's running on {}",
                endpoint.origin().ascii_serialization()
            ),
        Err(ChatError::Timeout { .. }) =>
            "⏱️ Error: Request timed out. The server might be overloaded.".to_string(),
        Err(ChatError::Request { detail, .. }) => format!("❌ Error: {}", detail),
        Err(ChatError::Parse { detail }) => format!("❌ Error parsing response: {}", detail),
    }
}

/// Conversation state for one interactive session. Lives only as long as the
/// session itself.
pub struct ChatSession {
    client: ChatClient,
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn new(client: ChatClient) -> Self {
        Self { client, history: Vec::new() }
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Sends `message` against the session history and records the exchange.
    /// Failures are recorded too, in the same form they are displayed.
    pub async fn send(&mut self, message: &str) -> String {
        let result = self.client.send(message, &self.history).await;
        let reply = render_reply(&result);
        self.history.push(Turn::new(message, reply.as_str()));
        reply
    }

    pub fn reset(&mut self) {
        info!("Clearing conversation ({} turns)", self.history.len());
        self.history.clear();
    }
}
