use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal chat client for a Tichy RAG server", long_about = None)]
pub struct Args {
    // --- Completion Endpoint Args ---
    /// Chat completion endpoint (OpenAI-compatible), e.g. http://localhost:7070/v1/chat/completions
    #[arg(long, env = "TICHY_ENDPOINT", default_value = "http://localhost:7070/v1/chat/completions")]
    pub endpoint: String,

    /// Model name sent with every request.
    #[arg(long, env = "TICHY_MODEL", default_value = "gpt-4")]
    pub model: String,

    /// Request timeout in milliseconds. No retries are attempted.
    #[arg(long, env = "TICHY_TIMEOUT_MS", default_value = "30000")]
    pub timeout_ms: u64,

    // --- General App Args ---
    /// Send a single message, print the reply and exit instead of starting the interactive session.
    #[arg(short = 'm', long)]
    pub message: Option<String>,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = Args::try_parse_from([
            "tichy-chat",
            "--endpoint",
            "http://example.com:9000/v1/chat/completions",
            "--model",
            "llama3",
            "--timeout-ms",
            "500",
            "-m",
            "hello",
        ]).unwrap();
        assert_eq!(args.endpoint, "http://example.com:9000/v1/chat/completions");
        assert_eq!(args.model, "llama3");
        assert_eq!(args.timeout_ms, 500);
        assert_eq!(args.message.as_deref(), Some("hello"));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        assert!(Args::try_parse_from(["tichy-chat", "--timeout-ms", "soon"]).is_err());
    }
}
