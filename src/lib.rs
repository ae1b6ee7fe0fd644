pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod repl;
pub mod session;

use cli::Args;
use config::ChatConfig;
use log::info;
use session::{ render_reply, ChatSession };
use std::error::Error;
use tokio::io::{ AsyncWriteExt, BufReader };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = ChatConfig::from_args(&args)?;

    info!("--- Chat Configuration ---");
    info!("Endpoint: {}", config.endpoint);
    info!("Model: {}", config.model);
    info!("Timeout: {} ms", config.timeout_ms);
    info!("--------------------------");

    let client = llm::new_client(&config)?;
    let mut stdout = tokio::io::stdout();

    if let Some(message) = args.message.as_deref() {
        let reply = render_reply(&client.send(message, &[]).await);
        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        return Ok(());
    }

    let mut session = ChatSession::new(client);
    let stdin = BufReader::new(tokio::io::stdin());
    repl::run_repl(&mut session, stdin, &mut stdout).await?;

    Ok(())
}
