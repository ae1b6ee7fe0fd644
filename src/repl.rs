use crate::session::{ ChatSession, EXAMPLE_PROMPTS };
use log::{ debug, info };
use std::io;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

const PROMPT: &str = "> ";

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Skip,
    Quit,
    Examples,
    Example(usize),
    Reset,
    History,
    Unknown(&'a str),
    Send(&'a str),
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    match line {
        "" => Command::Skip,
        "exit" | "quit" | "/exit" | "/quit" => Command::Quit,
        "/examples" => Command::Examples,
        "/reset" => Command::Reset,
        "/history" => Command::History,
        _ => {
            if let Some(rest) = line.strip_prefix("/example ") {
                return match rest.trim().parse::<usize>() {
                    Ok(n) => Command::Example(n),
                    Err(_) => Command::Unknown(line),
                };
            }
            if line.starts_with('/') {
                Command::Unknown(line)
            } else {
                Command::Send(line)
            }
        }
    }
}

async fn write_banner<W>(session: &ChatSession, output: &mut W) -> io::Result<()>
    where W: AsyncWrite + Unpin
{
    let endpoint = &session.client().config().endpoint;
    let banner = format!(
        "Tichy Chat\nChat interface powered by Tichy RAG server. Make sure the server is running on {}\n\
         Type /examples for sample questions, /reset to start over, 'exit' or 'quit' to end.\n\n",
        endpoint.origin().ascii_serialization()
    );
    output.write_all(banner.as_bytes()).await
}

async fn ask<W>(session: &mut ChatSession, message: &str, output: &mut W) -> io::Result<()>
    where W: AsyncWrite + Unpin
{
    let reply = session.send(message).await;
    output.write_all(reply.as_bytes()).await?;
    output.write_all(b"\n\n").await
}

/// Interactive loop: reads one line at a time from `input`, answers on `output`.
/// Ends on `exit`/`quit` or end of input.
pub async fn run_repl<R, W>(session: &mut ChatSession, input: R, output: &mut W) -> io::Result<()>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    write_banner(session, output).await?;
    let mut lines = input.lines();

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            debug!("Input closed, leaving chat");
            output.write_all(b"\n").await?;
            break;
        };

        match parse_command(&line) {
            Command::Skip => {}
            Command::Quit => {
                output.write_all(b"Goodbye!\n").await?;
                break;
            }
            Command::Examples => {
                let mut text = String::new();
                for (i, prompt) in EXAMPLE_PROMPTS.iter().enumerate() {
                    text.push_str(&format!("  {}. {}\n", i + 1, prompt));
                }
                text.push_str("Use /example N to ask one.\n\n");
                output.write_all(text.as_bytes()).await?;
            }
            Command::Example(n) => {
                match n.checked_sub(1).and_then(|i| EXAMPLE_PROMPTS.get(i)) {
                    Some(prompt) => {
                        output.write_all(format!("{}{}\n", PROMPT, prompt).as_bytes()).await?;
                        ask(session, prompt, output).await?;
                    }
                    None => {
                        let msg = format!("No example #{} (choose 1-{})\n\n", n, EXAMPLE_PROMPTS.len());
                        output.write_all(msg.as_bytes()).await?;
                    }
                }
            }
            Command::Reset => {
                session.reset();
                output.write_all(b"Conversation cleared.\n\n").await?;
            }
            Command::History => {
                let mut text = String::new();
                if session.history().is_empty() {
                    text.push_str("No messages yet.\n");
                }
                for turn in session.history() {
                    text.push_str(&format!("User: {}\nAssistant: {}\n", turn.user, turn.assistant));
                }
                text.push('\n');
                output.write_all(text.as_bytes()).await?;
            }
            Command::Unknown(cmd) => {
                let msg = format!("Unknown command: {} (try /examples, /reset, /history, quit)\n\n", cmd);
                output.write_all(msg.as_bytes()).await?;
            }
            Command::Send(message) => {
                ask(session, message, output).await?;
            }
        }
    }

    info!("Chat session ended after {} turn(s)", session.history().len());
    output.flush().await
}
