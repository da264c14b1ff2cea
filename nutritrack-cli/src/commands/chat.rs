use clap::Args;
use nutritrack_core::{ChatClient, ChatTranscript};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::config::Config;

#[derive(Args)]
pub struct ChatCommand {
    /// Ask a single question instead of starting a conversation
    pub message: Option<String>,
}

impl ChatCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let client = ChatClient::new(
            config.chat.api_url.clone(),
            config.chat.api_key.clone(),
            Duration::from_secs(config.chat.timeout_secs),
        )?
        .with_model(config.chat.model.clone());

        if !client.has_api_key() {
            eprintln!("Warning: no chat API key configured (set NUTRI_CHAT_API_KEY).");
        }

        let mut transcript = ChatTranscript::new();

        match &self.message {
            Some(message) => {
                if let Some(reply) = transcript.send(&client, message).await {
                    println!("{}", reply.content);
                }
            }
            None => {
                let stdin = BufReader::new(tokio::io::stdin());
                converse(&client, &mut transcript, stdin).await?;
            }
        }

        Ok(())
    }
}

/// Reads questions line by line until EOF or "/quit".
async fn converse<R: AsyncBufRead + Unpin>(
    client: &ChatClient,
    transcript: &mut ChatTranscript,
    input: R,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(greeting) = transcript.messages().first() {
        println!("NutriBot: {}", greeting.content);
    }

    let mut lines = input.lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        if let Some(reply) = transcript.send(client, &line).await {
            println!("NutriBot: {}", reply.content);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutritrack_core::chat::{DEFAULT_API_URL, DEFAULT_TIMEOUT, FALLBACK_REPLY};

    #[tokio::test]
    async fn test_converse_stops_at_quit() {
        let client = ChatClient::new(DEFAULT_API_URL, None, DEFAULT_TIMEOUT).unwrap();
        let mut transcript = ChatTranscript::new();
        let input: &[u8] = b"what is fiber?\n\n/quit\nignored\n";

        converse(&client, &mut transcript, input).await.unwrap();

        // greeting, one question and its fallback reply; blank line skipped
        let messages = transcript.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "what is fiber?");
        assert_eq!(messages[2].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_converse_ends_at_eof() {
        let client = ChatClient::new(DEFAULT_API_URL, None, DEFAULT_TIMEOUT).unwrap();
        let mut transcript = ChatTranscript::new();
        let input: &[u8] = b"";

        converse(&client, &mut transcript, input).await.unwrap();
        assert_eq!(transcript.messages().len(), 1);
    }
}
