//! # Command Router
//!
//! Routes incoming messages to the appropriate command handler (in `interface/commands`).
//! It parses the command string (e.g., `.next`) and dispatches it with the necessary
//! context. Messages shaped like `# Heading` propose topics instead.

use anyhow::Result;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tokio::sync::Mutex;

use crate::application::registry::SessionRegistry;
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::interface::commands;
use crate::strings::messages;

static TOPIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+(\S.*)$").expect("topic heading pattern"));

/// Extracts the topic text from a `# Heading` message, if it is one.
pub fn parse_topic_heading(message: &str) -> Option<&str> {
    TOPIC_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end())
}

pub struct CommandRouter {
    config: AppConfig,
    registry: Arc<Mutex<SessionRegistry>>,
}

impl CommandRouter {
    pub fn new(config: AppConfig, registry: Arc<Mutex<SessionRegistry>>) -> Self {
        Self { config, registry }
    }

    pub async fn route<C>(
        &self,
        chat: &C,
        message: &str,
        sender: &str,
        sender_name: &str,
        event_id: &str,
    ) -> Result<()>
    where
        C: ChatProvider + Clone + Send + Sync + 'static,
    {
        let msg = message.trim();

        // Topic proposals are plain H1 messages, not dot commands
        if let Some(content) = parse_topic_heading(msg) {
            return commands::topic::handle_topic(
                &self.registry,
                chat,
                sender,
                sender_name,
                event_id,
                content,
            )
            .await;
        }

        if !msg.starts_with('.') {
            return Ok(());
        }

        let (cmd, args) = if let Some(idx) = msg.find(' ') {
            (&msg[..idx], msg[idx + 1..].trim())
        } else {
            (msg, "")
        };
        tracing::info!("Router dispatching cmd='{}' args='{}' sender='{}'", cmd, args, sender);

        match cmd {
            ".create" => {
                commands::create::handle_create(
                    &self.config,
                    &self.registry,
                    chat,
                    sender,
                    sender_name,
                    args,
                )
                .await?;
            }
            ".finalize" => {
                commands::finalize::handle_finalize(&self.registry, chat, sender).await?;
            }
            ".next" => {
                commands::next::handle_next(&self.config, &self.registry, chat, sender, args)
                    .await?;
            }
            ".queue" => {
                commands::misc::handle_queue(&self.registry, chat).await?;
            }
            ".summary" => {
                commands::misc::handle_summary(&self.registry, chat).await?;
            }
            ".status" => {
                commands::misc::handle_status(&self.registry, chat).await?;
            }
            ".abort" => {
                commands::misc::handle_abort(&self.registry, chat, sender).await?;
            }
            ".help" => {
                commands::help::handle_help(chat).await?;
            }
            _ => {
                let _ = chat.send_message(messages::UNKNOWN_COMMAND).await;
            }
        }

        Ok(())
    }
}
