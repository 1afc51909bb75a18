//! # Create Command
//!
//! Handles `.create [max_votes]`: opens a Lean Coffee session in the room
//! with the sender as coordinator.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::registry::SessionRegistry;
use crate::domain::config::AppConfig;
use crate::domain::error::SessionError;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;

pub async fn handle_create(
    config: &AppConfig,
    registry: &Arc<Mutex<SessionRegistry>>,
    chat: &impl ChatProvider,
    sender: &str,
    sender_name: &str,
    args: &str,
) -> Result<()> {
    let max_votes = match args.split_whitespace().next() {
        None => config.session.max_votes,
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if (1..=9).contains(&n) => n,
            _ => {
                chat.send_notification(messages::CREATE_USAGE)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))?;
                return Ok(());
            }
        },
    };

    let created = {
        let mut guard = registry.lock().await;
        guard.create(&chat.room_id(), sender, max_votes).map(|_| ())
    };

    match created {
        Ok(()) => {
            tracing::info!("Lean Coffee created in {} by {}", chat.room_id(), sender);
            chat.send_message(&messages::session_created(sender_name, max_votes))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Err(SessionError::SessionAlreadyActive) => {
            chat.send_notification(messages::SESSION_ONGOING)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Err(e) => {
            chat.send_notification(&e.to_string())
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}
