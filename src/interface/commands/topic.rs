//! # Topic Proposal
//!
//! Handles `# Heading` messages while a session is collecting topics.
//! Proposals are silent: no session or a wrong phase just drops them,
//! so ordinary headings in rooms without a Lean Coffee stay untouched.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::registry::SessionRegistry;
use crate::domain::traits::ChatProvider;

pub async fn handle_topic(
    registry: &Arc<Mutex<SessionRegistry>>,
    chat: &impl ChatProvider,
    sender: &str,
    sender_name: &str,
    event_id: &str,
    content: &str,
) -> Result<()> {
    let mut guard = registry.lock().await;
    let Some(session) = guard.get_mut(&chat.room_id()) else {
        return Ok(());
    };
    match session.propose_topic(event_id, content, sender, sender_name) {
        Ok(()) => {
            tracing::info!("Topic proposed in {}: {}", chat.room_id(), content);
        }
        Err(e) => {
            tracing::debug!("Dropped topic proposal in {}: {}", chat.room_id(), e);
        }
    }
    Ok(())
}
