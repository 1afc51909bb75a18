//! # Miscellaneous Commands
//!
//! Handles `.queue`, `.summary`, `.status` and `.abort`.
//! Listing commands render from the cursor-scoped ranking.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::registry::SessionRegistry;
use crate::application::session::TopicFilter;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;

/// `.queue`: topics still waiting for their slot.
pub async fn handle_queue(
    registry: &Arc<Mutex<SessionRegistry>>,
    chat: &impl ChatProvider,
) -> Result<()> {
    let cards = {
        let guard = registry.lock().await;
        let Some(session) = guard.get(&chat.room_id()) else {
            chat.send_notification(messages::NO_SESSION)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            return Ok(());
        };
        session
            .get_sorted_topics(TopicFilter::Unfinished)
            .iter()
            .map(|t| {
                messages::wants_to_discuss(&t.author_name, &t.content, &session.voter_names(t))
            })
            .collect::<Vec<_>>()
    };

    for card in cards {
        chat.send_message(&card).await.map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}

/// `.summary`: topics already discussed, with their slot durations.
pub async fn handle_summary(
    registry: &Arc<Mutex<SessionRegistry>>,
    chat: &impl ChatProvider,
) -> Result<()> {
    let cards = {
        let guard = registry.lock().await;
        let Some(session) = guard.get(&chat.room_id()) else {
            chat.send_notification(messages::NO_SESSION)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            return Ok(());
        };
        session
            .get_sorted_topics(TopicFilter::Finished)
            .iter()
            .map(|t| {
                messages::wanted_to_discuss(
                    &t.author_name,
                    &t.content,
                    &session.voter_names(t),
                    &t.discussed_time(),
                )
            })
            .collect::<Vec<_>>()
    };

    for card in cards {
        chat.send_message(&card).await.map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}

/// `.status`: a one-message overview of the room's session.
pub async fn handle_status(
    registry: &Arc<Mutex<SessionRegistry>>,
    chat: &impl ChatProvider,
) -> Result<()> {
    let status = {
        let guard = registry.lock().await;
        guard.get(&chat.room_id()).map(|session| {
            messages::session_status(
                session.phase.label(),
                &session.coordinator_id,
                session.max_votes,
                session.topic_count(),
                session.attendee_count(),
                &session.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            )
        })
    };

    match status {
        Some(msg) => {
            chat.send_message(&msg).await.map_err(|e| anyhow::anyhow!(e))?;
        }
        None => {
            chat.send_notification(messages::NO_SESSION)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}

/// `.abort`: coordinator tears the session down; any in-flight discussion
/// wait wakes immediately.
pub async fn handle_abort(
    registry: &Arc<Mutex<SessionRegistry>>,
    chat: &impl ChatProvider,
    sender: &str,
) -> Result<()> {
    let notice = {
        let mut guard = registry.lock().await;
        let room_id = chat.room_id();
        match guard.get(&room_id) {
            None => messages::NO_SESSION,
            Some(session) => {
                if session.ensure_coordinator(sender).is_err() {
                    messages::NOT_COORDINATOR
                } else {
                    let _ = guard.abort(&room_id);
                    tracing::info!("Lean Coffee aborted in {}", room_id);
                    messages::ABORTED
                }
            }
        }
    };
    chat.send_notification(notice)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
