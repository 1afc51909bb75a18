//! # Finalize Command
//!
//! Handles `.finalize`: locks the vote, ranks the topics and posts one
//! card per topic. An empty session is aborted on the spot.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::registry::SessionRegistry;
use crate::application::session::TopicFilter;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;

enum Outcome {
    Cards(Vec<String>),
    Notice(&'static str),
}

pub async fn handle_finalize(
    registry: &Arc<Mutex<SessionRegistry>>,
    chat: &impl ChatProvider,
    sender: &str,
) -> Result<()> {
    let outcome = {
        let mut guard = registry.lock().await;
        let room_id = chat.room_id();
        let Some(session) = guard.get_mut(&room_id) else {
            chat.send_notification(messages::NO_SESSION)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            return Ok(());
        };
        if session.ensure_coordinator(sender).is_err() {
            Outcome::Notice(messages::NOT_COORDINATOR)
        } else {
            match session.finalize() {
                Err(_) => Outcome::Notice(messages::CANNOT_FINALIZE),
                Ok(()) => {
                    let cards: Vec<String> = session
                        .get_sorted_topics(TopicFilter::Full)
                        .iter()
                        .map(|t| {
                            messages::wants_to_discuss(
                                &t.author_name,
                                &t.content,
                                &session.voter_names(t),
                            )
                        })
                        .collect();
                    if cards.is_empty() {
                        let _ = guard.abort(&room_id);
                        Outcome::Notice(messages::NO_TOPICS_ABORTED)
                    } else {
                        Outcome::Cards(cards)
                    }
                }
            }
        }
    };

    match outcome {
        Outcome::Notice(text) => {
            chat.send_notification(text)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Outcome::Cards(cards) => {
            for card in cards {
                chat.send_message(&card).await.map_err(|e| anyhow::anyhow!(e))?;
            }
        }
    }
    Ok(())
}
