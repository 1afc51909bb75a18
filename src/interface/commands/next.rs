//! # Next Command
//!
//! Handles `.next [minutes]`: opens (or re-opens) a discussion slot, waits
//! out the timer, then asks the room whether to continue. The wait is
//! cancellable: aborting the session wakes it immediately, and the world
//! is re-checked on wake before the continue question goes out.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::sleep;

use crate::application::registry::SessionRegistry;
use crate::application::session::Phase;
use crate::application::utils::format_duration;
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;

enum Opened {
    Notice(&'static str),
    Closing(String),
    Slot {
        topic_id: String,
        card: String,
        abort: watch::Receiver<bool>,
    },
}

pub async fn handle_next<C>(
    config: &AppConfig,
    registry: &Arc<Mutex<SessionRegistry>>,
    chat: &C,
    sender: &str,
    args: &str,
) -> Result<()>
where
    C: ChatProvider + Clone + Send + Sync + 'static,
{
    let minutes = match args.split_whitespace().next() {
        None => config.session.discussion_minutes,
        Some(raw) => match raw.parse::<f64>() {
            Ok(m) => m,
            Err(_) => {
                chat.send_notification(messages::NEXT_USAGE)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))?;
                return Ok(());
            }
        },
    };
    if minutes < 0.0 || !minutes.is_finite() {
        chat.send_notification(messages::INVALID_TIME)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }
    let slot = Duration::from_secs_f64(minutes * 60.0);

    let opened = {
        let mut guard = registry.lock().await;
        let Some(session) = guard.get_mut(&chat.room_id()) else {
            chat.send_notification(messages::NO_SESSION)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            return Ok(());
        };
        if session.ensure_coordinator(sender).is_err() {
            Opened::Notice(messages::NOT_COORDINATOR)
        } else {
            match session.phase {
                Phase::Created => Opened::Notice(messages::FINALIZE_FIRST),
                Phase::Finished => Opened::Notice(messages::SESSION_FINISHED),
                Phase::Discussing => match session.advance_topic() {
                    Err(_) => Opened::Notice(messages::SESSION_FINISHED),
                    Ok(None) => {
                        let ranked = session.ranked_topics();
                        let lines = ranked
                            .iter()
                            .map(|t| {
                                messages::topic_summary_line(
                                    &t.author_name,
                                    &t.content,
                                    t.votes,
                                    &t.discussed_time(),
                                )
                            })
                            .collect::<Vec<_>>()
                            .join("\n");
                        Opened::Closing(messages::session_finished(
                            &lines,
                            &format_duration(session.total_time()),
                            ranked.len(),
                        ))
                    }
                    Ok(Some(topic)) => {
                        let topic_id = topic.id.clone();
                        let card = messages::now_discussing(
                            &topic.content,
                            &format_duration(slot),
                            &topic.elapsed_time(),
                        );
                        Opened::Slot {
                            topic_id,
                            card,
                            abort: session.abort_signal(),
                        }
                    }
                },
            }
        }
    };

    let (topic_id, card, abort) = match opened {
        Opened::Notice(text) => {
            chat.send_notification(text)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            return Ok(());
        }
        Opened::Closing(card) => {
            chat.send_message(&card).await.map_err(|e| anyhow::anyhow!(e))?;
            return Ok(());
        }
        Opened::Slot {
            topic_id,
            card,
            abort,
        } => (topic_id, card, abort),
    };

    chat.send_message(&card).await.map_err(|e| anyhow::anyhow!(e))?;

    // The long wait runs without the registry lock, so reactions and
    // queries keep flowing while the room talks.
    if wait_for_slot(slot, abort).await {
        tracing::info!("Discussion wait in {} cancelled by abort", chat.room_id());
        return Ok(());
    }

    // Re-check the world on wake: the session may be gone, finished, or
    // already moved past this topic.
    let mut guard = registry.lock().await;
    let Some(session) = guard.get_mut(&chat.room_id()) else {
        return Ok(());
    };
    if session.phase != Phase::Discussing {
        return Ok(());
    }
    let content = match session.current_topic() {
        Some(current) if current.id == topic_id => current.content.clone(),
        _ => return Ok(()),
    };

    let prompt_id = chat
        .send_message(&messages::continue_question(&content))
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    session.continue_prompt = Some(prompt_id);
    Ok(())
}

/// Sleeps out the slot unless the session's abort signal fires first.
/// Returns `true` when aborted.
async fn wait_for_slot(duration: Duration, mut abort: watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = sleep(duration) => false,
        changed = abort.changed() => match changed {
            Ok(()) => *abort.borrow(),
            // Sender gone means the session was dropped
            Err(_) => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_elapses_when_nobody_aborts() {
        let (_tx, rx) = watch::channel(false);
        assert!(!wait_for_slot(Duration::from_millis(5), rx).await);
    }

    #[tokio::test]
    async fn test_abort_cuts_the_wait_short() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        assert!(wait_for_slot(Duration::from_secs(60), rx).await);
    }

    #[tokio::test]
    async fn test_dropped_sender_counts_as_abort() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        assert!(wait_for_slot(Duration::from_secs(60), rx).await);
    }
}
