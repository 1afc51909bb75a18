//! # Reaction Plumbing
//!
//! Feeds emoji reactions and their redactions into the vote engine.
//! While topics are being collected, any reaction on a topic message is a
//! vote. During discussion, 👍/👎 on the tracked continue question drive
//! the continue counters. Every reaction acted on is logged by its event
//! id so the matching redaction can undo it; a redacted topic message
//! withdraws the topic itself.
//!
//! Reaction failures are logged and dropped rather than reported: stray
//! reactions on unrelated messages arrive all the time.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::registry::SessionRegistry;
use crate::application::session::{Phase, ReactionRecord};

fn is_thumbs_up(key: &str) -> bool {
    key.starts_with('👍')
}

fn is_thumbs_down(key: &str) -> bool {
    key.starts_with('👎')
}

pub async fn handle_reaction_added(
    registry: &Arc<Mutex<SessionRegistry>>,
    room_id: &str,
    reaction_event_id: &str,
    target_event_id: &str,
    key: &str,
    sender: &str,
    sender_name: &str,
) {
    let mut guard = registry.lock().await;
    let Some(session) = guard.get_mut(room_id) else {
        return;
    };

    match session.phase {
        Phase::Created => {
            if session.topic(target_event_id).is_none() {
                return;
            }
            match session.vote(target_event_id, sender, sender_name) {
                Ok(()) => {
                    session.reaction_log.insert(
                        reaction_event_id.to_string(),
                        ReactionRecord {
                            attendee_id: sender.to_string(),
                            attendee_name: sender_name.to_string(),
                            key: key.to_string(),
                            target: target_event_id.to_string(),
                        },
                    );
                }
                Err(e) => tracing::debug!("Dropped vote in {}: {}", room_id, e),
            }
        }
        Phase::Discussing => {
            if session.continue_prompt.as_deref() != Some(target_event_id) {
                return;
            }
            if !is_thumbs_up(key) && !is_thumbs_down(key) {
                return;
            }
            let Some(topic) = session.current_topic_mut() else {
                return;
            };
            if is_thumbs_up(key) {
                topic.add_continue_upvote();
            } else {
                topic.add_continue_downvote();
            }
            session.reaction_log.insert(
                reaction_event_id.to_string(),
                ReactionRecord {
                    attendee_id: sender.to_string(),
                    attendee_name: sender_name.to_string(),
                    key: key.to_string(),
                    target: target_event_id.to_string(),
                },
            );
        }
        Phase::Finished => {}
    }
}

/// A redaction either takes back a reaction the bot acted on, or deletes
/// a topic message outright.
pub async fn handle_redaction(
    registry: &Arc<Mutex<SessionRegistry>>,
    room_id: &str,
    redacted_event_id: &str,
) {
    let mut guard = registry.lock().await;
    let Some(session) = guard.get_mut(room_id) else {
        return;
    };

    if let Some(record) = session.reaction_log.remove(redacted_event_id) {
        match session.phase {
            Phase::Created => {
                if let Err(e) = session.unvote(&record.target, &record.attendee_id) {
                    tracing::debug!("Dropped unvote in {}: {}", room_id, e);
                }
            }
            Phase::Discussing => {
                // Only reactions on the live continue question still count
                if session.continue_prompt.as_deref() != Some(record.target.as_str()) {
                    return;
                }
                let Some(topic) = session.current_topic_mut() else {
                    return;
                };
                if is_thumbs_up(&record.key) {
                    topic.remove_continue_upvote();
                } else if is_thumbs_down(&record.key) {
                    topic.remove_continue_downvote();
                }
            }
            Phase::Finished => {}
        }
        return;
    }

    // Not a reaction: a deleted message may have been a topic proposal
    if session.phase == Phase::Created && session.topic(redacted_event_id).is_some() {
        if let Err(e) = session.remove_topic(redacted_event_id) {
            tracing::debug!("Dropped topic removal in {}: {}", room_id, e);
        } else {
            tracing::info!("Topic withdrawn in {}", room_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::TopicFilter;

    const ROOM: &str = "!room:example.org";
    const COORD: &str = "@coord:example.org";

    async fn registry_with_topic() -> Arc<Mutex<SessionRegistry>> {
        let registry = Arc::new(Mutex::new(SessionRegistry::new()));
        {
            let mut guard = registry.lock().await;
            let session = guard.create(ROOM, COORD, 3).unwrap();
            session
                .propose_topic("$topic", "Retro cadence", "@a:example.org", "alice")
                .unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn test_reaction_votes_and_redaction_unvotes() {
        let registry = registry_with_topic().await;

        handle_reaction_added(&registry, ROOM, "$r1", "$topic", "☕", "@b:example.org", "bob")
            .await;
        {
            let guard = registry.lock().await;
            let session = guard.get(ROOM).unwrap();
            assert_eq!(
                session.attendee("@b:example.org").unwrap().valid_voted_topics,
                vec!["$topic"]
            );
        }

        handle_redaction(&registry, ROOM, "$r1").await;
        {
            let guard = registry.lock().await;
            let session = guard.get(ROOM).unwrap();
            assert!(
                session
                    .attendee("@b:example.org")
                    .unwrap()
                    .voted_topics
                    .is_empty()
            );
            assert!(session.reaction_log.is_empty());
        }
    }

    #[tokio::test]
    async fn test_reaction_on_unrelated_message_is_ignored() {
        let registry = registry_with_topic().await;
        handle_reaction_added(&registry, ROOM, "$r1", "$other", "☕", "@b:example.org", "bob")
            .await;
        let guard = registry.lock().await;
        let session = guard.get(ROOM).unwrap();
        assert!(session.attendee("@b:example.org").is_none());
        assert!(session.reaction_log.is_empty());
    }

    #[tokio::test]
    async fn test_continue_votes_only_count_on_the_tracked_prompt() {
        let registry = registry_with_topic().await;
        {
            let mut guard = registry.lock().await;
            let session = guard.get_mut(ROOM).unwrap();
            session.finalize().unwrap();
            session.advance_topic().unwrap();
            session.continue_prompt = Some("$prompt".to_string());
        }

        handle_reaction_added(&registry, ROOM, "$r1", "$prompt", "👍", "@b:example.org", "bob")
            .await;
        handle_reaction_added(&registry, ROOM, "$r2", "$prompt", "👎", "@c:example.org", "carol")
            .await;
        // Wrong target and non-thumb keys change nothing
        handle_reaction_added(&registry, ROOM, "$r3", "$elsewhere", "👍", "@d:example.org", "dan")
            .await;
        handle_reaction_added(&registry, ROOM, "$r4", "$prompt", "🎉", "@d:example.org", "dan")
            .await;

        {
            let mut guard = registry.lock().await;
            let session = guard.get_mut(ROOM).unwrap();
            assert_eq!(session.current_topic_mut().unwrap().continue_tally(), (1, 1));
        }

        // Taking back the downvote flips the verdict to continue
        handle_redaction(&registry, ROOM, "$r2").await;
        let mut guard = registry.lock().await;
        let session = guard.get_mut(ROOM).unwrap();
        assert_eq!(session.current_topic_mut().unwrap().continue_tally(), (1, 0));
    }

    #[tokio::test]
    async fn test_redacted_topic_message_withdraws_the_topic() {
        let registry = registry_with_topic().await;
        handle_reaction_added(&registry, ROOM, "$r1", "$topic", "☕", "@b:example.org", "bob")
            .await;

        handle_redaction(&registry, ROOM, "$topic").await;

        let mut guard = registry.lock().await;
        let session = guard.get_mut(ROOM).unwrap();
        assert!(session.topic("$topic").is_none());
        assert!(
            session
                .attendee("@b:example.org")
                .unwrap()
                .voted_topics
                .is_empty()
        );
        session.finalize().unwrap();
        assert!(session.get_sorted_topics(TopicFilter::Full).is_empty());
    }

    #[tokio::test]
    async fn test_votes_are_frozen_once_discussion_starts() {
        let registry = registry_with_topic().await;
        handle_reaction_added(&registry, ROOM, "$r1", "$topic", "☕", "@b:example.org", "bob")
            .await;
        {
            let mut guard = registry.lock().await;
            guard.get_mut(ROOM).unwrap().finalize().unwrap();
        }

        // A redaction of the CREATED-phase vote arrives too late to matter
        handle_redaction(&registry, ROOM, "$r1").await;

        let guard = registry.lock().await;
        let session = guard.get(ROOM).unwrap();
        assert_eq!(session.topic("$topic").unwrap().votes, 1);
    }
}
