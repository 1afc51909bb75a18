//! # Attendee
//!
//! Vote accounting for a single participant. Votes are kept in cast order;
//! only the first `max_votes` of them count once the session is finalized.

use crate::domain::error::SessionError;

#[derive(Debug, Clone)]
pub struct Attendee {
    pub id: String,
    pub name: String,
    pub max_votes: usize,
    /// Topic ids this attendee proposed, in proposal order.
    pub authored_topics: Vec<String>,
    /// Topic ids voted for, in cast order. Duplicates are allowed.
    pub voted_topics: Vec<String>,
    /// Always exactly the first `max_votes` entries of `voted_topics`.
    pub valid_voted_topics: Vec<String>,
}

impl Attendee {
    pub fn new(id: &str, name: &str, max_votes: usize) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            max_votes,
            authored_topics: Vec::new(),
            voted_topics: Vec::new(),
            valid_voted_topics: Vec::new(),
        }
    }

    /// Casts a vote. Voting twice for the same topic is allowed; position
    /// in the cast order alone decides whether a vote counts.
    pub fn vote(&mut self, topic_id: &str) {
        self.voted_topics.push(topic_id.to_string());
        self.recompute_valid();
    }

    /// Retracts the earliest vote cast for `topic_id`.
    pub fn unvote(&mut self, topic_id: &str) -> Result<(), SessionError> {
        let pos = self
            .voted_topics
            .iter()
            .position(|id| id == topic_id)
            .ok_or(SessionError::VoteNotFound)?;
        self.voted_topics.remove(pos);
        self.recompute_valid();
        Ok(())
    }

    /// Strips every reference to `topic_id`, for when the topic itself is
    /// withdrawn before finalization.
    pub fn purge_topic(&mut self, topic_id: &str) {
        self.voted_topics.retain(|id| id != topic_id);
        self.authored_topics.retain(|id| id != topic_id);
        self.recompute_valid();
    }

    fn recompute_valid(&mut self) {
        self.valid_voted_topics = self
            .voted_topics
            .iter()
            .take(self.max_votes)
            .cloned()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_votes_track_cast_order_prefix() {
        let mut attendee = Attendee::new("@x:example.org", "x", 2);
        attendee.vote("a");
        assert_eq!(attendee.valid_voted_topics, vec!["a"]);
        attendee.vote("b");
        assert_eq!(attendee.valid_voted_topics, vec!["a", "b"]);
        attendee.vote("c");
        // Cap reached: the third vote is overflow
        assert_eq!(attendee.voted_topics, vec!["a", "b", "c"]);
        assert_eq!(attendee.valid_voted_topics, vec!["a", "b"]);
    }

    #[test]
    fn test_unvote_promotes_overflow_vote() {
        let mut attendee = Attendee::new("@x:example.org", "x", 2);
        attendee.vote("a");
        attendee.vote("b");
        attendee.vote("c");
        attendee.unvote("a").unwrap();
        assert_eq!(attendee.voted_topics, vec!["b", "c"]);
        assert_eq!(attendee.valid_voted_topics, vec!["b", "c"]);
    }

    #[test]
    fn test_unvote_removes_first_occurrence_only() {
        let mut attendee = Attendee::new("@x:example.org", "x", 3);
        attendee.vote("a");
        attendee.vote("b");
        attendee.vote("a");
        attendee.unvote("a").unwrap();
        assert_eq!(attendee.voted_topics, vec!["b", "a"]);
    }

    #[test]
    fn test_unvote_without_vote_fails() {
        let mut attendee = Attendee::new("@x:example.org", "x", 2);
        assert_eq!(attendee.unvote("a"), Err(SessionError::VoteNotFound));
    }

    #[test]
    fn test_prefix_invariant_over_random_sequence() {
        let mut attendee = Attendee::new("@x:example.org", "x", 2);
        let ops: &[(&str, bool)] = &[
            ("a", true),
            ("b", true),
            ("a", true),
            ("c", true),
            ("b", false),
            ("d", true),
            ("a", false),
            ("a", false),
        ];
        for (topic, is_vote) in ops {
            if *is_vote {
                attendee.vote(topic);
            } else {
                let _ = attendee.unvote(topic);
            }
            let expected: Vec<String> = attendee
                .voted_topics
                .iter()
                .take(attendee.max_votes)
                .cloned()
                .collect();
            assert_eq!(attendee.valid_voted_topics, expected);
        }
    }

    #[test]
    fn test_purge_topic_strips_votes_and_authorship() {
        let mut attendee = Attendee::new("@x:example.org", "x", 2);
        attendee.authored_topics.push("a".to_string());
        attendee.vote("a");
        attendee.vote("b");
        attendee.vote("a");
        attendee.purge_topic("a");
        assert_eq!(attendee.voted_topics, vec!["b"]);
        assert_eq!(attendee.valid_voted_topics, vec!["b"]);
        assert!(attendee.authored_topics.is_empty());
    }
}
