//! # Topic
//!
//! A proposed discussion item: vote tally, the live continue/stop
//! sub-vote, and the timing of its discussion slot.

use std::time::{Duration, Instant};

use crate::application::utils::format_duration;

#[derive(Debug, Clone)]
pub struct Topic {
    /// Event id of the message that proposed the topic. Unique per session.
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    /// Attendee ids whose valid votes included this topic. Populated once,
    /// at finalization, and immutable afterwards.
    pub voters: Vec<String>,
    pub votes: usize,
    continue_upvotes: u32,
    continue_downvotes: u32,
    started_at: Option<Instant>,
    discussed: Option<Duration>,
}

impl PartialEq for Topic {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Topic {}

impl Topic {
    pub fn new(id: &str, content: &str, author_id: &str, author_name: &str) -> Self {
        Self {
            id: id.to_string(),
            content: content.to_string(),
            author_id: author_id.to_string(),
            author_name: author_name.to_string(),
            voters: Vec::new(),
            votes: 0,
            continue_upvotes: 0,
            continue_downvotes: 0,
            started_at: None,
            discussed: None,
        }
    }

    /// Credits one finalized vote from `attendee_id`.
    pub fn record_vote(&mut self, attendee_id: &str) {
        self.voters.push(attendee_id.to_string());
        self.votes += 1;
    }

    pub fn add_continue_upvote(&mut self) {
        self.continue_upvotes += 1;
    }

    /// Counters clamp at zero: a redaction arriving without a matching
    /// prior reaction must not drive the tally negative.
    pub fn remove_continue_upvote(&mut self) {
        self.continue_upvotes = self.continue_upvotes.saturating_sub(1);
    }

    pub fn add_continue_downvote(&mut self) {
        self.continue_downvotes += 1;
    }

    pub fn remove_continue_downvote(&mut self) {
        self.continue_downvotes = self.continue_downvotes.saturating_sub(1);
    }

    /// Reads the continue verdict and resets both counters for the next
    /// round. A strict majority of upvotes is required; a tie means stop.
    /// Call exactly once per discussion round.
    pub fn resolve_continue(&mut self) -> bool {
        let verdict = self.continue_upvotes > self.continue_downvotes;
        self.continue_upvotes = 0;
        self.continue_downvotes = 0;
        verdict
    }

    pub fn continue_tally(&self) -> (u32, u32) {
        (self.continue_upvotes, self.continue_downvotes)
    }

    /// Opens the discussion slot. Also clears any stale continue counters
    /// so a re-entered topic starts its poll from zero.
    pub fn start_discussion(&mut self) {
        self.started_at = Some(Instant::now());
        self.continue_upvotes = 0;
        self.continue_downvotes = 0;
    }

    /// Fixes the cumulative discussed duration. The timer is not restarted
    /// between continue rounds, so this covers all of them.
    pub fn end_discussion(&mut self) {
        if let Some(started) = self.started_at {
            self.discussed = Some(started.elapsed());
        }
    }

    /// Live span since the slot opened, `HH:MM:SS`. Recomputed on each
    /// call; does not freeze.
    pub fn elapsed_time(&self) -> String {
        let elapsed = self.started_at.map(|s| s.elapsed()).unwrap_or_default();
        format_duration(elapsed)
    }

    /// Final cumulative discussed duration, `HH:MM:SS`.
    pub fn discussed_time(&self) -> String {
        format_duration(self.discussed.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> Topic {
        Topic::new("$ev1", "Retro cadence", "@a:example.org", "alice")
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = Topic::new("$ev1", "one", "@a:example.org", "alice");
        let b = Topic::new("$ev1", "another wording", "@b:example.org", "bob");
        let c = Topic::new("$ev2", "one", "@a:example.org", "alice");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_continue_majority_wins() {
        let mut t = topic();
        t.add_continue_upvote();
        t.add_continue_upvote();
        t.add_continue_downvote();
        assert!(t.resolve_continue());
    }

    #[test]
    fn test_continue_tie_stops() {
        let mut t = topic();
        t.add_continue_upvote();
        t.add_continue_downvote();
        assert!(!t.resolve_continue());
    }

    #[test]
    fn test_resolve_resets_counters() {
        let mut t = topic();
        t.add_continue_upvote();
        t.add_continue_upvote();
        assert!(t.resolve_continue());
        assert_eq!(t.continue_tally(), (0, 0));
        // Next round starts from scratch
        assert!(!t.resolve_continue());
    }

    #[test]
    fn test_removal_clamps_at_zero() {
        let mut t = topic();
        t.remove_continue_upvote();
        t.remove_continue_downvote();
        assert_eq!(t.continue_tally(), (0, 0));
        t.add_continue_upvote();
        assert!(t.resolve_continue());
    }

    #[test]
    fn test_start_discussion_clears_stale_counters() {
        let mut t = topic();
        t.add_continue_downvote();
        t.start_discussion();
        assert_eq!(t.continue_tally(), (0, 0));
    }

    #[test]
    fn test_discussed_time_covers_the_slot() {
        let mut t = topic();
        assert_eq!(t.discussed_time(), "00:00:00");
        t.start_discussion();
        t.end_discussion();
        assert_eq!(t.discussed_time(), "00:00:00");
        assert_eq!(t.elapsed_time(), "00:00:00");
    }

    #[test]
    fn test_record_vote_tracks_voters() {
        let mut t = topic();
        t.record_vote("@a:example.org");
        t.record_vote("@b:example.org");
        assert_eq!(t.votes, 2);
        assert_eq!(t.voters, vec!["@a:example.org", "@b:example.org"]);
    }
}
