//! # Session
//!
//! The per-room Lean Coffee state machine: topic collection and voting
//! while CREATED, finalization into a ranked queue, then cursor-driven
//! traversal while DISCUSSING until every topic is done.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::application::attendee::Attendee;
use crate::application::topic::Topic;
use crate::domain::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Discussing,
    Finished,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Created => "collecting topics",
            Phase::Discussing => "discussing",
            Phase::Finished => "finished",
        }
    }
}

/// Filter for the ranked topic listing while DISCUSSING.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicFilter {
    /// The whole ranking.
    Full,
    /// Topics strictly before the cursor (already discussed).
    Finished,
    /// Topics strictly after the cursor (still queued).
    Unfinished,
}

/// A reaction the bot has acted on, kept so a later redaction can undo it.
#[derive(Debug, Clone)]
pub struct ReactionRecord {
    pub attendee_id: String,
    pub attendee_name: String,
    pub key: String,
    /// Event id the reaction pointed at (topic message or continue prompt).
    pub target: String,
}

#[derive(Debug)]
pub struct Session {
    pub phase: Phase,
    pub coordinator_id: String,
    pub max_votes: usize,
    /// Insertion order = join order; keeps voter listings deterministic.
    attendees: Vec<Attendee>,
    /// Insertion order = proposal order; drives the stable tie-break.
    topics: Vec<Topic>,
    /// Topic ids by descending vote count, computed once at finalization.
    ranking: Vec<String>,
    /// Index into `ranking`. `None` until the first topic is opened; may
    /// run one past the end once the queue is exhausted.
    cursor: Option<usize>,
    /// Event id of the currently open continue question, if any.
    pub continue_prompt: Option<String>,
    /// Reactions acted on, by reaction event id, for redaction undo.
    pub reaction_log: HashMap<String, ReactionRecord>,
    pub created_at: DateTime<Utc>,
    started_at: Instant,
    abort_tx: watch::Sender<bool>,
}

impl Session {
    pub fn new(coordinator_id: &str, max_votes: usize) -> Self {
        let (abort_tx, _) = watch::channel(false);
        Self {
            phase: Phase::Created,
            coordinator_id: coordinator_id.to_string(),
            max_votes,
            attendees: Vec::new(),
            topics: Vec::new(),
            ranking: Vec::new(),
            cursor: None,
            continue_prompt: None,
            reaction_log: HashMap::new(),
            created_at: Utc::now(),
            started_at: Instant::now(),
            abort_tx,
        }
    }

    pub fn ensure_coordinator(&self, user_id: &str) -> Result<(), SessionError> {
        if user_id == self.coordinator_id {
            Ok(())
        } else {
            Err(SessionError::UnauthorizedActor)
        }
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    fn topic_mut(&mut self, topic_id: &str) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|t| t.id == topic_id)
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn attendee(&self, attendee_id: &str) -> Option<&Attendee> {
        self.attendees.iter().find(|a| a.id == attendee_id)
    }

    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    /// Display names for a topic's voters, in tally order.
    pub fn voter_names(&self, topic: &Topic) -> Vec<String> {
        topic
            .voters
            .iter()
            .filter_map(|id| self.attendee(id).map(|a| a.name.clone()))
            .collect()
    }

    fn attendee_entry(&mut self, attendee_id: &str, name: &str) -> &mut Attendee {
        if let Some(pos) = self.attendees.iter().position(|a| a.id == attendee_id) {
            return &mut self.attendees[pos];
        }
        self.attendees
            .push(Attendee::new(attendee_id, name, self.max_votes));
        let last = self.attendees.len() - 1;
        &mut self.attendees[last]
    }

    /// Registers a topic while CREATED. Re-delivery of an already known
    /// event id is ignored; Matrix can replay events across sync gaps.
    pub fn propose_topic(
        &mut self,
        topic_id: &str,
        content: &str,
        author_id: &str,
        author_name: &str,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Created {
            return Err(SessionError::InvalidPhase);
        }
        if self.topic(topic_id).is_some() {
            return Ok(());
        }
        let author = self.attendee_entry(author_id, author_name);
        author.authored_topics.push(topic_id.to_string());
        self.topics
            .push(Topic::new(topic_id, content, author_id, author_name));
        Ok(())
    }

    pub fn vote(
        &mut self,
        topic_id: &str,
        attendee_id: &str,
        attendee_name: &str,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Created {
            return Err(SessionError::InvalidPhase);
        }
        if self.topic(topic_id).is_none() {
            return Err(SessionError::UnknownTopic(topic_id.to_string()));
        }
        self.attendee_entry(attendee_id, attendee_name).vote(topic_id);
        Ok(())
    }

    pub fn unvote(&mut self, topic_id: &str, attendee_id: &str) -> Result<(), SessionError> {
        if self.phase != Phase::Created {
            return Err(SessionError::InvalidPhase);
        }
        if self.topic(topic_id).is_none() {
            return Err(SessionError::UnknownTopic(topic_id.to_string()));
        }
        let attendee = self
            .attendees
            .iter_mut()
            .find(|a| a.id == attendee_id)
            .ok_or(SessionError::VoteNotFound)?;
        attendee.unvote(topic_id)
    }

    /// Withdraws a topic while CREATED (the proposing message was deleted),
    /// stripping every pending vote for it.
    pub fn remove_topic(&mut self, topic_id: &str) -> Result<(), SessionError> {
        if self.phase != Phase::Created {
            return Err(SessionError::InvalidPhase);
        }
        let pos = self
            .topics
            .iter()
            .position(|t| t.id == topic_id)
            .ok_or_else(|| SessionError::UnknownTopic(topic_id.to_string()))?;
        self.topics.remove(pos);
        for attendee in &mut self.attendees {
            attendee.purge_topic(topic_id);
        }
        Ok(())
    }

    /// Counts every attendee's valid votes into the topics, computes the
    /// ranking (votes descending, proposal order on ties) and moves to
    /// DISCUSSING. The tally and ranking are frozen from here on.
    pub fn finalize(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Created {
            return Err(SessionError::InvalidPhase);
        }
        for i in 0..self.attendees.len() {
            let attendee_id = self.attendees[i].id.clone();
            let valid = self.attendees[i].valid_voted_topics.clone();
            for topic_id in valid {
                if let Some(topic) = self.topic_mut(&topic_id) {
                    topic.record_vote(&attendee_id);
                }
            }
        }
        let mut order: Vec<usize> = (0..self.topics.len()).collect();
        // sort_by is stable: equal counts keep proposal order
        order.sort_by(|a, b| self.topics[*b].votes.cmp(&self.topics[*a].votes));
        self.ranking = order.iter().map(|i| self.topics[*i].id.clone()).collect();
        self.phase = Phase::Discussing;
        Ok(())
    }

    /// Moves the discussion forward. The first call opens the top-ranked
    /// topic. Later calls resolve the current topic's continue vote: a
    /// strict majority keeps the same topic (timer untouched), otherwise
    /// its slot is closed and the next topic opens. Returns `None` once
    /// the queue is exhausted, flipping the session to FINISHED.
    pub fn advance_topic(&mut self) -> Result<Option<&Topic>, SessionError> {
        if self.phase != Phase::Discussing {
            return Err(SessionError::InvalidPhase);
        }
        self.continue_prompt = None;
        let next = match self.cursor {
            None => 0,
            Some(i) => {
                let current_id = self.ranking[i].clone();
                let keep_going = match self.topic_mut(&current_id) {
                    Some(topic) => topic.resolve_continue(),
                    None => false,
                };
                if keep_going {
                    return Ok(self.topic(&current_id));
                }
                if let Some(topic) = self.topic_mut(&current_id) {
                    topic.end_discussion();
                }
                i + 1
            }
        };
        if next >= self.ranking.len() {
            self.cursor = Some(self.ranking.len());
            self.phase = Phase::Finished;
            return Ok(None);
        }
        self.cursor = Some(next);
        let id = self.ranking[next].clone();
        if let Some(topic) = self.topic_mut(&id) {
            topic.start_discussion();
        }
        Ok(self.topic(&id))
    }

    /// The topic under the cursor, or `None`. A cursor that has run past
    /// the end flips the session to FINISHED as a side effect.
    pub fn current_topic(&mut self) -> Option<&Topic> {
        let i = self.cursor?;
        if i >= self.ranking.len() {
            self.phase = Phase::Finished;
            return None;
        }
        self.topic(&self.ranking[i])
    }

    /// Mutable access to the topic under the cursor, for the continue
    /// counters.
    pub fn current_topic_mut(&mut self) -> Option<&mut Topic> {
        let i = self.cursor?;
        if i >= self.ranking.len() {
            self.phase = Phase::Finished;
            return None;
        }
        let id = self.ranking[i].clone();
        self.topic_mut(&id)
    }

    /// Ranked listing scoped by the cursor. Empty outside DISCUSSING.
    pub fn get_sorted_topics(&self, filter: TopicFilter) -> Vec<&Topic> {
        if self.phase != Phase::Discussing {
            return Vec::new();
        }
        let len = self.ranking.len();
        let ids: &[String] = match (filter, self.cursor) {
            (TopicFilter::Full, _) => &self.ranking,
            (TopicFilter::Finished, None) => &[],
            (TopicFilter::Finished, Some(i)) => &self.ranking[..i.min(len)],
            (TopicFilter::Unfinished, None) => &self.ranking,
            (TopicFilter::Unfinished, Some(i)) if i + 1 <= len => &self.ranking[i + 1..],
            (TopicFilter::Unfinished, Some(_)) => &[],
        };
        ids.iter().filter_map(|id| self.topic(id)).collect()
    }

    /// The full ranking regardless of phase. The closing summary renders
    /// from this; the data is frozen at finalization.
    pub fn ranked_topics(&self) -> Vec<&Topic> {
        self.ranking
            .iter()
            .filter_map(|id| self.topic(id))
            .collect()
    }

    /// Wall time since the session was created, for the closing card.
    pub fn total_time(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Wakes any in-flight discussion wait for this session.
    pub fn abort(&self) {
        let _ = self.abort_tx.send(true);
    }

    pub fn abort_signal(&self) -> watch::Receiver<bool> {
        self.abort_tx.subscribe()
    }
}
