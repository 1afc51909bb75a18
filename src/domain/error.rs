//! # Session Errors
//!
//! Typed failures surfaced by the session core. All of them are
//! per-request and recoverable; handlers decide whether to notify the
//! room or just log and move on.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a Lean Coffee session is already ongoing in this room")]
    SessionAlreadyActive,
    #[error("no Lean Coffee session exists in this room")]
    SessionNotFound,
    #[error("only the coordinator may do that")]
    UnauthorizedActor,
    #[error("operation not allowed in the current session phase")]
    InvalidPhase,
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
    #[error("no matching vote to retract")]
    VoteNotFound,
}
