//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., .create, .next).
//! These handlers are invoked by the Router.

pub mod create;
pub mod finalize;
pub mod help;
pub mod misc;
pub mod next;
pub mod topic;
