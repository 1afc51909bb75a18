//! # Interface Layer
//!
//! Entry points for user interaction: command handlers invoked by the
//! router and the reaction/redaction plumbing feeding the vote engine.

pub mod commands;
pub mod reactions;
