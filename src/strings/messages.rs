//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes error messages, status updates, and card templates.

pub const UNKNOWN_COMMAND: &str = "❓ Unknown command.";
pub const NO_SESSION: &str = "☕ No Lean Coffee here yet. Start one with `.create`.";
pub const NOT_COORDINATOR: &str = "🚫 Only the coordinator can do that.";
pub const SESSION_ONGOING: &str = "☕ Cannot create a Lean Coffee as one is ongoing.";
pub const CANNOT_FINALIZE: &str = "⚠️ Cannot finalize during discussion.";
pub const NO_TOPICS_ABORTED: &str = "No topics to discuss, aborted.";
pub const FINALIZE_FIRST: &str = "Do `.finalize` first.";
pub const INVALID_TIME: &str = "⚠️ Invalid time.";
pub const SESSION_FINISHED: &str = "🎉 This Lean Coffee has already finished.";
pub const ABORTED: &str = "🛑 Lean Coffee aborted.";

pub const CREATE_USAGE: &str = "Usage: `.create [max votes per person, 1-9]`";
pub const NEXT_USAGE: &str = "Usage: `.next [minutes]`";

pub fn session_created(coordinator: &str, max_votes: usize) -> String {
    format!(
        "## Lean Coffee created ☕\n\
         ### Rules\n\
         - Coordinator: @{coordinator}\n\
         - Max votes per person: {max_votes}\n\
         ### Hints\n\
         - Propose topics with H1 headings: `# My topic`\n\
         - Withdraw a topic by deleting its message\n\
         - Vote for topics by reacting with any emoji\n\
         - During discussion, react 👍 to continue a topic and 👎 to end it\n"
    )
}

pub fn wants_to_discuss(author: &str, content: &str, voters: &[String]) -> String {
    format!(
        "**@{author} wants to discuss**\n# {content}\n**Interested by:** {}",
        join_mentions(voters)
    )
}

pub fn wanted_to_discuss(
    author: &str,
    content: &str,
    voters: &[String],
    discussed: &str,
) -> String {
    format!(
        "**@{author} wanted to discuss**\n# {content}\n**Interested by:** {}\n**Discussed:** {discussed}",
        join_mentions(voters)
    )
}

pub fn now_discussing(content: &str, scheduled: &str, elapsed: &str) -> String {
    format!(
        "**Now discussing**\n# {content}\n**Scheduled:** {scheduled}\n**Elapsed:** {elapsed}"
    )
}

pub fn continue_question(content: &str) -> String {
    format!("## @all Continue discussing topic: \"{content}\"?")
}

pub fn topic_summary_line(author: &str, content: &str, votes: usize, discussed: &str) -> String {
    format!("- @{author}: {content} ({votes}) [{discussed}]")
}

pub fn session_finished(topic_lines: &str, total_time: &str, topic_count: usize) -> String {
    format!(
        "# 🎉 Lean Coffee finished!\n---\n\
         ### Topics discussed\n{topic_lines}\n\n\
         **Lean Coffee time:** {total_time}\n\
         **Topics discussed:** {topic_count}"
    )
}

pub fn session_status(
    phase: &str,
    coordinator: &str,
    max_votes: usize,
    topics: usize,
    attendees: usize,
    created_at: &str,
) -> String {
    format!(
        "**Phase**: {phase}\n**Coordinator**: @{coordinator}\n**Max votes**: {max_votes}\n\
         **Topics**: {topics}\n**Attendees**: {attendees}\n**Created**: {created_at}"
    )
}

fn join_mentions(names: &[String]) -> String {
    if names.is_empty() {
        return "nobody".to_string();
    }
    names
        .iter()
        .map(|n| format!("@{n}"))
        .collect::<Vec<_>>()
        .join(" ")
}
