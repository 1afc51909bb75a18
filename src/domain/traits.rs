//! # Domain Traits
//!
//! Abstract interface for the chat backend. Allows the session logic and
//! command handlers to stay independent of the Matrix SDK.

use async_trait::async_trait;

/// Abstract interface for a Chat Provider (e.g., Matrix, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a markdown message to the room, returning its event id
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Send a notification (fire and forget)
    async fn send_notification(&self, content: &str) -> Result<(), String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}
