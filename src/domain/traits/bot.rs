use async_trait::async_trait;
use crate::application::errors::TransportError;

/// Bot trait - abstraction for chat platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Post a message to a channel, returning the platform message id
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, TransportError>;

    /// Post a message as a reply in an existing thread
    async fn send_thread_reply(&self, channel_id: &str, thread_ts: &str, text: &str) -> Result<String, TransportError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone, Default)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub team: String,
}
