use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{MessagingCapabilities, Reply},
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the only implementation today; the router and broadcaster only ever talk
/// to this trait.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    /// Send text with optional keyboard markup.
    async fn send_reply(&self, chat_id: ChatId, reply: &Reply) -> Result<MessageRef>;

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
