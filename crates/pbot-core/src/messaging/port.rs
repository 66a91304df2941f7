use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{ChatAction, InlineArticle, InlineKeyboard},
    Result,
};

/// Outbound side of the messenger.
///
/// Telegram is the only implementation; handlers in `pbot-core` only talk to this
/// trait so they can be exercised with an in-memory fake.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;
    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    /// Replace both text and buttons of an existing message.
    async fn edit_inline_keyboard(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()>;

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()>;

    async fn answer_inline_query(
        &self,
        query_id: &str,
        results: Vec<InlineArticle>,
        cache_time: Duration,
    ) -> Result<()>;
}
