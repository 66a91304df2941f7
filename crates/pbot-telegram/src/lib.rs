//! Telegram adapter (teloxide).
//!
//! This crate implements the `pbot-core` MessagingPort over Telegram Bot API and
//! feeds converted updates into `BotApp`.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, InlineQueryResult, InlineQueryResultArticle,
        InputMessageContent, InputMessageContentText, ParseMode,
    },
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use pbot_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ButtonAction, ChatAction, InlineArticle, InlineKeyboard},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    fn markup(keyboard: InlineKeyboard) -> Result<InlineKeyboardMarkup> {
        let mut rows: Vec<Vec<InlineKeyboardButton>> =
            Vec::with_capacity(keyboard.buttons.len());
        for b in keyboard.buttons {
            let button = match b.action {
                ButtonAction::Callback(data) => InlineKeyboardButton::callback(b.label, data),
                ButtonAction::Url(url) => {
                    let url = reqwest::Url::parse(&url)
                        .map_err(|e| Error::External(format!("invalid button url {url}: {e}")))?;
                    InlineKeyboardButton::url(b.label, url)
                }
            };
            rows.push(vec![button]);
        }
        Ok(InlineKeyboardMarkup::new(rows))
    }

    fn article(a: InlineArticle) -> InlineQueryResult {
        InlineQueryResult::Article(
            InlineQueryResultArticle::new(
                a.id,
                a.title,
                InputMessageContent::Text(InputMessageContentText::new(a.body)),
            )
            .description(a.description),
        )
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::debug!(?d, "telegram asked to retry later");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .edit_message_text(
                    Self::tg_chat(msg.chat_id),
                    Self::tg_msg_id(msg.message_id),
                    html.to_string(),
                )
                .parse_mode(ParseMode::Html)
        })
        .await?;
        Ok(())
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        let markup = Self::markup(keyboard)?;

        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(markup.clone())
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_inline_keyboard(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()> {
        let markup = Self::markup(keyboard)?;

        self.with_retry(|| {
            self.bot
                .edit_message_text(
                    Self::tg_chat(msg.chat_id),
                    Self::tg_msg_id(msg.message_id),
                    html.to_string(),
                )
                .parse_mode(ParseMode::Html)
                .reply_markup(markup.clone())
        })
        .await?;
        Ok(())
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()> {
        let tg_action = match action {
            ChatAction::Typing => teloxide::types::ChatAction::Typing,
        };
        self.with_retry(|| self.bot.send_chat_action(Self::tg_chat(chat_id), tg_action))
            .await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.with_retry(|| self.bot.answer_callback_query(callback_id.to_string()))
            .await?;
        Ok(())
    }

    async fn answer_inline_query(
        &self,
        query_id: &str,
        results: Vec<InlineArticle>,
        cache_time: Duration,
    ) -> Result<()> {
        let results: Vec<InlineQueryResult> = results.into_iter().map(Self::article).collect();
        let cache_secs = u32::try_from(cache_time.as_secs()).unwrap_or(u32::MAX);

        self.with_retry(|| {
            self.bot
                .answer_inline_query(query_id.to_string(), results.clone())
                .cache_time(cache_secs)
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pbot_core::messaging::types::InlineButton;

    use super::*;

    #[test]
    fn keyboard_is_one_button_per_row() {
        let kb = InlineKeyboard::new(vec![
            InlineButton::url("📢 Broadcast", "https://t.me/yourchannel"),
            InlineButton::callback("➕ Add Admin", "add_admin"),
        ]);
        let markup = TelegramMessenger::markup(kb).unwrap();
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert!(markup.inline_keyboard.iter().all(|row| row.len() == 1));
        assert_eq!(markup.inline_keyboard[1][0].text, "➕ Add Admin");
    }

    #[test]
    fn bad_url_is_reported() {
        let kb = InlineKeyboard::new(vec![InlineButton::url("x", "not a url")]);
        assert!(matches!(
            TelegramMessenger::markup(kb),
            Err(Error::External(_))
        ));
    }
}
