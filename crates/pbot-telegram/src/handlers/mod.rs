//! Telegram update handlers.
//!
//! Each endpoint converts the teloxide update into a `pbot-core` update and hands
//! it to `BotApp`. Endpoints always return `Ok(())` so the dispatcher keeps going.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, InlineQuery, Message, User},
};

use pbot_core::{
    domain::{Chat, ChatId, ChatKind, MessageId, MessageRef, Sender, UserId},
    messaging::types::{self, IncomingUpdate},
    utils::parse_command,
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(update) = convert_message(&msg) else {
        return Ok(());
    };

    // Sequentialize messages per chat so a pending form sees input in order.
    let _guard = state.chat_locks.lock_chat(msg.chat.id.0).await;
    state.app.handle_update(update).await;
    Ok(())
}

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    state
        .app
        .handle_update(IncomingUpdate::Callback(convert_callback(&q)))
        .await;
    Ok(())
}

pub async fn handle_inline_query(q: InlineQuery, state: Arc<AppState>) -> ResponseResult<()> {
    state
        .app
        .handle_update(IncomingUpdate::InlineQuery(types::InlineQuery {
            sender: sender_of(&q.from),
            query_id: q.id.clone(),
            query: q.query.clone(),
        }))
        .await;
    Ok(())
}

/// Text messages only; media, service messages and anonymous senders are dropped.
fn convert_message(msg: &Message) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    let text = msg.text()?;
    let chat = chat_of(&msg.chat);
    let sender = sender_of(user);

    let update = match parse_command(text) {
        Some((name, _args)) => IncomingUpdate::Command(types::Command {
            chat,
            sender,
            name,
            raw_text: text.to_string(),
        }),
        None => IncomingUpdate::Text(types::TextMessage {
            chat,
            sender,
            text: text.to_string(),
        }),
    };
    Some(update)
}

fn convert_callback(q: &CallbackQuery) -> types::CallbackQuery {
    types::CallbackQuery {
        sender: sender_of(&q.from),
        callback_id: q.id.clone(),
        data: q.data.clone().unwrap_or_default(),
        message: q.message.as_ref().map(|m| MessageRef {
            chat_id: ChatId(m.chat.id.0),
            message_id: MessageId(m.id.0),
        }),
    }
}

fn chat_of(chat: &teloxide::types::Chat) -> Chat {
    let kind = if chat.is_private() {
        ChatKind::Private
    } else {
        ChatKind::Group {
            title: chat.title().or(chat.username()).map(str::to_string),
        }
    };
    Chat {
        id: ChatId(chat.id.0),
        kind,
    }
}

fn sender_of(user: &User) -> Sender {
    Sender {
        id: UserId(user.id.0 as i64),
        first_name: user.first_name.clone(),
        username: user.username.clone(),
    }
}
