use crate::domain::{Chat, MessageRef, Sender};

/// Incoming update, already stripped of Telegram-specific fields.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Callback(CallbackQuery),
    InlineQuery(InlineQuery),
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat: Chat,
    pub sender: Sender,
    /// Lowercased, without the leading `/` and any `@botname` suffix.
    pub name: String,
    /// The message as typed, for the audit mirror.
    pub raw_text: String,
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat: Chat,
    pub sender: Sender,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub sender: Sender,
    pub callback_id: String,
    pub data: String,
    /// Message carrying the pressed button; `None` for inline-mode messages.
    pub message: Option<MessageRef>,
}

#[derive(Clone, Debug)]
pub struct InlineQuery {
    pub sender: Sender,
    pub query_id: String,
    pub query: String,
}

/// Outgoing "chat action" (typing indicator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    Url(String),
    Callback(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }
}

/// Inline keyboard, rendered one button per row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }

    pub fn callback_data(&self) -> Vec<&str> {
        self.buttons
            .iter()
            .filter_map(|b| match &b.action {
                ButtonAction::Callback(d) => Some(d.as_str()),
                ButtonAction::Url(_) => None,
            })
            .collect()
    }
}

/// A single inline-mode result; its body is sent as plain text when picked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub body: String,
}
