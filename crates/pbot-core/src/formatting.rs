//! User-facing text (Telegram HTML).

use crate::{
    conversation::{PendingAction, Resolution},
    domain::{Chat, ChatKind, Sender, UserId},
};

pub const PRIVATE_ONLY_NOTICE: &str = "⚠️ Please use /admin in private chat only.";
pub const PANEL_INTRO: &str =
    "Opening the broadcast panel... make sure your message hits the right hearts ❤️";
pub const PANEL_TITLE: &str = "🔐 <b>Admin Panel:</b>";
pub const PANEL_DENIED: &str = "🚫 Sorry, this panel is only for the bot owner or authorized admins.";
pub const OWNER_ONLY_BUTTON: &str = "❌ Only the bot owner can use this function.";
pub const CANCELLED: &str = "❌ Cancelled.";
pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn start_card(persona_name: &str) -> String {
    format!(
        "✨ <b>I've been waiting for you and finally you're here!</b> ✨\n\n\
         I'm <b>{}</b>, your personal assistant master.\n\n\
         How you doing 🤭 ?",
        escape_html(persona_name)
    )
}

pub fn id_prompt(pending: PendingAction) -> &'static str {
    match pending {
        PendingAction::AwaitingAddId => "🆔 Send the user ID you want to <b>add</b> as admin:",
        PendingAction::AwaitingRemoveId => {
            "🆔 Send the user ID you want to <b>remove</b> from admins:"
        }
    }
}

pub fn admin_list(ids: &[UserId]) -> String {
    let body = ids
        .iter()
        .map(|id| format!("<code>{id}</code>"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("👑 <b>Current Admins:</b>\n{body}")
}

pub fn resolution(r: &Resolution) -> String {
    match r {
        Resolution::Added(id) => format!("✅ Admin added: <code>{id}</code>"),
        Resolution::AlreadyAdmin(_) => "⚠️ This user is already an admin.".to_string(),
        Resolution::Removed(id) => format!("✅ Admin removed: <code>{id}</code>"),
        Resolution::NotAdmin(_) => "⚠️ This user is not an admin.".to_string(),
        Resolution::OwnerProtected(_) => "🚫 You can't remove the bot owner.".to_string(),
        Resolution::Invalid(_) => "⚠️ Invalid user ID.".to_string(),
        Resolution::Denied(_) => OWNER_ONLY_BUTTON.to_string(),
    }
}

/// Copy of an inbound message for the owner's private chat.
pub fn audit_mirror(chat: &Chat, sender: &Sender, text: &str) -> String {
    let tag = match &chat.kind {
        ChatKind::Private => "🧑‍💻 Private".to_string(),
        ChatKind::Group { title } => format!(
            "👥 Group: {}",
            escape_html(title.as_deref().unwrap_or("unknown"))
        ),
    };
    let handle = sender
        .username
        .as_deref()
        .map(|u| format!(" @{}", escape_html(u)))
        .unwrap_or_default();
    format!(
        "{tag}\n👤 From: {}{handle} ({})\n💬 Message: {}",
        escape_html(&sender.first_name),
        sender.id,
        escape_html(text)
    )
}

/// First `max_chars` characters, with an ellipsis when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
