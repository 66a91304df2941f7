use crate::{
    conversation::PendingAction,
    messaging::types::{InlineButton, InlineKeyboard},
};

/// Callback buttons of the admin panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelButton {
    AddAdmin,
    RemoveAdmin,
    ListAdmins,
    Cancel,
}

impl PanelButton {
    pub fn token(self) -> &'static str {
        match self {
            PanelButton::AddAdmin => "add_admin",
            PanelButton::RemoveAdmin => "remove_admin",
            PanelButton::ListAdmins => "list_admins",
            PanelButton::Cancel => "cancel_admin",
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "add_admin" => Some(PanelButton::AddAdmin),
            "remove_admin" => Some(PanelButton::RemoveAdmin),
            "list_admins" => Some(PanelButton::ListAdmins),
            "cancel_admin" => Some(PanelButton::Cancel),
            _ => None,
        }
    }

    /// The form a button arms, if any.
    pub fn pending(self) -> Option<PendingAction> {
        match self {
            PanelButton::AddAdmin => Some(PendingAction::AwaitingAddId),
            PanelButton::RemoveAdmin => Some(PendingAction::AwaitingRemoveId),
            PanelButton::ListAdmins | PanelButton::Cancel => None,
        }
    }
}

fn broadcast_button(url: &str) -> InlineButton {
    InlineButton::url("📢 Broadcast", url)
}

pub fn owner_keyboard(broadcast_url: &str) -> InlineKeyboard {
    InlineKeyboard::new(vec![
        broadcast_button(broadcast_url),
        InlineButton::callback("➕ Add Admin", PanelButton::AddAdmin.token()),
        InlineButton::callback("➖ Remove Admin", PanelButton::RemoveAdmin.token()),
        InlineButton::callback("📋 List Admins", PanelButton::ListAdmins.token()),
    ])
}

pub fn admin_keyboard(broadcast_url: &str) -> InlineKeyboard {
    InlineKeyboard::new(vec![broadcast_button(broadcast_url)])
}

pub fn cancel_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![InlineButton::callback(
        "✖️ Cancel",
        PanelButton::Cancel.token(),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for b in [
            PanelButton::AddAdmin,
            PanelButton::RemoveAdmin,
            PanelButton::ListAdmins,
            PanelButton::Cancel,
        ] {
            assert_eq!(PanelButton::parse(b.token()), Some(b));
        }
        assert_eq!(PanelButton::parse("askuser:1:0"), None);
    }

    #[test]
    fn admin_keyboard_has_no_management_buttons() {
        let kb = admin_keyboard("https://t.me/x");
        assert_eq!(kb.buttons.len(), 1);
        assert!(kb.callback_data().is_empty());

        let owner = owner_keyboard("https://t.me/x");
        assert_eq!(
            owner.callback_data(),
            vec!["add_admin", "remove_admin", "list_admins"]
        );
    }
}
