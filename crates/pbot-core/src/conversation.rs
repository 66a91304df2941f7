//! Pending add/remove-admin forms.
//!
//! A conversation is one user inside one chat. It is `Idle` unless the owner
//! pressed an "Add Admin" / "Remove Admin" button, in which case the next text
//! from that user in that chat is read as a numeric user id.

use std::collections::HashMap;

use crate::{
    domain::{ChatId, UserId},
    errors::{AuthorizationDenied, InvalidIdentifierInput},
    registry::{AddOutcome, AdminRegistry, RemoveOutcome},
    security::{ensure, Action},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub chat_id: ChatId,
    pub user_id: UserId,
}

impl ConversationKey {
    pub fn new(chat_id: ChatId, user_id: UserId) -> Self {
        Self { chat_id, user_id }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingAction {
    AwaitingAddId,
    AwaitingRemoveId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    Awaiting(PendingAction),
}

/// What happened to a text submitted while a form was pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Added(UserId),
    AlreadyAdmin(UserId),
    Removed(UserId),
    NotAdmin(UserId),
    OwnerProtected(UserId),
    Invalid(InvalidIdentifierInput),
    Denied(AuthorizationDenied),
}

impl PendingAction {
    pub fn required_action(self) -> Action {
        match self {
            PendingAction::AwaitingAddId => Action::AddAdmin,
            PendingAction::AwaitingRemoveId => Action::RemoveAdmin,
        }
    }

    /// Apply `text` to the registry. The gate is checked again because the
    /// registry may have changed since the form was armed.
    pub fn resolve(
        self,
        requester: UserId,
        text: &str,
        registry: &mut AdminRegistry,
    ) -> Resolution {
        if let Err(denied) = ensure(requester, self.required_action(), registry) {
            return Resolution::Denied(denied);
        }

        let id = match parse_user_id(text) {
            Ok(id) => id,
            Err(invalid) => return Resolution::Invalid(invalid),
        };

        match self {
            PendingAction::AwaitingAddId => match registry.add(id) {
                AddOutcome::Added => Resolution::Added(id),
                AddOutcome::AlreadyPresent => Resolution::AlreadyAdmin(id),
            },
            PendingAction::AwaitingRemoveId => match registry.remove(id) {
                RemoveOutcome::Removed => Resolution::Removed(id),
                RemoveOutcome::NotFound => Resolution::NotAdmin(id),
                RemoveOutcome::RejectedOwnerProtected => Resolution::OwnerProtected(id),
            },
        }
    }
}

pub fn parse_user_id(text: &str) -> Result<UserId, InvalidIdentifierInput> {
    text.trim()
        .parse::<i64>()
        .map(UserId)
        .map_err(|_| InvalidIdentifierInput {
            input: text.to_string(),
        })
}

/// Pending-action table for every conversation. Absent keys are `Idle`.
#[derive(Debug, Default)]
pub struct Conversations {
    pending: HashMap<ConversationKey, PendingAction>,
}

impl Conversations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: ConversationKey) -> ConversationState {
        match self.pending.get(&key) {
            Some(p) => ConversationState::Awaiting(*p),
            None => ConversationState::Idle,
        }
    }

    /// Start waiting for an id. Re-arming replaces whatever was pending; a denied
    /// requester leaves the conversation untouched.
    pub fn arm(
        &mut self,
        key: ConversationKey,
        pending: PendingAction,
        registry: &AdminRegistry,
    ) -> Result<(), AuthorizationDenied> {
        ensure(key.user_id, pending.required_action(), registry)?;
        self.pending.insert(key, pending);
        Ok(())
    }

    /// Remove the pending action so the caller can resolve it. The conversation
    /// is `Idle` afterwards whatever the outcome.
    pub fn take(&mut self, key: ConversationKey) -> Option<PendingAction> {
        self.pending.remove(&key)
    }

    /// Returns `true` if something was pending.
    pub fn cancel(&mut self, key: ConversationKey) -> bool {
        self.pending.remove(&key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: UserId = UserId(100);

    fn key(user: UserId) -> ConversationKey {
        ConversationKey::new(ChatId(user.0), user)
    }

    #[test]
    fn starts_idle() {
        let convs = Conversations::new();
        assert_eq!(convs.state(key(OWNER)), ConversationState::Idle);
    }

    #[test]
    fn owner_arms_and_rearms_without_stacking() {
        let reg = AdminRegistry::new(OWNER);
        let mut convs = Conversations::new();

        convs
            .arm(key(OWNER), PendingAction::AwaitingAddId, &reg)
            .unwrap();
        convs
            .arm(key(OWNER), PendingAction::AwaitingRemoveId, &reg)
            .unwrap();

        assert_eq!(
            convs.state(key(OWNER)),
            ConversationState::Awaiting(PendingAction::AwaitingRemoveId)
        );
        assert_eq!(convs.take(key(OWNER)), Some(PendingAction::AwaitingRemoveId));
        assert_eq!(convs.take(key(OWNER)), None);
    }

    #[test]
    fn non_owner_cannot_arm() {
        let reg = AdminRegistry::with_admins(OWNER, [UserId(555)]);
        let mut convs = Conversations::new();

        let err = convs
            .arm(key(UserId(555)), PendingAction::AwaitingAddId, &reg)
            .unwrap_err();
        assert_eq!(err.action, Action::AddAdmin);
        assert_eq!(convs.state(key(UserId(555))), ConversationState::Idle);
    }

    #[test]
    fn conversations_are_independent_per_chat() {
        let reg = AdminRegistry::new(OWNER);
        let mut convs = Conversations::new();
        let private = key(OWNER);
        let group = ConversationKey::new(ChatId(-42), OWNER);

        convs.arm(private, PendingAction::AwaitingAddId, &reg).unwrap();
        assert_eq!(convs.state(group), ConversationState::Idle);
    }

    #[test]
    fn cancel_returns_to_idle_without_touching_registry() {
        let reg = AdminRegistry::with_admins(OWNER, [UserId(7)]);
        let before = reg.list();
        let mut convs = Conversations::new();

        convs
            .arm(key(OWNER), PendingAction::AwaitingRemoveId, &reg)
            .unwrap();
        assert!(convs.cancel(key(OWNER)));
        assert!(!convs.cancel(key(OWNER)));
        assert_eq!(convs.state(key(OWNER)), ConversationState::Idle);
        assert_eq!(reg.list(), before);
    }

    #[test]
    fn add_then_duplicate() {
        let mut reg = AdminRegistry::new(OWNER);
        assert_eq!(
            PendingAction::AwaitingAddId.resolve(OWNER, " 555 ", &mut reg),
            Resolution::Added(UserId(555))
        );
        assert_eq!(reg.list(), vec![OWNER, UserId(555)]);
        assert_eq!(
            PendingAction::AwaitingAddId.resolve(OWNER, "555", &mut reg),
            Resolution::AlreadyAdmin(UserId(555))
        );
    }

    #[test]
    fn remove_outcomes() {
        let mut reg = AdminRegistry::with_admins(OWNER, [UserId(555)]);
        assert_eq!(
            PendingAction::AwaitingRemoveId.resolve(OWNER, "100", &mut reg),
            Resolution::OwnerProtected(OWNER)
        );
        assert_eq!(
            PendingAction::AwaitingRemoveId.resolve(OWNER, "42", &mut reg),
            Resolution::NotAdmin(UserId(42))
        );
        assert_eq!(
            PendingAction::AwaitingRemoveId.resolve(OWNER, "555", &mut reg),
            Resolution::Removed(UserId(555))
        );
        assert_eq!(reg.list(), vec![OWNER]);
    }

    #[test]
    fn garbage_input_is_invalid_and_leaves_registry_alone() {
        let mut reg = AdminRegistry::new(OWNER);
        for text in ["abc", "", "12.5", "555 666", "99999999999999999999"] {
            let r = PendingAction::AwaitingAddId.resolve(OWNER, text, &mut reg);
            assert_eq!(
                r,
                Resolution::Invalid(InvalidIdentifierInput {
                    input: text.to_string()
                })
            );
        }
        assert_eq!(reg.list(), vec![OWNER]);
    }

    #[test]
    fn resolve_rechecks_the_gate() {
        let mut reg = AdminRegistry::with_admins(OWNER, [UserId(555)]);
        let r = PendingAction::AwaitingAddId.resolve(UserId(555), "7", &mut reg);
        assert!(matches!(r, Resolution::Denied(_)));
        assert!(!reg.is_admin(UserId(7)));
    }
}
