use crate::{domain::UserId, errors::AuthorizationDenied, registry::AdminRegistry};

// ============== Authorization ==============

/// Privileged actions reachable from the admin panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    ViewBroadcastPanel,
    AddAdmin,
    RemoveAdmin,
    ListAdmins,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Permitted,
    Denied,
}

impl Decision {
    pub fn is_permitted(self) -> bool {
        matches!(self, Decision::Permitted)
    }
}

/// Decide whether `requester` may perform `action` given the current registry.
pub fn authorize(requester: UserId, action: Action, registry: &AdminRegistry) -> Decision {
    let allowed = match action {
        Action::ViewBroadcastPanel => registry.is_admin(requester),
        Action::AddAdmin | Action::RemoveAdmin | Action::ListAdmins => {
            registry.is_owner(requester)
        }
    };
    if allowed {
        Decision::Permitted
    } else {
        Decision::Denied
    }
}

/// Like [`authorize`], shaped for `?` at call sites.
pub fn ensure(
    requester: UserId,
    action: Action,
    registry: &AdminRegistry,
) -> Result<(), AuthorizationDenied> {
    match authorize(requester, action, registry) {
        Decision::Permitted => Ok(()),
        Decision::Denied => Err(AuthorizationDenied { requester, action }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: UserId = UserId(100);
    const ADMIN: UserId = UserId(555);
    const OWNER_ONLY: [Action; 3] = [Action::AddAdmin, Action::RemoveAdmin, Action::ListAdmins];

    fn registry() -> AdminRegistry {
        AdminRegistry::with_admins(OWNER, [ADMIN])
    }

    #[test]
    fn owner_is_always_permitted() {
        let reg = registry();
        for action in OWNER_ONLY.into_iter().chain([Action::ViewBroadcastPanel]) {
            assert_eq!(authorize(OWNER, action, &reg), Decision::Permitted);
        }
    }

    #[test]
    fn admin_sees_panel_but_cannot_manage() {
        let reg = registry();
        assert!(authorize(ADMIN, Action::ViewBroadcastPanel, &reg).is_permitted());
        for action in OWNER_ONLY {
            assert_eq!(authorize(ADMIN, action, &reg), Decision::Denied);
        }
    }

    #[test]
    fn strangers_are_denied_everything() {
        let reg = registry();
        for id in [-1, 0, 1, 99, 101, 554, 556, i64::MAX] {
            for action in OWNER_ONLY.into_iter().chain([Action::ViewBroadcastPanel]) {
                assert_eq!(authorize(UserId(id), action, &reg), Decision::Denied);
            }
        }
    }

    #[test]
    fn removed_admin_loses_panel_access() {
        let mut reg = registry();
        let _ = reg.remove(ADMIN);
        assert_eq!(
            authorize(ADMIN, Action::ViewBroadcastPanel, &reg),
            Decision::Denied
        );
    }

    #[test]
    fn ensure_reports_the_denied_action() {
        let reg = registry();
        let err = ensure(ADMIN, Action::RemoveAdmin, &reg).unwrap_err();
        assert_eq!(err.requester, ADMIN);
        assert_eq!(err.action, Action::RemoveAdmin);
        assert!(ensure(OWNER, Action::RemoveAdmin, &reg).is_ok());
    }
}
