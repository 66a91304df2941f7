//! Owner plus the mutable set of extra administrators.

use std::collections::BTreeSet;

use crate::domain::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
    RejectedOwnerProtected,
}

/// In-memory set of operators allowed to use the admin panel.
///
/// The owner is fixed at construction and can never be removed. Membership lives
/// for the lifetime of the process only.
#[derive(Clone, Debug)]
pub struct AdminRegistry {
    owner: UserId,
    admins: BTreeSet<UserId>,
}

impl AdminRegistry {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            admins: BTreeSet::new(),
        }
    }

    /// Seed extra admins at startup. The owner is skipped if listed.
    pub fn with_admins(owner: UserId, admins: impl IntoIterator<Item = UserId>) -> Self {
        let mut reg = Self::new(owner);
        for id in admins {
            let _ = reg.add(id);
        }
        reg
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn is_owner(&self, id: UserId) -> bool {
        id == self.owner
    }

    /// Owner counts as an admin.
    pub fn is_admin(&self, id: UserId) -> bool {
        self.is_owner(id) || self.admins.contains(&id)
    }

    pub fn add(&mut self, id: UserId) -> AddOutcome {
        if self.is_owner(id) || !self.admins.insert(id) {
            return AddOutcome::AlreadyPresent;
        }
        AddOutcome::Added
    }

    pub fn remove(&mut self, id: UserId) -> RemoveOutcome {
        if self.is_owner(id) {
            return RemoveOutcome::RejectedOwnerProtected;
        }
        if self.admins.remove(&id) {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFound
        }
    }

    /// All members, owner first, then admins in ascending id order.
    pub fn list(&self) -> Vec<UserId> {
        std::iter::once(self.owner)
            .chain(self.admins.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: UserId = UserId(100);

    #[test]
    fn owner_is_admin_and_listed_first() {
        let reg = AdminRegistry::with_admins(OWNER, [UserId(7), UserId(3)]);
        assert!(reg.is_owner(OWNER));
        assert!(reg.is_admin(OWNER));
        assert_eq!(reg.list(), vec![OWNER, UserId(3), UserId(7)]);
    }

    #[test]
    fn seeding_with_owner_does_not_duplicate() {
        let reg = AdminRegistry::with_admins(OWNER, [OWNER, UserId(5)]);
        assert_eq!(reg.list(), vec![OWNER, UserId(5)]);
    }

    #[test]
    fn add_existing_reports_already_present() {
        let mut reg = AdminRegistry::new(OWNER);
        assert_eq!(reg.add(UserId(555)), AddOutcome::Added);
        let before = reg.list();
        assert_eq!(reg.add(UserId(555)), AddOutcome::AlreadyPresent);
        assert_eq!(reg.add(OWNER), AddOutcome::AlreadyPresent);
        assert_eq!(reg.list(), before);
    }

    #[test]
    fn remove_absent_reports_not_found() {
        let mut reg = AdminRegistry::with_admins(OWNER, [UserId(555)]);
        let before = reg.list();
        assert_eq!(reg.remove(UserId(42)), RemoveOutcome::NotFound);
        assert_eq!(reg.list(), before);
    }

    #[test]
    fn owner_cannot_be_removed() {
        let mut reg = AdminRegistry::new(OWNER);
        assert_eq!(reg.remove(OWNER), RemoveOutcome::RejectedOwnerProtected);
        assert!(reg.is_admin(OWNER));
    }

    #[test]
    fn owner_survives_any_add_remove_sequence() {
        let mut reg = AdminRegistry::new(OWNER);
        // Deterministic pseudo-random walk over a small id space that includes the owner.
        let mut x: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..2_000 {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            let id = UserId(95 + (x % 10) as i64);
            if x & 1 == 0 {
                let _ = reg.add(id);
            } else {
                let _ = reg.remove(id);
            }
            assert!(reg.is_owner(OWNER));
            assert_eq!(reg.list().first(), Some(&OWNER));
        }
    }
}
