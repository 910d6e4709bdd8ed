//! # Role Store — Principal → Role-Set Mapping and the Halt Flag
//!
//! The authoritative record of who holds which roles, plus the global
//! emergency halt. The deployer is granted Admin at construction; all
//! grant/revoke/pause operations are Admin-gated from then on.
//!
//! ## Invariants
//!
//! - Roles are independent bits: granting Coordinator never touches an
//!   existing Student bit.
//! - A nil principal never appears in the table.
//! - At least one Admin always exists: revoking the last remaining Admin is
//!   rejected.
//! - `pause` while paused fails; `unpause` is idempotent.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crid_core::{Notification, NotificationLog, Principal};

// ─── Role / RoleSet ──────────────────────────────────────────────────

/// The three independently grantable roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Lifecycle, collaborator-address, and pause/unpause privileges.
    Admin,
    /// Course, grade, and enrollment approval privileges.
    Coordinator,
    /// Self-registration and enrollment request privileges.
    Student,
}

impl Role {
    /// All roles, in privilege order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Coordinator, Role::Student];

    /// Stable lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Coordinator => "coordinator",
            Self::Student => "student",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Self::Admin => 0b001,
            Self::Coordinator => 0b010,
            Self::Student => 0b100,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of roles held by one principal, stored as a bitset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleSet(u8);

impl RoleSet {
    /// The empty role set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// A set containing exactly one role.
    pub fn of(role: Role) -> Self {
        Self(role.bit())
    }

    /// Whether the set contains the given role.
    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// Add a role. Idempotent.
    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    /// Remove a role. Idempotent.
    pub fn remove(&mut self, role: Role) {
        self.0 &= !role.bit();
    }

    /// Whether no roles are held.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The roles in this set, in privilege order.
    pub fn roles(&self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| self.contains(*r)).collect()
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors signalled by the role store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The acting principal does not hold the Admin role.
    #[error("insufficient permissions: {by} is not an admin")]
    InsufficientPermissions {
        /// The rejected actor.
        by: Principal,
    },

    /// The target principal is nil.
    #[error("invalid address: nil principal")]
    InvalidAddress,

    /// The system is halted; only `unpause` is accepted.
    #[error("system is paused")]
    SystemIsPaused,

    /// The operation would violate a role-table invariant.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

// ─── RoleStore ───────────────────────────────────────────────────────

/// Authoritative principal → role-set mapping plus the global halt flag.
///
/// Safe to share behind an `Arc`; every mutating operation validates all of
/// its preconditions before touching state, so a failed call leaves the
/// table untouched.
pub struct RoleStore {
    state: RwLock<RoleTable>,
    log: NotificationLog,
}

struct RoleTable {
    assignments: HashMap<Principal, RoleSet>,
    paused: bool,
}

impl RoleStore {
    /// Create a store with `deployer` as the initial Admin.
    ///
    /// # Errors
    ///
    /// `InvalidAddress` if the deployer is nil.
    pub fn new(deployer: Principal, log: NotificationLog) -> Result<Self, AccessError> {
        if deployer.is_nil() {
            return Err(AccessError::InvalidAddress);
        }
        let mut assignments = HashMap::new();
        assignments.insert(deployer, RoleSet::of(Role::Admin));
        Ok(Self {
            state: RwLock::new(RoleTable {
                assignments,
                paused: false,
            }),
            log,
        })
    }

    /// Whether `principal` currently holds `role`.
    pub fn has_role(&self, role: Role, principal: Principal) -> bool {
        self.state
            .read()
            .expect("role table lock poisoned")
            .assignments
            .get(&principal)
            .is_some_and(|set| set.contains(role))
    }

    /// Whether `principal` is non-nil and holds at least one role.
    pub fn is_valid_principal(&self, principal: Principal) -> bool {
        if principal.is_nil() {
            return false;
        }
        self.state
            .read()
            .expect("role table lock poisoned")
            .assignments
            .get(&principal)
            .is_some_and(|set| !set.is_empty())
    }

    /// The full role set of `principal`.
    pub fn roles_of(&self, principal: Principal) -> RoleSet {
        self.state
            .read()
            .expect("role table lock poisoned")
            .assignments
            .get(&principal)
            .copied()
            .unwrap_or_default()
    }

    /// Whether the global halt flag is set.
    pub fn paused(&self) -> bool {
        self.state.read().expect("role table lock poisoned").paused
    }

    /// Grant `role` to `principal`. Admin-only; idempotent on the bit but a
    /// notification is emitted on every successful call.
    ///
    /// Precondition order: halt → actor role → target validity.
    pub fn grant(&self, role: Role, principal: Principal, by: Principal) -> Result<(), AccessError> {
        let mut table = self.state.write().expect("role table lock poisoned");
        if table.paused {
            return Err(AccessError::SystemIsPaused);
        }
        require_admin(&table, by)?;
        if principal.is_nil() {
            return Err(AccessError::InvalidAddress);
        }
        table.assignments.entry(principal).or_default().insert(role);
        drop(table);
        self.log.record(Notification::RoleGranted {
            role: role.as_str().to_string(),
            principal,
            by,
        });
        Ok(())
    }

    /// Revoke `role` from `principal`. Admin-only.
    ///
    /// Revoking the last remaining Admin is rejected with `InvalidInput` so
    /// the system can never lock itself out.
    pub fn revoke(
        &self,
        role: Role,
        principal: Principal,
        by: Principal,
    ) -> Result<(), AccessError> {
        let mut table = self.state.write().expect("role table lock poisoned");
        if table.paused {
            return Err(AccessError::SystemIsPaused);
        }
        require_admin(&table, by)?;
        if principal.is_nil() {
            return Err(AccessError::InvalidAddress);
        }
        let target_is_admin = table
            .assignments
            .get(&principal)
            .is_some_and(|set| set.contains(Role::Admin));
        if role == Role::Admin && target_is_admin && admin_count(&table) <= 1 {
            return Err(AccessError::InvalidInput(
                "cannot revoke the last remaining admin".to_string(),
            ));
        }
        if let Some(set) = table.assignments.get_mut(&principal) {
            set.remove(role);
            if set.is_empty() {
                table.assignments.remove(&principal);
            }
        }
        drop(table);
        self.log.record(Notification::RoleRevoked {
            role: role.as_str().to_string(),
            principal,
            by,
        });
        Ok(())
    }

    /// Set the global halt flag. Admin-only; fails `SystemIsPaused` if the
    /// system is already halted.
    pub fn pause(&self, by: Principal) -> Result<(), AccessError> {
        let mut table = self.state.write().expect("role table lock poisoned");
        if table.paused {
            return Err(AccessError::SystemIsPaused);
        }
        require_admin(&table, by)?;
        table.paused = true;
        drop(table);
        self.log.record(Notification::HaltChanged { paused: true, by });
        Ok(())
    }

    /// Clear the global halt flag. Admin-only, callable regardless of the
    /// current flag, and idempotent: unpausing an unpaused system succeeds
    /// with no state change (a notification is still emitted).
    pub fn unpause(&self, by: Principal) -> Result<(), AccessError> {
        let mut table = self.state.write().expect("role table lock poisoned");
        require_admin(&table, by)?;
        table.paused = false;
        drop(table);
        self.log
            .record(Notification::HaltChanged { paused: false, by });
        Ok(())
    }
}

impl std::fmt::Debug for RoleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.state.read().expect("role table lock poisoned");
        f.debug_struct("RoleStore")
            .field("principals", &table.assignments.len())
            .field("paused", &table.paused)
            .finish()
    }
}

fn require_admin(table: &RoleTable, by: Principal) -> Result<(), AccessError> {
    let is_admin = table
        .assignments
        .get(&by)
        .is_some_and(|set| set.contains(Role::Admin));
    if is_admin {
        Ok(())
    } else {
        Err(AccessError::InsufficientPermissions { by })
    }
}

fn admin_count(table: &RoleTable) -> usize {
    table
        .assignments
        .values()
        .filter(|set| set.contains(Role::Admin))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (RoleStore, Principal, NotificationLog) {
        let log = NotificationLog::new();
        let admin = Principal::new();
        let store = RoleStore::new(admin, log.clone()).unwrap();
        (store, admin, log)
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn test_deployer_is_admin() {
        let (store, admin, _) = store();
        assert!(store.has_role(Role::Admin, admin));
        assert!(!store.paused());
    }

    #[test]
    fn test_nil_deployer_rejected() {
        let err = RoleStore::new(Principal::nil(), NotificationLog::new()).unwrap_err();
        assert_eq!(err, AccessError::InvalidAddress);
    }

    // ── Grant / revoke ───────────────────────────────────────────────

    #[test]
    fn test_grant_revoke_roundtrip() {
        let (store, admin, _) = store();
        let p = Principal::new();

        store.grant(Role::Coordinator, p, admin).unwrap();
        assert!(store.has_role(Role::Coordinator, p));

        store.revoke(Role::Coordinator, p, admin).unwrap();
        assert!(!store.has_role(Role::Coordinator, p));
    }

    #[test]
    fn test_roles_are_independent_bits() {
        let (store, admin, _) = store();
        let p = Principal::new();

        store.grant(Role::Student, p, admin).unwrap();
        store.grant(Role::Coordinator, p, admin).unwrap();
        assert!(store.has_role(Role::Student, p));
        assert!(store.has_role(Role::Coordinator, p));

        store.revoke(Role::Student, p, admin).unwrap();
        assert!(!store.has_role(Role::Student, p));
        assert!(store.has_role(Role::Coordinator, p));
    }

    #[test]
    fn test_non_admin_cannot_grant() {
        let (store, admin, _) = store();
        let coordinator = Principal::new();
        store.grant(Role::Coordinator, coordinator, admin).unwrap();

        let err = store
            .grant(Role::Coordinator, Principal::new(), coordinator)
            .unwrap_err();
        assert_eq!(err, AccessError::InsufficientPermissions { by: coordinator });
    }

    #[test]
    fn test_non_admin_cannot_revoke() {
        let (store, admin, _) = store();
        let student = Principal::new();
        store.grant(Role::Student, student, admin).unwrap();

        let err = store.revoke(Role::Student, student, student).unwrap_err();
        assert_eq!(err, AccessError::InsufficientPermissions { by: student });
    }

    #[test]
    fn test_grant_nil_target_rejected() {
        let (store, admin, _) = store();
        let err = store
            .grant(Role::Student, Principal::nil(), admin)
            .unwrap_err();
        assert_eq!(err, AccessError::InvalidAddress);
    }

    #[test]
    fn test_revoke_nil_target_rejected() {
        let (store, admin, _) = store();
        let err = store
            .revoke(Role::Student, Principal::nil(), admin)
            .unwrap_err();
        assert_eq!(err, AccessError::InvalidAddress);
    }

    #[test]
    fn test_last_admin_cannot_be_revoked() {
        let (store, admin, _) = store();
        let err = store.revoke(Role::Admin, admin, admin).unwrap_err();
        assert!(matches!(err, AccessError::InvalidInput(_)));
        assert!(store.has_role(Role::Admin, admin));
    }

    #[test]
    fn test_second_admin_can_be_revoked() {
        let (store, admin, _) = store();
        let second = Principal::new();
        store.grant(Role::Admin, second, admin).unwrap();
        store.revoke(Role::Admin, second, admin).unwrap();
        assert!(!store.has_role(Role::Admin, second));
        assert!(store.has_role(Role::Admin, admin));
    }

    // ── Halt flag ────────────────────────────────────────────────────

    #[test]
    fn test_pause_blocks_grants() {
        let (store, admin, _) = store();
        store.pause(admin).unwrap();
        let err = store
            .grant(Role::Student, Principal::new(), admin)
            .unwrap_err();
        assert_eq!(err, AccessError::SystemIsPaused);
    }

    #[test]
    fn test_pause_while_paused_fails() {
        let (store, admin, _) = store();
        store.pause(admin).unwrap();
        assert_eq!(store.pause(admin).unwrap_err(), AccessError::SystemIsPaused);
    }

    #[test]
    fn test_unpause_is_idempotent() {
        let (store, admin, _) = store();
        store.unpause(admin).unwrap();
        assert!(!store.paused());

        store.pause(admin).unwrap();
        store.unpause(admin).unwrap();
        store.unpause(admin).unwrap();
        assert!(!store.paused());
    }

    #[test]
    fn test_unpause_requires_admin() {
        let (store, admin, _) = store();
        let student = Principal::new();
        store.grant(Role::Student, student, admin).unwrap();
        store.pause(admin).unwrap();

        let err = store.unpause(student).unwrap_err();
        assert_eq!(err, AccessError::InsufficientPermissions { by: student });
        assert!(store.paused());
    }

    #[test]
    fn test_non_admin_cannot_pause() {
        let (store, admin, _) = store();
        let coordinator = Principal::new();
        store.grant(Role::Coordinator, coordinator, admin).unwrap();
        let err = store.pause(coordinator).unwrap_err();
        assert_eq!(err, AccessError::InsufficientPermissions { by: coordinator });
    }

    #[test]
    fn test_roles_survive_pause_cycle() {
        let (store, admin, _) = store();
        let coordinator = Principal::new();
        store.grant(Role::Coordinator, coordinator, admin).unwrap();

        store.pause(admin).unwrap();
        store.unpause(admin).unwrap();
        assert!(store.has_role(Role::Coordinator, coordinator));
    }

    // ── Principal validity ───────────────────────────────────────────

    #[test]
    fn test_is_valid_principal() {
        let (store, admin, _) = store();
        let p = Principal::new();

        assert!(store.is_valid_principal(admin));
        assert!(!store.is_valid_principal(p));
        assert!(!store.is_valid_principal(Principal::nil()));

        store.grant(Role::Student, p, admin).unwrap();
        assert!(store.is_valid_principal(p));

        store.revoke(Role::Student, p, admin).unwrap();
        assert!(!store.is_valid_principal(p));
    }

    // ── Notifications ────────────────────────────────────────────────

    #[test]
    fn test_notifications_emitted() {
        let (store, admin, log) = store();
        let p = Principal::new();

        store.grant(Role::Coordinator, p, admin).unwrap();
        store.revoke(Role::Coordinator, p, admin).unwrap();
        store.pause(admin).unwrap();
        store.unpause(admin).unwrap();

        assert_eq!(log.of_kind("role_granted").len(), 1);
        assert_eq!(log.of_kind("role_revoked").len(), 1);
        assert_eq!(log.of_kind("halt_changed").len(), 2);
    }

    #[test]
    fn test_failed_calls_emit_nothing() {
        let (store, _, log) = store();
        let stranger = Principal::new();
        store
            .grant(Role::Student, Principal::new(), stranger)
            .unwrap_err();
        assert!(log.is_empty());
    }

    // ── RoleSet ──────────────────────────────────────────────────────

    #[test]
    fn test_roleset_bits() {
        let mut set = RoleSet::empty();
        assert!(set.is_empty());
        set.insert(Role::Admin);
        set.insert(Role::Student);
        assert!(set.contains(Role::Admin));
        assert!(!set.contains(Role::Coordinator));
        assert_eq!(set.roles(), vec![Role::Admin, Role::Student]);
        set.remove(Role::Admin);
        assert_eq!(set.roles(), vec![Role::Student]);
    }
}
