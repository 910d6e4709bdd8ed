//! # Guard Predicate Library
//!
//! Composable precondition checks invoked at the top of every mutating
//! handler. The chain order is a documented contract:
//!
//! 1. halt check — [`require_not_paused`], fails `SystemPaused`;
//! 2. role check — [`require_admin`] / [`require_student`] /
//!    [`require_coordinator_or_admin`] / [`require_valid_user`];
//! 3. argument validity — [`require_principal`] / [`require_nonempty`];
//! 4. reentrancy — `CallLock::enter` (see `reentrancy.rs`).
//!
//! The chain short-circuits at the first failing predicate, so a paused
//! system reports `SystemPaused` even to a caller who also lacks the role.
//! Composite guards apply the same predicates in the same relative order.

use thiserror::Error;

use crid_core::Principal;

use crate::roles::{Role, RoleStore};

/// Errors signalled by the guard chain, one per predicate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// The global halt flag is set.
    #[error("system is paused")]
    SystemPaused,

    /// The principal does not hold the Admin role.
    #[error("{0} is not an admin")]
    NotAdmin(Principal),

    /// The principal holds neither Coordinator nor Admin.
    #[error("{0} is not a coordinator")]
    NotCoordinator(Principal),

    /// The principal does not hold the Student role.
    #[error("{0} is not a student")]
    NotStudent(Principal),

    /// The principal holds no role at all.
    #[error("{0} is not a registered user")]
    InvalidUser(Principal),

    /// A principal argument is nil.
    #[error("invalid address: nil principal")]
    InvalidAddress,

    /// A non-principal argument is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The call boundary is already held by an outer call.
    #[error("reentrant call")]
    ReentrantCall,
}

/// Halt check. First predicate of every mutating chain.
pub fn require_not_paused(roles: &RoleStore) -> Result<(), GuardError> {
    if roles.paused() {
        Err(GuardError::SystemPaused)
    } else {
        Ok(())
    }
}

/// Role check: Admin.
pub fn require_admin(roles: &RoleStore, by: Principal) -> Result<(), GuardError> {
    if roles.has_role(Role::Admin, by) {
        Ok(())
    } else {
        Err(GuardError::NotAdmin(by))
    }
}

/// Role check: Student.
pub fn require_student(roles: &RoleStore, by: Principal) -> Result<(), GuardError> {
    if roles.has_role(Role::Student, by) {
        Ok(())
    } else {
        Err(GuardError::NotStudent(by))
    }
}

/// Role check: Coordinator or Admin. Fails `NotCoordinator` when the
/// principal holds neither.
pub fn require_coordinator_or_admin(roles: &RoleStore, by: Principal) -> Result<(), GuardError> {
    if roles.has_role(Role::Coordinator, by) || roles.has_role(Role::Admin, by) {
        Ok(())
    } else {
        Err(GuardError::NotCoordinator(by))
    }
}

/// Role check: any role at all.
pub fn require_valid_user(roles: &RoleStore, by: Principal) -> Result<(), GuardError> {
    if roles.is_valid_principal(by) {
        Ok(())
    } else {
        Err(GuardError::InvalidUser(by))
    }
}

/// Argument check: non-nil principal.
pub fn require_principal(principal: Principal) -> Result<(), GuardError> {
    if principal.is_nil() {
        Err(GuardError::InvalidAddress)
    } else {
        Ok(())
    }
}

/// Argument check: non-empty string field.
pub fn require_nonempty(field: &str, value: &str) -> Result<(), GuardError> {
    if value.trim().is_empty() {
        Err(GuardError::InvalidInput(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}
