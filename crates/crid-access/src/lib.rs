//! # crid-access — Authorization Layer
//!
//! Who may act, and under what system-wide conditions. Three pieces:
//!
//! - **RoleStore** (`roles.rs`): the authoritative principal → role-set
//!   mapping plus the global halt flag. Roles are independent bits — a
//!   principal may hold Admin, Coordinator, and Student simultaneously.
//!
//! - **Guard library** (`guards.rs`): plain predicate functions applied in a
//!   fixed, documented order at the top of every mutating handler:
//!   halt → role → argument validity → reentrancy. The order is a contract;
//!   callers rely on it to branch deterministically on the first failure.
//!
//! - **Reentrancy lock** (`reentrancy.rs`): a single-slot lock per protected
//!   call boundary, acquired on entry and released on every exit path via an
//!   RAII guard.
//!
//! ## Design
//!
//! There is no ambient singleton: the `RoleStore` is constructed once at
//! application start and injected into every consumer. Cross-cutting checks
//! are free functions over `&RoleStore`, not inherited modifiers, so each
//! handler's precondition chain is visible at its call site and testable in
//! isolation.

pub mod guards;
pub mod reentrancy;
pub mod roles;

pub use guards::{
    require_admin, require_coordinator_or_admin, require_nonempty, require_not_paused,
    require_principal, require_student, require_valid_user, GuardError,
};
pub use reentrancy::{CallGuard, CallLock};
pub use roles::{AccessError, Role, RoleSet, RoleStore};
