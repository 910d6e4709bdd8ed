//! # crid-core — Foundational Types for the CRID Stack
//!
//! This crate is the bedrock of the CRID Stack. It defines the type-system
//! primitives shared by every other crate in the workspace; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Principal`, `StudentId`,
//!    `CourseId`, `RequestId`, `GradeId` — all newtypes. No bare strings or
//!    integers for identifiers, so a course id can never be handed to an API
//!    expecting a request id.
//!
//! 2. **Nil principal is representable but never valid.** The authorization
//!    layer models "no identity" as `Principal::nil()` and rejects it at
//!    every guard, mirroring the zero-address convention of the system this
//!    stack records.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces UTC with seconds
//!    precision at construction.
//!
//! 4. **Uniform notification surface.** Every state change the system
//!    advertises flows through [`Notification`] and the shared
//!    [`NotificationLog`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `crid-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` outside tests; lock poisoning is the only `expect()` path.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod identity;
pub mod notify;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use identity::{CourseId, GradeId, Principal, RequestId, StudentId};
pub use notify::{Notification, NotificationLog};
pub use temporal::{Timestamp, TimestampError};
