//! # crid-enrollment — Enrollment-Request State Machine
//!
//! The multi-party enrollment workflow: a student submits a request, the
//! student may cancel it, a coordinator or admin approves or rejects it.
//!
//! ```text
//! Pending ──▶ Approved   (terminal)
//!    │
//!    ├─────▶ Rejected   (terminal)
//!    │
//!    └─────▶ Cancelled  (terminal)
//! ```
//!
//! ## Invariants
//!
//! - Request ids are assigned strictly in submission order across all
//!   students and courses, starting at 1, and are never reused — not even
//!   after a request reaches a terminal status.
//! - At most one Pending request exists per (student, course) pair; once a
//!   request leaves Pending, a fresh request for the same pair is accepted.
//! - `request_date` is stamped at creation and never changes.
//!
//! Role gating and query privacy live at the orchestrator (the ledger's
//! only caller); this crate enforces ownership and the state machine.

pub mod request;
pub mod workflow;

pub use request::{EnrollmentRequest, RequestStatus};
pub use workflow::{EnrollmentLedger, EnrollmentWorkflow, WorkflowError};
