//! # crid-system — Orchestrator Facade
//!
//! The single entry point over the CRID sub-ledgers. The [`Crid`] facade
//! owns the system lifecycle (one-time initialization, version counter,
//! collaborator hot-swap) and routes every student, course, enrollment, and
//! grade operation through the authorization guard chain before delegating
//! to the wired collaborator.
//!
//! Collaborators are reached only through the facade; consumers hold an
//! `Arc<Crid>` and never a sub-ledger handle directly.

pub mod collaborators;
pub mod crid;
pub mod error;

pub use collaborators::{CollaboratorHandle, CollaboratorName, CollaboratorTable};
pub use crid::{Crid, SystemStatus};
pub use error::CridError;
