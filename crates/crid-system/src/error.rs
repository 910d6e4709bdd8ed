//! The facade's error sum.
//!
//! Component errors cross the facade unchanged, wrapped transparently; the
//! direct variants belong to the orchestrator itself (lifecycle, collaborator
//! wiring, query privacy).

use thiserror::Error;

use crid_access::{AccessError, GuardError};
use crid_enrollment::WorkflowError;
use crid_registry::{CourseError, GradeError, StudentError};

/// Every failure the orchestrator can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CridError {
    /// A routed operation was attempted before `initialize`.
    #[error("system is not initialized")]
    SystemNotInitialized,

    /// `initialize` was called a second time.
    #[error("system is already initialized")]
    SystemAlreadyInitialized,

    /// A collaborator handle failed its liveness probe.
    #[error("invalid contract: {0}")]
    InvalidContract(String),

    /// An orchestrator argument is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A query asked for a record the caller may not see.
    #[error("unauthorized access")]
    UnauthorizedAccess,

    /// A role-store operation failed.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// A guard-chain predicate failed.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// An enrollment-ledger operation failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// A student-directory operation failed.
    #[error(transparent)]
    Student(#[from] StudentError),

    /// A course-catalog operation failed.
    #[error(transparent)]
    Course(#[from] CourseError),

    /// A grade-book operation failed.
    #[error(transparent)]
    Grade(#[from] GradeError),
}
