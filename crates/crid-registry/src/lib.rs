//! # crid-registry — Collaborator Ledgers
//!
//! The specialized sub-ledgers the orchestrator delegates to: the student
//! directory, the course catalog, and the grade book. Each is a simple keyed
//! store with uniqueness and active-flag invariants, exposed behind an
//! object-safe trait so the orchestrator can hold `Arc<dyn …>` handles and
//! hot-swap them at runtime.
//!
//! Every trait carries `is_live()`, the liveness probe the orchestrator runs
//! before accepting a handle at initialization or swap time. The reference
//! in-memory implementations always report live; test doubles override it to
//! exercise the rejection path.
//!
//! Errors raised here cross the orchestrator unchanged — the facade wraps
//! them without renaming so callers can branch on the original condition.

pub mod courses;
pub mod grades;
pub mod students;

pub use courses::{Course, CourseCatalog, CourseError, CourseManager, CourseSpec};
pub use grades::{Grade, GradeBook, GradeError, GradeManager};
pub use students::{Student, StudentDirectory, StudentError, StudentProfile, StudentRegistry};
