//! # Course Manager
//!
//! Keyed course catalog with caller-assigned numeric ids. Courses are
//! created active; activation and deactivation reject no-ops with the
//! course-specific conditions (`CourseAlreadyActive` / `CourseInactive`).

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crid_core::CourseId;

// ─── Data model ──────────────────────────────────────────────────────

/// Course data supplied at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSpec {
    /// Caller-assigned identifier; zero is rejected.
    pub id: CourseId,
    /// Course title.
    pub name: String,
    /// Free-form description (may be empty).
    pub description: String,
    /// Credit value; zero is rejected.
    pub credits: u8,
    /// Enrollment capacity; zero is rejected.
    pub max_students: u32,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Catalog identifier.
    pub id: CourseId,
    /// Course title.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Credit value.
    pub credits: u8,
    /// Enrollment capacity.
    pub max_students: u32,
    /// Whether the course accepts enrollment requests.
    pub is_active: bool,
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors signalled by the course catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CourseError {
    /// No course with the given id.
    #[error("{0} not found")]
    CourseNotFound(CourseId),

    /// A course with the given id already exists.
    #[error("{0} already exists")]
    CourseAlreadyExists(CourseId),

    /// Deactivation requested for an already-inactive course.
    #[error("{0} is inactive")]
    CourseInactive(CourseId),

    /// Activation requested for an already-active course.
    #[error("{0} is already active")]
    CourseAlreadyActive(CourseId),

    /// A course field is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

// ─── Trait ───────────────────────────────────────────────────────────

/// The course catalog operations the orchestrator calls.
pub trait CourseCatalog: Send + Sync {
    /// Add a course. The entry starts active.
    fn add(&self, spec: CourseSpec) -> Result<(), CourseError>;

    /// Activate (`true`) or deactivate (`false`) the course with `id`.
    fn set_status(&self, id: CourseId, active: bool) -> Result<(), CourseError>;

    /// Fetch the course with `id`.
    fn get(&self, id: CourseId) -> Result<Course, CourseError>;

    /// Whether the course exists and is active.
    fn is_active(&self, id: CourseId) -> bool;

    /// All courses, ordered by id.
    fn list(&self) -> Vec<Course>;

    /// Number of catalog entries.
    fn count(&self) -> u64;

    /// Liveness probe run before the orchestrator accepts this handle.
    fn is_live(&self) -> bool {
        true
    }
}

// ─── Reference implementation ────────────────────────────────────────

/// In-memory course catalog.
#[derive(Default)]
pub struct CourseManager {
    inner: RwLock<BTreeMap<CourseId, Course>>,
}

impl CourseManager {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CourseCatalog for CourseManager {
    fn add(&self, spec: CourseSpec) -> Result<(), CourseError> {
        if spec.id.0 == 0 {
            return Err(CourseError::InvalidInput(
                "course id must be non-zero".to_string(),
            ));
        }
        if spec.name.trim().is_empty() {
            return Err(CourseError::InvalidInput(
                "course name must not be empty".to_string(),
            ));
        }
        if spec.credits == 0 {
            return Err(CourseError::InvalidInput(
                "credits must be non-zero".to_string(),
            ));
        }
        if spec.max_students == 0 {
            return Err(CourseError::InvalidInput(
                "max students must be non-zero".to_string(),
            ));
        }

        let mut catalog = self.inner.write().expect("course catalog lock poisoned");
        if catalog.contains_key(&spec.id) {
            return Err(CourseError::CourseAlreadyExists(spec.id));
        }
        catalog.insert(
            spec.id,
            Course {
                id: spec.id,
                name: spec.name,
                description: spec.description,
                credits: spec.credits,
                max_students: spec.max_students,
                is_active: true,
            },
        );
        Ok(())
    }

    fn set_status(&self, id: CourseId, active: bool) -> Result<(), CourseError> {
        let mut catalog = self.inner.write().expect("course catalog lock poisoned");
        let course = catalog.get_mut(&id).ok_or(CourseError::CourseNotFound(id))?;
        match (course.is_active, active) {
            (true, true) => Err(CourseError::CourseAlreadyActive(id)),
            (false, false) => Err(CourseError::CourseInactive(id)),
            _ => {
                course.is_active = active;
                Ok(())
            }
        }
    }

    fn get(&self, id: CourseId) -> Result<Course, CourseError> {
        self.inner
            .read()
            .expect("course catalog lock poisoned")
            .get(&id)
            .cloned()
            .ok_or(CourseError::CourseNotFound(id))
    }

    fn is_active(&self, id: CourseId) -> bool {
        self.inner
            .read()
            .expect("course catalog lock poisoned")
            .get(&id)
            .is_some_and(|c| c.is_active)
    }

    fn list(&self) -> Vec<Course> {
        self.inner
            .read()
            .expect("course catalog lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    fn count(&self) -> u64 {
        self.inner
            .read()
            .expect("course catalog lock poisoned")
            .len() as u64
    }
}
