//! # Collaborator Table
//!
//! The four sub-ledgers the orchestrator delegates to, addressed by a
//! stable logical name. The table is populated exactly once at
//! initialization; afterwards an Admin may hot-swap a single slot with a
//! live replacement handle. Swaps carry no data migration.

use std::sync::Arc;

use crid_enrollment::EnrollmentLedger;
use crid_registry::{CourseCatalog, GradeBook, StudentDirectory};

use crate::error::CridError;

// ─── Logical names ───────────────────────────────────────────────────

/// The logical name of a collaborator slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorName {
    /// The student directory slot.
    StudentRegistry,
    /// The course catalog slot.
    CourseManager,
    /// The enrollment ledger slot.
    EnrollmentRequest,
    /// The grade book slot.
    GradeManager,
}

impl CollaboratorName {
    /// Parse a logical slot name.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for anything but the four recognized names.
    pub fn parse(name: &str) -> Result<Self, CridError> {
        match name {
            "studentRegistry" => Ok(Self::StudentRegistry),
            "courseManager" => Ok(Self::CourseManager),
            "enrollmentRequest" => Ok(Self::EnrollmentRequest),
            "gradeManager" => Ok(Self::GradeManager),
            other => Err(CridError::InvalidInput(format!(
                "unknown collaborator name: {other}"
            ))),
        }
    }

    /// The stable wire label of this slot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StudentRegistry => "studentRegistry",
            Self::CourseManager => "courseManager",
            Self::EnrollmentRequest => "enrollmentRequest",
            Self::GradeManager => "gradeManager",
        }
    }
}

impl std::fmt::Display for CollaboratorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Handles ─────────────────────────────────────────────────────────

/// A typed replacement handle for one collaborator slot.
#[derive(Clone)]
pub enum CollaboratorHandle {
    /// A student directory implementation.
    StudentRegistry(Arc<dyn StudentDirectory>),
    /// A course catalog implementation.
    CourseManager(Arc<dyn CourseCatalog>),
    /// An enrollment ledger implementation.
    EnrollmentRequest(Arc<dyn EnrollmentLedger>),
    /// A grade book implementation.
    GradeManager(Arc<dyn GradeBook>),
}

impl CollaboratorHandle {
    /// The slot this handle can occupy.
    pub fn name(&self) -> CollaboratorName {
        match self {
            Self::StudentRegistry(_) => CollaboratorName::StudentRegistry,
            Self::CourseManager(_) => CollaboratorName::CourseManager,
            Self::EnrollmentRequest(_) => CollaboratorName::EnrollmentRequest,
            Self::GradeManager(_) => CollaboratorName::GradeManager,
        }
    }

    /// Run the handle's liveness probe.
    pub fn is_live(&self) -> bool {
        match self {
            Self::StudentRegistry(h) => h.is_live(),
            Self::CourseManager(h) => h.is_live(),
            Self::EnrollmentRequest(h) => h.is_live(),
            Self::GradeManager(h) => h.is_live(),
        }
    }
}

impl std::fmt::Debug for CollaboratorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CollaboratorHandle")
            .field(&self.name())
            .finish()
    }
}

// ─── Table ───────────────────────────────────────────────────────────

/// The fully wired set of collaborators. Cloning clones the `Arc` handles,
/// so the facade can release its state lock before delegating.
#[derive(Clone)]
pub struct CollaboratorTable {
    /// The student directory.
    pub students: Arc<dyn StudentDirectory>,
    /// The course catalog.
    pub courses: Arc<dyn CourseCatalog>,
    /// The enrollment ledger.
    pub enrollment: Arc<dyn EnrollmentLedger>,
    /// The grade book.
    pub grades: Arc<dyn GradeBook>,
}

impl CollaboratorTable {
    /// Wire all four collaborators.
    pub fn new(
        students: Arc<dyn StudentDirectory>,
        courses: Arc<dyn CourseCatalog>,
        enrollment: Arc<dyn EnrollmentLedger>,
        grades: Arc<dyn GradeBook>,
    ) -> Self {
        Self {
            students,
            courses,
            enrollment,
            grades,
        }
    }

    /// Probe every slot, naming the first dead one.
    pub fn require_live(&self) -> Result<(), CridError> {
        for (name, live) in [
            (CollaboratorName::StudentRegistry, self.students.is_live()),
            (CollaboratorName::CourseManager, self.courses.is_live()),
            (CollaboratorName::EnrollmentRequest, self.enrollment.is_live()),
            (CollaboratorName::GradeManager, self.grades.is_live()),
        ] {
            if !live {
                return Err(CridError::InvalidContract(name.as_str().to_string()));
            }
        }
        Ok(())
    }

    /// Replace the slot the handle is typed for.
    pub fn install(&mut self, handle: CollaboratorHandle) {
        match handle {
            CollaboratorHandle::StudentRegistry(h) => self.students = h,
            CollaboratorHandle::CourseManager(h) => self.courses = h,
            CollaboratorHandle::EnrollmentRequest(h) => self.enrollment = h,
            CollaboratorHandle::GradeManager(h) => self.grades = h,
        }
    }
}

impl std::fmt::Debug for CollaboratorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollaboratorTable")
            .field("students", &self.students.count())
            .field("courses", &self.courses.count())
            .field("requests", &self.enrollment.count())
            .field("grades", &self.grades.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crid_enrollment::EnrollmentWorkflow;
    use crid_registry::{CourseManager, GradeManager, StudentRegistry};

    fn table() -> CollaboratorTable {
        CollaboratorTable::new(
            Arc::new(StudentRegistry::new()),
            Arc::new(CourseManager::new()),
            Arc::new(EnrollmentWorkflow::new()),
            Arc::new(GradeManager::new()),
        )
    }

    #[test]
    fn test_parse_recognized_names() {
        for name in [
            CollaboratorName::StudentRegistry,
            CollaboratorName::CourseManager,
            CollaboratorName::EnrollmentRequest,
            CollaboratorName::GradeManager,
        ] {
            assert_eq!(CollaboratorName::parse(name.as_str()).unwrap(), name);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_name() {
        assert!(matches!(
            CollaboratorName::parse("gradebook"),
            Err(CridError::InvalidInput(_))
        ));
        assert!(matches!(
            CollaboratorName::parse(""),
            Err(CridError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_reference_table_is_live() {
        assert!(table().require_live().is_ok());
    }

    #[test]
    fn test_install_replaces_named_slot() {
        let mut t = table();
        let fresh = Arc::new(CourseManager::new());
        t.install(CollaboratorHandle::CourseManager(fresh.clone()));
        assert_eq!(t.courses.count(), 0);
        assert_eq!(
            CollaboratorHandle::CourseManager(fresh).name(),
            CollaboratorName::CourseManager
        );
    }
}
