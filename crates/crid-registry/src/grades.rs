//! # Grade Manager
//!
//! The grade book: one percentage value per (student, course) pair, with a
//! strictly increasing grade id used for removal. Re-grading a pair
//! overwrites the value under a fresh id.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crid_core::{CourseId, GradeId, Principal};

/// Maximum accepted grade value.
pub const MAX_GRADE: u8 = 100;

// ─── Data model ──────────────────────────────────────────────────────

/// A recorded grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    /// Sequence identifier, starting at 1.
    pub id: GradeId,
    /// The graded student.
    pub student: Principal,
    /// The graded course.
    pub course_id: CourseId,
    /// Percentage value, 0–100.
    pub value: u8,
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors signalled by the grade book.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GradeError {
    /// No grade recorded for the lookup key.
    #[error("grade not found")]
    GradeNotFound,

    /// The grade value exceeds [`MAX_GRADE`].
    #[error("invalid grade value {0}")]
    InvalidGrade(u8),

    /// A grade argument is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

// ─── Trait ───────────────────────────────────────────────────────────

/// The grade book operations the orchestrator calls.
pub trait GradeBook: Send + Sync {
    /// Record a grade for (student, course), overwriting any previous value.
    /// Returns the assigned grade id.
    fn add_grade(
        &self,
        student: Principal,
        course_id: CourseId,
        value: u8,
    ) -> Result<GradeId, GradeError>;

    /// Remove the grade with `id`, returning the removed record.
    fn remove_grade(&self, id: GradeId) -> Result<Grade, GradeError>;

    /// The grade recorded for (student, course).
    fn get_grade(&self, student: Principal, course_id: CourseId) -> Result<Grade, GradeError>;

    /// All grades of a student.
    fn grades_by_student(&self, student: Principal) -> Vec<Grade>;

    /// All grades in a course.
    fn grades_by_course(&self, course_id: CourseId) -> Vec<Grade>;

    /// Number of recorded grades.
    fn count(&self) -> u64;

    /// Liveness probe run before the orchestrator accepts this handle.
    fn is_live(&self) -> bool {
        true
    }
}

// ─── Reference implementation ────────────────────────────────────────

/// In-memory grade book.
pub struct GradeManager {
    inner: RwLock<BookInner>,
}

struct BookInner {
    by_pair: HashMap<(Principal, CourseId), Grade>,
    pair_of: HashMap<GradeId, (Principal, CourseId)>,
    next_id: u64,
}

impl GradeManager {
    /// Create an empty grade book; ids start at 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BookInner {
                by_pair: HashMap::new(),
                pair_of: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for GradeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GradeBook for GradeManager {
    fn add_grade(
        &self,
        student: Principal,
        course_id: CourseId,
        value: u8,
    ) -> Result<GradeId, GradeError> {
        if student.is_nil() {
            return Err(GradeError::InvalidInput("nil student principal".to_string()));
        }
        if value > MAX_GRADE {
            return Err(GradeError::InvalidGrade(value));
        }

        let mut book = self.inner.write().expect("grade book lock poisoned");
        let id = GradeId(book.next_id);
        book.next_id += 1;

        // Overwrite drops the stale id index entry for the pair.
        if let Some(old) = book.by_pair.insert(
            (student, course_id),
            Grade {
                id,
                student,
                course_id,
                value,
            },
        ) {
            book.pair_of.remove(&old.id);
        }
        book.pair_of.insert(id, (student, course_id));
        Ok(id)
    }

    fn remove_grade(&self, id: GradeId) -> Result<Grade, GradeError> {
        let mut book = self.inner.write().expect("grade book lock poisoned");
        let pair = book.pair_of.remove(&id).ok_or(GradeError::GradeNotFound)?;
        book.by_pair.remove(&pair).ok_or(GradeError::GradeNotFound)
    }

    fn get_grade(&self, student: Principal, course_id: CourseId) -> Result<Grade, GradeError> {
        self.inner
            .read()
            .expect("grade book lock poisoned")
            .by_pair
            .get(&(student, course_id))
            .cloned()
            .ok_or(GradeError::GradeNotFound)
    }

    fn grades_by_student(&self, student: Principal) -> Vec<Grade> {
        let mut grades: Vec<Grade> = self
            .inner
            .read()
            .expect("grade book lock poisoned")
            .by_pair
            .values()
            .filter(|g| g.student == student)
            .cloned()
            .collect();
        grades.sort_by_key(|g| g.id);
        grades
    }

    fn grades_by_course(&self, course_id: CourseId) -> Vec<Grade> {
        let mut grades: Vec<Grade> = self
            .inner
            .read()
            .expect("grade book lock poisoned")
            .by_pair
            .values()
            .filter(|g| g.course_id == course_id)
            .cloned()
            .collect();
        grades.sort_by_key(|g| g.id);
        grades
    }

    fn count(&self) -> u64 {
        self.inner
            .read()
            .expect("grade book lock poisoned")
            .by_pair
            .len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let book = GradeManager::new();
        let student = Principal::new();

        let id = book.add_grade(student, CourseId(1), 85).unwrap();
        assert_eq!(id, GradeId(1));

        let grade = book.get_grade(student, CourseId(1)).unwrap();
        assert_eq!(grade.value, 85);
        assert_eq!(book.count(), 1);
    }

    #[test]
    fn test_values_over_100_rejected() {
        let book = GradeManager::new();
        assert_eq!(
            book.add_grade(Principal::new(), CourseId(1), 101).unwrap_err(),
            GradeError::InvalidGrade(101)
        );
        assert!(book.add_grade(Principal::new(), CourseId(1), 100).is_ok());
        assert!(book.add_grade(Principal::new(), CourseId(1), 0).is_ok());
    }

    #[test]
    fn test_nil_student_rejected() {
        let book = GradeManager::new();
        assert!(matches!(
            book.add_grade(Principal::nil(), CourseId(1), 50),
            Err(GradeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_regrade_overwrites_under_fresh_id() {
        let book = GradeManager::new();
        let student = Principal::new();

        let first = book.add_grade(student, CourseId(1), 60).unwrap();
        let second = book.add_grade(student, CourseId(1), 75).unwrap();
        assert!(second > first);

        assert_eq!(book.get_grade(student, CourseId(1)).unwrap().value, 75);
        assert_eq!(book.count(), 1);
        // The stale id no longer resolves.
        assert_eq!(book.remove_grade(first).unwrap_err(), GradeError::GradeNotFound);
    }

    #[test]
    fn test_remove() {
        let book = GradeManager::new();
        let student = Principal::new();
        let id = book.add_grade(student, CourseId(2), 90).unwrap();

        let removed = book.remove_grade(id).unwrap();
        assert_eq!(removed.student, student);
        assert_eq!(removed.course_id, CourseId(2));
        assert_eq!(
            book.get_grade(student, CourseId(2)).unwrap_err(),
            GradeError::GradeNotFound
        );
        assert_eq!(book.remove_grade(id).unwrap_err(), GradeError::GradeNotFound);
    }

    #[test]
    fn test_queries_by_student_and_course() {
        let book = GradeManager::new();
        let s1 = Principal::new();
        let s2 = Principal::new();

        book.add_grade(s1, CourseId(1), 85).unwrap();
        book.add_grade(s1, CourseId(2), 95).unwrap();
        book.add_grade(s2, CourseId(1), 75).unwrap();

        let s1_grades = book.grades_by_student(s1);
        assert_eq!(s1_grades.len(), 2);
        assert_eq!(s1_grades[0].course_id, CourseId(1));
        assert_eq!(s1_grades[1].course_id, CourseId(2));

        let c1_grades = book.grades_by_course(CourseId(1));
        assert_eq!(c1_grades.len(), 2);

        assert!(book.grades_by_student(Principal::new()).is_empty());
        assert!(book.grades_by_course(CourseId(999)).is_empty());
    }

    #[test]
    fn test_ids_strictly_increase() {
        let book = GradeManager::new();
        let mut last = 0;
        for i in 0..5 {
            let id = book
                .add_grade(Principal::new(), CourseId(i + 1), 50)
                .unwrap();
            assert!(id.0 > last);
            last = id.0;
        }
    }
}
