//! # Student Registry
//!
//! Keyed store of student profiles with two uniqueness invariants: one
//! profile per principal, one principal per institution id. Registration
//! starts a student in the active state; activation and deactivation are
//! explicit transitions that reject no-ops by name.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crid_core::{Principal, StudentId, Timestamp};

// ─── Data model ──────────────────────────────────────────────────────

/// Profile data supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Institution-assigned identifier; unique across the registry.
    pub id: StudentId,
    /// Full legal name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Degree program.
    pub program: String,
    /// Year of enrollment (0 is accepted for legacy records).
    pub enrollment_year: u16,
}

/// A registered student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// The owning principal.
    pub principal: Principal,
    /// Institution-assigned identifier.
    pub id: StudentId,
    /// Full legal name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Degree program.
    pub program: String,
    /// Year of enrollment.
    pub enrollment_year: u16,
    /// Whether the student may currently act (request enrollment).
    pub is_active: bool,
    /// When the student registered.
    pub registered_at: Timestamp,
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors signalled by the student registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudentError {
    /// The principal already has a profile.
    #[error("{0} is already registered")]
    AlreadyRegistered(Principal),

    /// The institution id is already taken by another principal.
    #[error("student id {0} is already registered")]
    DuplicateStudentId(StudentId),

    /// No profile exists for the given institution id.
    #[error("student {0} not found")]
    StudentNotFound(StudentId),

    /// No profile exists for the given principal.
    #[error("{0} is not registered")]
    StudentNotRegistered(Principal),

    /// The student exists but is deactivated.
    #[error("student {0} is not active")]
    StudentNotActive(StudentId),

    /// Activation requested for an already-active student.
    #[error("student {0} is already active")]
    AlreadyActive(StudentId),

    /// Deactivation requested for an already-inactive student.
    #[error("student {0} is not active")]
    NotActive(StudentId),

    /// A profile field is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

// ─── Trait ───────────────────────────────────────────────────────────

/// The student directory operations the orchestrator calls.
pub trait StudentDirectory: Send + Sync {
    /// Register a profile for `principal`. The record starts active.
    fn register(&self, principal: Principal, profile: StudentProfile) -> Result<(), StudentError>;

    /// Activate (`true`) or deactivate (`false`) the student with `id`.
    fn set_status(&self, id: &StudentId, active: bool) -> Result<(), StudentError>;

    /// Fetch the record owned by `principal`.
    fn get_by_principal(&self, principal: Principal) -> Result<Student, StudentError>;

    /// Fetch the record with institution id `id`.
    fn get_by_id(&self, id: &StudentId) -> Result<Student, StudentError>;

    /// Whether `principal` has a profile.
    fn is_registered(&self, principal: Principal) -> bool;

    /// Whether `principal` has a profile and it is active.
    fn is_active(&self, principal: Principal) -> bool;

    /// Number of registered students.
    fn count(&self) -> u64;

    /// Liveness probe run before the orchestrator accepts this handle.
    fn is_live(&self) -> bool {
        true
    }
}

// ─── Reference implementation ────────────────────────────────────────

/// In-memory student directory.
#[derive(Default)]
pub struct StudentRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    by_principal: HashMap<Principal, Student>,
    principal_of: HashMap<StudentId, Principal>,
}

impl StudentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StudentDirectory for StudentRegistry {
    fn register(&self, principal: Principal, profile: StudentProfile) -> Result<(), StudentError> {
        if principal.is_nil() {
            return Err(StudentError::InvalidInput("nil principal".to_string()));
        }
        for (field, value) in [
            ("student id", profile.id.as_str()),
            ("full name", profile.full_name.as_str()),
            ("email", profile.email.as_str()),
            ("program", profile.program.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(StudentError::InvalidInput(format!(
                    "{field} must not be empty"
                )));
            }
        }

        let mut inner = self.inner.write().expect("student registry lock poisoned");
        if inner.by_principal.contains_key(&principal) {
            return Err(StudentError::AlreadyRegistered(principal));
        }
        if inner.principal_of.contains_key(&profile.id) {
            return Err(StudentError::DuplicateStudentId(profile.id));
        }

        inner.principal_of.insert(profile.id.clone(), principal);
        inner.by_principal.insert(
            principal,
            Student {
                principal,
                id: profile.id,
                full_name: profile.full_name,
                email: profile.email,
                program: profile.program,
                enrollment_year: profile.enrollment_year,
                is_active: true,
                registered_at: Timestamp::now(),
            },
        );
        Ok(())
    }

    fn set_status(&self, id: &StudentId, active: bool) -> Result<(), StudentError> {
        let mut inner = self.inner.write().expect("student registry lock poisoned");
        let principal = *inner
            .principal_of
            .get(id)
            .ok_or_else(|| StudentError::StudentNotFound(id.clone()))?;
        let student = inner
            .by_principal
            .get_mut(&principal)
            .ok_or_else(|| StudentError::StudentNotFound(id.clone()))?;

        match (student.is_active, active) {
            (true, true) => Err(StudentError::AlreadyActive(id.clone())),
            (false, false) => Err(StudentError::NotActive(id.clone())),
            _ => {
                student.is_active = active;
                Ok(())
            }
        }
    }

    fn get_by_principal(&self, principal: Principal) -> Result<Student, StudentError> {
        self.inner
            .read()
            .expect("student registry lock poisoned")
            .by_principal
            .get(&principal)
            .cloned()
            .ok_or(StudentError::StudentNotRegistered(principal))
    }

    fn get_by_id(&self, id: &StudentId) -> Result<Student, StudentError> {
        let inner = self.inner.read().expect("student registry lock poisoned");
        let principal = inner
            .principal_of
            .get(id)
            .ok_or_else(|| StudentError::StudentNotFound(id.clone()))?;
        inner
            .by_principal
            .get(principal)
            .cloned()
            .ok_or_else(|| StudentError::StudentNotFound(id.clone()))
    }

    fn is_registered(&self, principal: Principal) -> bool {
        self.inner
            .read()
            .expect("student registry lock poisoned")
            .by_principal
            .contains_key(&principal)
    }

    fn is_active(&self, principal: Principal) -> bool {
        self.inner
            .read()
            .expect("student registry lock poisoned")
            .by_principal
            .get(&principal)
            .is_some_and(|s| s.is_active)
    }

    fn count(&self) -> u64 {
        self.inner
            .read()
            .expect("student registry lock poisoned")
            .by_principal
            .len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> StudentProfile {
        StudentProfile {
            id: StudentId::new(id),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.edu".to_string(),
            program: "Computing".to_string(),
            enrollment_year: 2026,
        }
    }

    #[test]
    fn test_register_starts_active() {
        let registry = StudentRegistry::new();
        let p = Principal::new();
        registry.register(p, profile("2026001")).unwrap();

        assert!(registry.is_registered(p));
        assert!(registry.is_active(p));
        assert_eq!(registry.count(), 1);

        let student = registry.get_by_principal(p).unwrap();
        assert_eq!(student.id, StudentId::new("2026001"));
        assert_eq!(student.full_name, "Ada Lovelace");
        assert!(student.is_active);
    }

    #[test]
    fn test_empty_fields_rejected() {
        let registry = StudentRegistry::new();
        let p = Principal::new();

        let mut bad = profile("");
        assert!(matches!(
            registry.register(p, bad.clone()),
            Err(StudentError::InvalidInput(_))
        ));

        bad = profile("2026001");
        bad.full_name = String::new();
        assert!(matches!(
            registry.register(p, bad.clone()),
            Err(StudentError::InvalidInput(_))
        ));

        bad = profile("2026001");
        bad.email = "   ".to_string();
        assert!(matches!(
            registry.register(p, bad),
            Err(StudentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_nil_principal_rejected() {
        let registry = StudentRegistry::new();
        assert!(matches!(
            registry.register(Principal::nil(), profile("2026001")),
            Err(StudentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_duplicate_principal_rejected() {
        let registry = StudentRegistry::new();
        let p = Principal::new();
        registry.register(p, profile("2026001")).unwrap();
        assert_eq!(
            registry.register(p, profile("2026002")).unwrap_err(),
            StudentError::AlreadyRegistered(p)
        );
    }

    #[test]
    fn test_duplicate_student_id_rejected() {
        let registry = StudentRegistry::new();
        registry
            .register(Principal::new(), profile("2026001"))
            .unwrap();
        assert_eq!(
            registry
                .register(Principal::new(), profile("2026001"))
                .unwrap_err(),
            StudentError::DuplicateStudentId(StudentId::new("2026001"))
        );
    }

    #[test]
    fn test_status_transitions() {
        let registry = StudentRegistry::new();
        let p = Principal::new();
        let id = StudentId::new("2026001");
        registry.register(p, profile("2026001")).unwrap();

        // Deactivate, then reject the repeat.
        registry.set_status(&id, false).unwrap();
        assert!(!registry.is_active(p));
        assert_eq!(
            registry.set_status(&id, false).unwrap_err(),
            StudentError::NotActive(id.clone())
        );

        // Reactivate, then reject the repeat.
        registry.set_status(&id, true).unwrap();
        assert!(registry.is_active(p));
        assert_eq!(
            registry.set_status(&id, true).unwrap_err(),
            StudentError::AlreadyActive(id.clone())
        );
    }

    #[test]
    fn test_unknown_lookups() {
        let registry = StudentRegistry::new();
        let p = Principal::new();
        let id = StudentId::new("nope");

        assert_eq!(
            registry.get_by_principal(p).unwrap_err(),
            StudentError::StudentNotRegistered(p)
        );
        assert_eq!(
            registry.get_by_id(&id).unwrap_err(),
            StudentError::StudentNotFound(id.clone())
        );
        assert_eq!(
            registry.set_status(&id, false).unwrap_err(),
            StudentError::StudentNotFound(id)
        );
        assert!(!registry.is_registered(p));
        assert!(!registry.is_active(p));
    }

    #[test]
    fn test_get_by_id_matches_principal_record() {
        let registry = StudentRegistry::new();
        let p = Principal::new();
        registry.register(p, profile("2026007")).unwrap();

        let by_id = registry.get_by_id(&StudentId::new("2026007")).unwrap();
        let by_principal = registry.get_by_principal(p).unwrap();
        assert_eq!(by_id, by_principal);
    }

    #[test]
    fn test_zero_year_accepted() {
        let registry = StudentRegistry::new();
        let mut data = profile("legacy-1");
        data.enrollment_year = 0;
        registry.register(Principal::new(), data).unwrap();
        assert_eq!(
            registry
                .get_by_id(&StudentId::new("legacy-1"))
                .unwrap()
                .enrollment_year,
            0
        );
    }

    #[test]
    fn test_registry_reports_live() {
        assert!(StudentRegistry::new().is_live());
    }
}
