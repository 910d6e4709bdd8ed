//! # Crid — the Orchestrator Facade
//!
//! The single entry point of the stack. `Crid` owns the lifecycle flag, the
//! version counter, the collaborator table, and the reentrancy lock; the
//! role store is injected so access control can be shared with other
//! surfaces.
//!
//! ## Invariants
//!
//! - `initialize` succeeds at most once; every routed operation fails
//!   `SystemNotInitialized` before it.
//! - Every mutating handler applies the guard chain in the documented
//!   order: halt, role, arguments, reentrancy.
//! - Every operation validates all of its preconditions before its first
//!   mutation, so a failed call leaves no partial state.
//! - The state lock is never held across a delegation; collaborator handles
//!   are cloned out first.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crid_access::{
    require_coordinator_or_admin, require_not_paused, require_student, CallLock, Role, RoleStore,
};
use crid_core::{
    CourseId, GradeId, Notification, NotificationLog, Principal, RequestId, StudentId,
};
use crid_enrollment::EnrollmentRequest;
use crid_registry::{Course, CourseSpec, Grade, Student, StudentProfile};

use crate::collaborators::{CollaboratorHandle, CollaboratorName, CollaboratorTable};
use crate::error::CridError;

// ─── Status snapshot ─────────────────────────────────────────────────

/// A point-in-time view of the system, readable by anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Whether `initialize` has completed.
    pub initialized: bool,
    /// Whether the global halt flag is set.
    pub paused: bool,
    /// Version counter; 0 before initialization, 1 after, bumped by upgrade.
    pub version: u64,
    /// Registered students.
    pub total_students: u64,
    /// Enrollment requests ever created.
    pub total_requests: u64,
}

// ─── Facade ──────────────────────────────────────────────────────────

/// The orchestrator. Safe to share behind an `Arc`.
pub struct Crid {
    roles: Arc<RoleStore>,
    state: RwLock<SystemState>,
    call_lock: CallLock,
    log: NotificationLog,
}

struct SystemState {
    collaborators: Option<CollaboratorTable>,
    version: u64,
}

impl Crid {
    /// Create an uninitialized facade over an existing role store.
    pub fn new(roles: Arc<RoleStore>, log: NotificationLog) -> Self {
        Self {
            roles,
            state: RwLock::new(SystemState {
                collaborators: None,
                version: 0,
            }),
            call_lock: CallLock::new(),
            log,
        }
    }

    /// The injected role store.
    pub fn roles(&self) -> &RoleStore {
        &self.roles
    }

    /// The shared notification trail.
    pub fn notifications(&self) -> &NotificationLog {
        &self.log
    }

    /// Whether `initialize` has completed.
    pub fn initialized(&self) -> bool {
        self.state
            .read()
            .expect("system state lock poisoned")
            .collaborators
            .is_some()
    }

    /// The version counter; 0 before initialization.
    pub fn version(&self) -> u64 {
        self.state.read().expect("system state lock poisoned").version
    }

    // ── internal helpers ──

    /// Clone the collaborator handles out from under the state lock.
    fn table(&self) -> Result<CollaboratorTable, CridError> {
        self.state
            .read()
            .expect("system state lock poisoned")
            .collaborators
            .clone()
            .ok_or(CridError::SystemNotInitialized)
    }

    fn is_staff(&self, by: Principal) -> bool {
        self.roles.has_role(Role::Coordinator, by) || self.roles.has_role(Role::Admin, by)
    }

    /// Privacy check for subject-scoped queries: the subject themselves, a
    /// Coordinator, or an Admin.
    fn require_subject_or_staff(&self, subject: Principal, by: Principal) -> Result<(), CridError> {
        if by == subject || self.is_staff(by) {
            Ok(())
        } else {
            Err(CridError::UnauthorizedAccess)
        }
    }

    fn require_staff(&self, by: Principal) -> Result<(), CridError> {
        if self.is_staff(by) {
            Ok(())
        } else {
            Err(CridError::UnauthorizedAccess)
        }
    }

    fn require_admin(&self, by: Principal) -> Result<(), CridError> {
        crid_access::require_admin(&self.roles, by).map_err(CridError::from)
    }

    // ─── Lifecycle ───────────────────────────────────────────────────

    /// One-time wiring of all four collaborators. Admin-only.
    ///
    /// Each handle must report itself live; on success the version counter
    /// starts at 1 and `SystemInitialized` is recorded.
    pub fn initialize(&self, table: CollaboratorTable, by: Principal) -> Result<(), CridError> {
        self.require_admin(by)?;
        let mut state = self.state.write().expect("system state lock poisoned");
        if state.collaborators.is_some() {
            return Err(CridError::SystemAlreadyInitialized);
        }
        table.require_live()?;
        state.collaborators = Some(table);
        state.version = 1;
        drop(state);
        self.log.record(Notification::SystemInitialized { by });
        Ok(())
    }

    /// Hot-swap one collaborator slot. Admin-only, requires an initialized
    /// system, and carries no data migration.
    pub fn update_collaborator(
        &self,
        name: &str,
        handle: CollaboratorHandle,
        by: Principal,
    ) -> Result<(), CridError> {
        self.require_admin(by)?;
        let slot = CollaboratorName::parse(name)?;
        if handle.name() != slot {
            return Err(CridError::InvalidInput(format!(
                "handle is a {} implementation, slot is {slot}",
                handle.name()
            )));
        }
        if !handle.is_live() {
            return Err(CridError::InvalidContract(slot.as_str().to_string()));
        }
        let mut state = self.state.write().expect("system state lock poisoned");
        let table = state
            .collaborators
            .as_mut()
            .ok_or(CridError::SystemNotInitialized)?;
        table.install(handle);
        drop(state);
        self.log.record(Notification::CollaboratorUpdated {
            name: slot.as_str().to_string(),
            by,
        });
        Ok(())
    }

    /// Bump the version counter. Admin-only; a pure marker with no
    /// behavioral effect.
    pub fn upgrade(&self, by: Principal) -> Result<u64, CridError> {
        self.require_admin(by)?;
        let mut state = self.state.write().expect("system state lock poisoned");
        if state.collaborators.is_none() {
            return Err(CridError::SystemNotInitialized);
        }
        state.version += 1;
        let version = state.version;
        drop(state);
        self.log.record(Notification::SystemUpgraded { version, by });
        Ok(version)
    }

    // ─── Students ────────────────────────────────────────────────────

    /// Self-registration: the caller becomes the profile's owning
    /// principal. Requires the Student role; the record starts active.
    pub fn register_student(
        &self,
        profile: StudentProfile,
        by: Principal,
    ) -> Result<(), CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        require_student(&self.roles, by)?;
        let _call = self.call_lock.enter()?;

        let id = profile.id.clone();
        table.students.register(by, profile)?;
        self.log
            .record(Notification::StudentRegistered { id, principal: by });
        Ok(())
    }

    /// Activate or deactivate a student. Admin-only.
    pub fn set_student_status(
        &self,
        id: &StudentId,
        active: bool,
        by: Principal,
    ) -> Result<(), CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        self.require_admin(by)?;
        let _call = self.call_lock.enter()?;

        table.students.set_status(id, active)?;
        self.log.record(Notification::StudentStatusChanged {
            id: id.clone(),
            active,
            by,
        });
        Ok(())
    }

    /// Fetch a student record by principal. Subject-or-staff.
    pub fn get_student_by_principal(
        &self,
        principal: Principal,
        by: Principal,
    ) -> Result<Student, CridError> {
        let table = self.table()?;
        self.require_subject_or_staff(principal, by)?;
        Ok(table.students.get_by_principal(principal)?)
    }

    /// Fetch a student record by institution id. Coordinator-or-Admin.
    pub fn get_student_by_id(&self, id: &StudentId, by: Principal) -> Result<Student, CridError> {
        let table = self.table()?;
        self.require_staff(by)?;
        Ok(table.students.get_by_id(id)?)
    }

    // ─── Courses ─────────────────────────────────────────────────────

    /// Add a course to the catalog. Coordinator-or-Admin; starts active.
    pub fn add_course(&self, spec: CourseSpec, by: Principal) -> Result<(), CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        require_coordinator_or_admin(&self.roles, by)?;
        let _call = self.call_lock.enter()?;

        let id = spec.id;
        table.courses.add(spec)?;
        self.log.record(Notification::CourseAdded { id, by });
        Ok(())
    }

    /// Activate or deactivate a course. Coordinator-or-Admin.
    pub fn set_course_status(
        &self,
        id: CourseId,
        active: bool,
        by: Principal,
    ) -> Result<(), CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        require_coordinator_or_admin(&self.roles, by)?;
        let _call = self.call_lock.enter()?;

        table.courses.set_status(id, active)?;
        self.log
            .record(Notification::CourseStatusChanged { id, active, by });
        Ok(())
    }

    /// Fetch one course. Unrestricted.
    pub fn get_course(&self, id: CourseId) -> Result<Course, CridError> {
        Ok(self.table()?.courses.get(id)?)
    }

    /// All courses, ordered by id. Unrestricted.
    pub fn list_courses(&self) -> Result<Vec<Course>, CridError> {
        Ok(self.table()?.courses.list())
    }

    // ─── Enrollment ──────────────────────────────────────────────────

    /// Submit an enrollment request for the calling student.
    ///
    /// The caller must hold the Student role and be a registered, active
    /// student; the course must exist and be active.
    pub fn request_enrollment(
        &self,
        course_id: CourseId,
        by: Principal,
    ) -> Result<RequestId, CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        require_student(&self.roles, by)?;
        if !table.students.is_active(by) {
            return Err(CridError::UnauthorizedAccess);
        }
        let course = table.courses.get(course_id)?;
        if !course.is_active {
            return Err(CridError::InvalidInput(format!(
                "{course_id} is not accepting enrollment"
            )));
        }
        let _call = self.call_lock.enter()?;

        let id = table.enrollment.create(course_id, by)?;
        self.log.record(Notification::EnrollmentRequested {
            id,
            course_id,
            student: by,
        });
        Ok(id)
    }

    /// Cancel a pending request. Only the owning student may cancel.
    pub fn cancel_enrollment_request(
        &self,
        id: RequestId,
        by: Principal,
    ) -> Result<(), CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        require_student(&self.roles, by)?;
        let _call = self.call_lock.enter()?;

        table.enrollment.cancel(id, by)?;
        self.log.record(Notification::EnrollmentCancelled { id });
        Ok(())
    }

    /// Approve a pending request. Coordinator-or-Admin.
    pub fn approve_enrollment_request(
        &self,
        id: RequestId,
        by: Principal,
    ) -> Result<(), CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        require_coordinator_or_admin(&self.roles, by)?;
        let _call = self.call_lock.enter()?;

        table.enrollment.approve(id)?;
        self.log.record(Notification::EnrollmentApproved { id, by });
        Ok(())
    }

    /// Reject a pending request. Coordinator-or-Admin.
    pub fn reject_enrollment_request(
        &self,
        id: RequestId,
        by: Principal,
    ) -> Result<(), CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        require_coordinator_or_admin(&self.roles, by)?;
        let _call = self.call_lock.enter()?;

        table.enrollment.reject(id)?;
        self.log.record(Notification::EnrollmentRejected { id, by });
        Ok(())
    }

    /// Fetch one request. The owning student or staff.
    pub fn get_enrollment_request(
        &self,
        id: RequestId,
        by: Principal,
    ) -> Result<EnrollmentRequest, CridError> {
        let table = self.table()?;
        let request = table.enrollment.get(id)?;
        self.require_subject_or_staff(request.student, by)?;
        Ok(request)
    }

    /// Ids of every request a student submitted. Subject-or-staff.
    pub fn enrollment_requests_by_student(
        &self,
        student: Principal,
        by: Principal,
    ) -> Result<Vec<RequestId>, CridError> {
        let table = self.table()?;
        self.require_subject_or_staff(student, by)?;
        Ok(table.enrollment.by_student(student))
    }

    /// Ids of every request for a course. Unrestricted.
    pub fn enrollment_requests_by_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<RequestId>, CridError> {
        Ok(self.table()?.enrollment.by_course(course_id))
    }

    /// Total requests ever created. Unrestricted.
    pub fn enrollment_request_count(&self) -> Result<u64, CridError> {
        Ok(self.table()?.enrollment.count())
    }

    // ─── Grades ──────────────────────────────────────────────────────

    /// Record a grade. Coordinator-or-Admin; the student must be
    /// registered and the course must exist. Overwrites any previous value
    /// for the pair under a fresh id.
    pub fn add_grade(
        &self,
        student: Principal,
        course_id: CourseId,
        value: u8,
        by: Principal,
    ) -> Result<GradeId, CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        require_coordinator_or_admin(&self.roles, by)?;
        if !table.students.is_registered(student) {
            return Err(crid_registry::StudentError::StudentNotRegistered(student).into());
        }
        table.courses.get(course_id)?;
        let _call = self.call_lock.enter()?;

        let id = table.grades.add_grade(student, course_id, value)?;
        self.log.record(Notification::GradeAdded {
            id,
            student,
            course_id,
            value,
            by,
        });
        Ok(id)
    }

    /// Remove a grade by id. Coordinator-or-Admin.
    pub fn remove_grade(&self, id: GradeId, by: Principal) -> Result<(), CridError> {
        let table = self.table()?;
        require_not_paused(&self.roles)?;
        require_coordinator_or_admin(&self.roles, by)?;
        let _call = self.call_lock.enter()?;

        let grade = table.grades.remove_grade(id)?;
        self.log.record(Notification::GradeRemoved {
            student: grade.student,
            course_id: grade.course_id,
            by,
        });
        Ok(())
    }

    /// The grade for (student, course). Subject-or-staff.
    pub fn get_grade(
        &self,
        student: Principal,
        course_id: CourseId,
        by: Principal,
    ) -> Result<Grade, CridError> {
        let table = self.table()?;
        self.require_subject_or_staff(student, by)?;
        Ok(table.grades.get_grade(student, course_id)?)
    }

    /// All grades of a student. Subject-or-staff.
    pub fn grades_by_student(
        &self,
        student: Principal,
        by: Principal,
    ) -> Result<Vec<Grade>, CridError> {
        let table = self.table()?;
        self.require_subject_or_staff(student, by)?;
        Ok(table.grades.grades_by_student(student))
    }

    /// All grades in a course. Coordinator-or-Admin.
    pub fn grades_by_course(
        &self,
        course_id: CourseId,
        by: Principal,
    ) -> Result<Vec<Grade>, CridError> {
        let table = self.table()?;
        self.require_staff(by)?;
        Ok(table.grades.grades_by_course(course_id))
    }

    // ─── Status ──────────────────────────────────────────────────────

    /// Point-in-time status snapshot. Unrestricted and callable before
    /// initialization.
    pub fn system_status(&self) -> SystemStatus {
        let state = self.state.read().expect("system state lock poisoned");
        let (total_students, total_requests) = match &state.collaborators {
            Some(table) => (table.students.count(), table.enrollment.count()),
            None => (0, 0),
        };
        SystemStatus {
            initialized: state.collaborators.is_some(),
            paused: self.roles.paused(),
            version: state.version,
            total_students,
            total_requests,
        }
    }
}

impl std::fmt::Debug for Crid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crid")
            .field("initialized", &self.initialized())
            .field("version", &self.version())
            .finish()
    }
}
