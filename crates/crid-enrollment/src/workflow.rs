//! # Enrollment Workflow
//!
//! The ledger of enrollment requests and its transitions. Creation assigns
//! the next id in a global sequence starting at 1; the (student, course)
//! pending index rejects a second open request for the same pair.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use thiserror::Error;

use crid_core::{CourseId, Principal, RequestId, Timestamp};

use crate::request::{EnrollmentRequest, RequestStatus};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors signalled by the enrollment ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// No request with the given id was ever created.
    #[error("{0} does not exist")]
    RequestDoesNotExist(RequestId),

    /// The request has already reached a terminal status.
    #[error("{0} is not pending")]
    RequestNotPending(RequestId),

    /// The student already has a pending request for this course.
    #[error("already requested enrollment in {0}")]
    AlreadyRequested(CourseId),

    /// Cancellation attempted by a principal other than the owner.
    #[error("{0} does not own the request")]
    NotRequestOwner(Principal),

    /// A request argument is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

// ─── Trait ───────────────────────────────────────────────────────────

/// The enrollment-request operations the orchestrator calls.
pub trait EnrollmentLedger: Send + Sync {
    /// Submit a request for `student` in `course_id`; returns the new id.
    fn create(&self, course_id: CourseId, student: Principal) -> Result<RequestId, WorkflowError>;

    /// Cancel a pending request. Only the owning student may cancel.
    fn cancel(&self, id: RequestId, student: Principal) -> Result<(), WorkflowError>;

    /// Approve a pending request.
    fn approve(&self, id: RequestId) -> Result<(), WorkflowError>;

    /// Reject a pending request.
    fn reject(&self, id: RequestId) -> Result<(), WorkflowError>;

    /// Fetch the request with `id`.
    fn get(&self, id: RequestId) -> Result<EnrollmentRequest, WorkflowError>;

    /// Ids of every request a student ever submitted, in creation order.
    fn by_student(&self, student: Principal) -> Vec<RequestId>;

    /// Ids of every request ever submitted for a course, in creation order.
    fn by_course(&self, course_id: CourseId) -> Vec<RequestId>;

    /// Total number of requests ever created.
    fn count(&self) -> u64;

    /// Liveness probe run before the orchestrator accepts this handle.
    fn is_live(&self) -> bool {
        true
    }
}

// ─── Reference implementation ────────────────────────────────────────

/// In-memory enrollment ledger.
pub struct EnrollmentWorkflow {
    inner: RwLock<LedgerInner>,
}

struct LedgerInner {
    requests: HashMap<RequestId, EnrollmentRequest>,
    pending: HashSet<(Principal, CourseId)>,
    by_student: HashMap<Principal, Vec<RequestId>>,
    by_course: HashMap<CourseId, Vec<RequestId>>,
    next_id: u64,
}

impl EnrollmentWorkflow {
    /// Create an empty ledger; ids start at 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerInner {
                requests: HashMap::new(),
                pending: HashSet::new(),
                by_student: HashMap::new(),
                by_course: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Move a pending request to `target`, clearing the pending index.
    fn settle(&self, id: RequestId, target: RequestStatus) -> Result<(), WorkflowError> {
        let mut ledger = self.inner.write().expect("enrollment ledger lock poisoned");
        let request = ledger
            .requests
            .get(&id)
            .ok_or(WorkflowError::RequestDoesNotExist(id))?;
        if request.status != RequestStatus::Pending {
            return Err(WorkflowError::RequestNotPending(id));
        }
        let pair = (request.student, request.course_id);
        ledger.pending.remove(&pair);
        if let Some(request) = ledger.requests.get_mut(&id) {
            request.status = target;
        }
        Ok(())
    }
}

impl Default for EnrollmentWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrollmentLedger for EnrollmentWorkflow {
    fn create(&self, course_id: CourseId, student: Principal) -> Result<RequestId, WorkflowError> {
        if student.is_nil() {
            return Err(WorkflowError::InvalidInput(
                "nil student principal".to_string(),
            ));
        }

        let mut ledger = self.inner.write().expect("enrollment ledger lock poisoned");
        if ledger.pending.contains(&(student, course_id)) {
            return Err(WorkflowError::AlreadyRequested(course_id));
        }

        let id = RequestId(ledger.next_id);
        ledger.next_id += 1;
        ledger.requests.insert(
            id,
            EnrollmentRequest {
                id,
                student,
                course_id,
                status: RequestStatus::Pending,
                request_date: Timestamp::now(),
            },
        );
        ledger.pending.insert((student, course_id));
        ledger.by_student.entry(student).or_default().push(id);
        ledger.by_course.entry(course_id).or_default().push(id);
        Ok(id)
    }

    fn cancel(&self, id: RequestId, student: Principal) -> Result<(), WorkflowError> {
        {
            let ledger = self.inner.read().expect("enrollment ledger lock poisoned");
            let request = ledger
                .requests
                .get(&id)
                .ok_or(WorkflowError::RequestDoesNotExist(id))?;
            if request.student != student {
                return Err(WorkflowError::NotRequestOwner(student));
            }
        }
        self.settle(id, RequestStatus::Cancelled)
    }

    fn approve(&self, id: RequestId) -> Result<(), WorkflowError> {
        self.settle(id, RequestStatus::Approved)
    }

    fn reject(&self, id: RequestId) -> Result<(), WorkflowError> {
        self.settle(id, RequestStatus::Rejected)
    }

    fn get(&self, id: RequestId) -> Result<EnrollmentRequest, WorkflowError> {
        self.inner
            .read()
            .expect("enrollment ledger lock poisoned")
            .requests
            .get(&id)
            .cloned()
            .ok_or(WorkflowError::RequestDoesNotExist(id))
    }

    fn by_student(&self, student: Principal) -> Vec<RequestId> {
        self.inner
            .read()
            .expect("enrollment ledger lock poisoned")
            .by_student
            .get(&student)
            .cloned()
            .unwrap_or_default()
    }

    fn by_course(&self, course_id: CourseId) -> Vec<RequestId> {
        self.inner
            .read()
            .expect("enrollment ledger lock poisoned")
            .by_course
            .get(&course_id)
            .cloned()
            .unwrap_or_default()
    }

    fn count(&self) -> u64 {
        self.inner
            .read()
            .expect("enrollment ledger lock poisoned")
            .requests
            .len() as u64
    }
}
