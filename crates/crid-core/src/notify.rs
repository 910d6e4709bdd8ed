//! # System Notification Log
//!
//! Every externally visible state change is recorded as a [`Notification`]
//! in a capacity-bounded, append-only [`NotificationLog`] and mirrored to
//! `tracing` for structured observability.
//!
//! The log is an observability surface only: core logic never reads it back
//! to make decisions. When the trail exceeds its configured maximum, the
//! oldest 10% of entries are trimmed; deployments that need the full history
//! should drain to durable storage before trimming.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::identity::{CourseId, GradeId, Principal, RequestId, StudentId};
use crate::temporal::Timestamp;

// ─── Notification ────────────────────────────────────────────────────

/// A wire-visible notification emitted by the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A role was granted to a principal.
    RoleGranted {
        /// Name of the granted role.
        role: String,
        /// The principal receiving the role.
        principal: Principal,
        /// The admin who granted it.
        by: Principal,
    },
    /// A role was revoked from a principal.
    RoleRevoked {
        /// Name of the revoked role.
        role: String,
        /// The principal losing the role.
        principal: Principal,
        /// The admin who revoked it.
        by: Principal,
    },
    /// The global halt flag changed.
    HaltChanged {
        /// The new value of the flag.
        paused: bool,
        /// The admin who flipped it.
        by: Principal,
    },
    /// The orchestrator completed one-time initialization.
    SystemInitialized {
        /// The admin who initialized the system.
        by: Principal,
    },
    /// A collaborator slot was hot-swapped.
    CollaboratorUpdated {
        /// Logical name of the swapped slot.
        name: String,
        /// The admin who performed the swap.
        by: Principal,
    },
    /// The system version counter was incremented.
    SystemUpgraded {
        /// The new version.
        version: u64,
        /// The admin who upgraded.
        by: Principal,
    },
    /// A student registered a profile.
    StudentRegistered {
        /// Institution identifier of the student.
        id: StudentId,
        /// The registering principal.
        principal: Principal,
    },
    /// A student's active flag changed.
    StudentStatusChanged {
        /// Institution identifier of the student.
        id: StudentId,
        /// The new active flag.
        active: bool,
        /// The admin who changed it.
        by: Principal,
    },
    /// A course was added to the catalog.
    CourseAdded {
        /// The new course.
        id: CourseId,
        /// The coordinator or admin who added it.
        by: Principal,
    },
    /// A course's active flag changed.
    CourseStatusChanged {
        /// The course.
        id: CourseId,
        /// The new active flag.
        active: bool,
        /// The coordinator or admin who changed it.
        by: Principal,
    },
    /// An enrollment request was submitted.
    EnrollmentRequested {
        /// The assigned request id.
        id: RequestId,
        /// The requested course.
        course_id: CourseId,
        /// The requesting student.
        student: Principal,
    },
    /// An enrollment request was cancelled by its owner.
    EnrollmentCancelled {
        /// The cancelled request.
        id: RequestId,
    },
    /// An enrollment request was approved.
    EnrollmentApproved {
        /// The approved request.
        id: RequestId,
        /// The coordinator or admin who approved it.
        by: Principal,
    },
    /// An enrollment request was rejected.
    EnrollmentRejected {
        /// The rejected request.
        id: RequestId,
        /// The coordinator or admin who rejected it.
        by: Principal,
    },
    /// A grade was recorded.
    GradeAdded {
        /// The assigned grade id.
        id: GradeId,
        /// The graded student.
        student: Principal,
        /// The graded course.
        course_id: CourseId,
        /// The grade value (0–100).
        value: u8,
        /// The coordinator or admin who recorded it.
        by: Principal,
    },
    /// A grade was removed.
    GradeRemoved {
        /// The removed student's principal.
        student: Principal,
        /// The course the grade belonged to.
        course_id: CourseId,
        /// The coordinator or admin who removed it.
        by: Principal,
    },
}

impl Notification {
    /// Stable snake_case label for this notification kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoleGranted { .. } => "role_granted",
            Self::RoleRevoked { .. } => "role_revoked",
            Self::HaltChanged { .. } => "halt_changed",
            Self::SystemInitialized { .. } => "system_initialized",
            Self::CollaboratorUpdated { .. } => "collaborator_updated",
            Self::SystemUpgraded { .. } => "system_upgraded",
            Self::StudentRegistered { .. } => "student_registered",
            Self::StudentStatusChanged { .. } => "student_status_changed",
            Self::CourseAdded { .. } => "course_added",
            Self::CourseStatusChanged { .. } => "course_status_changed",
            Self::EnrollmentRequested { .. } => "enrollment_requested",
            Self::EnrollmentCancelled { .. } => "enrollment_cancelled",
            Self::EnrollmentApproved { .. } => "enrollment_approved",
            Self::EnrollmentRejected { .. } => "enrollment_rejected",
            Self::GradeAdded { .. } => "grade_added",
            Self::GradeRemoved { .. } => "grade_removed",
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

// ─── Recorded entry ──────────────────────────────────────────────────

/// A notification with the instant it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// The notification payload.
    pub notification: Notification,
    /// When it was recorded.
    pub recorded_at: Timestamp,
}

// ─── NotificationLog ─────────────────────────────────────────────────

/// Default maximum number of retained notifications.
pub const DEFAULT_LOG_CAPACITY: usize = 4096;

/// A shared, capacity-bounded, append-only notification trail.
///
/// The handle is cheap to clone; all clones record into the same trail.
/// When the trail exceeds its maximum capacity, the oldest 10% of entries
/// are trimmed.
#[derive(Clone)]
pub struct NotificationLog {
    inner: Arc<Mutex<LogInner>>,
}

struct LogInner {
    entries: Vec<NotificationRecord>,
    max_entries: usize,
}

impl NotificationLog {
    /// Create a log with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// Create a log with the given maximum capacity.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogInner {
                entries: Vec::new(),
                max_entries: max_entries.max(1),
            })),
        }
    }

    /// Record a notification, mirroring it to `tracing`.
    pub fn record(&self, notification: Notification) {
        tracing::info!(kind = notification.kind(), "crid notification");
        let mut inner = self.inner.lock().expect("notification log lock poisoned");
        inner.entries.push(NotificationRecord {
            notification,
            recorded_at: Timestamp::now(),
        });
        if inner.entries.len() > inner.max_entries {
            let trim_count = (inner.max_entries / 10).max(1);
            inner.entries.drain(..trim_count);
        }
    }

    /// A snapshot of all retained records, oldest first.
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.inner
            .lock()
            .expect("notification log lock poisoned")
            .entries
            .clone()
    }

    /// A snapshot of retained notifications matching the given kind label.
    pub fn of_kind(&self, kind: &str) -> Vec<Notification> {
        self.inner
            .lock()
            .expect("notification log lock poisoned")
            .entries
            .iter()
            .filter(|r| r.notification.kind() == kind)
            .map(|r| r.notification.clone())
            .collect()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("notification log lock poisoned")
            .entries
            .len()
    }

    /// Whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NotificationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationLog")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halt(paused: bool) -> Notification {
        Notification::HaltChanged {
            paused,
            by: Principal::nil(),
        }
    }

    #[test]
    fn test_record_and_snapshot() {
        let log = NotificationLog::new();
        assert!(log.is_empty());
        log.record(halt(true));
        log.record(halt(false));
        let snap = log.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].notification, halt(true));
        assert_eq!(snap[1].notification, halt(false));
    }

    #[test]
    fn test_clones_share_the_trail() {
        let log = NotificationLog::new();
        let other = log.clone();
        other.record(halt(true));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_of_kind_filters() {
        let log = NotificationLog::new();
        log.record(halt(true));
        log.record(Notification::SystemUpgraded {
            version: 2,
            by: Principal::new(),
        });
        assert_eq!(log.of_kind("halt_changed").len(), 1);
        assert_eq!(log.of_kind("system_upgraded").len(), 1);
        assert!(log.of_kind("role_granted").is_empty());
    }

    #[test]
    fn test_capacity_trims_oldest() {
        let log = NotificationLog::with_capacity(10);
        for i in 0..11 {
            log.record(Notification::SystemUpgraded {
                version: i,
                by: Principal::nil(),
            });
        }
        // One trim of 10% (1 entry) fires when the 11th is appended.
        assert_eq!(log.len(), 10);
        let first = &log.snapshot()[0].notification;
        assert_eq!(
            *first,
            Notification::SystemUpgraded {
                version: 1,
                by: Principal::nil()
            }
        );
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(halt(true).kind(), "halt_changed");
        assert_eq!(
            Notification::EnrollmentRequested {
                id: RequestId(1),
                course_id: CourseId(1),
                student: Principal::nil(),
            }
            .kind(),
            "enrollment_requested"
        );
    }

    #[test]
    fn test_notification_serde_roundtrip() {
        let n = Notification::RoleGranted {
            role: "coordinator".to_string(),
            principal: Principal::new(),
            by: Principal::new(),
        };
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"kind\":\"role_granted\""));
        let parsed: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(n, parsed);
    }
}
