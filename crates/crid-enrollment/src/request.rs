//! Request record and status enum.

use serde::{Deserialize, Serialize};

use crid_core::{CourseId, Principal, RequestId, Timestamp};

/// The lifecycle status of an enrollment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Submitted and awaiting a decision.
    Pending,
    /// Approved by a coordinator or admin (terminal).
    Approved,
    /// Rejected by a coordinator or admin (terminal).
    Rejected,
    /// Cancelled by the owning student (terminal).
    Cancelled,
}

impl RequestStatus {
    /// Whether this status permits no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// An enrollment request record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    /// Sequence id, assigned at creation, never reused.
    pub id: RequestId,
    /// The owning student.
    pub student: Principal,
    /// The requested course.
    pub course_id: CourseId,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// Creation timestamp; immutable.
    pub request_date: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_is_non_terminal() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(RequestStatus::Pending.to_string(), "PENDING");
        assert_eq!(RequestStatus::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn test_request_serde_roundtrip() {
        let request = EnrollmentRequest {
            id: RequestId(1),
            student: Principal::new(),
            course_id: CourseId(7),
            status: RequestStatus::Pending,
            request_date: Timestamp::parse("2026-03-10T09:00:00Z").unwrap(),
        };
        let json = serde_json::to_string(&request).unwrap();
        let parsed: EnrollmentRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request, parsed);
    }
}
