//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the CRID Stack. These
//! prevent accidental identifier confusion — you cannot pass a `CourseId`
//! where a `RequestId` is expected.
//!
//! ## Security Invariant
//!
//! `Principal` carries a distinguished nil value standing in for "no
//! identity". It exists only so the guard layer can reject it by name; no
//! valid role assignment, registration, or request ever holds a nil
//! principal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque acting identity (an address-equivalent value).
///
/// Authenticity is assumed to be established by the calling context; the
/// stack only decides what the principal is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(pub Uuid);

impl Principal {
    /// Generate a new random principal.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil principal — the "zero address" of the system.
    ///
    /// Guards reject it with `InvalidAddress`; it is never a valid actor
    /// or subject.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the nil principal.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::new()
    }
}

/// Institution-assigned student identifier (e.g. a matriculation number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl StudentId {
    /// Wrap a raw identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (rejected at registration).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Catalog-assigned course identifier. Zero is not a valid course id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(pub u64);

/// Sequence identifier of an enrollment request.
///
/// Assigned strictly in submission order starting at 1; never reused, even
/// after a request reaches a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Sequence identifier of a recorded grade, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GradeId(pub u64);

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "principal:{}", self.0)
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "student:{}", self.0)
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "course:{}", self.0)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "request:{}", self.0)
    }
}

impl std::fmt::Display for GradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "grade:{}", self.0)
    }
}
