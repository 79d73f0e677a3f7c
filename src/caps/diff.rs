//! Grant and revoke submissions
//!
//! RGW treats capability add and remove as idempotent operations keyed by
//! resource and permission, so the current set of a user is never fetched.
//! A change is the validated requested set, serialized for the admin API.
//! The API splits `user-caps` entries on `;`, so that is the separator
//! used on the wire.

use super::{CapabilitySet, CapsError};

/// Direction of a capability change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapsVerb {
    /// Grant the listed capabilities
    Add,
    /// Revoke the listed capabilities
    Remove,
}

impl std::fmt::Display for CapsVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapsVerb::Add => write!(f, "add"),
            CapsVerb::Remove => write!(f, "remove"),
        }
    }
}

/// A validated capability change, ready to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapsChange {
    pub verb: CapsVerb,
    pub requested: CapabilitySet,
}

impl CapsChange {
    /// Validate `spec` through the grammar
    pub fn parse(verb: CapsVerb, spec: &str) -> Result<Self, CapsError> {
        Ok(Self {
            verb,
            requested: CapabilitySet::parse(spec)?,
        })
    }
}

/// Serialize `requested` for submission. Both verbs submit the same set.
pub fn compute(_verb: CapsVerb, requested: &CapabilitySet) -> String {
    requested.join(";")
}

/// Serialized spec for granting `requested`
pub fn compute_add(requested: &CapabilitySet) -> String {
    compute(CapsVerb::Add, requested)
}

/// Serialized spec for revoking `requested`
pub fn compute_remove(requested: &CapabilitySet) -> String {
    compute(CapsVerb::Remove, requested)
}
