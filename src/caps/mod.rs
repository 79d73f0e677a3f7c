//! RGW user capabilities
//!
//! Capabilities grant an RGW user access to admin resources. They are
//! written as `resource=permission` entries:
//! - `buckets=*` - full access to bucket administration
//! - `users=read,write` - read and write access to user administration
//! - `buckets=*,users=read` - several grants at once

mod diff;
mod types;

pub use diff::{compute, compute_add, compute_remove, CapsChange, CapsVerb};
pub use types::{CapPermission, CapResource, CapabilityGrant, CapabilitySet};

use thiserror::Error;

/// Capability parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapsError {
    #[error("capability spec is empty")]
    EmptySpec,

    #[error("malformed capability entry '{0}', expected resource=permission")]
    MalformedEntry(String),

    #[error("unknown capability resource '{0}' (expected users, buckets, metadata, usage or zone)")]
    UnknownResource(String),

    #[error("unknown capability permission '{0}' (expected read, write, read,write or *)")]
    UnknownPermission(String),
}
