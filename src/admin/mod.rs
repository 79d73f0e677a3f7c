//! RGW admin API
//!
//! This module provides the AdminApi trait and the HTTP client that
//! implements it against the RGW `/admin` endpoints.

mod client;
mod types;

pub use client::RgwAdminClient;
pub use types::{BucketInfo, UserCap, UserKey, UserRecord};

use crate::caps::CapabilitySet;
use crate::UserIdentity;
use async_trait::async_trait;
use thiserror::Error;

/// Admin API errors
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("HTTP error: {0}")]
    Http(String),

    /// The gateway rejected the request
    #[error("RGW admin API returned {status}: {code}")]
    Api { status: u16, code: String },

    #[error("Invalid response from RGW: {0}")]
    Decode(String),
}

/// Admin operations used by cephmgr
///
/// Every call is a single round trip. Implementations do not retry.
#[async_trait]
pub trait AdminApi: Send + Sync {
    // ==================== User Operations ====================

    /// Create a user, optionally with initial capabilities
    async fn create_user(
        &self,
        user: &UserIdentity,
        caps: Option<&CapabilitySet>,
    ) -> Result<UserRecord, AdminError>;

    /// Get user information
    async fn get_user(&self, uid: &str) -> Result<UserRecord, AdminError>;

    /// List user IDs
    async fn list_users(&self) -> Result<Vec<String>, AdminError>;

    /// Delete a user
    async fn delete_user(&self, uid: &str) -> Result<(), AdminError>;

    // ==================== Capability Operations ====================

    /// Grant capabilities, returning the resulting capabilities of the user
    async fn add_user_caps(&self, uid: &str, caps: &CapabilitySet)
        -> Result<Vec<UserCap>, AdminError>;

    /// Revoke capabilities, returning the remaining capabilities of the user
    async fn remove_user_caps(
        &self,
        uid: &str,
        caps: &CapabilitySet,
    ) -> Result<Vec<UserCap>, AdminError>;

    // ==================== Bucket Operations ====================

    /// List bucket names
    async fn list_buckets(&self) -> Result<Vec<String>, AdminError>;

    /// Get bucket details
    async fn get_bucket_info(&self, bucket: &str) -> Result<BucketInfo, AdminError>;
}
