//! Response types of the RGW admin API

use crate::Secret;
use serde::{Deserialize, Serialize};

/// A user as returned by `/admin/user`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "user_id", default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub suspended: u8,
    #[serde(default)]
    pub max_buckets: i64,
    #[serde(default)]
    pub keys: Vec<UserKey>,
    #[serde(default)]
    pub caps: Vec<UserCap>,
}

impl UserRecord {
    /// Capabilities joined for display, `-` when there are none
    pub fn caps_summary(&self) -> String {
        if self.caps.is_empty() {
            return "-".to_string();
        }
        self.caps
            .iter()
            .map(|cap| cap.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// S3 key pair of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserKey {
    #[serde(default)]
    pub user: String,
    pub access_key: String,
    pub secret_key: Secret,
}

/// One capability of a user as reported by RGW
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCap {
    #[serde(rename = "type")]
    pub cap_type: String,
    pub perm: String,
}

impl std::fmt::Display for UserCap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.cap_type, self.perm)
    }
}

/// Bucket details as returned by `/admin/bucket?bucket=...`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketInfo {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub zonegroup: String,
    #[serde(default)]
    pub placement_rule: String,
}
