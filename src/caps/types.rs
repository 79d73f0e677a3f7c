//! Capability grammar types
//!
//! Provides:
//! - CapResource for the RGW admin resource types
//! - CapPermission for the permission levels
//! - CapabilitySet, the normalized resource -> permission map

use super::CapsError;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Admin resource types a capability can be granted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapResource {
    /// User administration
    Users,
    /// Bucket administration
    Buckets,
    /// Metadata log and metadata operations
    Metadata,
    /// Usage logs
    Usage,
    /// Zone configuration
    Zone,
}

impl CapResource {
    /// Parse a resource type from string
    pub fn parse(s: &str) -> Option<CapResource> {
        match s.trim().to_lowercase().as_str() {
            "users" => Some(CapResource::Users),
            "buckets" => Some(CapResource::Buckets),
            "metadata" => Some(CapResource::Metadata),
            "usage" => Some(CapResource::Usage),
            "zone" => Some(CapResource::Zone),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapResource::Users => "users",
            CapResource::Buckets => "buckets",
            CapResource::Metadata => "metadata",
            CapResource::Usage => "usage",
            CapResource::Zone => "zone",
        }
    }
}

impl std::fmt::Display for CapResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission level of a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapPermission {
    Read,
    Write,
    /// Both read and write, written `read,write`
    ReadWrite,
    /// Full access, written `*`
    All,
}

impl CapPermission {
    /// Parse a permission value.
    ///
    /// Accepts `read`, `write`, `*` and `read,write` in either order
    /// (`write, read` is `read,write`). Repeated tokens are rejected.
    pub fn parse(s: &str) -> Option<CapPermission> {
        let s = s.trim();
        if s == "*" {
            return Some(CapPermission::All);
        }

        let mut read = false;
        let mut write = false;
        for part in s.split(',') {
            match part.trim().to_lowercase().as_str() {
                "read" if !read => read = true,
                "write" if !write => write = true,
                _ => return None,
            }
        }

        match (read, write) {
            (true, true) => Some(CapPermission::ReadWrite),
            (true, false) => Some(CapPermission::Read),
            (false, true) => Some(CapPermission::Write),
            (false, false) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapPermission::Read => "read",
            CapPermission::Write => "write",
            CapPermission::ReadWrite => "read,write",
            CapPermission::All => "*",
        }
    }
}

impl std::fmt::Display for CapPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `resource=permission` grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityGrant {
    pub resource: CapResource,
    pub permission: CapPermission,
}

impl CapabilityGrant {
    pub fn new(resource: CapResource, permission: CapPermission) -> Self {
        Self {
            resource,
            permission,
        }
    }
}

impl std::fmt::Display for CapabilityGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.resource, self.permission)
    }
}

/// A normalized set of capability grants, at most one per resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    grants: BTreeMap<CapResource, CapPermission>,
}

impl CapabilitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a capability spec such as `buckets=*,users=read`.
    ///
    /// Entries are separated by `,` or `;`. A comma-separated fragment
    /// without `=` continues the permission of the entry before it, so
    /// `users=read,write` is one entry. Duplicate resources keep the last
    /// permission given.
    pub fn parse(spec: &str) -> Result<Self, CapsError> {
        let mut entries: Vec<(String, String)> = Vec::new();

        for group in spec.split(';') {
            // Continuations never cross a `;`
            let mut open = false;
            let fragments: Vec<&str> = group.split(',').map(str::trim).collect();
            let first = fragments.iter().position(|f| !f.is_empty());
            let last = fragments.iter().rposition(|f| !f.is_empty());

            for (index, fragment) in fragments.iter().copied().enumerate() {
                if fragment.is_empty() {
                    // Only leading and trailing commas are tolerated
                    if let (Some(first), Some(last)) = (first, last) {
                        if first < index && index < last {
                            return Err(CapsError::MalformedEntry(group.trim().to_string()));
                        }
                    }
                    continue;
                }

                match fragment.split_once('=') {
                    Some((_, permission)) if permission.contains('=') => {
                        return Err(CapsError::MalformedEntry(fragment.to_string()));
                    }
                    Some((resource, permission)) => {
                        entries.push((resource.trim().to_string(), permission.trim().to_string()));
                        open = true;
                    }
                    None => match entries.last_mut() {
                        Some((_, permission)) if open => {
                            permission.push(',');
                            permission.push_str(fragment);
                        }
                        _ => return Err(CapsError::MalformedEntry(fragment.to_string())),
                    },
                }
            }
        }

        if entries.is_empty() {
            return Err(CapsError::EmptySpec);
        }

        let mut set = Self::new();
        for (resource, permission) in entries {
            let resource =
                CapResource::parse(&resource).ok_or(CapsError::UnknownResource(resource))?;
            let permission = CapPermission::parse(&permission)
                .ok_or(CapsError::UnknownPermission(permission))?;
            set.insert(CapabilityGrant::new(resource, permission));
        }

        Ok(set)
    }

    /// Insert a grant, returning the permission it replaced
    pub fn insert(&mut self, grant: CapabilityGrant) -> Option<CapPermission> {
        self.grants.insert(grant.resource, grant.permission)
    }

    pub fn get(&self, resource: CapResource) -> Option<CapPermission> {
        self.grants.get(&resource).copied()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Iterate grants in resource order
    pub fn iter(&self) -> impl Iterator<Item = CapabilityGrant> + '_ {
        self.grants
            .iter()
            .map(|(resource, permission)| CapabilityGrant::new(*resource, *permission))
    }

    /// Join the grants with `separator`
    pub fn join(&self, separator: &str) -> String {
        self.iter()
            .map(|grant| grant.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Serialize back to the `resource=permission[,resource=permission...]` form
    pub fn to_spec(&self) -> String {
        self.join(",")
    }
}

impl std::fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_spec())
    }
}

impl FromStr for CapabilitySet {
    type Err = CapsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromIterator<CapabilityGrant> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = CapabilityGrant>>(iter: I) -> Self {
        let mut set = Self::new();
        for grant in iter {
            set.insert(grant);
        }
        set
    }
}
