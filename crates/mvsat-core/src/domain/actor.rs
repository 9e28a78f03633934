//! Actor credentials and permission snapshots.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier/secret pair of the signed-in employee or owner.
///
/// Opaque to this crate: the only question asked of it is whether both halves
/// are present.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorCredential {
    pub identifier: String,
    pub secret: String,
}

impl ActorCredential {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Both identifier and secret are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.identifier.trim().is_empty() && !self.secret.is_empty()
    }
}

impl fmt::Debug for ActorCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCredential")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Key of a capability (one feature area of the admin app).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityKey(String);

impl CapabilityKey {
    pub const CLIENTS: &'static str = "clients";
    pub const EQUIPMENT: &'static str = "equipment";
    pub const SUBSCRIPTIONS: &'static str = "subscriptions";
    pub const BILLING: &'static str = "billing";
    pub const TV_BOXES: &'static str = "tv_boxes";
    pub const EMPLOYEES: &'static str = "employees";
    pub const AUDIT_LOGS: &'static str = "audit_logs";

    /// Every feature area of the app, in menu order.
    pub const ALL: [&'static str; 7] = [
        Self::CLIENTS,
        Self::EQUIPMENT,
        Self::SUBSCRIPTIONS,
        Self::BILLING,
        Self::TV_BOXES,
        Self::EMPLOYEES,
        Self::AUDIT_LOGS,
    ];

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn all() -> BTreeSet<CapabilityKey> {
        Self::ALL.iter().map(|k| CapabilityKey::new(*k)).collect()
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CapabilityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CapabilityKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Capabilities granted to the current actor, as last computed by the auth
/// collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    pub granted: BTreeSet<CapabilityKey>,
}

impl PermissionSnapshot {
    pub fn new(granted: impl IntoIterator<Item = CapabilityKey>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }

    /// Snapshot of an actor with no capabilities (signed out).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn allows(&self, key: &str) -> bool {
        self.granted.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}
