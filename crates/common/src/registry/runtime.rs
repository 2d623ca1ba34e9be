//! Runtime registration records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tee::{EnclaveIdentity, TeeHardware};
use crate::types::{PublicKey, RuntimeId};

/// Runtime kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeKind {
    Compute,
    KeyManager,
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeKind::Compute => write!(f, "compute"),
            RuntimeKind::KeyManager => write!(f, "keymanager"),
        }
    }
}

/// Runtime version, compared as a single ordered integer triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl Version {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One deployed version of a runtime and the enclaves allowed to run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: Version,
    pub enclaves: Vec<EnclaveIdentity>,
}

/// Registered runtime.
///
/// Registrations are permanent; nothing in this workspace removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runtime {
    pub id: RuntimeId,
    /// Owner entity. Only the owner may replace a key manager's policy.
    pub entity_id: PublicKey,
    pub kind: RuntimeKind,
    pub tee_hardware: TeeHardware,
    pub deployments: Vec<VersionInfo>,
}

impl Runtime {
    pub fn is_key_manager(&self) -> bool {
        self.kind == RuntimeKind::KeyManager
    }

    /// Deployment entry for `version`, if any.
    pub fn deployment(&self, version: &Version) -> Option<&VersionInfo> {
        self.deployments.iter().find(|d| d.version == *version)
    }
}
