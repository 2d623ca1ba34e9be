//! # Key Manager Status
//!
//! Authoritative consensus view of one key-manager runtime.
//!
//! ## Sticky Fields
//!
//! `is_initialized` and `is_secure` are fixed by the first node ever
//! admitted to the committee. [`InitState`] makes that transition explicit:
//!
//! ```text
//! Uninitialized ──observe(is_secure)──▶ Initialized { is_secure }
//! Initialized { s } ──observe(s)──▶ Initialized { s }
//! Initialized { s } ──observe(!s)──▶ Err(mismatch)
//! ```
//!
//! ## Rotation Fields
//!
//! `generation`, `rotation_epoch`, `checksum` and `rsk` change together,
//! and only when a master secret proposal is accepted.

use serde::{Deserialize, Serialize};

use super::error::{KeyManagerError, Result};
use super::policy::SignedPolicySgx;
use crate::types::{EpochTime, PublicKey, RuntimeId};

// ════════════════════════════════════════════════════════════════════════════════
// INIT STATE
// ════════════════════════════════════════════════════════════════════════════════

/// Initialization state machine of a key manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initialized { is_secure: bool },
}

/// Returned when an observation disagrees with the captured security flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityMismatch {
    pub expected: bool,
    pub actual: bool,
}

impl InitState {
    pub fn is_initialized(&self) -> bool {
        matches!(self, InitState::Initialized { .. })
    }

    /// `is_secure` of an initialized state; `false` before initialization.
    pub fn is_secure(&self) -> bool {
        match self {
            InitState::Initialized { is_secure } => *is_secure,
            InitState::Uninitialized => false,
        }
    }

    /// Observe a node's reported security flag.
    ///
    /// The first observation initializes the state; every later one must
    /// agree with it.
    pub fn observe(&mut self, is_secure: bool) -> std::result::Result<(), SecurityMismatch> {
        match *self {
            InitState::Uninitialized => {
                *self = InitState::Initialized { is_secure };
                Ok(())
            }
            InitState::Initialized { is_secure: expected } if expected == is_secure => Ok(()),
            InitState::Initialized { is_secure: expected } => {
                Err(SecurityMismatch { expected, actual: is_secure })
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// STATUS
// ════════════════════════════════════════════════════════════════════════════════

/// Current status of a key-manager runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: RuntimeId,
    pub is_initialized: bool,
    pub is_secure: bool,
    /// Generation of the latest accepted master secret.
    pub generation: u64,
    /// Epoch of the latest accepted rotation.
    pub rotation_epoch: EpochTime,
    /// Checksum over all master secrets accepted so far. Empty before the
    /// first one.
    pub checksum: Vec<u8>,
    pub policy: Option<SignedPolicySgx>,
    /// Runtime signing key derived by the committee.
    pub rsk: Option<PublicKey>,
    /// Committee, in node-identity order.
    pub nodes: Vec<PublicKey>,
}

impl Status {
    /// Empty status of a never-before-seen key manager.
    pub fn new(id: RuntimeId) -> Self {
        Status {
            id,
            is_initialized: false,
            is_secure: false,
            generation: 0,
            rotation_epoch: 0,
            checksum: Vec::new(),
            policy: None,
            rsk: None,
            nodes: Vec::new(),
        }
    }

    pub fn init_state(&self) -> InitState {
        if self.is_initialized {
            InitState::Initialized { is_secure: self.is_secure }
        } else {
            InitState::Uninitialized
        }
    }

    /// Store an init state back into the sticky fields.
    ///
    /// Once initialized, the sticky fields are left untouched.
    pub fn apply_init_state(&mut self, state: InitState) {
        if self.is_initialized {
            return;
        }
        if let InitState::Initialized { is_secure } = state {
            self.is_initialized = true;
            self.is_secure = is_secure;
        }
    }

    /// Generation the next master secret proposal must target.
    pub fn next_generation(&self) -> Result<u64> {
        self.generation.checked_add(1).ok_or_else(|| {
            KeyManagerError::StateCorruption(format!(
                "key manager {} master secret generation overflow",
                self.id
            ))
        })
    }

    /// True once a master secret has been accepted.
    pub fn has_master_secret(&self) -> bool {
        !self.checksum.is_empty()
    }

    pub fn has_committee_member(&self, id: &PublicKey) -> bool {
        self.nodes.contains(id)
    }

    /// Check whether a master secret may rotate at `epoch`.
    ///
    /// The first master secret may always be proposed. Later rotations need
    /// a policy with a non-zero rotation interval, and at least that many
    /// epochs since the last rotation.
    pub fn verify_rotation_epoch(&self, epoch: EpochTime) -> Result<()> {
        if !self.has_master_secret() {
            return Ok(());
        }

        let interval = match &self.policy {
            Some(p) => p.policy.master_secret_rotation_interval,
            None => {
                return Err(KeyManagerError::RotationNotAllowed(
                    "master secret rotation disabled: no policy".to_string(),
                ))
            }
        };
        if interval == 0 {
            return Err(KeyManagerError::RotationNotAllowed(
                "master secret rotation disabled".to_string(),
            ));
        }
        if epoch < self.rotation_epoch.saturating_add(interval) {
            return Err(KeyManagerError::RotationNotAllowed(format!(
                "rotation interval has not yet expired (last {}, interval {}, epoch {})",
                self.rotation_epoch, interval, epoch
            )));
        }
        Ok(())
    }
}
