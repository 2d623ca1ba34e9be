//! # Key-Manager Secrets Application
//!
//! Consensus logic that governs key-manager runtimes: committee formation
//! at epoch transitions, policy updates and master/ephemeral secret
//! publication.
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | `lookup` | Runtime, RAK and committee REK lookups |
//! | `attestation` | `verify_extra_info` over a node's init response |
//! | `status` | `StatusGenerator`, committee admission and rotation |
//! | `epoch` | `on_epoch_change`, status recomputation for all runtimes |
//! | `txs` | `update_policy`, `publish_master_secret`, `publish_ephemeral_secret` |
//!
//! ## Entry Points
//!
//! [`SecretsApp::execute_tx`] for transactions and
//! [`SecretsApp::on_epoch_change`] for epoch transitions. Both work on a
//! `&mut ChainState` snapshot and record events on the [`Context`].

pub mod attestation;
pub mod epoch;
pub mod lookup;
pub mod status;
pub mod txs;


pub use attestation::verify_extra_info;
pub use epoch::on_epoch_change;
pub use lookup::{key_manager_runtime, runtime_attestation_key, runtime_encryption_keys};
pub use status::{policy_hash, StatusGenerator, MIN_PROPOSAL_REPLICATION_PERCENT};
pub use txs::{publish_ephemeral_secret, publish_master_secret, update_policy};

use serde::{Deserialize, Serialize};
use tracing::debug;

use keyward_common::keymanager::{
    GasOp, Result, SignedEncryptedEphemeralSecret, SignedEncryptedMasterSecret, SignedPolicySgx,
};
use keyward_common::{EpochTime, RuntimeId};

use crate::context::Context;
use crate::state::ChainState;

/// Key-manager transaction payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyManagerTx {
    UpdatePolicy(SignedPolicySgx),
    PublishMasterSecret(SignedEncryptedMasterSecret),
    PublishEphemeralSecret(SignedEncryptedEphemeralSecret),
}

impl KeyManagerTx {
    /// Runtime targeted by the transaction.
    pub fn runtime_id(&self) -> RuntimeId {
        match self {
            KeyManagerTx::UpdatePolicy(p) => p.policy.id,
            KeyManagerTx::PublishMasterSecret(s) => s.secret.id,
            KeyManagerTx::PublishEphemeralSecret(s) => s.secret.id,
        }
    }

    /// Metered operation charged by the transaction.
    pub fn gas_op(&self) -> GasOp {
        match self {
            KeyManagerTx::UpdatePolicy(_) => GasOp::UpdatePolicy,
            KeyManagerTx::PublishMasterSecret(_) => GasOp::PublishMasterSecret,
            KeyManagerTx::PublishEphemeralSecret(_) => GasOp::PublishEphemeralSecret,
        }
    }
}

/// The secrets application. Stateless; all state lives in [`ChainState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretsApp;

impl SecretsApp {
    pub fn new() -> Self {
        SecretsApp
    }

    /// Route `tx` to its handler.
    pub fn execute_tx(&self, ctx: &mut Context, state: &mut ChainState, tx: &KeyManagerTx) -> Result<()> {
        debug!(runtime_id = %tx.runtime_id(), op = %tx.gas_op(), mode = ?ctx.mode(), "executing key manager tx");
        match tx {
            KeyManagerTx::UpdatePolicy(p) => update_policy(ctx, state, p),
            KeyManagerTx::PublishMasterSecret(s) => publish_master_secret(ctx, state, s),
            KeyManagerTx::PublishEphemeralSecret(s) => publish_ephemeral_secret(ctx, state, s),
        }
    }

    /// Recompute every key-manager status for `epoch`.
    pub fn on_epoch_change(&self, ctx: &mut Context, state: &mut ChainState, epoch: EpochTime) -> Result<()> {
        on_epoch_change(ctx, state, epoch)
    }
}
