//! # Key-Manager Transactions
//!
//! Every handler runs the same phases:
//!
//! ```text
//! validate ──▶ [CheckOnly: return] ──▶ charge gas ──▶ [Simulate: return] ──▶ commit + event
//! ```
//!
//! Validation is identical in all modes. Nothing is written before the
//! commit phase, so a failing transaction leaves state untouched.
//!
//! ## Master vs Ephemeral Secrets
//!
//! A master secret proposal targets the next generation and the next epoch.
//! It may be replaced by a later proposal and takes effect only once the
//! committee replicates it at an epoch transition. An ephemeral secret is
//! published at most once per epoch and is never overwritten within it.

use tracing::error;

use keyward_common::keymanager::{
    sanity_check_signed_policy, EphemeralSecretPublishedEvent, Event, GasOp, KeyManagerError,
    MasterSecretPublishedEvent, Result, SignedEncryptedEphemeralSecret,
    SignedEncryptedMasterSecret, SignedPolicySgx, Status, StatusUpdateEvent,
};
use keyward_common::registry::sort_node_list;
use keyward_common::{EpochTime, RuntimeId};

use super::lookup::{key_manager_runtime, runtime_attestation_key, runtime_encryption_keys};
use super::status::StatusGenerator;
use crate::context::Context;
use crate::state::ChainState;

/// Charge one unit of `op`.
fn charge(ctx: &mut Context, state: &ChainState, op: GasOp) -> Result<()> {
    let costs = &state.keymanager.consensus_parameters().gas_costs;
    ctx.gas_mut().use_gas(1, op, costs)
}

/// Epoch a published secret must target.
fn target_epoch(ctx: &Context) -> Result<EpochTime> {
    ctx.current_epoch()
        .checked_add(1)
        .ok_or_else(|| KeyManagerError::verification("epoch overflow"))
}

/// Existing status of `id`; publication requires one.
fn committee_status(state: &ChainState, id: &RuntimeId) -> Result<Status> {
    state
        .keymanager
        .status(id)?
        .ok_or_else(|| KeyManagerError::not_found("status", id))
}

// ════════════════════════════════════════════════════════════════════════════
// UPDATE POLICY
// ════════════════════════════════════════════════════════════════════════════

/// Replace the policy of a key manager. Owner only.
///
/// On commit the status is recomputed right away with the new policy, so
/// nodes still running the old policy leave the committee immediately.
pub fn update_policy(ctx: &mut Context, state: &mut ChainState, signed: &SignedPolicySgx) -> Result<()> {
    let rt = key_manager_runtime(&state.registry, &signed.policy.id)?;

    let signer = ctx.tx_signer()?;
    if rt.entity_id != signer {
        return Err(KeyManagerError::Unauthorized(format!(
            "invalid update signer {} for runtime {}",
            signer, rt.id
        )));
    }

    let mut status = state.keymanager.status(&rt.id)?.unwrap_or_else(|| Status::new(rt.id));
    sanity_check_signed_policy(status.policy.as_ref(), signed)?;

    if ctx.is_check_only() {
        return Ok(());
    }
    charge(ctx, state, GasOp::UpdatePolicy)?;
    if ctx.is_simulation() {
        return Ok(());
    }

    let mut nodes = state.registry.nodes();
    sort_node_list(&mut nodes);
    status.policy = Some(signed.clone());

    let generator = StatusGenerator::new(
        state.registry.consensus_parameters(),
        ctx.current_epoch(),
        ctx.now(),
        ctx.block_height(),
    );
    let new_status = generator.generate(&rt, &status, None, &nodes)?;

    state.keymanager.set_status(&new_status).map_err(|e| {
        error!(runtime_id = %rt.id, err = %e, "failed to set key manager status");
        e
    })?;
    ctx.emit_event(Event::StatusUpdate(StatusUpdateEvent { statuses: vec![new_status] }));

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// PUBLISH MASTER SECRET
// ════════════════════════════════════════════════════════════════════════════

/// Store a proposal for the next master secret generation, replacing any
/// older proposal. Committee members only.
pub fn publish_master_secret(
    ctx: &mut Context,
    state: &mut ChainState,
    signed: &SignedEncryptedMasterSecret,
) -> Result<()> {
    let rt = key_manager_runtime(&state.registry, &signed.secret.id)?;

    let signer = ctx.tx_signer()?;
    let status = committee_status(state, &rt.id)?;
    if !status.has_committee_member(&signer) {
        return Err(KeyManagerError::Unauthorized(
            "master secret can be published only by the key manager committee".to_string(),
        ));
    }

    if let Some(last) = state.keymanager.master_secret(&rt.id)? {
        if last.secret.epoch == signed.secret.epoch {
            return Err(KeyManagerError::StaleOrDuplicate {
                what: "master secret",
                epoch: signed.secret.epoch,
            });
        }
    }

    status.verify_rotation_epoch(signed.secret.epoch)?;

    let next_epoch = target_epoch(ctx)?;
    let rak = runtime_attestation_key(&state.registry, &signer, &rt)?;
    let reks = runtime_encryption_keys(&state.registry, &rt, &status.nodes);
    signed.verify(status.next_generation()?, next_epoch, &reks, &rak)?;

    if ctx.is_check_only() {
        return Ok(());
    }
    charge(ctx, state, GasOp::PublishMasterSecret)?;
    if ctx.is_simulation() {
        return Ok(());
    }

    state.keymanager.set_master_secret(signed).map_err(|e| {
        error!(runtime_id = %rt.id, err = %e, "failed to set key manager master secret");
        e
    })?;
    ctx.emit_event(Event::MasterSecretPublished(MasterSecretPublishedEvent { secret: signed.clone() }));

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// PUBLISH EPHEMERAL SECRET
// ════════════════════════════════════════════════════════════════════════════

/// Store the ephemeral secret for the next epoch. Committee members only.
pub fn publish_ephemeral_secret(
    ctx: &mut Context,
    state: &mut ChainState,
    signed: &SignedEncryptedEphemeralSecret,
) -> Result<()> {
    let rt = key_manager_runtime(&state.registry, &signed.secret.id)?;

    let signer = ctx.tx_signer()?;
    let status = committee_status(state, &rt.id)?;
    if !status.has_committee_member(&signer) {
        return Err(KeyManagerError::Unauthorized(
            "ephemeral secret can be published only by the key manager committee".to_string(),
        ));
    }

    if let Some(last) = state.keymanager.ephemeral_secret(&rt.id)? {
        if last.secret.epoch == signed.secret.epoch {
            return Err(KeyManagerError::StaleOrDuplicate {
                what: "ephemeral secret",
                epoch: signed.secret.epoch,
            });
        }
    }

    let next_epoch = target_epoch(ctx)?;
    let rak = runtime_attestation_key(&state.registry, &signer, &rt)?;
    let reks = runtime_encryption_keys(&state.registry, &rt, &status.nodes);
    signed.verify(next_epoch, &reks, &rak)?;

    if ctx.is_check_only() {
        return Ok(());
    }
    charge(ctx, state, GasOp::PublishEphemeralSecret)?;
    if ctx.is_simulation() {
        return Ok(());
    }

    state.keymanager.set_ephemeral_secret(signed).map_err(|e| {
        error!(runtime_id = %rt.id, err = %e, "failed to set key manager ephemeral secret");
        e
    })?;
    ctx.emit_event(Event::EphemeralSecretPublished(EphemeralSecretPublishedEvent {
        secret: signed.clone(),
    }));

    Ok(())
}
