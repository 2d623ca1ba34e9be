//! Epoch transition: recompute every key-manager status.
//!
//! Runtimes are visited in runtime-ID order and a single `StatusUpdate`
//! event carries every status that changed. Runtime registrations never
//! expire, so statuses without a runtime are not swept.

use tracing::{debug, error};

use keyward_common::keymanager::{Event, KeyManagerError, Result, Status, StatusUpdateEvent};
use keyward_common::registry::sort_node_list;
use keyward_common::EpochTime;

use super::status::StatusGenerator;
use crate::context::Context;
use crate::state::ChainState;

fn encoded(status: &Status) -> Result<Vec<u8>> {
    bincode::serialize(status)
        .map_err(|e| KeyManagerError::StateCorruption(format!("failed to encode status {}: {}", status.id, e)))
}

/// Recompute and persist the status of every key manager for `epoch`.
///
/// Any error is fatal for the transition.
pub fn on_epoch_change(ctx: &mut Context, state: &mut ChainState, epoch: EpochTime) -> Result<()> {
    let runtimes = state.registry.runtimes();
    let mut nodes = state.registry.nodes();
    sort_node_list(&mut nodes);

    let params = state.registry.consensus_parameters().clone();
    let generator = StatusGenerator::new(&params, epoch, ctx.now(), ctx.block_height());

    let mut to_emit: Vec<Status> = Vec::new();
    for rt in runtimes.iter().filter(|rt| rt.is_key_manager()) {
        let (old, force_emit) = match state.keymanager.status(&rt.id) {
            Ok(Some(status)) => (status, false),
            // New key manager runtime.
            Ok(None) => (Status::new(rt.id), true),
            Err(e) => {
                error!(runtime_id = %rt.id, err = %e, "failed to query key manager status");
                return Err(e);
            }
        };

        let secret = state.keymanager.master_secret(&rt.id).map_err(|e| {
            error!(runtime_id = %rt.id, err = %e, "failed to query key manager master secret");
            e
        })?;

        let new = generator.generate(rt, &old, secret.as_ref(), &nodes)?;
        if !force_emit && encoded(&old)? == encoded(&new)? {
            continue;
        }

        debug!(
            runtime_id = %new.id,
            is_initialized = new.is_initialized,
            is_secure = new.is_secure,
            generation = new.generation,
            rotation_epoch = new.rotation_epoch,
            checksum = %hex::encode(&new.checksum),
            rsk = ?new.rsk,
            nodes = ?new.nodes,
            "status updated"
        );

        state.keymanager.set_status(&new).map_err(|e| {
            error!(runtime_id = %new.id, err = %e, "failed to set key manager status");
            e
        })?;
        to_emit.push(new);
    }

    if !to_emit.is_empty() {
        ctx.emit_event(Event::StatusUpdate(StatusUpdateEvent { statuses: to_emit }));
    }

    Ok(())
}
