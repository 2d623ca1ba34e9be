//! Runtime and key lookups shared by the transaction handlers.

use std::collections::BTreeSet;

use keyward_common::keymanager::{KeyManagerError, Result};
use keyward_common::registry::Runtime;
use keyward_common::{EncryptionKey, PublicKey, RuntimeId};

use crate::state::RegistryState;

/// Fetch runtime `id` and ensure it is a key manager.
pub fn key_manager_runtime(registry: &RegistryState, id: &RuntimeId) -> Result<Runtime> {
    let rt = registry.runtime(id)?;
    if !rt.is_key_manager() {
        return Err(KeyManagerError::WrongKind(*id));
    }
    Ok(rt.clone())
}

/// Trusted attestation key of `signer` for the key manager `km_rt`.
///
/// Key managers run exactly one version, so the first entry for the
/// runtime is used regardless of its version.
pub fn runtime_attestation_key(
    registry: &RegistryState,
    signer: &PublicKey,
    km_rt: &Runtime,
) -> Result<PublicKey> {
    let node = registry.node(signer)?;
    let node_rt = node
        .runtime(&km_rt.id)
        .ok_or(KeyManagerError::NotKeyManagerNode(*signer))?;

    km_rt.tee_hardware.attestation_key(signer, &node_rt.capabilities)
}

/// REKs of the committee `members` for the key manager `km_rt`.
///
/// Lossy: members without a node record, without an entry for the runtime
/// or without a usable REK are skipped.
pub fn runtime_encryption_keys(
    registry: &RegistryState,
    km_rt: &Runtime,
    members: &[PublicKey],
) -> BTreeSet<EncryptionKey> {
    members
        .iter()
        .filter_map(|id| registry.node(id).ok())
        .filter_map(|node| node.runtime(&km_rt.id))
        .filter_map(|node_rt| km_rt.tee_hardware.encryption_key(&node_rt.capabilities))
        .collect()
}
