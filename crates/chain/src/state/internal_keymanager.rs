//! # Key-Manager State
//!
//! Status and secret records, stored bincode-encoded under their runtime
//! ID. Only the latest master secret proposal and the latest ephemeral
//! secret are kept per runtime.
//!
//! A record that fails to decode is reported as `StateCorruption`: it can
//! only have been written by a replica running different code.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use keyward_common::keymanager::{
    ConsensusParameters, KeyManagerError, Result, SignedEncryptedEphemeralSecret,
    SignedEncryptedMasterSecret, Status,
};
use keyward_common::RuntimeId;

#[derive(Debug, Clone, Default)]
pub struct KeyManagerState {
    statuses: BTreeMap<RuntimeId, Vec<u8>>,
    master_secrets: BTreeMap<RuntimeId, Vec<u8>>,
    ephemeral_secrets: BTreeMap<RuntimeId, Vec<u8>>,
    params: ConsensusParameters,
}

fn encode<T: Serialize>(what: &str, id: &RuntimeId, value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value)
        .map_err(|e| KeyManagerError::StateCorruption(format!("failed to encode {} {}: {}", what, id, e)))
}

fn decode<T: DeserializeOwned>(what: &str, id: &RuntimeId, raw: &[u8]) -> Result<T> {
    bincode::deserialize(raw)
        .map_err(|e| KeyManagerError::StateCorruption(format!("failed to decode {} {}: {}", what, id, e)))
}

fn lookup<T: DeserializeOwned>(
    map: &BTreeMap<RuntimeId, Vec<u8>>,
    what: &str,
    id: &RuntimeId,
) -> Result<Option<T>> {
    map.get(id).map(|raw| decode(what, id, raw)).transpose()
}

impl KeyManagerState {
    pub fn with_parameters(params: ConsensusParameters) -> Self {
        KeyManagerState { params, ..Default::default() }
    }

    /// Status of `id`, `None` if the key manager has never been seen.
    pub fn status(&self, id: &RuntimeId) -> Result<Option<Status>> {
        lookup(&self.statuses, "status", id)
    }

    /// All statuses, ordered by runtime ID.
    pub fn statuses(&self) -> Result<Vec<Status>> {
        self.statuses
            .iter()
            .map(|(id, raw)| decode("status", id, raw))
            .collect()
    }

    pub fn set_status(&mut self, status: &Status) -> Result<()> {
        let raw = encode("status", &status.id, status)?;
        self.statuses.insert(status.id, raw);
        Ok(())
    }

    /// Latest master secret proposal of `id`.
    pub fn master_secret(&self, id: &RuntimeId) -> Result<Option<SignedEncryptedMasterSecret>> {
        lookup(&self.master_secrets, "master secret", id)
    }

    pub fn set_master_secret(&mut self, secret: &SignedEncryptedMasterSecret) -> Result<()> {
        let id = secret.secret.id;
        let raw = encode("master secret", &id, secret)?;
        self.master_secrets.insert(id, raw);
        Ok(())
    }

    /// Latest ephemeral secret of `id`.
    pub fn ephemeral_secret(&self, id: &RuntimeId) -> Result<Option<SignedEncryptedEphemeralSecret>> {
        lookup(&self.ephemeral_secrets, "ephemeral secret", id)
    }

    pub fn set_ephemeral_secret(&mut self, secret: &SignedEncryptedEphemeralSecret) -> Result<()> {
        let id = secret.secret.id;
        let raw = encode("ephemeral secret", &id, secret)?;
        self.ephemeral_secrets.insert(id, raw);
        Ok(())
    }

    pub fn consensus_parameters(&self) -> &ConsensusParameters {
        &self.params
    }

    pub fn set_consensus_parameters(&mut self, params: ConsensusParameters) {
        self.params = params;
    }

    #[cfg(test)]
    pub(crate) fn insert_raw_status(&mut self, id: RuntimeId, raw: Vec<u8>) {
        self.statuses.insert(id, raw);
    }

    #[cfg(test)]
    pub(crate) fn insert_raw_master_secret(&mut self, id: RuntimeId, raw: Vec<u8>) {
        self.master_secrets.insert(id, raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        let mut state = KeyManagerState::default();
        let id = RuntimeId([1; 32]);
        assert_eq!(state.status(&id), Ok(None));

        let mut status = Status::new(id);
        status.generation = 3;
        state.set_status(&status).expect("set");
        assert_eq!(state.status(&id), Ok(Some(status.clone())));
        assert_eq!(state.statuses(), Ok(vec![status]));
    }

    #[test]
    fn test_undecodable_status_is_corruption() {
        let mut state = KeyManagerState::default();
        let id = RuntimeId([1; 32]);
        state.insert_raw_status(id, vec![0xFF]);
        let err = state.status(&id).unwrap_err();
        assert!(err.is_fatal());
        assert!(state.statuses().is_err());
    }

    #[test]
    fn test_statuses_ordered_by_runtime() {
        let mut state = KeyManagerState::default();
        for seed in [3u8, 1, 2] {
            state.set_status(&Status::new(RuntimeId([seed; 32]))).expect("set");
        }
        let ids: Vec<RuntimeId> = state.statuses().expect("statuses").iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![RuntimeId([1; 32]), RuntimeId([2; 32]), RuntimeId([3; 32])]);
    }
}
