//! Registry records: runtimes, nodes and registry consensus parameters.

use std::collections::BTreeMap;

use keyward_common::keymanager::{KeyManagerError, Result};
use keyward_common::registry::{ConsensusParameters, Node, Runtime};
use keyward_common::{PublicKey, RuntimeId};

#[derive(Debug, Clone, Default)]
pub struct RegistryState {
    runtimes: BTreeMap<RuntimeId, Runtime>,
    nodes: BTreeMap<PublicKey, Node>,
    params: ConsensusParameters,
}

impl RegistryState {
    pub fn with_parameters(params: ConsensusParameters) -> Self {
        RegistryState { params, ..Default::default() }
    }

    pub fn runtime(&self, id: &RuntimeId) -> Result<&Runtime> {
        self.runtimes
            .get(id)
            .ok_or_else(|| KeyManagerError::not_found("runtime", id))
    }

    /// All runtimes, ordered by runtime ID.
    pub fn runtimes(&self) -> Vec<Runtime> {
        self.runtimes.values().cloned().collect()
    }

    pub fn node(&self, id: &PublicKey) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| KeyManagerError::not_found("node", id))
    }

    /// All nodes, ordered by node ID.
    pub fn nodes(&self) -> Vec<Node> {
        self.nodes.values().cloned().collect()
    }

    pub fn consensus_parameters(&self) -> &ConsensusParameters {
        &self.params
    }

    pub fn set_consensus_parameters(&mut self, params: ConsensusParameters) {
        self.params = params;
    }

    /// Insert or replace a runtime descriptor (genesis and test seeding).
    pub fn register_runtime(&mut self, runtime: Runtime) {
        self.runtimes.insert(runtime.id, runtime);
    }

    /// Insert or replace a node descriptor (genesis and test seeding).
    pub fn register_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_common::registry::{RoleMask, RuntimeKind, TeeHardware};

    fn node(seed: u8) -> Node {
        Node {
            id: PublicKey([seed; 32]),
            entity_id: PublicKey([0xEE; 32]),
            expiration: 10,
            roles: RoleMask::KEY_MANAGER,
            runtimes: Vec::new(),
        }
    }

    #[test]
    fn test_missing_records_are_not_found() {
        let reg = RegistryState::default();
        assert!(matches!(
            reg.runtime(&RuntimeId([1; 32])),
            Err(KeyManagerError::NotFound { what: "runtime", .. })
        ));
        assert!(matches!(
            reg.node(&PublicKey([1; 32])),
            Err(KeyManagerError::NotFound { what: "node", .. })
        ));
    }

    #[test]
    fn test_nodes_ordered_by_id() {
        let mut reg = RegistryState::default();
        reg.register_node(node(3));
        reg.register_node(node(1));
        reg.register_node(node(2));
        let ids: Vec<PublicKey> = reg.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![PublicKey([1; 32]), PublicKey([2; 32]), PublicKey([3; 32])]);
    }

    #[test]
    fn test_register_runtime_replaces() {
        let mut reg = RegistryState::default();
        let mut rt = Runtime {
            id: RuntimeId([1; 32]),
            entity_id: PublicKey([2; 32]),
            kind: RuntimeKind::Compute,
            tee_hardware: TeeHardware::None,
            deployments: Vec::new(),
        };
        reg.register_runtime(rt.clone());
        rt.kind = RuntimeKind::KeyManager;
        reg.register_runtime(rt);
        assert_eq!(reg.runtimes().len(), 1);
        assert!(reg.runtime(&RuntimeId([1; 32])).expect("runtime").is_key_manager());
    }
}
