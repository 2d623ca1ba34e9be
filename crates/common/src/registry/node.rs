//! Node registration records.

use serde::{Deserialize, Serialize};

use super::runtime::Version;
use super::tee::Capabilities;
use crate::types::{EpochTime, PublicKey, RuntimeId};

/// Bit set of roles a node registered for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleMask(pub u32);

impl RoleMask {
    pub const COMPUTE_WORKER: RoleMask = RoleMask(1 << 0);
    pub const KEY_MANAGER: RoleMask = RoleMask(1 << 2);
    pub const VALIDATOR: RoleMask = RoleMask(1 << 3);

    pub const fn empty() -> Self {
        RoleMask(0)
    }

    pub const fn union(self, other: RoleMask) -> Self {
        RoleMask(self.0 | other.0)
    }

    /// True if every bit of `roles` is set.
    pub const fn contains(&self, roles: RoleMask) -> bool {
        self.0 & roles.0 == roles.0
    }
}

/// Per-runtime entry a node advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRuntime {
    pub id: RuntimeId,
    pub version: Version,
    pub capabilities: Capabilities,
    /// Runtime-specific payload. Key-manager nodes put their signed
    /// initialization response here.
    pub extra_info: Option<Vec<u8>>,
}

/// Registered node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: PublicKey,
    pub entity_id: PublicKey,
    /// Last epoch for which the registration is valid.
    pub expiration: EpochTime,
    pub roles: RoleMask,
    pub runtimes: Vec<NodeRuntime>,
}

impl Node {
    pub fn is_expired(&self, epoch: EpochTime) -> bool {
        self.expiration < epoch
    }

    pub fn has_roles(&self, roles: RoleMask) -> bool {
        self.roles.contains(roles)
    }

    /// First advertised entry for `runtime_id`, ignoring the version.
    pub fn runtime(&self, runtime_id: &RuntimeId) -> Option<&NodeRuntime> {
        self.runtimes.iter().find(|rt| rt.id == *runtime_id)
    }
}

/// Sort nodes by identity bytes.
///
/// Every replica must iterate nodes in the same order; the sort is stable
/// and keyed only on the node identity.
pub fn sort_node_list(nodes: &mut [Node]) {
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(seed: u8, expiration: EpochTime) -> Node {
        Node {
            id: PublicKey([seed; 32]),
            entity_id: PublicKey([0xEE; 32]),
            expiration,
            roles: RoleMask::KEY_MANAGER,
            runtimes: Vec::new(),
        }
    }

    #[test]
    fn test_sort_node_list_by_identity() {
        let mut nodes = vec![node(3, 1), node(1, 1), node(2, 1)];
        sort_node_list(&mut nodes);
        let ids: Vec<u8> = nodes.iter().map(|n| n.id.0[0]).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_expiry_is_inclusive_of_last_epoch() {
        let n = node(1, 10);
        assert!(!n.is_expired(10));
        assert!(n.is_expired(11));
    }

    #[test]
    fn test_role_mask() {
        let roles = RoleMask::KEY_MANAGER.union(RoleMask::VALIDATOR);
        assert!(roles.contains(RoleMask::KEY_MANAGER));
        assert!(!roles.contains(RoleMask::COMPUTE_WORKER));
        assert!(!RoleMask::empty().contains(RoleMask::KEY_MANAGER));
    }
}
