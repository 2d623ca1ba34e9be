//! # Chain State
//!
//! In-memory consensus state seen by the key-manager application.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │                ChainState                  │
//! │  ┌──────────────────┐  ┌────────────────┐  │
//! │  │  RegistryState   │  │ KeyManagerState│  │
//! │  │ runtimes, nodes, │  │ status, master │  │
//! │  │ TEE parameters   │  │ and ephemeral  │  │
//! │  └──────────────────┘  │ secrets        │  │
//! │                        └────────────────┘  │
//! └────────────────────────────────────────────┘
//! ```
//!
//! | Module | Content |
//! |--------|---------|
//! | `internal_registry` | Runtime and node records, registry parameters |
//! | `internal_keymanager` | Bincode-encoded key-manager records, gas costs |
//!
//! The engine hands out `&mut ChainState` to one transaction or epoch
//! transition at a time. Nothing here locks.

mod internal_keymanager;
mod internal_registry;

pub use internal_keymanager::KeyManagerState;
pub use internal_registry::RegistryState;

use keyward_common::GenesisConfig;

#[derive(Debug, Clone, Default)]
pub struct ChainState {
    pub registry: RegistryState,
    pub keymanager: KeyManagerState,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty state carrying the genesis consensus parameters.
    pub fn from_genesis(genesis: &GenesisConfig) -> Self {
        ChainState {
            registry: RegistryState::with_parameters(genesis.registry.clone()),
            keymanager: KeyManagerState::with_parameters(genesis.keymanager.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_genesis_applies_parameters() {
        let mut genesis = GenesisConfig::default();
        genesis.keymanager.gas_costs.update_policy = 42;
        let state = ChainState::from_genesis(&genesis);
        assert_eq!(state.keymanager.consensus_parameters().gas_costs.update_policy, 42);
        assert!(state.registry.runtimes().is_empty());
    }
}
