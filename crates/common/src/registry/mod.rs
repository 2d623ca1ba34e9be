//! # Registry Records
//!
//! Read-side view of the runtime and node registry consumed by the
//! key-manager logic.
//!
//! ## Modules
//!
//! - `tee`: `TeeHardware`, `CapabilityTee`, `EnclaveIdentity`
//! - `runtime`: `Runtime`, `RuntimeKind`, `Version`, `VersionInfo`
//! - `node`: `Node`, `NodeRuntime`, `RoleMask`, `sort_node_list`
//! - `params`: registry `ConsensusParameters`, `TeeFeatures`
//! - `enclave`: `verify_node_runtime_enclave_ids`

pub mod tee;
pub mod runtime;
pub mod node;
pub mod params;
pub mod enclave;

pub use tee::{Capabilities, CapabilityTee, EnclaveIdentity, SgxAttestation, TeeHardware};
pub use runtime::{Runtime, RuntimeKind, Version, VersionInfo};
pub use node::{sort_node_list, Node, NodeRuntime, RoleMask};
pub use params::{ConsensusParameters, TeeFeatures};
pub use enclave::{verify_node_runtime_enclave_ids, EnclaveError};
