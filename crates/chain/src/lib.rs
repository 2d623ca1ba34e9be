//! # Keyward Chain Library
//!
//! Consensus-side logic of the key-manager secrets application.
//!
//! ## Module Overview
//!
//! | Module | Content |
//! |--------|---------|
//! | `context` | Execution context: mode, signer, epoch, block time, gas, events |
//! | `state` | `ChainState`: registry records and key-manager records |
//! | `keymanager` | Lookups, attestation, status generator, epoch driver, transactions |
//!
//! ## Execution Flow
//!
//! ```text
//!   tx ──▶ SecretsApp::execute_tx ──▶ update_policy / publish_*_secret
//!                                          │
//!                                          ▼
//!                          ChainState + Context (gas, events)
//!                                          ▲
//!                                          │
//!   epoch ──▶ SecretsApp::on_epoch_change ──▶ StatusGenerator per runtime
//! ```
//!
//! Everything runs sequentially and deterministically: one transaction or
//! epoch transition at a time against a `&mut ChainState`.

pub mod context;
pub mod keymanager;
pub mod state;

pub use context::{Context, ExecutionMode, GasAccountant};
pub use keymanager::{KeyManagerTx, SecretsApp};
pub use state::{ChainState, KeyManagerState, RegistryState};
