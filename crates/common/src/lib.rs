//! # Keyward Common Crate
//!
//! Shared types for the key-manager consensus application.
//!
//! ## Modules
//! - `types`: fixed-size identifiers (`PublicKey`, `RuntimeId`, `EncryptionKey`, `Signature`)
//! - `crypto`: SHA3-256 and domain-separated Ed25519 helpers
//! - `registry`: runtime and node records, TEE capabilities, enclave identity rule
//! - `keymanager`: status, policy, secrets, init response, events, errors
//! - `config`: genesis parameter loading
//!
//! ## Layering
//! ```text
//! ┌──────────────┐
//! │  keymanager  │  <- records + per-TEE key strategy
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │   registry   │  <- runtimes, nodes, TEE classes
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ types/crypto │
//! └──────────────┘
//! ```

pub mod types;
pub mod crypto;
pub mod registry;
pub mod keymanager;
pub mod config;

pub use types::{EncryptionKey, EpochTime, PublicKey, RuntimeId, Signature, CHECKSUM_SIZE};
pub use keymanager::KeyManagerError;
pub use config::GenesisConfig;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
