//! # Key Manager Records
//!
//! Value types shared by every component that handles key-manager state.
//!
//! ## Components
//!
//! | Type | Module | Purpose |
//! |------|--------|---------|
//! | `Status`, `InitState` | `status` | Authoritative per-runtime status and its sticky-field state machine |
//! | `SignedPolicySgx` | `policy` | Owner-signed policy and its continuity rule |
//! | `SignedEncryptedMasterSecret` | `secrets` | Next-generation master secret proposal |
//! | `SignedEncryptedEphemeralSecret` | `secrets` | Per-epoch ephemeral secret |
//! | `SignedInitResponse` | `init_response` | Node-signed enclave state report |
//! | `insecure_rak`, `insecure_rek` | `keys` | Placeholder keys and per-TEE key extraction |
//! | `ConsensusParameters`, `GasCosts` | `params` | Gas costs |
//! | `Event` | `events` | Emitted events |
//! | `KeyManagerError` | `error` | Error taxonomy |

pub mod error;
pub mod keys;
pub mod status;
pub mod policy;
pub mod secrets;
pub mod init_response;
pub mod params;
pub mod events;

pub use error::{KeyManagerError, Result};
pub use keys::{insecure_rak, insecure_rak_signer, insecure_rek};
pub use status::{InitState, SecurityMismatch, Status};
pub use policy::{
    sanity_check_signed_policy, EnclavePolicySgx, PolicySgx, SignatureBundle, SignedPolicySgx,
    POLICY_SIGNATURE_CONTEXT,
};
pub use secrets::{
    EncryptedEphemeralSecret, EncryptedMasterSecret, EncryptedSecret,
    SignedEncryptedEphemeralSecret, SignedEncryptedMasterSecret,
    EPHEMERAL_SECRET_SIGNATURE_CONTEXT, MASTER_SECRET_SIGNATURE_CONTEXT,
};
pub use init_response::{InitResponse, SignedInitResponse, INIT_RESPONSE_SIGNATURE_CONTEXT};
pub use params::{ConsensusParameters, GasCosts, GasOp};
pub use events::{
    EphemeralSecretPublishedEvent, Event, MasterSecretPublishedEvent, StatusUpdateEvent,
};
