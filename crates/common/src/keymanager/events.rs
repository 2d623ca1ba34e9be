//! Events emitted by the key-manager application.

use serde::{Deserialize, Serialize};

use super::secrets::{SignedEncryptedEphemeralSecret, SignedEncryptedMasterSecret};
use super::status::Status;

/// One or more statuses changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateEvent {
    pub statuses: Vec<Status>,
}

/// A master secret proposal was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterSecretPublishedEvent {
    pub secret: SignedEncryptedMasterSecret,
}

/// An ephemeral secret was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralSecretPublishedEvent {
    pub secret: SignedEncryptedEphemeralSecret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    StatusUpdate(StatusUpdateEvent),
    MasterSecretPublished(MasterSecretPublishedEvent),
    EphemeralSecretPublished(EphemeralSecretPublishedEvent),
}
