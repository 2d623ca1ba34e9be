//! Genesis parameter loader using TOML and serde.
//! Every field has a default, so a partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::keymanager;
use crate::registry;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Key-manager consensus parameters (gas costs).
    pub keymanager: keymanager::ConsensusParameters,

    /// Registry consensus parameters (TEE features).
    pub registry: registry::ConsensusParameters,
}

/// Parse a config from TOML text.
pub fn load_from_str(s: &str) -> Result<GenesisConfig> {
    let cfg: GenesisConfig = toml::from_str(s)?;
    Ok(cfg)
}

/// Load config from a TOML file path.
/// If file is missing or parse fails, an error is returned.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<GenesisConfig> {
    let s = fs::read_to_string(path.as_ref())?;
    load_from_str(&s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymanager::params::DEFAULT_GAS_PUBLISH_MASTER_SECRET;

    #[test]
    fn test_default_config() {
        let def = GenesisConfig::default();
        assert_eq!(def.keymanager.gas_costs.publish_master_secret, DEFAULT_GAS_PUBLISH_MASTER_SECRET);
        assert!(def.registry.tee_features.is_none());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = load_from_str(
            r#"
            [keymanager.gas_costs]
            update_policy = 7
        "#,
        )
        .expect("parse");
        assert_eq!(cfg.keymanager.gas_costs.update_policy, 7);
        assert_eq!(cfg.keymanager.gas_costs.publish_master_secret, DEFAULT_GAS_PUBLISH_MASTER_SECRET);
    }

    #[test]
    fn test_load_from_file_roundtrip() {
        use std::io::Write;
        let tmp = tempfile::NamedTempFile::new().expect("temp file");
        let toml = r#"
            [keymanager.gas_costs]
            update_policy = 10
            publish_master_secret = 20
            publish_ephemeral_secret = 30

            [registry.tee_features]
            sgx = true
            max_attestation_age = 50
        "#;
        let mut f = tmp.reopen().expect("reopen");
        write!(f, "{}", toml).expect("write");
        let cfg = load_from_file(tmp.path()).expect("load");
        assert_eq!(cfg.keymanager.gas_costs.publish_ephemeral_secret, 30);
        let features = cfg.registry.tee_features.expect("tee features");
        assert!(features.sgx);
        assert_eq!(features.max_attestation_age, 50);
    }

    #[test]
    fn test_malformed_file_errors() {
        assert!(load_from_str("keymanager = 5").is_err());
    }
}
