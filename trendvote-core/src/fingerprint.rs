//! Run fingerprinting.
//!
//! A run id is the blake3 hash of the canonical JSON serialization of the
//! full configuration. Two replays with the same id are byte-for-byte
//! reproducible; logging the id alongside results makes runs comparable.

use serde::Serialize;

/// Hex-encoded blake3 fingerprint of a serializable configuration.
///
/// Serialization is infallible for the plain-data config types this is used
/// with; a failure would be a programming error, so it maps to a fixed
/// sentinel rather than poisoning the caller with an error path.
pub fn run_id<T: Serialize>(config: &T) -> String {
    match serde_json::to_vec(config) {
        Ok(bytes) => blake3::hash(&bytes).to_hex().to_string(),
        Err(_) => "unfingerprintable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;

    #[test]
    fn identical_configs_share_an_id() {
        let a = EngineConfig::default();
        let b = EngineConfig::default();
        assert_eq!(run_id(&a), run_id(&b));
    }

    #[test]
    fn any_parameter_change_changes_the_id() {
        let a = EngineConfig::default();
        let mut b = EngineConfig::default();
        b.max_bars_after_flip += 1;
        assert_ne!(run_id(&a), run_id(&b));
    }

    #[test]
    fn id_is_hex_and_stable_length() {
        let id = run_id(&EngineConfig::default());
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
