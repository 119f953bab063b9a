//! Canonical command hashing.
//!
//! Two definitions that differ only in JSON key order must hash the
//! same, so hashing runs over a canonical form: every object's keys
//! sorted recursively, serialized compactly, digested with SHA-256.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Hashes a command definition to a lowercase hex SHA-256 digest over
/// its canonical JSON form.
#[must_use]
pub fn definition_hash(definition: &Value) -> String {
    let canonical = canonicalize(definition);
    // Compact serialization of an already-canonical tree is stable.
    let json = canonical.to_string();
    let digest = Sha256::digest(json.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Rebuilds the value with every object's keys in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(key, _)| key.as_str());
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), canonicalize(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_change_the_hash() {
        let a: Value = serde_json::from_str(r#"{"name":"ping","description":"pong"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"description":"pong","name":"ping"}"#).unwrap();
        assert_eq!(definition_hash(&a), definition_hash(&b));
    }

    #[test]
    fn nested_objects_are_canonicalized() {
        let a: Value =
            serde_json::from_str(r#"{"name":"x","options":[{"b":1,"a":2}]}"#).unwrap();
        let b: Value =
            serde_json::from_str(r#"{"options":[{"a":2,"b":1}],"name":"x"}"#).unwrap();
        assert_eq!(definition_hash(&a), definition_hash(&b));
    }

    #[test]
    fn content_changes_change_the_hash() {
        let a = json!({"name": "ping", "description": "pong"});
        let b = json!({"name": "ping", "description": "PONG"});
        assert_ne!(definition_hash(&a), definition_hash(&b));
    }

    #[test]
    fn array_order_matters() {
        let a = json!({"options": [1, 2]});
        let b = json!({"options": [2, 1]});
        assert_ne!(definition_hash(&a), definition_hash(&b));
    }

    #[test]
    fn digest_is_hex_sha256() {
        let hash = definition_hash(&json!({"name": "ping"}));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
