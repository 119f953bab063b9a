//! Stored session record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time as epoch milliseconds.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One persisted session: a data bag plus its expiry instant.
///
/// This is the layout every backend stores, one record per session
/// key. The data bag preserves insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session key.
    pub key: String,
    /// Ordered key-value bag.
    pub data: Map<String, Value>,
    /// Expiry instant, epoch milliseconds.
    pub expires_at_ms: u64,
}

impl SessionRecord {
    /// Creates an empty record expiring `ttl_ms` from now.
    #[must_use]
    pub fn new(key: impl Into<String>, ttl_ms: u64) -> Self {
        Self {
            key: key.into(),
            data: Map::new(),
            expires_at_ms: now_ms().saturating_add(ttl_ms),
        }
    }

    /// Slides the expiry forward to `ttl_ms` from now.
    pub fn touch(&mut self, ttl_ms: u64) {
        self.expires_at_ms = now_ms().saturating_add(ttl_ms);
    }

    /// Returns `true` once `now` has reached the expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_not_expired() {
        let record = SessionRecord::new("k", 60_000);
        assert!(!record.is_expired(now_ms()));
        assert!(record.data.is_empty());
    }

    #[test]
    fn expiry_is_inclusive() {
        let record = SessionRecord::new("k", 0);
        assert!(record.is_expired(record.expires_at_ms));
    }

    #[test]
    fn touch_slides_expiry_forward() {
        let mut record = SessionRecord::new("k", 10);
        let first = record.expires_at_ms;
        record.touch(60_000);
        assert!(record.expires_at_ms > first);
    }

    #[test]
    fn serde_layout() {
        let mut record = SessionRecord::new("k", 1000);
        record.data.insert("step".into(), serde_json::json!(2));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["key"], "k");
        assert_eq!(json["data"]["step"], 2);
        assert!(json["expires_at_ms"].is_u64());
    }
}
