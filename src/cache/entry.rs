//! Cache Entry Module
//!
//! Row shape for the persisted cache table, plus the shared clock helper.

use sqlx::FromRow;

// == Cache Entry ==
/// One row of the `cache` table.
#[derive(Debug, Clone, FromRow)]
pub struct CacheEntry {
    /// Caller-constructed lookup key
    pub key: String,
    /// Encoded value blob (codec output)
    pub value: Vec<u8>,
    /// Expiry timestamp (Unix milliseconds); the entry is logically absent
    /// once the current time reaches this value
    pub expires_at: i64,
    /// Last successful read or write (Unix milliseconds); LRU ranking only
    pub last_accessed_at: i64,
}

impl CacheEntry {
    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired when the current time is
    /// greater than or equal to `expires_at`.
    #[allow(dead_code)]
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(expires_at: i64) -> CacheEntry {
        CacheEntry {
            key: "k".to_string(),
            value: vec![1, 2, 3],
            expires_at,
            last_accessed_at: 0,
        }
    }

    #[test]
    fn test_not_expired_before_deadline() {
        assert!(!entry(100).is_expired(99));
    }

    #[test]
    fn test_expired_at_boundary() {
        assert!(entry(100).is_expired(100));
    }

    #[test]
    fn test_expired_after_deadline() {
        assert!(entry(100).is_expired(101));
    }

    #[test]
    fn test_now_millis_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
    }
}
