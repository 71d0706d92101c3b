/// Revoked-token blocklist
///
/// Logout revokes the presented token by recording its `jti`; every
/// authenticated request checks membership after signature and expiry
/// validation. The blocklist lives in application state and is injected
/// into the handlers that need it, rather than being a process global.
///
/// Entries are stored together with the token's expiry timestamp, and
/// expired entries are pruned on every insert. A revoked token past its
/// expiry is rejected by the expiry check anyway, so pruning loses nothing
/// and bounds the set by the token lifetime.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Concurrent set of revoked token identifiers
///
/// Safe for concurrent insert-and-lookup from simultaneously handled
/// requests. Operations hold the lock only briefly; a poisoned lock is
/// treated as still usable since the map cannot be left mid-update.
#[derive(Debug, Default)]
pub struct TokenBlocklist {
    inner: Mutex<HashMap<Uuid, i64>>,
}

impl TokenBlocklist {
    /// Creates an empty blocklist
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes a token by its `jti`
    ///
    /// `expires_at` is the token's `exp` claim (Unix timestamp); entries
    /// whose expiry has passed are dropped before the insert.
    pub fn revoke(&self, jti: Uuid, expires_at: i64) {
        let now = Utc::now().timestamp();
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        map.retain(|_, exp| *exp > now);
        map.insert(jti, expires_at);
    }

    /// Checks whether a token identifier has been revoked
    pub fn is_revoked(&self, jti: Uuid) -> bool {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.contains_key(&jti)
    }

    /// Number of tracked revocations
    pub fn len(&self) -> usize {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.len()
    }

    /// True when no revocations are tracked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 900
    }

    #[test]
    fn test_revoke_and_lookup() {
        let blocklist = TokenBlocklist::new();
        let jti = Uuid::new_v4();

        assert!(!blocklist.is_revoked(jti));

        blocklist.revoke(jti, future_exp());
        assert!(blocklist.is_revoked(jti));
        assert_eq!(blocklist.len(), 1);
    }

    #[test]
    fn test_unrelated_jti_not_revoked() {
        let blocklist = TokenBlocklist::new();
        blocklist.revoke(Uuid::new_v4(), future_exp());

        assert!(!blocklist.is_revoked(Uuid::new_v4()));
    }

    #[test]
    fn test_expired_entries_pruned_on_insert() {
        let blocklist = TokenBlocklist::new();
        let stale = Uuid::new_v4();

        // Entry whose token expired an hour ago
        blocklist.revoke(stale, Utc::now().timestamp() - 3600);
        assert_eq!(blocklist.len(), 1);

        // Next insert sweeps it out
        let live = Uuid::new_v4();
        blocklist.revoke(live, future_exp());

        assert_eq!(blocklist.len(), 1);
        assert!(blocklist.is_revoked(live));
        assert!(!blocklist.is_revoked(stale));
    }

    #[test]
    fn test_concurrent_insert_and_lookup() {
        let blocklist = Arc::new(TokenBlocklist::new());
        let jtis: Vec<Uuid> = (0..64).map(|_| Uuid::new_v4()).collect();

        let handles: Vec<_> = jtis
            .iter()
            .map(|&jti| {
                let blocklist = Arc::clone(&blocklist);
                std::thread::spawn(move || {
                    blocklist.revoke(jti, future_exp());
                    assert!(blocklist.is_revoked(jti));
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread should not panic");
        }

        // No lost updates
        assert_eq!(blocklist.len(), 64);
        for jti in jtis {
            assert!(blocklist.is_revoked(jti));
        }
    }
}
