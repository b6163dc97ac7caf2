//! Per-user conversational context: the last normalized message each user sent.
//!
//! The map is split into shards, each behind its own lock, so turns from different users rarely
//! contend. Every critical section is a single map operation. Same-user writes are last write
//! wins. Entries are never evicted.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{PoisonError, RwLock};

const DEFAULT_SHARDS: usize = 16;

/// Opaque, already-authenticated user identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct ContextStore {
    shards: Vec<RwLock<HashMap<UserId, String>>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Store with an explicit shard count (at least one).
    pub fn with_shards(count: usize) -> Self {
        let count = count.max(1);
        Self {
            shards: (0..count).map(|_| RwLock::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, user: &UserId) -> &RwLock<HashMap<UserId, String>> {
        let mut hasher = DefaultHasher::new();
        user.hash(&mut hasher);
        let idx = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    /// Last message recorded for `user`, if any.
    #[must_use]
    pub fn get(&self, user: &UserId) -> Option<String> {
        self.shard(user)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
            .cloned()
    }

    /// Record `message` for `user`, replacing whatever was there.
    pub fn set(&self, user: &UserId, message: impl Into<String>) {
        let message = message.into();
        self.shard(user)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.clone(), message);
    }

    /// Number of users with a recorded message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextStore")
            .field("shards", &self.shards.len())
            .field("users", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn absent_until_set() {
        let store = ContextStore::new();
        assert_eq!(store.get(&UserId::from("u1")), None);
        assert!(store.is_empty());
    }

    #[test]
    fn set_overwrites_previous_entry() {
        let store = ContextStore::new();
        let user = UserId::from(7u64);
        store.set(&user, "first");
        store.set(&user, "second");
        assert_eq!(store.get(&user).as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_message_is_still_an_entry() {
        let store = ContextStore::new();
        let user = UserId::from("blank");
        store.set(&user, "");
        assert_eq!(store.get(&user).as_deref(), Some(""));
    }

    #[test]
    fn single_shard_keeps_users_apart() {
        let store = ContextStore::with_shards(0);
        store.set(&UserId::from("a"), "alpha");
        store.set(&UserId::from("b"), "beta");
        assert_eq!(store.get(&UserId::from("a")).as_deref(), Some("alpha"));
        assert_eq!(store.get(&UserId::from("b")).as_deref(), Some("beta"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_same_user_writes_leave_one_whole_value() {
        let store = Arc::new(ContextStore::new());
        let user = UserId::from("double-submit");
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                let user = user.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        store.set(&user, format!("message-{n}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let last = store.get(&user).unwrap();
        let n: usize = last.strip_prefix("message-").unwrap().parse().unwrap();
        assert!(n < 8);
        assert_eq!(store.len(), 1);
    }
}
