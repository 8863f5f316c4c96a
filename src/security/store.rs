//! Rate-limit entry storage.
//!
//! The limiter talks to storage only through [`RateLimitStore`], so the
//! in-process map can be swapped for a shared cache when several gateway
//! instances must agree on counts.

use std::fmt;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Counter state for one `(client, endpoint)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests admitted in the current window. Always at least 1.
    pub count: u32,
    /// Epoch milliseconds at which the current window ends.
    pub reset_at_ms: u64,
}

impl RateLimitEntry {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.reset_at_ms <= now_ms
    }
}

/// Storage backend for rate-limit entries.
pub trait RateLimitStore: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Option<RateLimitEntry>;

    fn set(&self, key: &str, entry: RateLimitEntry);

    fn delete(&self, key: &str);

    /// Remove every entry whose own window has ended at or before `now_ms`.
    /// Returns the number of entries removed.
    fn sweep(&self, now_ms: u64) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-modify-write of a single key.
    ///
    /// `f` receives the current entry and returns the replacement (`None`
    /// deletes). The default is built from `get`/`set`/`delete` and is not
    /// atomic; stores that can hold a per-key lock should override it.
    fn compute(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<RateLimitEntry>) -> Option<RateLimitEntry>,
    ) -> Option<RateLimitEntry> {
        let next = f(self.get(key));
        match next {
            Some(entry) => self.set(key, entry),
            None => self.delete(key),
        }
        next
    }
}

/// Process-local store on a sharded concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|entry| *entry)
    }

    fn set(&self, key: &str, entry: RateLimitEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    fn sweep(&self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now_ms));
        before.saturating_sub(self.entries.len())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    // The shard write lock is held for the whole closure, which keeps
    // concurrent increments on one key exact.
    fn compute(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<RateLimitEntry>) -> Option<RateLimitEntry>,
    ) -> Option<RateLimitEntry> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => match f(Some(*occupied.get())) {
                Some(next) => {
                    *occupied.get_mut() = next;
                    Some(next)
                }
                None => {
                    occupied.remove();
                    None
                }
            },
            Entry::Vacant(vacant) => {
                let next = f(None)?;
                vacant.insert(next);
                Some(next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn entry(count: u32, reset_at_ms: u64) -> RateLimitEntry {
        RateLimitEntry { count, reset_at_ms }
    }

    #[test]
    fn sweep_uses_each_entrys_own_reset() {
        let store = InMemoryStore::new();
        store.set("short", entry(1, 1_000));
        store.set("long", entry(1, 900_000));
        store.set("edge", entry(4, 5_000));

        assert_eq!(store.sweep(5_000), 2);
        assert!(store.get("short").is_none());
        assert!(store.get("edge").is_none());
        assert_eq!(store.get("long"), Some(entry(1, 900_000)));
    }

    #[test]
    fn compute_can_insert_update_and_delete() {
        let store = InMemoryStore::new();
        assert_eq!(store.compute("k", &mut |_| Some(entry(1, 10))), Some(entry(1, 10)));
        assert_eq!(
            store.compute("k", &mut |cur| cur.map(|e| entry(e.count + 1, e.reset_at_ms))),
            Some(entry(2, 10))
        );
        assert_eq!(store.compute("k", &mut |_| None), None);
        assert!(store.is_empty());
        assert_eq!(store.compute("absent", &mut |_| None), None);
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_compute_counts_exactly() {
        let store = Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        store.compute("hot", &mut |cur| {
                            Some(match cur {
                                Some(e) => entry(e.count + 1, e.reset_at_ms),
                                None => entry(1, u64::MAX),
                            })
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get("hot").unwrap().count, 8_000);
    }

    #[derive(Debug, Default)]
    struct GetSetOnly(InMemoryStore);

    impl RateLimitStore for GetSetOnly {
        fn get(&self, key: &str) -> Option<RateLimitEntry> {
            self.0.get(key)
        }
        fn set(&self, key: &str, entry: RateLimitEntry) {
            self.0.set(key, entry)
        }
        fn delete(&self, key: &str) {
            self.0.delete(key)
        }
        fn sweep(&self, now_ms: u64) -> usize {
            self.0.sweep(now_ms)
        }
        fn len(&self) -> usize {
            self.0.len()
        }
    }

    #[test]
    fn default_compute_goes_through_get_and_set() {
        let store = GetSetOnly::default();
        store.compute("k", &mut |_| Some(entry(1, 10)));
        store.compute("k", &mut |cur| cur.map(|e| entry(e.count + 1, e.reset_at_ms)));
        assert_eq!(store.get("k"), Some(entry(2, 10)));
        store.compute("k", &mut |_| None);
        assert!(store.is_empty());
    }
}
