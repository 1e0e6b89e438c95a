// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Which tab most recently asked for accounts, per origin.
//!
//! One binding per origin, last write wins. The store is bounded: once
//! `capacity` origins are tracked, recording a new origin evicts the one
//! written least recently. Reads do not refresh an entry. There is no TTL.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Default number of origins tracked.
pub const DEFAULT_BINDING_CAPACITY: usize = 4096;

pub struct RequestAccountBindings {
    bindings: Mutex<LruCache<String, i64>>,
}

impl Default for RequestAccountBindings {
    fn default() -> Self {
        Self::new(DEFAULT_BINDING_CAPACITY)
    }
}

impl RequestAccountBindings {
    /// Store tracking at most `capacity` origins (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            bindings: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Bind `origin` to `tab_id`, replacing any earlier binding.
    pub fn record(&self, origin: &str, tab_id: i64) {
        if let Ok(mut bindings) = self.bindings.lock() {
            bindings.put(origin.to_string(), tab_id);
        }
    }

    /// Tab that last requested accounts for `origin`.
    pub fn tab_for(&self, origin: &str) -> Option<i64> {
        self.bindings.lock().ok()?.peek(origin).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let bindings = RequestAccountBindings::default();
        bindings.record("https://a.example", 1);
        bindings.record("https://a.example", 7);
        assert_eq!(bindings.tab_for("https://a.example"), Some(7));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn origins_are_independent() {
        let bindings = RequestAccountBindings::default();
        bindings.record("https://a.example", 1);
        bindings.record("https://b.example", 2);
        assert_eq!(bindings.tab_for("https://a.example"), Some(1));
        assert_eq!(bindings.tab_for("https://b.example"), Some(2));
        assert_eq!(bindings.tab_for("https://c.example"), None);
    }

    #[test]
    fn least_recently_written_origin_is_evicted() {
        let bindings = RequestAccountBindings::new(2);
        bindings.record("https://a.example", 1);
        bindings.record("https://b.example", 2);
        // A read does not keep `a` alive.
        assert_eq!(bindings.tab_for("https://a.example"), Some(1));
        bindings.record("https://c.example", 3);

        assert_eq!(bindings.tab_for("https://a.example"), None);
        assert_eq!(bindings.tab_for("https://b.example"), Some(2));
        assert_eq!(bindings.tab_for("https://c.example"), Some(3));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let bindings = RequestAccountBindings::new(0);
        bindings.record("https://a.example", 1);
        assert_eq!(bindings.tab_for("https://a.example"), Some(1));
    }
}
