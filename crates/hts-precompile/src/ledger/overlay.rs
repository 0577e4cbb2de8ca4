use std::collections::BTreeMap;

/// Pending writes over one ledger table.
///
/// `Some(value)` is an upsert and `None` a removal. Reads that miss the
/// overlay fall through to the caller-supplied base lookup, so the overlay
/// never holds more than what the current call touched.
#[derive(Clone, Debug)]
pub struct TransactionalLedger<K, V> {
    pending: BTreeMap<K, Option<V>>,
}

impl<K, V> Default for TransactionalLedger<K, V> {
    fn default() -> Self {
        Self {
            pending: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V: Clone> TransactionalLedger<K, V> {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `key`, consulting `base` only when the overlay has no entry.
    pub fn get_or_else(&self, key: &K, base: impl FnOnce() -> Option<V>) -> Option<V> {
        match self.pending.get(key) {
            Some(entry) => entry.clone(),
            None => base(),
        }
    }

    /// Stages an upsert.
    pub fn put(&mut self, key: K, value: V) {
        self.pending.insert(key, Some(value));
    }

    /// Stages a removal.
    pub fn remove(&mut self, key: K) {
        self.pending.insert(key, None);
    }

    /// Consumes the overlay, yielding the staged entries.
    pub fn into_changes(self) -> BTreeMap<K, Option<V>> {
        self.pending
    }
}
