//! Optimistic updates with single-step rollback.
//!
//! A table of values keyed by row id. [`OptimisticState::apply`] writes the
//! new values immediately and hands back a [`Snapshot`] of what was there
//! before; if the backend rejects the change, [`OptimisticState::rollback`]
//! restores exactly that. There is no retry.

use std::collections::BTreeMap;

/// Prior values captured by [`OptimisticState::apply`].
///
/// `None` means the key was absent before the update.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a snapshot must be rolled back or confirmed"]
pub struct Snapshot<K, V> {
    previous: Vec<(K, Option<V>)>,
}

impl<K, V> Snapshot<K, V> {
    /// Backend accepted the change; the snapshot is no longer needed.
    pub fn confirm(self) {}

    /// Value that was in place before the update, for a single-key snapshot.
    #[must_use]
    pub fn previous_of(&self, key: &K) -> Option<&V>
    where
        K: PartialEq,
    {
        self.previous
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }
}

/// Keyed values that can be updated ahead of the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticState<K: Ord, V> {
    values: BTreeMap<K, V>,
}

impl<K: Ord, V> Default for OptimisticState<K, V> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OptimisticState<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord + Clone, V: Clone> OptimisticState<K, V> {
    /// Write one value, capturing the prior one.
    pub fn apply(self, key: K, value: V) -> (Self, Snapshot<K, V>) {
        self.apply_many([(key, value)])
    }

    /// Write several values at once, e.g. moving the primary flag between
    /// addresses. All of them are restored together on rollback.
    pub fn apply_many(
        mut self,
        updates: impl IntoIterator<Item = (K, V)>,
    ) -> (Self, Snapshot<K, V>) {
        let mut previous: Vec<(K, Option<V>)> = Vec::new();
        for (key, value) in updates {
            let prior = self.values.insert(key.clone(), value);
            // Keep only the first capture so a key updated twice rolls back
            // to the value from before this call.
            if !previous.iter().any(|(k, _)| *k == key) {
                previous.push((key, prior));
            }
        }
        (self, Snapshot { previous })
    }

    /// Remove a key, capturing its prior value.
    pub fn remove(mut self, key: K) -> (Self, Snapshot<K, V>) {
        let prior = self.values.remove(&key);
        (
            self,
            Snapshot {
                previous: vec![(key, prior)],
            },
        )
    }

    /// Undo the update that produced `snapshot`.
    #[must_use]
    pub fn rollback(mut self, snapshot: Snapshot<K, V>) -> Self {
        for (key, prior) in snapshot.previous {
            match prior {
                Some(value) => {
                    self.values.insert(key, value);
                }
                None => {
                    self.values.remove(&key);
                }
            }
        }
        self
    }

    /// Run `commit` and roll back if it fails.
    ///
    /// # Errors
    ///
    /// Returns the commit error together with the rolled-back state.
    pub fn settle<E>(self, snapshot: Snapshot<K, V>, commit: Result<(), E>) -> Result<Self, (Self, E)> {
        match commit {
            Ok(()) => {
                snapshot.confirm();
                Ok(self)
            }
            Err(e) => Err((self.rollback(snapshot), e)),
        }
    }
}

impl<K: Ord, V> OptimisticState<K, V> {
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.values.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
