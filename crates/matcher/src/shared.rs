//! Thread-safe handle around a [`Matcher`].
//!
//! Queries take a read lock and may run concurrently; inserts take the write
//! lock and are serialized. Results are cloned out before the lock is
//! released, so the `*_owned` methods never hand out borrows of the index.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use crate::engine::Matcher;
use crate::types::{MatchConfig, MatchError, MatchHit, PairHit};

pub struct SharedMatcher<K, E> {
    inner: Arc<RwLock<Matcher<K, E>>>,
}

impl<K, E> Clone for SharedMatcher<K, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, E> From<Matcher<K, E>> for SharedMatcher<K, E> {
    fn from(matcher: Matcher<K, E>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(matcher)),
        }
    }
}

impl<K, E> Default for SharedMatcher<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> SharedMatcher<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::from(Matcher::new())
    }

    /// Shared read access. A lock poisoned by a panicking writer is
    /// recovered; inserts are all-or-nothing so the matcher stays consistent.
    pub fn read(&self) -> RwLockReadGuard<'_, Matcher<K, E>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("matcher lock poisoned; recovering for read");
            poisoned.into_inner()
        })
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Matcher<K, E>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("matcher lock poisoned; recovering for write");
            poisoned.into_inner()
        })
    }

    pub fn add<I>(&self, id: K, item: I) -> Result<(), MatchError>
    where
        I: IntoIterator<Item = E>,
    {
        self.write().add(id, item)
    }

    pub fn extend<I, S>(&self, items: I) -> Result<usize, MatchError>
    where
        I: IntoIterator<Item = (K, S)>,
        S: IntoIterator<Item = E>,
    {
        self.write().extend(items)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// [`Matcher::by_id`], collected under a single read lock.
    pub fn by_id_owned<Q>(
        &self,
        id: &Q,
        cfg: &MatchConfig,
        exclude: Option<&Q>,
    ) -> Result<Vec<MatchHit<K>>, MatchError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let guard = self.read();
        let hits = guard.by_id(id, cfg, exclude)?.map(MatchHit::cloned).collect();
        Ok(hits)
    }

    /// [`Matcher::by_item`], collected under a single read lock.
    pub fn by_item_owned<'q, Q, I, X>(
        &self,
        item: I,
        cfg: &MatchConfig,
        exclude: Option<&X>,
    ) -> Result<Vec<MatchHit<K>>, MatchError>
    where
        I: IntoIterator<Item = &'q Q>,
        E: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'q,
        K: Borrow<X>,
        X: Hash + Eq + ?Sized,
    {
        let guard = self.read();
        let hits = guard
            .by_item(item, cfg, exclude)?
            .map(MatchHit::cloned)
            .collect();
        Ok(hits)
    }

    /// [`Matcher::pairwise`], collected under a single read lock.
    pub fn pairwise_owned(
        &self,
        cfg: &MatchConfig,
        self_loops: bool,
    ) -> Result<Vec<PairHit<K, K>>, MatchError> {
        let guard = self.read();
        let hits = guard
            .pairwise(cfg, self_loops)?
            .map(PairHit::cloned)
            .collect();
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn clones_share_one_matcher() -> Result<(), MatchError> {
        let shared: SharedMatcher<String, u32> = SharedMatcher::new();
        let other = shared.clone();
        shared.add("a".into(), [1, 2, 3])?;
        other.add("b".into(), [2, 3, 4])?;

        assert_eq!(shared.len(), 2);
        let hits = other.by_id_owned("a", &MatchConfig::default(), Some("a"))?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");
        Ok(())
    }

    #[test]
    fn concurrent_readers_and_writer() -> Result<(), MatchError> {
        let shared: SharedMatcher<u32, u32> = SharedMatcher::new();
        shared.extend((0..50u32).map(|id| (id, vec![id, id + 1])))?;

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for id in 50..100u32 {
                    shared.add(id, vec![id, id + 1]).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..20 {
                        let hits = shared
                            .by_item_owned(&[10u32, 11], &MatchConfig::default(), None::<&u32>)
                            .unwrap();
                        assert!(hits.iter().any(|h| h.id == 10));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(shared.len(), 100);
        let pairs = shared.pairwise_owned(&MatchConfig::default(), false)?;
        // every neighbouring pair overlaps in one element, in both directions
        assert_eq!(pairs.len(), 2 * 99);
        Ok(())
    }
}
