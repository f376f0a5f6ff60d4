use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

use index::{IndexConfig, Item, SetIndex, Slot};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::metrics::metrics_recorder;
use crate::pipeline::{Matches, Tagged};
use crate::types::{MatchConfig, MatchError, PairHit, QueryKind};


/// Set-similarity search engine over an append-only inverted index.
///
/// Queries borrow the matcher immutably and return lazy iterators, so the
/// index cannot change while a result sequence is being consumed.
#[derive(Debug, Clone)]
pub struct Matcher<K, E> {
    index: SetIndex<K, E>,
}

impl<K, E> Default for Matcher<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> From<SetIndex<K, E>> for Matcher<K, E> {
    fn from(index: SetIndex<K, E>) -> Self {
        Self { index }
    }
}

impl<K, E> Matcher<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    /// Construct an empty matcher with the default index configuration.
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Construct an empty matcher with an explicit index configuration.
    pub fn with_config(cfg: IndexConfig) -> Self {
        Self {
            index: SetIndex::with_config(cfg),
        }
    }

    pub fn index(&self) -> &SetIndex<K, E> {
        &self.index
    }

    pub fn into_index(self) -> SetIndex<K, E> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Add an item under a new identifier.
    ///
    /// Fails with [`index::IndexError::DuplicateIdentifier`] when the
    /// identifier already exists; the matcher is left unchanged in that case.
    pub fn add<I>(&mut self, id: K, item: I) -> Result<(), MatchError>
    where
        I: IntoIterator<Item = E>,
    {
        let start = Instant::now();
        let result = self
            .index
            .add(id, item)
            .map(|_| ())
            .map_err(MatchError::from);
        if let Some(recorder) = metrics_recorder() {
            recorder.record_add(start.elapsed(), result.clone());
        }
        result
    }

    /// Add items in order, stopping at the first failure.
    pub fn extend<I, S>(&mut self, items: I) -> Result<usize, MatchError>
    where
        I: IntoIterator<Item = (K, S)>,
        S: IntoIterator<Item = E>,
    {
        let mut added = 0;
        for (id, item) in items {
            self.add(id, item)?;
            added += 1;
        }
        debug!(added, total = self.len(), "extended matcher");
        Ok(added)
    }

    /// Find items similar to the stored item `id`.
    ///
    /// The item itself is a candidate like any other; pass it as `exclude` to
    /// drop the self-match.
    pub fn by_id<Q>(
        &self,
        id: &Q,
        cfg: &MatchConfig,
        exclude: Option<&Q>,
    ) -> Result<Matches<'_, K, E>, MatchError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        cfg.validate()?;
        let slot = self.index.resolve(id)?;
        let elements = self
            .index
            .item(slot)
            .map(Item::elements)
            .unwrap_or_default();
        if elements.is_empty() {
            return Err(MatchError::EmptyQuerySet);
        }
        let exclude = exclude.and_then(|ex| self.index.slot_of(ex));
        self.retrieve(QueryKind::ById, elements, cfg, exclude)
    }

    /// Find stored items similar to an arbitrary set.
    ///
    /// `exclude` names a stored identifier to drop from the results; like
    /// `by_id` it accepts any borrowed form of the key, so a bare `None` needs
    /// a type (`None::<&str>` for `String` keys). Fails with
    /// [`MatchError::EmptyQuerySet`] when `item` yields no elements.
    pub fn by_item<'q, Q, I, X>(
        &self,
        item: I,
        cfg: &MatchConfig,
        exclude: Option<&X>,
    ) -> Result<Matches<'_, K, E>, MatchError>
    where
        I: IntoIterator<Item = &'q Q>,
        E: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'q,
        K: Borrow<X>,
        X: Hash + Eq + ?Sized,
    {
        cfg.validate()?;
        let exclude = exclude.and_then(|ex| self.index.slot_of(ex));
        self.retrieve(QueryKind::ByItem, item, cfg, exclude)
    }

    /// Query every stored item against the whole index, in insertion order.
    ///
    /// Each hit is prefixed with the querying item's identifier. Self-matches
    /// are dropped unless `self_loops` is set; empty items produce no hits.
    pub fn pairwise(
        &self,
        cfg: &MatchConfig,
        self_loops: bool,
    ) -> Result<impl Iterator<Item = PairHit<&K, &K>> + '_, MatchError> {
        cfg.validate()?;
        let cfg = *cfg;
        Ok(self
            .index
            .iter()
            .enumerate()
            .flat_map(move |(slot, item)| {
                self.pairwise_item(slot as Slot, item, &cfg, self_loops)
                    .into_iter()
                    .flatten()
            }))
    }

    /// Query each `(id, set)` of an external collection against the index.
    ///
    /// Without `self_loops`, a hit whose identifier equals the query's own
    /// identifier is dropped. Empty sets produce no hits.
    pub fn pairwise_with<'a, Q, S, I>(
        &'a self,
        compare: I,
        cfg: &MatchConfig,
        self_loops: bool,
    ) -> Result<impl Iterator<Item = PairHit<Q, &'a K>> + 'a, MatchError>
    where
        I: IntoIterator<Item = (Q, S)>,
        I::IntoIter: 'a,
        Q: Borrow<K> + Clone + 'a,
        S: AsRef<[E]> + 'a,
    {
        cfg.validate()?;
        let cfg = *cfg;
        Ok(compare.into_iter().flat_map(move |(query, set)| {
            let elements = set.as_ref();
            let tagged = if elements.is_empty() {
                None
            } else {
                let exclude = if self_loops {
                    None
                } else {
                    let id: &K = query.borrow();
                    self.index.slot_of(id)
                };
                self.retrieve(QueryKind::Pairwise, elements, &cfg, exclude)
                    .ok()
                    .map(|matches| matches.tagged(query))
            };
            tagged.into_iter().flatten()
        }))
    }

    /// Parallel [`Matcher::pairwise`], materialized.
    ///
    /// Stored items are spread across the rayon pool; the order of the
    /// returned hits is unspecified.
    pub fn par_pairwise(
        &self,
        cfg: &MatchConfig,
        self_loops: bool,
    ) -> Result<Vec<PairHit<&K, &K>>, MatchError>
    where
        K: Sync,
        E: Sync,
    {
        cfg.validate()?;
        let hits: Vec<_> = self
            .index
            .items()
            .par_iter()
            .enumerate()
            .flat_map_iter(|(slot, item)| {
                self.pairwise_item(slot as Slot, item, cfg, self_loops)
                    .into_iter()
                    .flatten()
            })
            .collect();
        debug!(items = self.len(), hits = hits.len(), "parallel pairwise complete");
        Ok(hits)
    }

    fn pairwise_item<'a>(
        &'a self,
        slot: Slot,
        item: &'a Item<K, E>,
        cfg: &MatchConfig,
        self_loops: bool,
    ) -> Option<Tagged<&'a K, Matches<'a, K, E>>> {
        if item.is_empty() {
            return None;
        }
        trace!(slot, id = ?item.id(), "pairwise query");
        let exclude = if self_loops { None } else { Some(slot) };
        self.retrieve(QueryKind::Pairwise, item.elements(), cfg, exclude)
            .ok()
            .map(|matches| matches.tagged(item.id()))
    }

    fn retrieve<'q, Q, I>(
        &self,
        kind: QueryKind,
        query: I,
        cfg: &MatchConfig,
        exclude: Option<Slot>,
    ) -> Result<Matches<'_, K, E>, MatchError>
    where
        I: IntoIterator<Item = &'q Q>,
        E: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'q,
    {
        let start = Instant::now();
        let candidates = self.index.matches(query);
        let latency = start.elapsed();
        // fail before logging or recording so metrics only see real queries
        if candidates.query_len() == 0 {
            return Err(MatchError::EmptyQuerySet);
        }

        if kind != QueryKind::Pairwise {
            debug!(
                ?kind,
                query_len = candidates.query_len(),
                candidates = candidates.len(),
                "retrieved candidates"
            );
        }
        if let Some(recorder) = metrics_recorder() {
            recorder.record_query(kind, latency, candidates.len());
        }

        Ok(Matches::new(&self.index, candidates, *cfg, exclude))
    }
}
