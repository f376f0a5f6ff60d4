//! Containment / Jaccard filtering over retrieved candidates.
//!
//! Candidate retrieval is eager (shared counts are only known once every
//! posting list has been walked), while filtering is lazy: each call to
//! `next` pulls candidates until one passes every predicate. Nothing is
//! allocated per filter stage.

use std::fmt::Debug;
use std::hash::Hash;
use std::iter::FusedIterator;

use index::{Candidates, SetIndex, Slot};

use crate::types::{MatchConfig, MatchHit, PairHit};

type CandidateIter = <Candidates as IntoIterator>::IntoIter;

/// Lazy, single-pass sequence of hits for one query.
///
/// Hit order is unspecified. Re-running the query is the only way to iterate
/// again.
pub struct Matches<'a, K, E> {
    index: &'a SetIndex<K, E>,
    candidates: CandidateIter,
    cfg: MatchConfig,
    query_len: usize,
    query_size: usize,
    exclude: Option<Slot>,
}

impl<'a, K, E> Matches<'a, K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    pub(crate) fn new(
        index: &'a SetIndex<K, E>,
        candidates: Candidates,
        cfg: MatchConfig,
        exclude: Option<Slot>,
    ) -> Self {
        let query_len = candidates.query_len();
        let query_size = candidates.query_size(index.config().size_policy);
        Self {
            index,
            candidates: candidates.into_iter(),
            cfg,
            query_len,
            query_size,
            exclude,
        }
    }

    /// Number of elements in the query as supplied.
    pub fn query_len(&self) -> usize {
        self.query_len
    }

    /// Denominator used for containment.
    pub fn query_size(&self) -> usize {
        self.query_size
    }

    /// Prefix every hit with `tag`.
    pub fn tagged<T: Clone>(self, tag: T) -> Tagged<T, Self> {
        Tagged { tag, inner: self }
    }

    fn evaluate(&self, slot: Slot, shared: usize) -> Option<MatchHit<&'a K>> {
        if self.exclude == Some(slot) {
            return None;
        }

        let containment = shared as f64 / self.query_size as f64;
        if !self.cfg.containment_min.admits_min(shared, containment)
            || !self.cfg.containment_max.admits_max(shared, containment)
        {
            return None;
        }

        // Candidate sizes are only looked up for containment survivors.
        let jaccard = if self.cfg.jaccard {
            let union = (self.query_size + self.index.size_of(slot)).saturating_sub(shared);
            let jaccard = shared as f64 / union as f64;
            if jaccard < self.cfg.jaccard_min || jaccard > self.cfg.jaccard_max {
                return None;
            }
            Some(jaccard)
        } else {
            None
        };

        let item = self.index.item(slot)?;
        Some(MatchHit {
            id: item.id(),
            shared,
            containment,
            jaccard,
        })
    }
}

impl<'a, K, E> Iterator for Matches<'a, K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    type Item = MatchHit<&'a K>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((slot, shared)) = self.candidates.next() {
            if let Some(hit) = self.evaluate(slot, shared) {
                return Some(hit);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.candidates.size_hint().1)
    }
}

impl<K, E> FusedIterator for Matches<'_, K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
}

/// Hits prefixed with a fixed query tag.
pub struct Tagged<T, I> {
    tag: T,
    inner: I,
}

impl<T, I, M> Iterator for Tagged<T, I>
where
    T: Clone,
    I: Iterator<Item = MatchHit<M>>,
{
    type Item = PairHit<T, M>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|hit| PairHit {
            query: self.tag.clone(),
            hit,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bound;
    use index::{IndexConfig, SizePolicy};

    fn seed_index(policy: SizePolicy) -> SetIndex<&'static str, u32> {
        let mut index = SetIndex::with_config(IndexConfig::new().with_size_policy(policy));
        index.add("a", [1, 2, 3]).unwrap();
        index.add("b", [2, 3, 4]).unwrap();
        index.add("big", [1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        index.add("dups", [1, 1, 1, 9]).unwrap();
        index
    }

    fn run<'a>(
        index: &'a SetIndex<&'static str, u32>,
        query: &[u32],
        cfg: MatchConfig,
        exclude: Option<Slot>,
    ) -> Vec<MatchHit<&'a &'static str>> {
        let mut hits: Vec<_> = Matches::new(index, index.matches(query), cfg, exclude).collect();
        hits.sort_by(|a, b| a.id.cmp(b.id));
        hits
    }

    #[test]
    fn containment_is_relative_to_query() {
        let index = seed_index(SizePolicy::Supplied);
        let hits = run(&index, &[1, 2, 3], MatchConfig::default(), None);

        let big = hits.iter().find(|h| *h.id == "big").unwrap();
        assert_eq!(big.containment, 1.0);
        assert_eq!(big.jaccard, Some(3.0 / 8.0));
    }

    #[test]
    fn exclusion_happens_before_bounds() {
        let index = seed_index(SizePolicy::Supplied);
        let a = index.slot_of("a");
        let hits = run(&index, &[1, 2, 3], MatchConfig::default(), a);
        assert!(hits.iter().all(|h| *h.id != "a"));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn count_bounds_use_shared_elements() {
        let index = seed_index(SizePolicy::Supplied);
        let cfg = MatchConfig::default()
            .with_containment_min(2u64)
            .with_containment_max(2u64)
            .with_jaccard(false);
        let hits = run(&index, &[1, 2, 3], cfg, None);

        let ids: Vec<&str> = hits.iter().map(|h| *h.id).collect();
        assert_eq!(ids, ["b"]);
        assert_eq!(hits[0].shared, 2);
        assert_eq!(hits[0].jaccard, None);
    }

    #[test]
    fn bounds_are_inclusive() {
        let index = seed_index(SizePolicy::Supplied);
        let cfg = MatchConfig::default()
            .with_containment_min(Bound::fraction(2.0 / 3.0))
            .with_containment_max(Bound::fraction(2.0 / 3.0))
            .with_jaccard_range(0.5, 0.5);
        let hits = run(&index, &[1, 2, 3], cfg, None);

        assert_eq!(hits.len(), 1);
        assert_eq!(*hits[0].id, "b");
    }

    #[test]
    fn size_policy_changes_jaccard_denominator() {
        let supplied = seed_index(SizePolicy::Supplied);
        let distinct = seed_index(SizePolicy::Distinct);

        let hit = run(&supplied, &[1, 9], MatchConfig::default(), None)
            .into_iter()
            .find(|h| *h.id == "dups")
            .unwrap();
        // |q| = 2, |dups| = 4 as supplied
        assert_eq!(hit.jaccard, Some(2.0 / 4.0));

        let hit = run(&distinct, &[1, 9], MatchConfig::default(), None)
            .into_iter()
            .find(|h| *h.id == "dups")
            .unwrap();
        // |dups| = 2 distinct, identical sets
        assert_eq!(hit.jaccard, Some(1.0));
    }

    #[test]
    fn tagged_prefixes_every_hit() {
        let index = seed_index(SizePolicy::Supplied);
        let tagged: Vec<_> = Matches::new(&index, index.matches(&[4u32]), MatchConfig::default(), None)
            .tagged("query-7")
            .collect();

        assert_eq!(tagged.len(), 2);
        assert!(tagged.iter().all(|p| p.query == "query-7"));
    }
}
