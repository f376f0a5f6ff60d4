use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

use hashbrown::hash_map;
use hashbrown::{HashMap, HashSet};

use crate::{SetIndex, SizePolicy, Slot};

/// Items sharing at least one element with a query, with exact shared counts.
///
/// Iteration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    counts: HashMap<Slot, usize>,
    query_len: usize,
    query_distinct_len: usize,
}

impl Candidates {
    /// Number of candidate items.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Elements shared between the query and the item at `slot`; zero for
    /// items that are not candidates.
    pub fn shared(&self, slot: Slot) -> usize {
        self.counts.get(&slot).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, usize)> + '_ {
        self.counts.iter().map(|(&slot, &count)| (slot, count))
    }

    /// Length of the query as supplied.
    pub fn query_len(&self) -> usize {
        self.query_len
    }

    /// Number of distinct query elements.
    pub fn query_distinct_len(&self) -> usize {
        self.query_distinct_len
    }

    /// Query size used as the containment denominator under `policy`.
    pub fn query_size(&self, policy: SizePolicy) -> usize {
        match policy {
            SizePolicy::Supplied => self.query_len,
            SizePolicy::Distinct => self.query_distinct_len,
        }
    }
}

impl IntoIterator for Candidates {
    type Item = (Slot, usize);
    type IntoIter = hash_map::IntoIter<Slot, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

/// Candidate retrieval
impl<K, E> SetIndex<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    /// Gather every stored item sharing at least one element with `query`.
    ///
    /// Each distinct query element contributes its posting list once, so the
    /// per-candidate count is exactly `|query ∩ item|`. Elements never seen by
    /// the index simply contribute nothing.
    pub fn matches<'q, Q, I>(&self, query: I) -> Candidates
    where
        I: IntoIterator<Item = &'q Q>,
        E: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'q,
    {
        let query = query.into_iter();
        let mut seen: HashSet<&Q> = HashSet::with_capacity(query.size_hint().0);
        let mut counts: HashMap<Slot, usize> = HashMap::new();
        let mut query_len = 0;

        for element in query {
            query_len += 1;
            if !seen.insert(element) {
                continue;
            }
            if let Some(slots) = self.postings.get(element) {
                for &slot in slots {
                    *counts.entry(slot).or_insert(0) += 1;
                }
            }
        }

        Candidates {
            counts,
            query_len,
            query_distinct_len: seen.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{IndexConfig, SetIndex, SizePolicy};

    fn seed_index() -> SetIndex<&'static str, u32> {
        let mut index = SetIndex::new();
        index.add("a", [1, 2, 3]).unwrap();
        index.add("b", [2, 3, 4]).unwrap();
        index.add("c", [5, 6]).unwrap();
        index
    }

    #[test]
    fn counts_are_exact_intersection_sizes() {
        let index = seed_index();
        let candidates = index.matches(&[1u32, 2, 3]);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates.shared(index.slot_of("a").unwrap()), 3);
        assert_eq!(candidates.shared(index.slot_of("b").unwrap()), 2);
        assert_eq!(candidates.shared(index.slot_of("c").unwrap()), 0);
    }

    #[test]
    fn repeated_query_elements_count_once() {
        let index = seed_index();
        let candidates = index.matches(&[2u32, 2, 2, 4]);

        assert_eq!(candidates.shared(index.slot_of("a").unwrap()), 1);
        assert_eq!(candidates.shared(index.slot_of("b").unwrap()), 2);
        assert_eq!(candidates.query_len(), 4);
        assert_eq!(candidates.query_distinct_len(), 2);
        assert_eq!(candidates.query_size(SizePolicy::Supplied), 4);
        assert_eq!(candidates.query_size(SizePolicy::Distinct), 2);
    }

    #[test]
    fn unknown_elements_yield_no_candidates() {
        let index = seed_index();
        assert!(index.matches(&[100u32, 200]).is_empty());
    }

    #[test]
    fn empty_index_yields_no_candidates() {
        let index: SetIndex<u32, u32> = SetIndex::with_config(IndexConfig::new());
        let candidates = index.matches(&[1u32, 2]);
        assert!(candidates.is_empty());
        assert_eq!(candidates.into_iter().count(), 0);
    }

    #[test]
    fn borrowed_query_elements_resolve_owned_keys() {
        let mut index: SetIndex<u32, String> = SetIndex::new();
        index
            .add(7, ["red".to_string(), "green".to_string()])
            .unwrap();

        let candidates = index.matches(["green", "blue"]);
        let hits: Vec<_> = candidates.iter().collect();
        assert_eq!(hits, vec![(0, 1)]);
    }
}
