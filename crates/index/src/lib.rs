//! # setmatch Index
//!
//! This crate provides the append-only storage layer for exact set-similarity
//! search: an item store that keeps every labeled set verbatim, and an
//! inverted index that maps each element to the items containing it.
//!
//! ## Core Features
//!
//! - **Item Store**: items are addressed by a dense [`Slot`] assigned in
//!   insertion order. The store keeps the element sequence exactly as it was
//!   supplied, along with its distinct element count, so similarity
//!   denominators can follow either [`SizePolicy`].
//! - **Inverted Index**: every distinct element of an item gets that item's
//!   slot appended to its posting list. Posting lists are created lazily and
//!   never contain the same slot twice.
//! - **Candidate Retrieval**: [`SetIndex::matches`] walks the posting lists of
//!   a query's distinct elements and counts, per candidate, how many elements
//!   it shares with the query. The cost depends only on the posting lists
//!   touched, never on the total number of stored items.
//!
//! ## Example Usage
//!
//! ```
//! use index::SetIndex;
//!
//! let mut index: SetIndex<&str, u32> = SetIndex::new();
//! index.add("a", [1, 2, 3]).unwrap();
//! index.add("b", [2, 3, 4]).unwrap();
//! index.add("c", [5, 6]).unwrap();
//!
//! let candidates = index.matches(&[1u32, 2, 3]);
//! let b = index.slot_of("b").unwrap();
//! assert_eq!(candidates.shared(b), 2);
//! assert_eq!(candidates.len(), 2); // "c" shares nothing
//! ```

mod query;
mod store;

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

use hashbrown::{HashMap, HashSet};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::query::Candidates;
pub use crate::store::Item;
use crate::store::ItemStore;

/// Dense position of an item in the store.
pub type Slot = u32;

/// Which length of an item (or query) is used as a similarity denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// Length of the element sequence as supplied, duplicates included.
    #[default]
    Supplied,
    /// Number of distinct elements, consistent with how the index counts
    /// shared elements.
    Distinct,
}

/// Config for initializing the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Size policy applied to stored items and to queries.
    #[serde(default)]
    pub size_policy: SizePolicy,
    /// Number of items to pre-allocate room for.
    #[serde(default)]
    pub capacity: usize,
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size_policy(mut self, size_policy: SizePolicy) -> Self {
        self.size_policy = size_policy;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Errors raised by the index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("identifier already exists: {0}")]
    DuplicateIdentifier(String),
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),
    #[error("index is full: at most {max} items can be stored")]
    CapacityExhausted { max: usize },
}

/// Inverted index over labeled sets.
#[derive(Debug, Clone)]
pub struct SetIndex<K, E> {
    cfg: IndexConfig,
    store: ItemStore<K, E>,
    /// element -> slots of the items containing it, in insertion order
    postings: HashMap<E, Vec<Slot>>,
}

impl<K, E> Default for SetIndex<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> SetIndex<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    pub fn with_config(cfg: IndexConfig) -> Self {
        Self {
            store: ItemStore::with_capacity(cfg.capacity),
            postings: HashMap::new(),
            cfg,
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.cfg
    }

    /// Add an item under a new identifier.
    ///
    /// The element sequence is stored verbatim; the item's slot is appended
    /// once to the posting list of each distinct element. Fails with
    /// [`IndexError::DuplicateIdentifier`] without modifying anything when the
    /// identifier is already present.
    pub fn add<I>(&mut self, id: K, item: I) -> Result<Slot, IndexError>
    where
        I: IntoIterator<Item = E>,
    {
        if self.store.slot_of(&id).is_some() {
            return Err(IndexError::DuplicateIdentifier(format!("{id:?}")));
        }
        let slot = self.store.next_slot()?;
        let elements: Vec<E> = item.into_iter().collect();

        let distinct_len = {
            let mut seen: HashSet<&E> = HashSet::with_capacity(elements.len());
            for element in &elements {
                if !seen.insert(element) {
                    continue;
                }
                match self.postings.get_mut(element) {
                    Some(slots) => slots.push(slot),
                    None => {
                        self.postings.insert(element.clone(), vec![slot]);
                    }
                }
            }
            seen.len()
        };

        debug!(
            "indexed item {id:?} at slot {slot} ({} elements, {distinct_len} distinct)",
            elements.len()
        );
        self.store.push(slot, id, elements, distinct_len);
        Ok(slot)
    }

    /// Add items in order, stopping at the first duplicate identifier.
    ///
    /// Items preceding the failing one stay in the index. Returns the number
    /// of items added.
    pub fn extend<I, S>(&mut self, items: I) -> Result<usize, IndexError>
    where
        I: IntoIterator<Item = (K, S)>,
        S: IntoIterator<Item = E>,
    {
        let mut added = 0;
        for (id, item) in items {
            self.add(id, item)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.slot_of(id).is_some()
    }

    pub fn slot_of<Q>(&self, id: &Q) -> Option<Slot>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.slot_of(id)
    }

    /// Look up the slot of a stored identifier, failing with
    /// [`IndexError::UnknownIdentifier`] when it was never added.
    pub fn resolve<Q>(&self, id: &Q) -> Result<Slot, IndexError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.store
            .slot_of(id)
            .ok_or_else(|| IndexError::UnknownIdentifier(format!("{id:?}")))
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&Item<K, E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.slot_of(id).and_then(|slot| self.store.item(slot))
    }

    pub fn item(&self, slot: Slot) -> Option<&Item<K, E>> {
        self.store.item(slot)
    }

    /// All stored items, indexed by slot.
    pub fn items(&self) -> &[Item<K, E>] {
        self.store.items()
    }

    /// Iterate stored items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item<K, E>> {
        self.store.items().iter()
    }

    /// Similarity denominator of the item at `slot` under the configured
    /// [`SizePolicy`]. Unknown slots have size zero.
    pub fn size_of(&self, slot: Slot) -> usize {
        self.store
            .item(slot)
            .map_or(0, |item| item.size(self.cfg.size_policy))
    }

    /// Posting list of `element`; empty when the element was never indexed.
    pub fn postings<Q>(&self, element: &Q) -> &[Slot]
    where
        E: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.postings.get(element).map_or(&[], Vec::as_slice)
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Number of distinct elements across all items.
    pub fn element_count(&self) -> usize {
        self.postings.len()
    }
}

impl<'a, K, E> IntoIterator for &'a SetIndex<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone,
{
    type Item = &'a Item<K, E>;
    type IntoIter = std::slice::Iter<'a, Item<K, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
