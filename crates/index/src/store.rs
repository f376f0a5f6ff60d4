use std::borrow::Borrow;
use std::hash::Hash;

use hashbrown::HashMap;

use crate::{IndexError, SizePolicy, Slot};

/// A stored item: its identifier and the element sequence exactly as supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<K, E> {
    id: K,
    elements: Vec<E>,
    distinct_len: usize,
}

impl<K, E> Item<K, E> {
    pub fn id(&self) -> &K {
        &self.id
    }

    /// Elements in the order they were supplied, duplicates included.
    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    /// Length of the supplied element sequence.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of distinct elements, i.e. the number of index entries this
    /// item appears in.
    pub fn distinct_len(&self) -> usize {
        self.distinct_len
    }

    /// Size used as a similarity denominator under `policy`.
    pub fn size(&self, policy: SizePolicy) -> usize {
        match policy {
            SizePolicy::Supplied => self.len(),
            SizePolicy::Distinct => self.distinct_len,
        }
    }
}

/// Slot-addressed item storage.
///
/// Items live in a dense vector in insertion order; a slot is the item's
/// position in that vector. Slots are never reused because nothing is ever
/// removed.
#[derive(Debug, Clone)]
pub(crate) struct ItemStore<K, E> {
    items: Vec<Item<K, E>>,
    slots: HashMap<K, Slot>,
}

impl<K, E> ItemStore<K, E>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
        }
    }

    /// Reserve the next slot for `id` without touching the store.
    pub(crate) fn next_slot(&self) -> Result<Slot, IndexError> {
        Slot::try_from(self.items.len()).map_err(|_| IndexError::CapacityExhausted {
            max: Slot::MAX as usize,
        })
    }

    /// Append an item. The caller has already checked `id` is new and that
    /// `slot` came from [`ItemStore::next_slot`].
    pub(crate) fn push(&mut self, slot: Slot, id: K, elements: Vec<E>, distinct_len: usize) {
        debug_assert_eq!(slot as usize, self.items.len());
        self.slots.insert(id.clone(), slot);
        self.items.push(Item {
            id,
            elements,
            distinct_len,
        });
    }

    pub(crate) fn slot_of<Q>(&self, id: &Q) -> Option<Slot>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.slots.get(id).copied()
    }

    pub(crate) fn item(&self, slot: Slot) -> Option<&Item<K, E>> {
        self.items.get(slot as usize)
    }

    pub(crate) fn items(&self) -> &[Item<K, E>] {
        &self.items
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
