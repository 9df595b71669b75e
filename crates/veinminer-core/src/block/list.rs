//! Mutable collections of block matchers with by-type lookup.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::block::{BlockState, VeinBlock};
use crate::key::NamespacedKey;

static WILDCARD: VeinBlock = VeinBlock::Wildcard;

/// A set of [`VeinBlock`] matchers, indexed by block type for O(1) average
/// lookup.
///
/// A type may carry several differently-stated matchers. Insertion order is
/// irrelevant to matching semantics but iteration is stable (types in
/// insertion order, matchers in insertion order within a type, the wildcard
/// last), so snapshots serialize deterministically.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    entries: IndexMap<NamespacedKey, Vec<VeinBlock>>,
    wildcard: bool,
}

impl BlockList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a matcher. Returns `false` if an equal matcher was already
    /// present.
    pub fn add(&mut self, block: VeinBlock) -> bool {
        match block.block_type() {
            Some(key) => {
                let matchers = self.entries.entry(key.clone()).or_default();
                if matchers.contains(&block) {
                    return false;
                }
                matchers.push(block);
                true
            }
            None => !std::mem::replace(&mut self.wildcard, true),
        }
    }

    /// Merges every matcher of `other` into this list.
    pub fn union(&mut self, other: &BlockList) {
        for block in other.iter() {
            self.add(block.clone());
        }
    }

    /// Removes a matcher. Returns `true` if it was present.
    pub fn remove(&mut self, block: &VeinBlock) -> bool {
        match block.block_type() {
            Some(key) => {
                let Some(matchers) = self.entries.get_mut(key) else {
                    return false;
                };
                let before = matchers.len();
                matchers.retain(|existing| existing != block);
                let removed = matchers.len() != before;
                if matchers.is_empty() {
                    self.entries.shift_remove(key);
                }
                removed
            }
            None => std::mem::replace(&mut self.wildcard, false),
        }
    }

    /// Removes every matcher registered for the given type.
    pub fn remove_type(&mut self, key: &NamespacedKey) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    /// Whether an equal matcher is present.
    pub fn contains(&self, block: &VeinBlock) -> bool {
        match block.block_type() {
            Some(key) => self
                .entries
                .get(key)
                .is_some_and(|matchers| matchers.contains(block)),
            None => self.wildcard,
        }
    }

    /// Whether any matcher would accept a block of the given type.
    pub fn contains_type(&self, key: &NamespacedKey) -> bool {
        self.wildcard
            || self
                .entries
                .get(key)
                .is_some_and(|matchers| matchers.iter().any(|block| block.matches_type(key)))
    }

    /// Whether any matcher accepts the given state.
    pub fn contains_state(&self, state: &BlockState) -> bool {
        self.get(state).is_some()
    }

    /// Whether the wildcard matcher is present.
    pub fn contains_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Returns the most specific matcher accepting `state`.
    ///
    /// State-specific matchers for the type win (first registered match
    /// first), then a type-only matcher for the type, then the wildcard.
    pub fn get(&self, state: &BlockState) -> Option<&VeinBlock> {
        let mut type_only = None;

        if let Some(matchers) = self.entries.get(state.key()) {
            for block in matchers {
                match block {
                    VeinBlock::State(_) => {
                        if block.matches_state(state, false) {
                            return Some(block);
                        }
                    }
                    VeinBlock::Type(_) => type_only = type_only.or(Some(block)),
                    VeinBlock::Wildcard => {}
                }
            }
        }

        type_only.or(self.wildcard.then_some(&WILDCARD))
    }

    /// The number of matchers in the list (the wildcard counts as one).
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum::<usize>() + usize::from(self.wildcard)
    }

    /// Whether the list holds no matchers at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && !self.wildcard
    }

    /// Removes every matcher.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.wildcard = false;
    }

    /// Iterates all matchers in stable order.
    pub fn iter(&self) -> impl Iterator<Item = &VeinBlock> {
        self.entries
            .values()
            .flatten()
            .chain(self.wildcard.then_some(&WILDCARD))
    }
}

impl PartialEq for BlockList {
    /// Set equality: insertion order does not participate.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|block| other.contains(block))
    }
}

impl Eq for BlockList {}

impl FromIterator<VeinBlock> for BlockList {
    fn from_iter<I: IntoIterator<Item = VeinBlock>>(iter: I) -> Self {
        let mut list = Self::new();
        for block in iter {
            list.add(block);
        }
        list
    }
}

impl Serialize for BlockList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for BlockList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let blocks = Vec::<VeinBlock>::deserialize(deserializer)?;
        Ok(blocks.into_iter().collect())
    }
}
