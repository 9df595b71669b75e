//! Vein mining patterns: pluggable allocation strategies.

mod default;
mod staircase;
mod tunnel;

pub use default::DefaultPattern;
pub use staircase::{StaircaseDirection, StaircasePattern};
pub use tunnel::TunnelPattern;

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::block::{BlockList, BlockState, VeinBlock};
use crate::config::VeinMiningConfig;
use crate::key::NamespacedKey;
use crate::platform::BlockAccessor;
use crate::position::{BlockFace, BlockPosition};

/// A strategy deciding which block positions a vein mine destroys.
///
/// Implementations must be deterministic for identical inputs and world
/// content, must keep all search state local to the call (allocation runs
/// re-entrantly on the event path), and must never allocate more positions
/// than [`VeinMiningConfig::vein_size_limit`] permits. Whenever the returned
/// set is non-empty it includes the origin; an empty set means the pattern
/// does not apply to this destruction and the caller falls back to breaking
/// the single block.
pub trait VeinMiningPattern: std::fmt::Debug + Send + Sync {
    /// The stable key identifying this pattern.
    fn key(&self) -> &NamespacedKey;

    /// The permission node required to use this pattern, if any.
    fn permission(&self) -> Option<&str> {
        None
    }

    /// Computes the set of positions destroyed by a vein mine starting at
    /// `origin`.
    fn allocate(
        &self,
        accessor: &dyn BlockAccessor,
        origin: BlockPosition,
        destroyed_face: BlockFace,
        origin_block: &VeinBlock,
        config: &VeinMiningConfig,
        alias_list: Option<&BlockList>,
    ) -> IndexSet<BlockPosition>;
}

/// Whether `state` belongs to the vein anchored by `origin_block`: it either
/// matches the origin's matcher or is accepted by the alias list.
pub fn matches_vein(
    origin_block: &VeinBlock,
    alias_list: Option<&BlockList>,
    state: Option<&BlockState>,
) -> bool {
    let Some(state) = state else {
        return false;
    };

    origin_block.matches_state(state, false)
        || alias_list.is_some_and(|aliases| aliases.contains_state(state))
}

/// Whether `count` positions exhaust the configured cap.
#[inline]
pub(crate) fn at_vein_size_limit(limit: Option<usize>, count: usize) -> bool {
    limit.is_some_and(|limit| count >= limit)
}

/// Error raised when mutating a [`PatternRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternRegistryError {
    /// A pattern with the same key already exists.
    #[error("a pattern with key \"{0}\" is already registered")]
    DuplicateKey(NamespacedKey),
}

/// Registry of vein mining patterns, keyed by their stable keys.
///
/// Iteration is registration order. The registry always knows a default
/// pattern to fall back to when a player has no valid selection.
#[derive(Clone)]
pub struct PatternRegistry {
    patterns: IndexMap<NamespacedKey, Arc<dyn VeinMiningPattern>>,
    default_key: NamespacedKey,
}

impl PatternRegistry {
    /// Creates a registry seeded with the given default pattern.
    pub fn new(default_pattern: Arc<dyn VeinMiningPattern>) -> Self {
        let default_key = default_pattern.key().clone();
        let mut patterns = IndexMap::new();
        patterns.insert(default_key.clone(), default_pattern);
        Self {
            patterns,
            default_key,
        }
    }

    /// Creates a registry with the built-in patterns: the default flood
    /// fill, the tunnel, and both staircases.
    pub fn with_builtin_patterns() -> Self {
        let mut registry = Self::new(Arc::new(DefaultPattern::new()));
        for pattern in [
            Arc::new(TunnelPattern::new()) as Arc<dyn VeinMiningPattern>,
            Arc::new(StaircasePattern::new(StaircaseDirection::Up)),
            Arc::new(StaircasePattern::new(StaircaseDirection::Down)),
        ] {
            // Built-in keys are distinct; registration cannot collide.
            let _ = registry.register(pattern);
        }
        registry
    }

    /// Registers a pattern. Rejects key collisions.
    pub fn register(
        &mut self,
        pattern: Arc<dyn VeinMiningPattern>,
    ) -> Result<(), PatternRegistryError> {
        let key = pattern.key().clone();
        if self.patterns.contains_key(&key) {
            return Err(PatternRegistryError::DuplicateKey(key));
        }

        self.patterns.insert(key, pattern);
        Ok(())
    }

    /// Looks a pattern up by key.
    pub fn get(&self, key: &NamespacedKey) -> Option<&Arc<dyn VeinMiningPattern>> {
        self.patterns.get(key)
    }

    /// The key of the default pattern.
    pub fn default_key(&self) -> &NamespacedKey {
        &self.default_key
    }

    /// The default pattern.
    pub fn default_pattern(&self) -> &Arc<dyn VeinMiningPattern> {
        // The constructor guarantees the default key is registered.
        &self.patterns[&self.default_key]
    }

    /// Iterates all patterns in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn VeinMiningPattern>> {
        self.patterns.values()
    }

    /// The keys of all registered patterns, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &NamespacedKey> {
        self.patterns.keys()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl std::fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRegistry")
            .field("patterns", &self.patterns.keys().collect::<Vec<_>>())
            .field("default_key", &self.default_key)
            .finish()
    }
}
