//! Collaborator interfaces the engine consumes.
//!
//! World storage, economy backends, permissions and event vetoes all live in
//! the host. The engine only ever talks to them through the traits below, so
//! the search and resolution logic stays platform neutral.

use std::collections::HashMap;

use thiserror::Error;

use crate::block::{BlockState, VeinBlock};
use crate::key::NamespacedKey;
use crate::position::BlockPosition;

/// Read-only world access used by the allocation patterns.
///
/// Reads must be idempotent: querying the same position repeatedly during one
/// allocation returns the same answer.
pub trait BlockAccessor {
    /// The name of the world being accessed.
    fn world_name(&self) -> &str;

    /// The state of the block at `position`, or `None` when the position is
    /// not available (unloaded or outside the world). `None` never matches a
    /// vein.
    fn state(&self, position: BlockPosition) -> Option<BlockState>;

    /// The type of the block at `position`.
    fn block_type(&self, position: BlockPosition) -> Option<NamespacedKey> {
        self.state(position).map(|state| state.key().clone())
    }
}

/// An in-memory [`BlockAccessor`] over an explicit position -> state map.
///
/// Useful for tests and client-side previews; anything not inserted reads as
/// absent.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockAccessor {
    world_name: String,
    blocks: HashMap<BlockPosition, BlockState>,
}

impl MemoryBlockAccessor {
    pub fn new(world_name: impl Into<String>) -> Self {
        Self {
            world_name: world_name.into(),
            blocks: HashMap::new(),
        }
    }

    /// Sets the state at a position, replacing any previous block.
    pub fn set(&mut self, position: impl Into<BlockPosition>, state: BlockState) -> &mut Self {
        self.blocks.insert(position.into(), state);
        self
    }

    /// Sets the same state at every given position.
    pub fn fill<I>(&mut self, positions: I, state: BlockState) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<BlockPosition>,
    {
        for position in positions {
            self.blocks.insert(position.into(), state.clone());
        }
        self
    }

    /// Removes the block at a position.
    pub fn remove(&mut self, position: impl Into<BlockPosition>) -> &mut Self {
        self.blocks.remove(&position.into());
        self
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockAccessor for MemoryBlockAccessor {
    fn world_name(&self) -> &str {
        &self.world_name
    }

    fn state(&self, position: BlockPosition) -> Option<BlockState> {
        self.blocks.get(&position).cloned()
    }
}

/// Error raised by an [`Economy`] withdrawal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EconomyError {
    #[error("insufficient funds: {required} required")]
    InsufficientFunds { required: f64 },

    #[error("economy backend error: {0}")]
    Backend(String),
}

/// Economy access, bound to the player attempting the vein mine.
///
/// The host decides who is charged; a player exempt from charges reports
/// `should_charge() == false` and is never queried further.
pub trait Economy {
    /// Whether this player should be charged at all.
    fn should_charge(&self) -> bool;

    /// Whether the player can afford the given amount.
    fn has_sufficient_balance(&self, amount: f64) -> bool;

    /// Withdraws the given amount from the player's balance.
    fn withdraw(&self, amount: f64) -> Result<(), EconomyError>;
}

/// An [`Economy`] that never charges anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeEconomy;

impl Economy for FreeEconomy {
    fn should_charge(&self) -> bool {
        false
    }

    fn has_sufficient_balance(&self, _amount: f64) -> bool {
        true
    }

    fn withdraw(&self, _amount: f64) -> Result<(), EconomyError> {
        Ok(())
    }
}

/// Permission access, bound to the player attempting the vein mine.
pub trait PermissionChecker {
    fn has_permission(&self, node: &str) -> bool;
}

impl<F: Fn(&str) -> bool> PermissionChecker for F {
    fn has_permission(&self, node: &str) -> bool {
        self(node)
    }
}

/// The outcome of a [`VeinMineHook`] consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    /// Proceed with the vein mine.
    Continue,
    /// Abort: no block may be destroyed.
    Cancel,
}

/// A completed allocation, presented to the cancellation hook before any
/// destructive side effect takes place.
#[derive(Debug)]
pub struct VeinMineEvent<'a> {
    /// Every position the pattern allocated, origin included.
    pub positions: &'a [BlockPosition],
    /// The matcher the origin block resolved to.
    pub matcher: &'a VeinBlock,
    /// The id of the tool category in effect.
    pub category_id: &'a str,
    /// The key of the pattern that performed the allocation.
    pub pattern_key: &'a NamespacedKey,
}

/// Pre-destruction veto, consulted exactly once per vein mine after the
/// allocation completes.
pub trait VeinMineHook {
    fn pre_vein_mine(&self, event: &VeinMineEvent<'_>) -> HookDecision;
}

/// A [`VeinMineHook`] that always lets the vein mine proceed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl VeinMineHook for NoopHook {
    fn pre_vein_mine(&self, _event: &VeinMineEvent<'_>) -> HookDecision {
        HookDecision::Continue
    }
}
