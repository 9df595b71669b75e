//! Vein allocation engine.
//!
//! This crate decides, given a destroyed block and its context, exactly which
//! further block positions a vein mine destroys. It provides the block
//! matching model ([`block`]), the tool category and configuration layer
//! ([`tool`], [`config`]), the pluggable bounded graph search ([`pattern`]),
//! and the resolution pipeline gluing them together ([`resolve`]). World
//! storage, permissions, economy and event dispatch belong to the host and
//! are reached through the traits in [`platform`].

pub mod block;
pub mod config;
pub mod key;
pub mod manager;
pub mod pattern;
pub mod platform;
pub mod player;
pub mod position;
pub mod resolve;
pub mod tool;

pub use block::{BlockList, BlockParseError, BlockState, VeinBlock};
pub use config::{ClientConfig, GameMode, VeinMiningConfig, VeinMiningConfigBuilder};
pub use key::{KeyError, NamespacedKey};
pub use manager::{VeinMinerManager, VeinMinerRegistry};
pub use pattern::{
    DefaultPattern, PatternRegistry, PatternRegistryError, StaircaseDirection, StaircasePattern,
    TunnelPattern, VeinMiningPattern,
};
pub use platform::{
    BlockAccessor, Economy, EconomyError, FreeEconomy, HookDecision, MemoryBlockAccessor,
    NoopHook, PermissionChecker, VeinMineEvent, VeinMineHook,
};
pub use player::{ActivationStrategy, PlayerManager, VeinMinerPlayer};
pub use position::{BlockFace, BlockPosition};
pub use resolve::{
    execute, resolve, resolve_pattern, Denial, ResolvedVeinMine, VeinMineOutcome, VeinMineRequest,
};
pub use tool::{ToolCategory, ToolCategoryRegistry, ToolRegistryError, FALLBACK_CATEGORY_ID};
