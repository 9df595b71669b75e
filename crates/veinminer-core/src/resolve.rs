//! Resolution and execution of a vein mine attempt.
//!
//! [`resolve`] turns an event context into everything the allocation needs,
//! denying early when the world, game mode, block or permissions rule the
//! attempt out. [`execute`] then runs the pattern and walks the remaining
//! gates: economy balance, the cancellation hook (consulted exactly once,
//! after allocation and before any destructive side effect), and the final
//! withdrawal. Actual block destruction stays with the host.

use std::sync::Arc;

use thiserror::Error;

use crate::block::{BlockList, BlockState, VeinBlock};
use crate::config::{GameMode, VeinMiningConfig};
use crate::key::NamespacedKey;
use crate::manager::VeinMinerRegistry;
use crate::pattern::{PatternRegistry, VeinMiningPattern};
use crate::platform::{
    BlockAccessor, Economy, EconomyError, HookDecision, PermissionChecker, VeinMineEvent,
    VeinMineHook,
};
use crate::position::{BlockFace, BlockPosition};

/// The context of a block destruction that may become a vein mine.
#[derive(Debug)]
pub struct VeinMineRequest<'a> {
    /// The world the origin block is in.
    pub world_name: &'a str,
    /// The player's current game mode.
    pub game_mode: GameMode,
    /// The item type held by the player; `None` means the bare hand.
    pub held_item: Option<&'a NamespacedKey>,
    /// The position of the destroyed block.
    pub origin: BlockPosition,
    /// The state of the destroyed block.
    pub origin_state: &'a BlockState,
    /// The face the block was destroyed from.
    pub destroyed_face: BlockFace,
    /// The pattern the player has selected, if any.
    pub selected_pattern: Option<&'a NamespacedKey>,
    /// Extra matchers treated as part of the origin's vein for this
    /// invocation only, merged with the registry's alias groups.
    pub alias_list: Option<&'a BlockList>,
}

/// Why a vein mine attempt was denied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Denial {
    #[error("vein mining is disabled in world \"{0}\"")]
    WorldDisabled(String),

    #[error("vein mining is disabled in the current game mode")]
    GameModeDisabled(GameMode),

    #[error("block \"{0}\" is not vein mineable with the held tool")]
    BlockNotVeinMineable(String),

    #[error("missing permission \"{0}\"")]
    MissingPermission(String),

    #[error("insufficient funds to vein mine ({required} required)")]
    InsufficientFunds { required: f64 },

    #[error("economy failure: {0}")]
    Economy(#[from] EconomyError),

    #[error("vein mine was cancelled")]
    Cancelled,
}

/// A fully resolved vein mine, ready to be allocated and executed.
#[derive(Debug)]
pub struct ResolvedVeinMine {
    /// The id of the category the held item resolved to.
    pub category_id: String,
    /// The global list merged with the category's list.
    pub block_list: BlockList,
    /// The config in effect (the resolved category's).
    pub config: VeinMiningConfig,
    /// The matcher the origin block resolved to.
    pub matcher: VeinBlock,
    /// The pattern performing the allocation.
    pub pattern: Arc<dyn VeinMiningPattern>,
    /// Aliases applying to this allocation, if any.
    pub alias_list: Option<BlockList>,
    origin: BlockPosition,
    destroyed_face: BlockFace,
}

/// The result of a successful vein mine.
#[derive(Debug, Clone, PartialEq)]
pub struct VeinMineOutcome {
    /// Every allocated position in discovery order, origin first. The host
    /// destroys these (and charges drops/durability) itself.
    pub positions: Vec<BlockPosition>,
    /// The amount withdrawn from the player, if anything.
    pub charged: Option<f64>,
}

/// Resolves a destruction context against the active registry.
///
/// Returns the effective list, config, matcher and pattern on success;
/// otherwise the denial to surface to the player. No side effects occur
/// either way.
pub fn resolve(
    registry: &VeinMinerRegistry,
    patterns: &PatternRegistry,
    request: &VeinMineRequest<'_>,
    permissions: &dyn PermissionChecker,
) -> Result<ResolvedVeinMine, Denial> {
    let category = registry.categories().category_for_item(request.held_item);
    let config = category.config();

    if config.is_disabled_world(request.world_name) {
        tracing::debug!(world = request.world_name, "vein mine denied: disabled world");
        return Err(Denial::WorldDisabled(request.world_name.to_string()));
    }

    if config.is_disabled_game_mode(request.game_mode) {
        tracing::debug!(game_mode = ?request.game_mode, "vein mine denied: disabled game mode");
        return Err(Denial::GameModeDisabled(request.game_mode));
    }

    let Some(matcher) = registry.matcher_for(request.origin_state, category) else {
        return Err(Denial::BlockNotVeinMineable(request.origin_state.to_string()));
    };

    let permission_node = category.permission_node();
    if !permissions.has_permission(&permission_node) {
        tracing::debug!(permission = %permission_node, "vein mine denied: missing permission");
        return Err(Denial::MissingPermission(permission_node));
    }

    let pattern = resolve_pattern(patterns, request.selected_pattern, permissions);
    let matcher = matcher.clone();

    let mut alias_list = registry.alias_list_for(&matcher);
    if let Some(extra) = request.alias_list {
        alias_list.get_or_insert_with(BlockList::new).union(extra);
    }

    Ok(ResolvedVeinMine {
        category_id: category.id().to_string(),
        block_list: registry.effective_block_list(category),
        config: config.clone(),
        matcher,
        pattern,
        alias_list,
        origin: request.origin,
        destroyed_face: request.destroyed_face,
    })
}

/// The pattern a player actually gets: their selection when it exists and
/// they may use it, the default pattern otherwise.
pub fn resolve_pattern(
    patterns: &PatternRegistry,
    selected: Option<&NamespacedKey>,
    permissions: &dyn PermissionChecker,
) -> Arc<dyn VeinMiningPattern> {
    selected
        .and_then(|key| patterns.get(key))
        .filter(|pattern| {
            pattern
                .permission()
                .map_or(true, |node| permissions.has_permission(node))
        })
        .unwrap_or_else(|| patterns.default_pattern())
        .clone()
}

/// Runs a resolved vein mine: allocation, the economy gate and the
/// cancellation hook.
///
/// The balance is verified before the search so an unaffordable attempt has
/// no side effects at all; the withdrawal happens only after the hook lets
/// the vein mine proceed.
pub fn execute(
    resolved: &ResolvedVeinMine,
    accessor: &dyn BlockAccessor,
    economy: &dyn Economy,
    hook: &dyn VeinMineHook,
) -> Result<VeinMineOutcome, Denial> {
    let cost = resolved.config.cost();
    let charging = cost > 0.0 && economy.should_charge();
    if charging && !economy.has_sufficient_balance(cost) {
        return Err(Denial::InsufficientFunds { required: cost });
    }

    let positions: Vec<BlockPosition> = resolved
        .pattern
        .allocate(
            accessor,
            resolved.origin,
            resolved.destroyed_face,
            &resolved.matcher,
            &resolved.config,
            resolved.alias_list.as_ref(),
        )
        .into_iter()
        .collect();

    let event = VeinMineEvent {
        positions: &positions,
        matcher: &resolved.matcher,
        category_id: &resolved.category_id,
        pattern_key: resolved.pattern.key(),
    };
    if hook.pre_vein_mine(&event) == HookDecision::Cancel {
        tracing::debug!(category = %resolved.category_id, "vein mine cancelled by hook");
        return Err(Denial::Cancelled);
    }

    let charged = if charging {
        economy.withdraw(cost)?;
        Some(cost)
    } else {
        None
    };

    tracing::debug!(
        category = %resolved.category_id,
        pattern = %resolved.pattern.key(),
        blocks = positions.len(),
        "vein mine allocated"
    );

    Ok(VeinMineOutcome { positions, charged })
}
