//! Staircase patterns: mine a stairway up or down into a wall.

use indexmap::IndexSet;

use crate::block::{BlockList, VeinBlock};
use crate::config::VeinMiningConfig;
use crate::key::NamespacedKey;
use crate::pattern::{at_vein_size_limit, matches_vein, VeinMiningPattern};
use crate::platform::BlockAccessor;
use crate::position::{BlockFace, BlockPosition};

/// The vertical direction a staircase pattern mines in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaircaseDirection {
    Up,
    Down,
}

impl StaircaseDirection {
    /// The y step applied between stair segments: 1 or -1.
    #[inline]
    pub const fn mod_y(self) -> i32 {
        match self {
            StaircaseDirection::Up => 1,
            StaircaseDirection::Down => -1,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            StaircaseDirection::Up => "up",
            StaircaseDirection::Down => "down",
        }
    }
}

/// Mines three-block-tall segments stepping away from the player and up or
/// down, producing a walkable staircase.
///
/// Only applicable when a wall face is destroyed; on a floor or ceiling face
/// the pattern returns an empty set and the vein mine does not apply.
#[derive(Debug, Clone)]
pub struct StaircasePattern {
    direction: StaircaseDirection,
    key: NamespacedKey,
    permission: String,
}

impl StaircasePattern {
    pub fn new(direction: StaircaseDirection) -> Self {
        let name = direction.name();
        Self {
            direction,
            key: NamespacedKey::veinminer(&format!("staircase_{name}")),
            permission: format!("veinminer.pattern.staircase_{name}"),
        }
    }

    /// The direction this staircase mines in.
    pub fn direction(&self) -> StaircaseDirection {
        self.direction
    }
}

impl VeinMiningPattern for StaircasePattern {
    fn key(&self) -> &NamespacedKey {
        &self.key
    }

    fn permission(&self) -> Option<&str> {
        Some(&self.permission)
    }

    fn allocate(
        &self,
        accessor: &dyn BlockAccessor,
        origin: BlockPosition,
        destroyed_face: BlockFace,
        origin_block: &VeinBlock,
        config: &VeinMiningConfig,
        alias_list: Option<&BlockList>,
    ) -> IndexSet<BlockPosition> {
        let mut positions = IndexSet::new();

        // Staircases can only be mined into walls.
        if destroyed_face.is_vertical() {
            return positions;
        }

        let staircase_direction = destroyed_face.opposite();
        let (step_x, _, step_z) = staircase_direction.offsets();
        let limit = config.vein_size_limit();

        let mut current = origin;
        loop {
            let mut changed = false;

            for dy in -1..=1 {
                let relative = current.offset(0, dy, 0);
                if positions.contains(&relative) {
                    continue;
                }

                let state = accessor.state(relative);
                if !matches_vein(origin_block, alias_list, state.as_ref()) {
                    continue;
                }

                positions.insert(relative);
                changed = true;

                if at_vein_size_limit(limit, positions.len()) {
                    return positions;
                }
            }

            if !changed {
                break;
            }

            current = current.offset(step_x, self.direction.mod_y(), step_z);
        }

        positions
    }
}
