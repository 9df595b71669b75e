//! A tunneling pattern: mines a square cross-section into the wall.

use indexmap::IndexSet;

use crate::block::{BlockList, VeinBlock};
use crate::config::VeinMiningConfig;
use crate::key::NamespacedKey;
use crate::pattern::{at_vein_size_limit, matches_vein, VeinMiningPattern};
use crate::platform::BlockAccessor;
use crate::position::{BlockFace, BlockPosition};

const DEFAULT_TUNNEL_RADIUS: i32 = 1;

/// Mines squares of `(2 * radius + 1)^2` blocks perpendicular to the
/// destroyed face, advancing away from the player one square at a time.
///
/// The tunnel depth is capped at `ceil(max_vein_size / blocks_per_square)` so
/// a thin vein cannot be abused to mine a `max_vein_size`-deep 1x1 tunnel.
#[derive(Debug, Clone)]
pub struct TunnelPattern {
    key: NamespacedKey,
    radius: i32,
}

impl TunnelPattern {
    /// Creates the pattern with the default radius of 1 (3x3 squares).
    pub fn new() -> Self {
        Self::with_radius(DEFAULT_TUNNEL_RADIUS)
    }

    /// Creates the pattern with a custom radius. Radius 0 mines a 1x1
    /// tunnel.
    pub fn with_radius(radius: i32) -> Self {
        Self {
            key: NamespacedKey::veinminer("tunnel"),
            radius: radius.max(0),
        }
    }

    fn collect_square(
        &self,
        positions: &mut IndexSet<BlockPosition>,
        accessor: &dyn BlockAccessor,
        center: BlockPosition,
        direction: BlockFace,
        origin_block: &VeinBlock,
        limit: Option<usize>,
        alias_list: Option<&BlockList>,
    ) -> bool {
        let mut changed = false;

        for first in -self.radius..=self.radius {
            for second in -self.radius..=self.radius {
                let relative = offset_in_plane(center, direction, first, second);
                if positions.contains(&relative) {
                    continue;
                }

                let state = accessor.state(relative);
                if !matches_vein(origin_block, alias_list, state.as_ref()) {
                    continue;
                }

                changed |= positions.insert(relative);
                if at_vein_size_limit(limit, positions.len()) {
                    return false;
                }
            }
        }

        changed
    }
}

impl Default for TunnelPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl VeinMiningPattern for TunnelPattern {
    fn key(&self) -> &NamespacedKey {
        &self.key
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
        let direction = destroyed_face.opposite();
        let limit = config.vein_size_limit();

        let side = (2 * self.radius + 1) as usize;
        let blocks_per_square = side * side;
        let mut remaining_depth = limit.map(|cap| cap.div_ceil(blocks_per_square));

        let mut positions = IndexSet::new();
        let mut center = origin;

        loop {
            match remaining_depth.as_mut() {
                Some(0) => break,
                Some(depth) => *depth -= 1,
                None => {}
            }

            if !self.collect_square(
                &mut positions,
                accessor,
                center,
                direction,
                origin_block,
                limit,
                alias_list,
            ) {
                break;
            }

            center = center.relative(direction);
        }

        positions
    }
}

/// Maps square coordinates onto the plane perpendicular to `direction`.
fn offset_in_plane(
    center: BlockPosition,
    direction: BlockFace,
    first: i32,
    second: i32,
) -> BlockPosition {
    match direction {
        BlockFace::West | BlockFace::East => center.offset(0, first, second),
        BlockFace::Down | BlockFace::Up => center.offset(first, 0, second),
        BlockFace::North | BlockFace::South => center.offset(first, second, 0),
    }
}
