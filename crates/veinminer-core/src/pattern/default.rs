//! The default vein mining pattern: a bounded flood fill.

use indexmap::IndexSet;

use crate::block::{BlockList, VeinBlock};
use crate::config::VeinMiningConfig;
use crate::key::NamespacedKey;
use crate::pattern::{at_vein_size_limit, matches_vein, VeinMiningPattern};
use crate::platform::BlockAccessor;
use crate::position::{BlockFace, BlockPosition};

use std::collections::VecDeque;

/// Breadth-first flood fill over the six axis-aligned neighbors.
///
/// Breadth-first order gives distance-biased truncation when the vein size
/// cap is hit: positions closer to the origin are always kept in preference
/// to farther ones. The visited set (the result set itself) guarantees
/// termination on cyclic connectivity.
#[derive(Debug, Clone)]
pub struct DefaultPattern {
    key: NamespacedKey,
}

impl DefaultPattern {
    pub fn new() -> Self {
        Self {
            key: NamespacedKey::veinminer("default"),
        }
    }
}

impl Default for DefaultPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl VeinMiningPattern for DefaultPattern {
    fn key(&self) -> &NamespacedKey {
        &self.key
    }

    fn allocate(
        &self,
        accessor: &dyn BlockAccessor,
        origin: BlockPosition,
        _destroyed_face: BlockFace,
        origin_block: &VeinBlock,
        config: &VeinMiningConfig,
        alias_list: Option<&BlockList>,
    ) -> IndexSet<BlockPosition> {
        let limit = config.vein_size_limit();

        let mut positions = IndexSet::new();
        positions.insert(origin);

        let mut frontier = VecDeque::new();
        frontier.push_back(origin);

        while let Some(current) = frontier.pop_front() {
            if at_vein_size_limit(limit, positions.len()) {
                break;
            }

            for face in BlockFace::ALL {
                let neighbor = current.relative(face);
                if positions.contains(&neighbor) {
                    continue;
                }

                let state = accessor.state(neighbor);
                if !matches_vein(origin_block, alias_list, state.as_ref()) {
                    continue;
                }

                positions.insert(neighbor);
                frontier.push_back(neighbor);

                if at_vein_size_limit(limit, positions.len()) {
                    return positions;
                }
            }
        }

        positions
    }
}
