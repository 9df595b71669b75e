//! The central registry and its atomically swappable snapshots.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::block::{BlockList, BlockState, VeinBlock};
use crate::config::VeinMiningConfig;
use crate::tool::{ToolCategory, ToolCategoryRegistry};

/// A complete, immutable view of everything an allocation needs to consult:
/// the global block list, the global config, the tool categories and the
/// alias groups.
///
/// Snapshots are built off to the side and installed wholesale through
/// [`VeinMinerManager::reload`]; a reader holding a snapshot never observes a
/// partially-updated registry. Invalid contents (duplicate category ids)
/// cannot reach a snapshot at all, because [`ToolCategoryRegistry::register`]
/// rejects them while the snapshot is still being assembled.
#[derive(Debug, Clone)]
pub struct VeinMinerRegistry {
    global_block_list: BlockList,
    global_config: VeinMiningConfig,
    categories: ToolCategoryRegistry,
    aliases: Vec<BlockList>,
}

impl VeinMinerRegistry {
    /// Creates a registry snapshot.
    pub fn new(
        global_block_list: BlockList,
        global_config: VeinMiningConfig,
        categories: ToolCategoryRegistry,
    ) -> Self {
        Self {
            global_block_list,
            global_config,
            categories,
            aliases: Vec::new(),
        }
    }

    /// Adds an alias group: a set of matchers treated as one vein whenever
    /// any member anchors an allocation.
    pub fn with_alias_group(mut self, group: BlockList) -> Self {
        self.aliases.push(group);
        self
    }

    /// The block list applying to every category.
    pub fn global_block_list(&self) -> &BlockList {
        &self.global_block_list
    }

    /// The config applying when no category overrides it.
    pub fn global_config(&self) -> &VeinMiningConfig {
        &self.global_config
    }

    /// The tool category registry.
    pub fn categories(&self) -> &ToolCategoryRegistry {
        &self.categories
    }

    /// Whether the given state is vein mineable with the given category.
    pub fn is_vein_mineable(&self, state: &BlockState, category: &ToolCategory) -> bool {
        self.matcher_for(state, category).is_some()
    }

    /// Resolves the matcher the given state falls under, consulting the
    /// global list first and the category's own list second.
    pub fn matcher_for<'a>(&'a self, state: &BlockState, category: &'a ToolCategory) -> Option<&'a VeinBlock> {
        self.global_block_list
            .get(state)
            .or_else(|| category.block_list().get(state))
    }

    /// The union of the global block list and the category's list: the
    /// effective list for an allocation with that category.
    pub fn effective_block_list(&self, category: &ToolCategory) -> BlockList {
        let mut list = self.global_block_list.clone();
        list.union(category.block_list());
        list
    }

    /// Every block mineable by any category, global list included.
    pub fn all_vein_mineable_blocks(&self) -> BlockList {
        let mut list = self.global_block_list.clone();
        for category in self.categories.all() {
            list.union(category.block_list());
        }
        list
    }

    /// The alias list applying to an allocation anchored at `block`: the
    /// union of every alias group containing it. `None` when no group does.
    pub fn alias_list_for(&self, block: &VeinBlock) -> Option<BlockList> {
        let mut merged: Option<BlockList> = None;

        for group in &self.aliases {
            if !group.contains(block) {
                continue;
            }
            let merged = merged.get_or_insert_with(BlockList::new);
            merged.union(group);
        }

        merged
    }
}

/// Owner of the active [`VeinMinerRegistry`] snapshot.
///
/// Reads take a cheap `Arc` clone; administrative reloads swap the entire
/// snapshot atomically, so in-flight allocations keep the registry they
/// started with.
#[derive(Debug)]
pub struct VeinMinerManager {
    registry: RwLock<Arc<VeinMinerRegistry>>,
}

impl VeinMinerManager {
    pub fn new(registry: VeinMinerRegistry) -> Self {
        Self {
            registry: RwLock::new(Arc::new(registry)),
        }
    }

    /// The current registry snapshot.
    pub fn registry(&self) -> Arc<VeinMinerRegistry> {
        Arc::clone(&self.registry.read())
    }

    /// Replaces the active registry with a freshly built one.
    pub fn reload(&self, registry: VeinMinerRegistry) {
        let categories = registry.categories().len();
        let blocks = registry.global_block_list().len();
        *self.registry.write() = Arc::new(registry);
        tracing::info!(categories, global_blocks = blocks, "registry reloaded");
    }
}
