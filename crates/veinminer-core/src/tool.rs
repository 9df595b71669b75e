//! Tool categories and their registry.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::BlockList;
use crate::config::VeinMiningConfig;
use crate::key::NamespacedKey;

/// The id of the reserved fallback category applied when a held item matches
/// no registered category (or no item is held at all).
pub const FALLBACK_CATEGORY_ID: &str = "hand";

/// A group of item types sharing a block list and config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCategory {
    id: String,
    block_list: BlockList,
    config: VeinMiningConfig,
    items: IndexSet<NamespacedKey>,
}

impl ToolCategory {
    /// Creates a category. The id is lowercased; it must be unique within a
    /// registry.
    pub fn new<I>(
        id: impl Into<String>,
        block_list: BlockList,
        config: VeinMiningConfig,
        items: I,
    ) -> Self
    where
        I: IntoIterator<Item = NamespacedKey>,
    {
        Self {
            id: id.into().to_lowercase(),
            block_list,
            config,
            items: items.into_iter().collect(),
        }
    }

    /// Creates the reserved bare-hand fallback category: no items of its own,
    /// applied when nothing else matches.
    pub fn fallback(block_list: BlockList, config: VeinMiningConfig) -> Self {
        Self::new(FALLBACK_CATEGORY_ID, block_list, config, [])
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn block_list(&self) -> &BlockList {
        &self.block_list
    }

    #[inline]
    pub fn config(&self) -> &VeinMiningConfig {
        &self.config
    }

    /// Whether the given item type belongs to this category.
    pub fn contains_item(&self, item: &NamespacedKey) -> bool {
        self.items.contains(item)
    }

    /// Adds an item type. Returns `false` if it was already present.
    pub fn add_item(&mut self, item: NamespacedKey) -> bool {
        self.items.insert(item)
    }

    /// Removes an item type. Returns `true` if it was present.
    pub fn remove_item(&mut self, item: &NamespacedKey) -> bool {
        self.items.shift_remove(item)
    }

    /// The item types of this category, in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &NamespacedKey> {
        self.items.iter()
    }

    /// The permission node required to vein mine with this category.
    pub fn permission_node(&self) -> String {
        format!("veinminer.veinmine.{}", self.id)
    }
}

/// Error raised when mutating a [`ToolCategoryRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolRegistryError {
    /// A category with the same id already exists (or collides with the
    /// fallback category).
    #[error("a tool category with id \"{0}\" is already registered")]
    DuplicateCategory(String),
}

/// Registry of tool categories, resolved by id or by held item.
///
/// Categories iterate in registration order, and item lookup returns the
/// first registered category containing the item. Unmatched items resolve to
/// the fallback category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCategoryRegistry {
    categories: IndexMap<String, ToolCategory>,
    fallback: ToolCategory,
}

impl ToolCategoryRegistry {
    /// Creates a registry with the given fallback category.
    pub fn new(fallback: ToolCategory) -> Self {
        Self {
            categories: IndexMap::new(),
            fallback,
        }
    }

    /// Registers a category. Rejects id collisions, including with the
    /// fallback category's id.
    pub fn register(&mut self, category: ToolCategory) -> Result<(), ToolRegistryError> {
        let id = category.id().to_string();
        if id == self.fallback.id() || self.categories.contains_key(&id) {
            return Err(ToolRegistryError::DuplicateCategory(id));
        }

        self.categories.insert(id, category);
        Ok(())
    }

    /// Unregisters a category by id, returning it if it existed. The
    /// fallback category cannot be unregistered.
    pub fn unregister(&mut self, id: &str) -> Option<ToolCategory> {
        self.categories.shift_remove(&id.to_lowercase())
    }

    /// Looks a category up by id. The fallback category is reachable by its
    /// own id.
    pub fn get(&self, id: &str) -> Option<&ToolCategory> {
        let id = id.to_lowercase();
        if id == self.fallback.id() {
            return Some(&self.fallback);
        }
        self.categories.get(&id)
    }

    /// Resolves the category for a held item.
    ///
    /// Categories are scanned in registration order and the first one whose
    /// item set contains the item wins; `None` (bare hand) and unmatched
    /// items resolve to the fallback category.
    pub fn category_for_item(&self, item: Option<&NamespacedKey>) -> &ToolCategory {
        let Some(item) = item else {
            return &self.fallback;
        };

        self.categories
            .values()
            .find(|category| category.contains_item(item))
            .unwrap_or(&self.fallback)
    }

    /// The fallback category.
    pub fn fallback(&self) -> &ToolCategory {
        &self.fallback
    }

    /// Iterates all categories in registration order, the fallback last.
    pub fn all(&self) -> impl Iterator<Item = &ToolCategory> {
        self.categories
            .values()
            .chain(std::iter::once(&self.fallback))
    }

    /// The number of registered categories, the fallback included.
    pub fn len(&self) -> usize {
        self.categories.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(value: &str) -> NamespacedKey {
        value.parse().expect(value)
    }

    fn category(id: &str, items: &[&str]) -> ToolCategory {
        ToolCategory::new(
            id,
            BlockList::new(),
            VeinMiningConfig::default(),
            items.iter().map(|item| key(item)),
        )
    }

    fn registry() -> ToolCategoryRegistry {
        ToolCategoryRegistry::new(ToolCategory::fallback(
            BlockList::new(),
            VeinMiningConfig::default(),
        ))
    }

    #[test]
    fn lookup_by_id_is_case_insensitive() {
        let mut registry = registry();
        registry.register(category("Pickaxe", &["minecraft:iron_pickaxe"])).unwrap();

        assert_eq!(registry.get("pickaxe").unwrap().id(), "pickaxe");
        assert_eq!(registry.get("PICKAXE").unwrap().id(), "pickaxe");
        assert_eq!(registry.get("hand").unwrap().id(), "hand");
        assert!(registry.get("axe").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = registry();
        registry.register(category("pickaxe", &[])).unwrap();

        assert_eq!(
            registry.register(category("pickaxe", &[])),
            Err(ToolRegistryError::DuplicateCategory("pickaxe".to_string()))
        );
        assert_eq!(
            registry.register(category("hand", &[])),
            Err(ToolRegistryError::DuplicateCategory("hand".to_string()))
        );
    }

    #[test]
    fn first_registered_category_wins() {
        let mut registry = registry();
        registry
            .register(category("pickaxe", &["minecraft:netherite_pickaxe"]))
            .unwrap();
        registry
            .register(category("all_tools", &["minecraft:netherite_pickaxe"]))
            .unwrap();

        let item = key("minecraft:netherite_pickaxe");
        assert_eq!(registry.category_for_item(Some(&item)).id(), "pickaxe");
    }

    #[test]
    fn unmatched_items_resolve_to_fallback() {
        let mut registry = registry();
        registry.register(category("pickaxe", &["minecraft:iron_pickaxe"])).unwrap();

        let stick = key("minecraft:stick");
        assert_eq!(registry.category_for_item(Some(&stick)).id(), "hand");
        assert_eq!(registry.category_for_item(None).id(), "hand");
    }

    #[test]
    fn iteration_is_registration_order_with_fallback_last() {
        let mut registry = registry();
        registry.register(category("pickaxe", &[])).unwrap();
        registry.register(category("axe", &[])).unwrap();

        let ids: Vec<&str> = registry.all().map(ToolCategory::id).collect();
        assert_eq!(ids, vec!["pickaxe", "axe", "hand"]);
    }
}
