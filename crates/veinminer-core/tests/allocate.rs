//! End-to-end allocation properties over the full resolution pipeline.

use veinminer_core::{
    execute, resolve, BlockFace, BlockList, BlockPosition, BlockState, GameMode,
    MemoryBlockAccessor, NamespacedKey, PatternRegistry, FreeEconomy, NoopHook, ToolCategory,
    ToolCategoryRegistry, VeinBlock, VeinMineRequest, VeinMinerRegistry, VeinMiningConfig,
};

fn block(value: &str) -> VeinBlock {
    value.parse().expect(value)
}

fn state(value: &str) -> BlockState {
    value.parse().expect(value)
}

fn key(value: &str) -> NamespacedKey {
    value.parse().expect(value)
}

fn registry(max_vein_size: i32) -> VeinMinerRegistry {
    let mut categories = ToolCategoryRegistry::new(ToolCategory::fallback(
        BlockList::new(),
        VeinMiningConfig::default(),
    ));
    categories
        .register(ToolCategory::new(
            "pickaxe",
            [block("minecraft:coal_ore")].into_iter().collect(),
            VeinMiningConfig::builder().max_vein_size(max_vein_size).build(),
            [key("minecraft:iron_pickaxe")],
        ))
        .unwrap();

    let alias_group: BlockList = [
        block("minecraft:coal_ore"),
        block("minecraft:deepslate_coal_ore"),
    ]
    .into_iter()
    .collect();

    VeinMinerRegistry::new(BlockList::new(), VeinMiningConfig::default(), categories)
        .with_alias_group(alias_group)
}

fn mine(
    registry: &VeinMinerRegistry,
    accessor: &MemoryBlockAccessor,
) -> Vec<BlockPosition> {
    let patterns = PatternRegistry::with_builtin_patterns();
    let pickaxe = key("minecraft:iron_pickaxe");
    let origin_state = state("minecraft:coal_ore");
    let allow_all = |_: &str| true;

    let request = VeinMineRequest {
        world_name: "world",
        game_mode: GameMode::Survival,
        held_item: Some(&pickaxe),
        origin: BlockPosition::new(0, 0, 0),
        origin_state: &origin_state,
        destroyed_face: BlockFace::Up,
        selected_pattern: None,
        alias_list: None,
    };

    let resolved = resolve(registry, &patterns, &request, &allow_all).expect("resolve");
    execute(&resolved, accessor, &FreeEconomy, &NoopHook)
        .expect("execute")
        .positions
}

/// A connected component of N matching blocks with N below the cap comes
/// back complete, origin included.
#[test]
fn connectivity_returns_the_whole_component() {
    let mut accessor = MemoryBlockAccessor::new("world");
    let component = [
        (0, 0, 0),
        (1, 0, 0),
        (1, 1, 0),
        (1, 1, 1),
        (0, 1, 1),
        (0, 2, 1),
    ];
    accessor.fill(component, state("minecraft:coal_ore"));
    // Matching but disconnected.
    accessor.set((10, 0, 0), state("minecraft:coal_ore"));
    // Connected but not matching.
    accessor.set((0, 0, 1), state("minecraft:stone"));

    let positions = mine(&registry(64), &accessor);
    assert_eq!(positions.len(), component.len());
    for position in component {
        assert!(positions.contains(&BlockPosition::from(position)));
    }
    assert_eq!(positions[0], BlockPosition::new(0, 0, 0));
}

/// A component larger than the cap truncates to exactly the cap, preferring
/// positions closer to the origin in graph distance.
#[test]
fn cap_truncation_is_distance_biased() {
    let mut accessor = MemoryBlockAccessor::new("world");
    accessor.fill((0..32).map(|x| (x, 0, 0)), state("minecraft:coal_ore"));

    let positions = mine(&registry(8), &accessor);
    assert_eq!(positions.len(), 8);
    // On a straight line, graph distance equals the x coordinate: a capped
    // result must be the prefix of the line.
    for x in 0..8 {
        assert!(positions.contains(&BlockPosition::new(x, 0, 0)));
    }
}

/// Cyclic connectivity terminates and visits each position once.
#[test]
fn cyclic_worlds_terminate() {
    let mut accessor = MemoryBlockAccessor::new("world");
    // A hollow 4x4 ring in the XZ plane through the origin.
    let mut ring = Vec::new();
    for i in 0..4 {
        ring.push((i, 0, 0));
        ring.push((i, 0, 3));
        ring.push((0, 0, i));
        ring.push((3, 0, i));
    }
    accessor.fill(ring, state("minecraft:coal_ore"));

    let positions = mine(&registry(0), &accessor);
    assert_eq!(positions.len(), 12);
}

/// Aliased blocks join the vein; unrelated blocks never do.
#[test]
fn alias_union_extends_the_vein() {
    let mut accessor = MemoryBlockAccessor::new("world");
    accessor.set((0, 0, 0), state("minecraft:coal_ore"));
    accessor.set((1, 0, 0), state("minecraft:deepslate_coal_ore"));
    accessor.set((2, 0, 0), state("minecraft:coal_ore"));
    accessor.set((3, 0, 0), state("minecraft:iron_ore"));

    let positions = mine(&registry(64), &accessor);
    assert_eq!(positions.len(), 3);
    assert!(positions.contains(&BlockPosition::new(1, 0, 0)));
    assert!(!positions.contains(&BlockPosition::new(3, 0, 0)));
}

/// A four block vein comes back whole when unlimited and keeps the origin
/// plus one direct neighbor when capped at two.
#[test]
fn four_block_vein_unlimited_and_capped() {
    let mut accessor = MemoryBlockAccessor::new("world");
    accessor.fill(
        [(0, 0, 0), (1, 0, 0), (2, 0, 0), (0, 1, 0)],
        state("minecraft:coal_ore"),
    );

    let unlimited = mine(&registry(0), &accessor);
    assert_eq!(unlimited.len(), 4);

    let capped = mine(&registry(2), &accessor);
    assert_eq!(capped.len(), 2);
    assert_eq!(capped[0], BlockPosition::new(0, 0, 0));
    let neighbor = capped[1];
    assert_eq!(neighbor.distance_squared(BlockPosition::new(0, 0, 0)), 1);
}
