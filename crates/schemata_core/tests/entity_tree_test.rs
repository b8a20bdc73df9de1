//! Integration tests for entity tree reconstruction and spawning.

use std::collections::HashSet;

use schemata_core::{
    reconstruct_entity, reconstruct_entity_tree, spawn_tree, BuilderConfig, EntityRecord, EntityRegistry,
    EntityWorld, KindSpec, SchemataConfig, SimWorld, Tag, TreeBuilder, Vec3,
};
use uuid::Uuid;

fn registry() -> EntityRegistry {
    EntityRegistry::from_specs([
        KindSpec::new("minecart").with_size(0.98, 0.7).with_offsets(0.0625, 0.0),
        KindSpec::new("zombie").with_offsets(1.35, -0.35),
        KindSpec::new("chicken").with_size(0.4, 0.7).with_offsets(0.5, 0.0),
        KindSpec::new("item_frame").requiring("Facing"),
    ])
    .unwrap()
}

#[test]
fn test_unknown_root_kind_returns_none() {
    let record = EntityRecord::new("not_a_kind").with_passenger(EntityRecord::new("zombie"));
    assert!(reconstruct_entity_tree(&record, &registry()).is_none());
    assert!(reconstruct_entity(&record, &registry()).is_none());
}

#[test]
fn test_missing_kind_returns_none() {
    assert!(reconstruct_entity_tree(&EntityRecord::default(), &registry()).is_none());
}

#[test]
fn test_one_valid_one_invalid_passenger() {
    let record = EntityRecord::new("minecart")
        .with_passenger(EntityRecord::new("zombie"))
        .with_passenger(EntityRecord::new("item_frame"));

    let tree = reconstruct_entity_tree(&record, &registry()).unwrap();
    assert_eq!(tree.passengers().len(), 1);
    assert_eq!(tree.passengers()[0].state().kind, "zombie");
}

#[test]
fn test_invalid_passenger_keeps_later_siblings() {
    let record = EntityRecord::new("minecart")
        .with_passenger(EntityRecord::new("dragon"))
        .with_passenger(EntityRecord::new("item_frame").with_field("Facing", Tag::Int(3)))
        .with_passenger(EntityRecord::new("chicken"));

    let tree = reconstruct_entity_tree(&record, &registry()).unwrap();
    let kinds: Vec<_> = tree.passengers().iter().map(|p| p.state().kind.as_str()).collect();
    assert_eq!(kinds, ["item_frame", "chicken"]);
}

#[test]
fn test_failed_middle_insert_blocks_subtree() {
    let record = EntityRecord::new("minecart").with_passenger(
        EntityRecord::new("zombie").with_passenger(EntityRecord::new("chicken")),
    );
    let tree = reconstruct_entity_tree(&record, &registry()).unwrap();
    assert_eq!(tree.depth(), 3);

    let root_id = tree.id();
    let middle_id = tree.passengers()[0].id();
    let leaf_id = tree.passengers()[0].passengers()[0].id();

    let mut world = SimWorld::new(16);
    world.deny_kind("zombie");
    let report = spawn_tree(tree, &mut world);

    assert!(world.is_live(root_id));
    assert!(!world.is_live(middle_id));
    assert!(!world.is_live(leaf_id));
    assert_eq!(report.spawned, vec![root_id]);
    assert_eq!(report.rejected, vec![middle_id]);
    assert_eq!(report.skipped, 1);
}

#[test]
fn test_failed_root_insert_spawns_nothing() {
    let record = EntityRecord::new("minecart").with_passenger(EntityRecord::new("zombie"));
    let tree = reconstruct_entity_tree(&record, &registry()).unwrap();

    let mut world = SimWorld::new(0);
    let report = spawn_tree(tree, &mut world);
    assert!(world.is_empty());
    assert!(report.spawned.is_empty());
    assert_eq!(report.skipped, 1);
}

#[test]
fn test_spawn_stacks_riders_vertically() {
    let record = EntityRecord::new("minecart")
        .with_pos(10.5, 64.0, -3.5)
        .with_passenger(
            EntityRecord::new("zombie")
                .with_pos(999.0, 999.0, 999.0)
                .with_passenger(EntityRecord::new("chicken")),
        );
    let tree = reconstruct_entity_tree(&record, &registry()).unwrap();
    let zombie_id = tree.passengers()[0].id();
    let chicken_id = tree.passengers()[0].passengers()[0].id();

    let mut world = SimWorld::new(8);
    assert!(spawn_tree(tree, &mut world).is_complete());

    let zombie = world.get(zombie_id).unwrap().state.position;
    let chicken = world.get(chicken_id).unwrap().state.position;

    // minecart seat 0.0625, zombie rides 0.35 lower
    let expected_zombie = Vec3::new(10.5, 64.0 + 0.0625 - 0.35, -3.5);
    assert!(zombie.distance_squared(expected_zombie) < 1e-12);
    let expected_chicken = zombie.with_y_offset(1.35);
    assert!(chicken.distance_squared(expected_chicken) < 1e-12);
}

#[test]
fn test_fresh_ids_never_reuse_record_ids() {
    let registry = registry();
    let mut recorded = HashSet::new();
    let mut assigned = HashSet::new();

    for _ in 0..1000 {
        let root_uuid = Uuid::new_v4();
        let rider_uuid = Uuid::new_v4();
        recorded.insert(root_uuid);
        recorded.insert(rider_uuid);

        let record = EntityRecord::new("minecart")
            .with_uuid(root_uuid)
            .with_passenger(EntityRecord::new("zombie").with_uuid(rider_uuid));
        let tree = reconstruct_entity_tree(&record, &registry).unwrap();

        tree.for_each(&mut |node| {
            assert!(assigned.insert(node.id()));
        });
    }

    assert_eq!(assigned.len(), 2000);
    assert!(assigned.is_disjoint(&recorded));
}

#[test]
fn test_spawned_ids_are_unique_in_world() {
    let registry = registry();
    let mut world = SimWorld::new(4096);
    let stored = Uuid::new_v4();

    // Same stored UUID pasted many times must still spawn every copy
    for _ in 0..100 {
        let record = EntityRecord::new("chicken").with_uuid(stored);
        let tree = reconstruct_entity_tree(&record, &registry).unwrap();
        assert!(spawn_tree(tree, &mut world).is_complete());
    }
    assert_eq!(world.len(), 100);
    assert!(!world.is_live(stored));
}

#[test]
fn test_depth_cap_from_config() {
    let config = SchemataConfig::from_toml_str(
        r#"
        [builder]
        max_passenger_depth = 2

        [[kinds]]
        id = "zombie"
        "#,
    )
    .unwrap();
    let registry = config.build_registry().unwrap();

    let mut record = EntityRecord::new("zombie");
    for _ in 0..5 {
        record = EntityRecord::new("zombie").with_passenger(record);
    }

    let builder = TreeBuilder::with_config(&registry, config.builder);
    let tree = builder.reconstruct_tree(&record).unwrap();
    assert_eq!(tree.tree_size(), 3);

    let unlimited = TreeBuilder::with_config(&registry, BuilderConfig { max_passenger_depth: 64 });
    assert_eq!(unlimited.reconstruct_tree(&record).unwrap().tree_size(), 6);
}

#[test]
fn test_record_parsed_from_toml_round_trips_through_world() {
    let record = EntityRecord::from_toml_str(
        r#"
        id = "minecart"
        Pos = [0.5, 70, 0.5]

        [[Passengers]]
        id = "zombie"
        Rotation = [45.0, 0.0]
        "#,
    )
    .unwrap();

    let tree = reconstruct_entity_tree(&record, &registry()).unwrap();
    let mut world = SimWorld::new(8);
    spawn_tree(tree, &mut world);

    let zombie = world.iter().find(|e| e.state.kind == "zombie").unwrap();
    assert!((zombie.state.yaw - 45.0).abs() < f32::EPSILON);
    assert!(zombie.vehicle.is_some());

    // Moving a live entity does not touch its rider
    let cart_id = zombie.vehicle.unwrap();
    assert!(world.reposition(cart_id, Vec3::new(5.0, 5.0, 5.0)));
}
