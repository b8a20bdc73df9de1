//! Integration tests for placement transforms and sub-region queries.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use schemata_core::{
    absolute_region_origin, enclosing_volume, entities_within_sub_region, reconstruct_entity_tree, spawn_tree,
    sub_region_box, transform_point, transformed_placement_position, BlockPos, EntityRecord, EntityRegistry,
    KindSpec, Mirror, Orientation, Rotation, SchematicPlacement, SimWorld, SubRegionPlacement, WorldError,
};

fn random_block(rng: &mut StdRng) -> BlockPos {
    BlockPos::new(
        rng.gen_range(-100_000..100_000),
        rng.gen_range(-64..320),
        rng.gen_range(-100_000..100_000),
    )
}

fn spawn_cow(world: &mut SimWorld, registry: &EntityRegistry, x: f64, y: f64, z: f64) {
    let tree = reconstruct_entity_tree(&EntityRecord::new("cow").with_pos(x, y, z), registry).unwrap();
    assert!(spawn_tree(tree, world).is_complete());
}

#[test]
fn test_inverse_round_trip_all_orientations() {
    let mut rng = StdRng::seed_from_u64(42);
    for orientation in Orientation::all() {
        for _ in 0..200 {
            let p = random_block(&mut rng);
            let there = transform_point(p, orientation);
            assert_eq!(transform_point(there, orientation.inverse()), p, "{orientation:?}");
        }
    }
}

#[test]
fn test_mirror_and_rotation_inverse_independently() {
    let p = BlockPos::new(7, 3, -2);
    for mirror in Mirror::ALL {
        let o = Orientation::new(mirror, Rotation::None);
        assert_eq!(transform_point(transform_point(p, o), o), p);
    }
    for rotation in Rotation::ALL {
        let o = Orientation::new(Mirror::None, rotation);
        assert_eq!(transform_point(transform_point(p, o), o.inverse()), p);
    }
}

#[test]
fn test_enclosing_volume_order_independent() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let a = random_block(&mut rng);
        let b = random_block(&mut rng);
        let bb = enclosing_volume(a, b);
        assert_eq!(bb, enclosing_volume(b, a));
        assert!(bb.contains(a) && bb.contains(b));
    }
}

#[test]
fn test_endpoint_at_origin_without_orientation() {
    let schematic = SchematicPlacement::default();
    let sub = SubRegionPlacement::new("r", BlockPos::ORIGIN);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let size = BlockPos::new(rng.gen_range(1..64), rng.gen_range(1..64), rng.gen_range(1..64));
        let end = transformed_placement_position(size.offset(-1, -1, -1), &schematic, &sub);
        assert_eq!(end, size.offset(-1, -1, -1));
    }
}

#[test]
fn test_region_box_starts_at_absolute_origin() {
    let origin = BlockPos::new(-40, 64, 12);
    let schematic = SchematicPlacement::new(origin, Orientation::new(Mirror::None, Rotation::Clockwise180));
    let sub = SubRegionPlacement::new("r", BlockPos::new(3, 1, 5));

    let bb = sub_region_box(origin, sub.position, BlockPos::new(4, 2, 6), &schematic, &sub);
    let start = absolute_region_origin(origin, sub.position, schematic.orientation);
    assert!(bb.contains(start));
    // cw180 of (3,1,5) is (-3,1,-5); the far corner adds cw180 of (3,1,5) again
    assert_eq!(bb.max(), BlockPos::new(-43, 66, 7));
    assert_eq!(bb.min(), BlockPos::new(-46, 65, 2));
}

#[test]
fn test_entities_within_sub_region() {
    let registry = EntityRegistry::from_specs([KindSpec::new("cow").with_size(0.9, 1.4)]).unwrap();
    let mut world = SimWorld::new(16);

    // Region covers blocks x 10..=13, y 64..=65, z 20..=22
    spawn_cow(&mut world, &registry, 10.5, 64.0, 20.5);
    spawn_cow(&mut world, &registry, 13.9, 65.0, 22.9);
    spawn_cow(&mut world, &registry, 30.0, 64.0, 20.5);

    let schematic = SchematicPlacement::new(BlockPos::new(10, 64, 20), Orientation::IDENTITY);
    let sub = SubRegionPlacement::new("r", BlockPos::ORIGIN);
    let found = entities_within_sub_region(
        &world,
        schematic.origin,
        sub.position,
        BlockPos::new(4, 2, 3),
        &schematic,
        &sub,
    )
    .unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn test_rotated_region_finds_rotated_entity() {
    let registry = EntityRegistry::from_specs([KindSpec::new("cow").with_size(0.5, 1.0)]).unwrap();
    let mut world = SimWorld::new(4);

    // A 1x1x8 strip along +z turns into a strip along -x under cw90
    spawn_cow(&mut world, &registry, -6.5, 0.0, 0.5);

    let sub = SubRegionPlacement::new("strip", BlockPos::ORIGIN);
    let size = BlockPos::new(1, 1, 8);
    let identity = SchematicPlacement::default();
    let rotated = SchematicPlacement::new(BlockPos::ORIGIN, Orientation::new(Mirror::None, Rotation::Clockwise90));

    let unrotated = entities_within_sub_region(&world, BlockPos::ORIGIN, sub.position, size, &identity, &sub).unwrap();
    assert!(unrotated.is_empty());

    let found = entities_within_sub_region(&world, BlockPos::ORIGIN, sub.position, size, &rotated, &sub).unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn test_query_failure_propagates() {
    let world = SimWorld::new(4).with_max_query_volume(100.0);
    let schematic = SchematicPlacement::default();
    let sub = SubRegionPlacement::new("big", BlockPos::ORIGIN);

    let result = entities_within_sub_region(&world, BlockPos::ORIGIN, sub.position, BlockPos::new(10, 10, 10), &schematic, &sub);
    assert!(matches!(result, Err(WorldError::QueryTooLarge { .. })));
}
