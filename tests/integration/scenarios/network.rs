use factory_power::{
    constants::layers::SURFACE_LAYER as S,
    grid::TileCoord,
    power::{NetworkStrength, PowerGrid},
};

use crate::harness::*;

#[test]
fn cable_line_forms_one_network() {
    let mut app = headless_app();
    for x in 0..3 {
        place(&mut app, "Cable", S, x, 0);
    }
    tick_n(&mut app, 2);

    let world = app.world();
    assert_network_count(world, 1);
    assert_eq!(world.resource::<PowerGrid>().node_count(), 3);
    assert_same_network(world, node_at(world, S, 0, 0), node_at(world, S, 2, 0));
    assert_partition_valid(world);
}

#[test]
fn removing_middle_cable_splits_the_line() {
    let mut app = headless_app();
    for x in 0..3 {
        place(&mut app, "Cable", S, x, 0);
    }
    tick_n(&mut app, 2);

    remove(&mut app, S, 1, 0);
    tick_n(&mut app, 2);

    assert!(structure_at(&mut app, TileCoord::new(S, 1, 0)).is_none());
    let world = app.world();
    assert_network_count(world, 2);
    assert_different_networks(world, node_at(world, S, 0, 0), node_at(world, S, 2, 0));
    assert_partition_valid(world);
}

#[test]
fn bridging_cable_keeps_the_larger_network() {
    let mut app = headless_app();
    place(&mut app, "Cable", S, 0, 0);
    place(&mut app, "Cable", S, 1, 0);
    place(&mut app, "Cable", S, 3, 0);
    tick_n(&mut app, 2);

    let larger = {
        let world = app.world();
        world
            .resource::<PowerGrid>()
            .network_id_of(node_at(world, S, 0, 0))
    };
    assert_network_count(app.world(), 2);

    place(&mut app, "Cable", S, 2, 0);
    tick_n(&mut app, 2);

    let world = app.world();
    assert_network_count(world, 1);
    let merged = world
        .resource::<PowerGrid>()
        .network_id_of(node_at(world, S, 3, 0));
    assert_eq!(merged, larger);
}

#[test]
fn mismatched_dock_types_stay_apart() {
    let mut app = headless_app();
    place(&mut app, "Cable", S, 0, 0);
    place(&mut app, "Power Pole", S, 1, 0);
    tick_n(&mut app, 2);

    let world = app.world();
    assert_network_count(world, 2);
    assert!(world
        .resource::<PowerGrid>()
        .find_adjacent(node_at(world, S, 0, 0))
        .is_empty());
}

#[test]
fn pole_links_use_the_pole_tier() {
    let mut app = headless_app();
    place(&mut app, "Power Pole", S, 0, 0);
    place(&mut app, "Power Pole", S, 0, 1);
    tick_n(&mut app, 2);

    let world = app.world();
    let grid = world.resource::<PowerGrid>();
    let network = grid.network_of(node_at(world, S, 0, 0)).unwrap();
    assert_eq!(network.weakest_link(), Some(NetworkStrength::PowerPole));
    assert!((network.ceiling_capacity() - 200.0).abs() < f32::EPSILON);
}

#[test]
fn occupied_tiles_reject_placement() {
    let mut app = headless_app();
    place(&mut app, "Cable", S, 0, 0);
    place(&mut app, "Power Pole", S, 0, 0);
    place(&mut app, "Conveyor", S, 1, 0);
    place(&mut app, "Conveyor", S, 1, 0);
    tick_n(&mut app, 2);

    place(&mut app, "Cable", S, 1, 0);
    tick_n(&mut app, 2);

    assert_eq!(structure_count(&mut app), 2);
    assert_eq!(app.world().resource::<PowerGrid>().node_count(), 1);
}

#[test]
fn footprint_claims_every_tile() {
    let mut app = headless_app();
    let assembler = spawn_structure(&mut app, "Assembler", S, 0, 0);
    place(&mut app, "Power Pole", S, 1, 1);
    tick_n(&mut app, 2);

    assert_eq!(structure_at(&mut app, TileCoord::new(S, 1, 1)), Some(assembler));
    assert_eq!(app.world().resource::<PowerGrid>().node_count(), 1);

    remove(&mut app, S, 1, 1);
    tick_n(&mut app, 2);
    assert_eq!(structure_count(&mut app), 0);
    assert_network_count(app.world(), 0);
}

#[test]
fn unpowered_structures_are_removed_by_tile() {
    let mut app = headless_app();
    spawn_structure(&mut app, "Conveyor", S, 4, 4);
    remove(&mut app, S, 4, 4);
    tick_n(&mut app, 2);
    assert_eq!(structure_count(&mut app), 0);
}

#[test]
fn unknown_structures_are_ignored() {
    let mut app = headless_app();
    place(&mut app, "Fusion Reactor", S, 0, 0);
    tick_n(&mut app, 2);
    assert_eq!(structure_count(&mut app), 0);
}

#[test]
fn rotation_turns_power_docks() {
    let mut app = headless_app();
    // Power dock on the east end; a quarter turn points it south of (0, -1).
    place_rotated(&mut app, "Coal Generator", S, 0, 0, 1);
    place(&mut app, "Cable", S, 0, -2);
    place(&mut app, "Cable", S, 2, 0);
    tick_n(&mut app, 2);

    let world = app.world();
    let generator = node_at(world, S, 0, -1);
    assert_eq!(generator, node_at(world, S, 0, 0));
    assert_same_network(world, generator, node_at(world, S, 0, -2));
    assert_different_networks(world, generator, node_at(world, S, 2, 0));
}

#[test]
fn ids_follow_placement_order() {
    let mut app = headless_app();
    place(&mut app, "Cable", S, 5, 0);
    place(&mut app, "Cable", S, 0, 0);
    tick_n(&mut app, 2);

    let world = app.world();
    assert!(node_at(world, S, 5, 0) < node_at(world, S, 0, 0));
}
