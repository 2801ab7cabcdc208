use factory_power::{
    constants::layers::{SURFACE_LAYER as S, UNDERGROUND_LAYER as U},
    power::{NodeId, PowerGrid},
    systems::{RebuildPowerGrid, ResetPowerGrid},
};

use crate::harness::*;

fn partition(app: &bevy::prelude::App) -> Vec<Vec<NodeId>> {
    let mut groups: Vec<Vec<NodeId>> = app
        .world()
        .resource::<PowerGrid>()
        .networks()
        .map(|network| network.members().collect())
        .collect();
    groups.sort();
    groups
}

fn two_layer_layout(app: &mut bevy::prelude::App) {
    place(app, "Coal Generator", S, -2, 0);
    place(app, "Cable", S, 0, 0);
    place(app, "Smelter", S, 0, 1);
    place(app, "High Power Shaft", S, 5, 5);
    place(app, "Power Pole", S, 5, 6);
    place(app, "High Power Shaft", U, 5, 5);
    place(app, "Battery", U, 6, 5);
    place(app, "Cable", U, 0, 0);
    place(app, "Conveyor", S, 9, 9);
    tick_n(app, 3);
}

#[test]
fn rebuild_restores_the_same_partition() {
    let mut app = headless_app();
    two_layer_layout(&mut app);
    let before = partition(&app);
    assert_eq!(before.len(), 3);

    app.world_mut().resource_mut::<PowerGrid>().clear();
    app.world_mut().write_message(RebuildPowerGrid);
    tick(&mut app);

    assert_eq!(partition(&app), before);
    assert_partition_valid(app.world());
}

#[test]
fn rebuild_keeps_inactive_generators_inactive() {
    let mut app = headless_app();
    let generator = spawn_structure(&mut app, "Coal Generator", S, -2, 0);
    spawn_structure(&mut app, "Cable", S, 0, 0);
    set_activity(app.world_mut(), generator, false);
    tick(&mut app);

    app.world_mut().write_message(RebuildPowerGrid);
    tick(&mut app);

    let world = app.world();
    let id = node_at(world, S, -2, 0);
    assert!(!world.resource::<PowerGrid>().node(id).unwrap().is_active());
}

#[test]
fn placements_after_rebuild_get_fresh_ids() {
    let mut app = headless_app();
    two_layer_layout(&mut app);
    let highest = app
        .world()
        .resource::<PowerGrid>()
        .nodes()
        .map(|node| node.id())
        .max()
        .unwrap();

    app.world_mut().write_message(RebuildPowerGrid);
    tick(&mut app);
    place(&mut app, "Cable", S, 20, 20);
    tick(&mut app);

    assert!(node_at(app.world(), S, 20, 20) > highest);
}

#[test]
fn reset_clears_structures_and_ids() {
    let mut app = headless_app();
    two_layer_layout(&mut app);

    app.world_mut().write_message(ResetPowerGrid);
    tick(&mut app);

    assert_eq!(structure_count(&mut app), 0);
    assert_network_count(app.world(), 0);
    assert_eq!(app.world().resource::<PowerGrid>().node_count(), 0);

    place(&mut app, "Cable", S, 0, 0);
    tick(&mut app);
    assert_eq!(node_at(app.world(), S, 0, 0), NodeId(1));
}

#[test]
fn background_reader_sees_published_membership() {
    let mut app = headless_app();
    let handle = app.world().resource::<PowerGrid>().membership_handle();
    two_layer_layout(&mut app);

    let snapshot = std::thread::spawn(move || handle.snapshot())
        .join()
        .unwrap();
    assert_eq!(snapshot.networks.len(), 3);
    assert_eq!(
        snapshot.node_count(),
        app.world().resource::<PowerGrid>().node_count()
    );
    let cable = node_at(app.world(), S, 0, 0);
    assert_eq!(
        snapshot.network_of(cable),
        app.world().resource::<PowerGrid>().network_id_of(cable)
    );
}
