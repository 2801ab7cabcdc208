use factory_power::{
    constants::layers::SURFACE_LAYER as S,
    power::PowerGrid,
    systems::GameSpeed,
};

use crate::harness::*;

#[test]
fn second_panel_brings_smelter_online() {
    let mut app = headless_app();
    spawn_structure(&mut app, "Solar Panel", S, 0, 0);
    let smelter = spawn_structure(&mut app, "Smelter", S, 0, 1);
    tick_n(&mut app, 5);

    // 20 of generation against a demand of 30.
    assert_not_powered(app.world(), smelter);
    assert_not_operational(app.world(), smelter);

    place(&mut app, "Solar Panel", S, 0, 2);
    tick_until(
        &mut app,
        10,
        |world| world.get::<factory_power::systems::Powered>(smelter).is_some_and(|p| p.0),
        "smelter should be powered by two panels",
    );
    tick(&mut app);
    assert_operational(app.world(), smelter);
}

/// Coal generator at (-2, 0) with its power dock facing a cable at (0, 0),
/// and one smelter above and one below the cable.
fn cable_fed_smelters(app: &mut bevy::prelude::App) -> (bevy::prelude::Entity, bevy::prelude::Entity) {
    spawn_structure(app, "Coal Generator", S, -2, 0);
    spawn_structure(app, "Cable", S, 0, 0);
    let first = spawn_structure(app, "Smelter", S, 0, 1);
    let second = spawn_structure(app, "Smelter", S, 0, -1);
    (first, second)
}

#[test]
fn cable_ceiling_starves_the_later_consumer() {
    let mut app = headless_app();
    let (first, second) = cable_fed_smelters(&mut app);
    tick_n(&mut app, 5);

    let world = app.world();
    assert_powered(world, first);
    assert_not_powered(world, second);
    assert_not_operational(world, second);

    let grid = world.resource::<PowerGrid>();
    let report = grid
        .network_of(node_at(world, S, 0, 0))
        .unwrap()
        .last_settlement();
    assert!((report.ceiling - 50.0).abs() < f32::EPSILON);
    assert!((report.generation - 100.0).abs() < f32::EPSILON);
    assert!(report.deficit > 0.0);
    assert_eq!(report.powered_consumers, 1);
    assert_eq!(report.unpowered_consumers, 1);
}

#[test]
fn idle_consumer_frees_power_for_the_next() {
    let mut app = headless_app();
    let (first, second) = cable_fed_smelters(&mut app);
    tick_n(&mut app, 3);

    set_activity(app.world_mut(), first, false);
    tick_n(&mut app, 3);

    let world = app.world();
    assert_powered(world, second);
    assert_operational(world, second);
    assert_not_operational(world, first);
}

/// Coal generator feeding a substation over a cable link, a battery on the
/// substation's pole side and a turned smelter on its cable side.
fn battery_backed_smelter(
    app: &mut bevy::prelude::App,
) -> (bevy::prelude::Entity, bevy::prelude::Entity) {
    let generator = spawn_structure(app, "Coal Generator", S, -2, 0);
    spawn_structure(app, "Substation", S, 0, 0);
    spawn_structure(app, "Battery", S, 0, -1);
    place_rotated(app, "Smelter", S, 1, 0, 1);
    tick(app);
    let smelter = structure_at(app, factory_power::grid::TileCoord::new(S, 1, 0))
        .unwrap_or_else(|| panic!("smelter was not placed"));
    (generator, smelter)
}

#[test]
fn battery_carries_consumer_through_outage() {
    let mut app = headless_app();
    let (generator, smelter) = battery_backed_smelter(&mut app);
    assert_network_count(app.world(), 1);

    tick_seconds(&mut app, 2.0);
    let battery = node_at(app.world(), S, 0, -1);
    let charged = storage_charge(app.world(), battery);
    // Surplus is 50 - 30 per second under the cable ceiling.
    assert!(charged > 35.0 && charged < 45.0, "charge {charged}");

    set_activity(app.world_mut(), generator, false);
    tick_seconds(&mut app, 0.5);

    assert_powered(app.world(), smelter);
    let drained = storage_charge(app.world(), battery);
    assert!(drained < charged - 10.0, "charge {drained} after outage");
}

#[test]
fn paused_game_freezes_the_grid() {
    let mut app = headless_app();
    battery_backed_smelter(&mut app);
    tick_seconds(&mut app, 1.0);

    app.world_mut().insert_resource(GameSpeed(0.0));
    let battery = node_at(app.world(), S, 0, -1);
    let before = storage_charge(app.world(), battery);
    tick_n(&mut app, 30);
    assert!((storage_charge(app.world(), battery) - before).abs() < f32::EPSILON);

    app.world_mut().insert_resource(GameSpeed(2.0));
    tick_n(&mut app, 30);
    assert!(storage_charge(app.world(), battery) > before);
}

#[test]
fn deposits_power_a_consumer_for_one_tick() {
    let mut app = headless_app();
    spawn_structure(&mut app, "Substation", S, 0, 0);
    place_rotated(&mut app, "Smelter", S, 1, 0, 1);
    tick_n(&mut app, 3);
    let smelter = structure_at(&mut app, factory_power::grid::TileCoord::new(S, 1, 0))
        .unwrap_or_else(|| panic!("smelter was not placed"));
    assert_not_powered(app.world(), smelter);

    let substation = node_at(app.world(), S, 0, 0);
    let accepted = app
        .world_mut()
        .resource_mut::<PowerGrid>()
        .accept_power(substation, 500.0)
        .unwrap();
    assert!((accepted - 200.0).abs() < f32::EPSILON);

    tick(&mut app);
    assert_powered(app.world(), smelter);

    tick(&mut app);
    assert_not_powered(app.world(), smelter);
}
