use bevy::prelude::*;

use factory_power::{
    power::{NodeId, PowerGrid},
    systems::{Operational, Powered},
};

pub fn assert_powered(world: &World, entity: Entity) {
    let powered = world
        .get::<Powered>(entity)
        .unwrap_or_else(|| panic!("entity {entity:?} has no Powered component"));
    assert!(powered.0, "entity {entity:?} expected powered, but it is not");
}

pub fn assert_not_powered(world: &World, entity: Entity) {
    let powered = world
        .get::<Powered>(entity)
        .unwrap_or_else(|| panic!("entity {entity:?} has no Powered component"));
    assert!(!powered.0, "entity {entity:?} expected NOT powered, but it is");
}

pub fn assert_operational(world: &World, entity: Entity) {
    let operational = world
        .get::<Operational>(entity)
        .unwrap_or_else(|| panic!("entity {entity:?} has no Operational component"));
    assert!(
        operational.get_status(),
        "entity {entity:?} expected operational"
    );
}

pub fn assert_not_operational(world: &World, entity: Entity) {
    let operational = world
        .get::<Operational>(entity)
        .unwrap_or_else(|| panic!("entity {entity:?} has no Operational component"));
    assert!(
        !operational.get_status(),
        "entity {entity:?} expected NOT operational"
    );
}

pub fn assert_same_network(world: &World, a: NodeId, b: NodeId) {
    let grid = world.resource::<PowerGrid>();
    let (left, right) = (grid.network_id_of(a), grid.network_id_of(b));
    assert!(left.is_some(), "{a} belongs to no network");
    assert_eq!(left, right, "{a} and {b} expected in the same network");
}

pub fn assert_different_networks(world: &World, a: NodeId, b: NodeId) {
    let grid = world.resource::<PowerGrid>();
    assert_ne!(
        grid.network_id_of(a),
        grid.network_id_of(b),
        "{a} and {b} expected in different networks"
    );
}

pub fn assert_network_count(world: &World, expected: usize) {
    let actual = world.resource::<PowerGrid>().network_count();
    assert_eq!(actual, expected, "expected {expected} networks, found {actual}");
}

pub fn assert_partition_valid(world: &World) {
    if let Err(violation) = world.resource::<PowerGrid>().verify_partition() {
        panic!("power grid partition broken: {violation}");
    }
}
