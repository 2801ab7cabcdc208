use bevy::prelude::*;

use crate::{
    grid::{Layer, Position, TileCoord},
    power::{PowerGrid, PowerNode},
    structures::{
        Orientation, PowerLink, PowerNetworkChanged, Structure, StructureIds, StructureRegistry,
    },
    systems::{PowerActivity, PowerGridFault},
};

/// Rebuilds the power grid from every live structure, as after loading a save.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct RebuildPowerGrid;

/// Drops every structure and the whole power grid, as when starting a new game.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct ResetPowerGrid;

pub fn reset_power_grid(
    mut commands: Commands,
    mut requests: MessageReader<ResetPowerGrid>,
    mut power_grid: ResMut<PowerGrid>,
    mut ids: ResMut<StructureIds>,
    structures: Query<Entity, With<Structure>>,
) {
    if requests.read().count() == 0 {
        return;
    }
    for entity in &structures {
        commands.entity(entity).despawn();
    }
    power_grid.clear();
    ids.reset();
    info!("Power grid reset");
}

pub fn rebuild_power_grid(
    mut requests: MessageReader<RebuildPowerGrid>,
    registry: Option<Res<StructureRegistry>>,
    mut power_grid: ResMut<PowerGrid>,
    mut ids: ResMut<StructureIds>,
    structures: Query<(
        &Structure,
        &Position,
        &Layer,
        &Orientation,
        &PowerLink,
        Option<&PowerActivity>,
    )>,
    mut network_changed: MessageWriter<PowerNetworkChanged>,
    mut faults: MessageWriter<PowerGridFault>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let Some(registry) = registry else {
        warn!("Cannot rebuild the power grid before structure definitions are loaded");
        return;
    };

    let mut nodes: Vec<PowerNode> = Vec::new();
    for (structure, position, layer, orientation, link, activity) in &structures {
        let origin = TileCoord::new(layer.0, position.x, position.y);
        let Some(mut node) = registry
            .get_definition(&structure.name)
            .and_then(|def| def.power_node(link.0, origin, orientation.0))
        else {
            warn!("'{}' at {origin} no longer has a power role", structure.name);
            continue;
        };
        if let Some(activity) = activity {
            node.set_active(activity.0);
        }
        ids.observe(link.0);
        nodes.push(node);
    }

    match power_grid.load_structures(nodes) {
        Ok(_) => {
            network_changed.write(PowerNetworkChanged);
        }
        Err(err) => {
            faults.write(PowerGridFault { error: err });
        }
    }
}
