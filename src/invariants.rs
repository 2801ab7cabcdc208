use bevy::prelude::*;

use crate::{
    grid::{Layer, Position},
    power::PowerGrid,
    structures::{Footprint, Orientation, PowerLink, PowerNetworkChanged, Structure},
    systems::{Operational, PowerActivity, Powered},
};

pub struct InvariantPlugin;

impl Plugin for InvariantPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            (
                check_power_partition,
                check_power_links,
                check_structure_components,
                check_power_link_components,
            ),
        );
    }
}

fn report_violation(entity: Option<Entity>, message: &str) {
    let msg = match entity {
        Some(entity) => format!("INVARIANT VIOLATION [{entity:?}]: {message}"),
        None => format!("INVARIANT VIOLATION: {message}"),
    };
    if cfg!(test) {
        #[allow(clippy::panic)]
        {
            panic!("{msg}");
        }
    } else {
        error!("{msg}");
    }
}

/// Full partition check, only after frames that changed the grid.
fn check_power_partition(
    mut changes: MessageReader<PowerNetworkChanged>,
    power_grid: Res<PowerGrid>,
) {
    if changes.read().count() == 0 {
        return;
    }
    if let Err(violation) = power_grid.verify_partition() {
        report_violation(None, &violation.to_string());
    }
}

fn check_power_links(links: Query<(Entity, &PowerLink)>, power_grid: Res<PowerGrid>) {
    for (entity, link) in &links {
        if power_grid.node(link.0).is_none() {
            report_violation(
                Some(entity),
                &format!("PowerLink references unregistered {}", link.0),
            );
        }
    }
}

fn check_structure_components(
    structures: Query<
        (
            Entity,
            Has<Position>,
            Has<Layer>,
            Has<Orientation>,
            Has<Footprint>,
        ),
        With<Structure>,
    >,
) {
    for (entity, has_position, has_layer, has_orientation, has_footprint) in &structures {
        if !has_position {
            report_violation(Some(entity), "structure missing Position component");
        }
        if !has_layer {
            report_violation(Some(entity), "structure missing Layer component");
        }
        if !has_orientation {
            report_violation(Some(entity), "structure missing Orientation component");
        }
        if !has_footprint {
            report_violation(Some(entity), "structure missing Footprint component");
        }
    }
}

fn check_power_link_components(
    links: Query<(Entity, Has<PowerActivity>, Has<Powered>, Has<Operational>), With<PowerLink>>,
) {
    for (entity, has_activity, has_powered, has_operational) in &links {
        if !has_activity {
            report_violation(Some(entity), "power structure missing PowerActivity component");
        }
        if !has_powered {
            report_violation(Some(entity), "power structure missing Powered component");
        }
        if !has_operational {
            report_violation(Some(entity), "power structure missing Operational component");
        }
    }
}
