use bevy::prelude::*;

use crate::{
    grid::{Grid, Layer, VisibleLayer},
    power::{NetworkStrength, PowerGrid, PowerRole},
    structures::Structure,
};

/// Debug overlay of network spanning trees, toggled with F3.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerOverlay(pub bool);

fn tier_color(strength: NetworkStrength) -> Color {
    match strength {
        NetworkStrength::Cable => Color::srgb(0.9, 0.7, 0.2),
        NetworkStrength::PowerPole => Color::srgb(0.3, 0.5, 1.0),
        NetworkStrength::HighPowerShaft => Color::srgb(0.8, 0.3, 0.9),
    }
}

pub fn sync_layer_visibility(
    visible_layer: Res<VisibleLayer>,
    mut structures: Query<(&Layer, &mut Visibility), With<Structure>>,
) {
    for (layer, mut visibility) in &mut structures {
        let wanted = if layer.0 == visible_layer.0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}

pub fn toggle_power_overlay(keyboard: Res<ButtonInput<KeyCode>>, mut overlay: ResMut<PowerOverlay>) {
    if keyboard.just_pressed(KeyCode::F3) {
        overlay.0 = !overlay.0;
        info!("Power overlay {}", if overlay.0 { "on" } else { "off" });
    }
}

pub fn draw_power_overlay(
    overlay: Res<PowerOverlay>,
    visible_layer: Res<VisibleLayer>,
    grid: Res<Grid>,
    power_grid: Res<PowerGrid>,
    mut gizmos: Gizmos,
) {
    if !overlay.0 {
        return;
    }
    let layer = visible_layer.0;

    for network in power_grid.networks() {
        for edge in network.get_spanning_tree() {
            let (Some(a), Some(b)) = (power_grid.node(edge.a), power_grid.node(edge.b)) else {
                continue;
            };
            let (from, to) = (a.origin(), b.origin());
            let color = tier_color(edge.strength);
            if from.layer == layer && to.layer == layer {
                gizmos.line_2d(
                    grid.grid_to_world_coordinates(from.x, from.y),
                    grid.grid_to_world_coordinates(to.x, to.y),
                    color,
                );
            } else if from.layer == layer || to.layer == layer {
                // Shaft link to another layer.
                let here = if from.layer == layer { from } else { to };
                gizmos.circle_2d(
                    grid.grid_to_world_coordinates(here.x, here.y),
                    grid.cell_size * 0.25,
                    color,
                );
            }
        }
    }

    for node in power_grid.nodes() {
        let origin = node.origin();
        if origin.layer != layer
            || node.is_powered()
            || !matches!(node.role(), PowerRole::Consumer { .. })
        {
            continue;
        }
        gizmos.circle_2d(
            grid.grid_to_world_coordinates(origin.x, origin.y),
            grid.cell_size * 0.4,
            Color::srgb(1.0, 0.1, 0.1),
        );
    }
}

pub struct PowerOverlayPlugin;

impl Plugin for PowerOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PowerOverlay>().add_systems(
            Update,
            (toggle_power_overlay, draw_power_overlay)
                .chain()
                .in_set(crate::GameplaySet::Display),
        );
    }
}
