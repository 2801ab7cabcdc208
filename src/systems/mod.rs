pub mod display;
pub mod loading;
pub mod operational;
pub mod power;

pub use display::{
    draw_power_overlay, sync_layer_visibility, toggle_power_overlay, PowerOverlay,
    PowerOverlayPlugin,
};
pub use loading::{rebuild_power_grid, reset_power_grid, RebuildPowerGrid, ResetPowerGrid};
pub use operational::{update_operational_status, Operational};
pub use power::{
    publish_powered_status, report_power_faults, sync_power_activity, update_power_grid,
    GameSpeed, PowerActivity, PowerGridFault, Powered,
};

use bevy::prelude::*;

use crate::structures::StructureSystemSet;
use crate::GameplaySet;

pub struct SystemsPlugin;

impl Plugin for SystemsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameSpeed>()
            .add_message::<PowerGridFault>()
            .add_message::<RebuildPowerGrid>()
            .add_message::<ResetPowerGrid>()
            .add_systems(
                Update,
                (
                    (reset_power_grid, rebuild_power_grid)
                        .chain()
                        .after(StructureSystemSet::Removal)
                        .in_set(GameplaySet::StructureChanges),
                    (
                        sync_power_activity,
                        update_power_grid,
                        publish_powered_status,
                    )
                        .chain()
                        .in_set(GameplaySet::PowerSettlement),
                    update_operational_status.in_set(GameplaySet::Production),
                    (sync_layer_visibility, report_power_faults).in_set(GameplaySet::Display),
                ),
            );
    }
}
