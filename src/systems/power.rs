use bevy::prelude::*;

use crate::{
    constants::DEFAULT_GAME_SPEED,
    power::{PowerGrid, PowerGridError},
    structures::PowerLink,
};

/// Multiplier on simulated time. Zero pauses the power grid.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct GameSpeed(pub f32);

impl Default for GameSpeed {
    fn default() -> Self {
        Self(DEFAULT_GAME_SPEED)
    }
}

/// Set by production code: `false` for generators out of fuel and idle consumers.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerActivity(pub bool);

/// Mirror of the node's powered flag after the last settlement.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Powered(pub bool);

#[derive(Message, Clone, Debug)]
pub struct PowerGridFault {
    pub error: PowerGridError,
}

pub fn sync_power_activity(
    mut power_grid: ResMut<PowerGrid>,
    changed: Query<(&PowerLink, &PowerActivity), Changed<PowerActivity>>,
) {
    for (link, activity) in &changed {
        if let Err(err) = power_grid.set_active(link.0, activity.0) {
            warn!("Activity change for unregistered structure: {err}");
        }
    }
}

#[allow(clippy::needless_pass_by_value)] // Bevy system parameters must be passed by value
pub fn update_power_grid(
    time: Res<Time>,
    game_speed: Res<GameSpeed>,
    mut power_grid: ResMut<PowerGrid>,
) {
    power_grid.update(time.delta_secs(), game_speed.0);
}

pub fn publish_powered_status(
    power_grid: Res<PowerGrid>,
    mut structures: Query<(&PowerLink, &mut Powered)>,
) {
    for (link, mut powered) in &mut structures {
        powered.set_if_neq(Powered(power_grid.is_powered(link.0)));
    }
}

pub fn report_power_faults(mut faults: MessageReader<PowerGridFault>) {
    for fault in faults.read() {
        error!("Power grid fault: {}", fault.error);
    }
}
