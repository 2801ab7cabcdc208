use bevy::prelude::*;

use crate::{
    power::{PowerGrid, PowerRole},
    structures::PowerLink,
    systems::{PowerActivity, Powered},
};

/// Whether a structure may run its production step this frame.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operational(pub bool);

impl Operational {
    pub fn get_status(&self) -> bool {
        self.0
    }
}

/// Consumers need power and activity; everything else only needs activity.
pub fn update_operational_status(
    power_grid: Res<PowerGrid>,
    mut structures: Query<(&PowerLink, &PowerActivity, &Powered, &mut Operational)>,
) {
    for (link, activity, powered, mut operational) in &mut structures {
        let needs_power = power_grid
            .node(link.0)
            .is_some_and(|node| matches!(node.role(), PowerRole::Consumer { .. }));
        let status = activity.0 && (!needs_power || powered.0);
        operational.set_if_neq(Operational(status));
    }
}
