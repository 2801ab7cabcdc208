use serde::{Deserialize, Serialize};

use crate::constants::tiers::{CABLE_CAPACITY, HIGH_POWER_SHAFT_CAPACITY, POWER_POLE_CAPACITY};
use crate::structures::DockType;

/// Capacity tier of a link. Ordered from weakest to strongest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NetworkStrength {
    Cable,
    PowerPole,
    HighPowerShaft,
}

impl NetworkStrength {
    pub const ALL: [NetworkStrength; 3] = [
        NetworkStrength::Cable,
        NetworkStrength::PowerPole,
        NetworkStrength::HighPowerShaft,
    ];

    pub fn max_power_per_second(self) -> f32 {
        match self {
            NetworkStrength::Cable => CABLE_CAPACITY,
            NetworkStrength::PowerPole => POWER_POLE_CAPACITY,
            NetworkStrength::HighPowerShaft => HIGH_POWER_SHAFT_CAPACITY,
        }
    }

    /// Tier of the link formed where two compatible docks of `kind` meet.
    /// Vertical shaft pairs always carry the shaft tier.
    pub fn classify(kind: DockType, vertical: bool) -> Self {
        if vertical {
            NetworkStrength::HighPowerShaft
        } else if kind == DockType::BigPower {
            NetworkStrength::PowerPole
        } else {
            NetworkStrength::Cable
        }
    }
}
