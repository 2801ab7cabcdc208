pub mod tiers {
    /// Throughput of a plain cable link, in power units per second.
    pub const CABLE_CAPACITY: f32 = 50.0;
    pub const POWER_POLE_CAPACITY: f32 = 200.0;
    pub const HIGH_POWER_SHAFT_CAPACITY: f32 = 1000.0;
}

pub mod settlement {
    /// Slack used when comparing accumulated energy against a consumer's need,
    /// so that summing many small ticks does not flip a consumer off.
    pub const ENERGY_EPSILON: f32 = 1e-4;
}

pub mod layers {
    pub const SURFACE_LAYER: i32 = 0;
    pub const UNDERGROUND_LAYER: i32 = -1;
}

pub const CELL_SIZE: f32 = 64.0;

pub const DEFAULT_GAME_SPEED: f32 = 1.0;
