// Library target exists for integration tests only: suppress library-API lints
// that don't apply to a game crate.
#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::implicit_hasher
)]

pub mod camera;
pub mod constants;
pub mod grid;
pub mod power;
pub mod structures;
pub mod systems;

#[cfg(debug_assertions)]
pub mod invariants;

use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameplaySet {
    StructureChanges,
    PowerSettlement,
    Production,
    Display,
}

pub fn configure_system_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameplaySet::StructureChanges,
            GameplaySet::PowerSettlement,
            GameplaySet::Production,
            GameplaySet::Display,
        )
            .chain(),
    );
}
