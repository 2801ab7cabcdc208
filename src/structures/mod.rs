pub mod docks;
pub mod placement;
pub mod registry;

pub use docks::{rotate_offset, Dock, DockType, Facing};
pub use placement::*;
pub use registry::*;

use bevy::prelude::*;

use crate::power::PowerGrid;
use crate::GameplaySet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum StructureSystemSet {
    Placement,
    Removal,
}

pub struct StructuresPlugin;

impl Plugin for StructuresPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (StructureSystemSet::Placement, StructureSystemSet::Removal)
                .chain()
                .in_set(GameplaySet::StructureChanges),
        );

        app.init_resource::<PowerGrid>()
            .init_resource::<StructureIds>()
            .add_message::<PlaceStructureRequest>()
            .add_message::<RemoveStructureRequest>()
            .add_message::<PowerNetworkChanged>()
            .add_systems(Startup, setup_registry)
            .add_systems(
                Update,
                (
                    place_structure.in_set(StructureSystemSet::Placement),
                    remove_structure.in_set(StructureSystemSet::Removal),
                ),
            );
    }
}

/// Mouse and keyboard placement, for builds with a window.
pub struct StructureInputPlugin;

impl Plugin for StructureInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectedStructure>().add_systems(
            Update,
            handle_structure_input.before(StructureSystemSet::Placement),
        );
    }
}
