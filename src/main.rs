use bevy::prelude::*;

use factory_power::{
    camera::CameraPlugin,
    configure_system_sets,
    constants::layers::{SURFACE_LAYER, UNDERGROUND_LAYER},
    grid::{GridPlugin, TileCoord},
    structures::{PlaceStructureRequest, StructureInputPlugin, StructuresPlugin},
    systems::{PowerOverlayPlugin, SystemsPlugin},
};

/// A small two-layer layout: coal power on the surface feeding a smelter row,
/// and a shaft pair carrying it down to an underground assembler.
fn spawn_demo_layout(mut requests: MessageWriter<PlaceStructureRequest>) {
    let surface = [
        ("Coal Generator", -3, 0, 0),
        ("Cable", -1, 0, 0),
        ("Cable", 0, 0, 0),
        ("Smelter", 1, 0, 0),
        ("Cable", 0, 1, 0),
        ("Smelter", 0, 2, 0),
        ("Solar Panel", -1, -1, 0),
        ("Substation", 0, -1, 0),
        ("Power Pole", 0, -2, 0),
        ("Battery", 1, -2, 0),
        ("High Power Shaft", 0, -3, 0),
        ("Conveyor", 2, 0, 0),
    ];
    let underground = [
        ("High Power Shaft", 0, -3, 0),
        ("Power Pole", 0, -4, 0),
        ("Assembler", 0, -6, 0),
    ];

    for (layer, layout) in [(SURFACE_LAYER, &surface[..]), (UNDERGROUND_LAYER, &underground[..])] {
        for &(name, x, y, rotation) in layout {
            requests.write(PlaceStructureRequest {
                name: name.to_string(),
                coord: TileCoord::new(layer, x, y),
                rotation,
            });
        }
    }
}

fn main() {
    let mut app = App::new();
    configure_system_sets(&mut app);
    app.add_plugins(DefaultPlugins)
        .add_plugins((
            GridPlugin,
            StructuresPlugin,
            StructureInputPlugin,
            SystemsPlugin,
            PowerOverlayPlugin,
            CameraPlugin,
        ))
        .add_systems(Startup, spawn_demo_layout);

    #[cfg(debug_assertions)]
    app.add_plugins(factory_power::invariants::InvariantPlugin);

    app.run();
}
