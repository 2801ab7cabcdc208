use bevy::prelude::*;
use std::collections::HashSet;

use crate::{
    grid::{Grid, Layer, TileCoord, VisibleLayer},
    power::{NodeId, PowerGrid, PowerGridError, PowerRole},
    structures::{StructureDef, StructureRegistry},
    systems::{Operational, PowerActivity, PowerGridFault, Powered},
};

#[derive(Message, Clone, Debug)]
pub struct PlaceStructureRequest {
    pub name: String,
    pub coord: TileCoord,
    /// Clockwise quarter turns.
    pub rotation: u8,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct RemoveStructureRequest {
    pub coord: TileCoord,
}

/// Written after any structural change to the power grid.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct PowerNetworkChanged;

#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct Structure {
    pub name: String,
}

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Orientation(pub u8);

/// Every tile the structure covers.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct Footprint(pub Vec<TileCoord>);

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PowerLink(pub NodeId);

/// Hands out node ids in placement order, so ascending id means "placed earlier".
#[derive(Resource, Debug)]
pub struct StructureIds {
    next: u64,
}

impl Default for StructureIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl StructureIds {
    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Makes sure future ids are larger than `id`, e.g. after loading a save.
    pub fn observe(&mut self, id: NodeId) {
        self.next = self.next.max(id.0 + 1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Which structure the mouse places in the debug build.
#[derive(Resource, Default, Debug)]
pub struct SelectedStructure {
    pub name: Option<String>,
    pub rotation: u8,
}

pub fn handle_structure_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    grid: Res<Grid>,
    visible_layer: Res<VisibleLayer>,
    registry: Option<Res<StructureRegistry>>,
    mut selected: ResMut<SelectedStructure>,
    mut place_requests: MessageWriter<PlaceStructureRequest>,
    mut remove_requests: MessageWriter<RemoveStructureRequest>,
) {
    const DIGITS: [KeyCode; 9] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];

    if let Some(registry) = registry {
        let names = registry.names();
        for (index, key) in DIGITS.iter().enumerate() {
            if keyboard.just_pressed(*key) {
                selected.name = names.get(index).map(|name| (*name).to_string());
            }
        }
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        selected.name = None;
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        selected.rotation = (selected.rotation + 1) % 4;
    }

    let Some(coord) = grid.cursor_tile(&windows, &camera_q, visible_layer.0) else {
        return;
    };

    if mouse_button.just_pressed(MouseButton::Left) {
        if let Some(name) = &selected.name {
            place_requests.write(PlaceStructureRequest {
                name: name.clone(),
                coord,
                rotation: selected.rotation,
            });
        }
    }

    if mouse_button.just_pressed(MouseButton::Right) {
        remove_requests.write(RemoveStructureRequest { coord });
    }
}

fn structure_color(def: &StructureDef) -> Color {
    Color::srgb(def.color.0, def.color.1, def.color.2)
}

pub fn place_structure(
    mut commands: Commands,
    mut requests: MessageReader<PlaceStructureRequest>,
    registry: Option<Res<StructureRegistry>>,
    grid: Res<Grid>,
    mut power_grid: ResMut<PowerGrid>,
    mut ids: ResMut<StructureIds>,
    footprints: Query<&Footprint>,
    mut network_changed: MessageWriter<PowerNetworkChanged>,
    mut faults: MessageWriter<PowerGridFault>,
) {
    let Some(registry) = registry else {
        requests.clear();
        return;
    };
    // Unpowered structures spawned this frame are not visible to `footprints` yet.
    let mut claimed: HashSet<TileCoord> = HashSet::new();

    for request in requests.read() {
        let Some(def) = registry.get_definition(&request.name) else {
            warn!("Unknown structure '{}' requested at {}", request.name, request.coord);
            continue;
        };

        let tiles = def.tiles(request.coord, request.rotation);
        let blocked = tiles.iter().any(|tile| {
            claimed.contains(tile)
                || power_grid.occupant(*tile).is_some()
                || footprints.iter().any(|footprint| footprint.0.contains(tile))
        });
        if blocked {
            warn!("Cannot place '{}' at {}: tile occupied", def.name, request.coord);
            continue;
        }

        let world_pos = grid.grid_to_world_coordinates(request.coord.x, request.coord.y);
        let base = (
            Structure {
                name: def.name.clone(),
            },
            request.coord.position(),
            Layer(request.coord.layer),
            Orientation(request.rotation % 4),
            Footprint(tiles.clone()),
            Sprite::from_color(structure_color(def), Vec2::splat(grid.cell_size * 0.8)),
            Transform::from_xyz(world_pos.x, world_pos.y, 1.0),
        );

        let id = ids.allocate();
        let Some(node) = def.power_node(id, request.coord, request.rotation) else {
            commands.spawn(base);
            claimed.extend(tiles);
            continue;
        };
        let is_consumer = matches!(node.role(), PowerRole::Consumer { .. });

        match power_grid.register_structure(node) {
            Ok(network) => {
                debug!("Placed '{}' as {id} in {network}", def.name);
                commands.spawn((
                    base,
                    PowerLink(id),
                    PowerActivity(true),
                    Powered(false),
                    Operational(!is_consumer),
                ));
                network_changed.write(PowerNetworkChanged);
            }
            Err(PowerGridError::Invariant(violation)) => {
                error!("Placing '{}' broke the power grid: {violation}", def.name);
                faults.write(PowerGridFault {
                    error: PowerGridError::Invariant(violation),
                });
            }
            Err(err) => {
                warn!("Rejected placement of '{}': {err}", def.name);
            }
        }
    }
}

pub fn remove_structure(
    mut commands: Commands,
    mut requests: MessageReader<RemoveStructureRequest>,
    mut power_grid: ResMut<PowerGrid>,
    linked: Query<(Entity, &PowerLink)>,
    unlinked: Query<(Entity, &Footprint), Without<PowerLink>>,
    mut network_changed: MessageWriter<PowerNetworkChanged>,
    mut faults: MessageWriter<PowerGridFault>,
) {
    let mut despawned: HashSet<Entity> = HashSet::new();

    for request in requests.read() {
        if let Some(id) = power_grid.occupant(request.coord) {
            match power_grid.unregister_structure(id) {
                Ok(node) => {
                    debug!("Removed {id} ({}) at {}", node.role().label(), node.origin());
                    if let Some((entity, _)) = linked.iter().find(|(_, link)| link.0 == id) {
                        commands.entity(entity).despawn();
                        despawned.insert(entity);
                    }
                    network_changed.write(PowerNetworkChanged);
                }
                Err(err) => {
                    error!("Removing {id} broke the power grid: {err}");
                    faults.write(PowerGridFault { error: err });
                }
            }
            continue;
        }

        let found = unlinked
            .iter()
            .find(|(entity, footprint)| {
                !despawned.contains(entity) && footprint.0.contains(&request.coord)
            })
            .map(|(entity, _)| entity);
        match found {
            Some(entity) => {
                commands.entity(entity).despawn();
                despawned.insert(entity);
            }
            None => warn!("Nothing to remove at {}", request.coord),
        }
    }
}
