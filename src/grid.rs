use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::layers::SURFACE_LAYER;
use crate::structures::Facing;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layer(pub i32);

/// A single tile on a single layer. Layers stack vertically; shafts link a tile
/// to the tile with the same `(x, y)` one layer up or down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub layer: i32,
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(layer: i32, x: i32, y: i32) -> Self {
        Self { layer, x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            layer: self.layer,
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The tile a dock facing `facing` looks at.
    pub fn step(self, facing: Facing) -> Self {
        let (dx, dy, dlayer) = facing.delta();
        Self {
            layer: self.layer + dlayer,
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn position(self) -> Position {
        Position {
            x: self.x,
            y: self.y,
        }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) on layer {}", self.x, self.y, self.layer)
    }
}

/// World-space layout of the tile grid, used when drawing structures and links.
#[derive(Resource, Clone, Copy, Debug)]
pub struct Grid {
    pub cell_size: f32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cell_size: crate::constants::CELL_SIZE,
        }
    }
}

impl Grid {
    pub fn new(cell_size: f32) -> Self {
        Self { cell_size }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn grid_to_world_coordinates(&self, grid_x: i32, grid_y: i32) -> Vec2 {
        Vec2::new(grid_x as f32 * self.cell_size, grid_y as f32 * self.cell_size)
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn world_to_grid_coordinates(&self, world_position: Vec2) -> (i32, i32) {
        let scaled = world_position / self.cell_size;
        (scaled.x.round() as i32, scaled.y.round() as i32)
    }

    /// Tile under the cursor on `layer`, if the cursor is inside the window.
    pub fn cursor_tile(
        &self,
        windows: &Query<&Window>,
        camera_q: &Query<(&Camera, &GlobalTransform)>,
        layer: i32,
    ) -> Option<TileCoord> {
        let window = windows.single().ok()?;
        let (camera, camera_transform) = camera_q.single().ok()?;
        let world_position = window
            .cursor_position()
            .and_then(|cursor| camera.viewport_to_world(camera_transform, cursor).ok())
            .map(|ray| ray.origin.truncate())?;
        let (x, y) = self.world_to_grid_coordinates(world_position);
        Some(TileCoord::new(layer, x, y))
    }
}

/// The layer currently shown on screen. Structures on other layers are hidden.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleLayer(pub i32);

impl Default for VisibleLayer {
    fn default() -> Self {
        Self(SURFACE_LAYER)
    }
}

pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Grid>().init_resource::<VisibleLayer>();
    }
}
