use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

use crate::grid::VisibleLayer;

#[derive(Component)]
pub struct GameCamera {
    pub velocity: Vec2,
    pub base_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for GameCamera {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            base_speed: 400.0,  // Pixels per second at zoom 1
            acceleration: 8.0,  // How quickly we reach target speed
            deceleration: 12.0, // How quickly we stop when no input
            min_zoom: 0.3,
            max_zoom: 3.0,
        }
    }
}

#[derive(Resource, Default)]
pub struct CameraInput {
    pub is_dragging: bool,
    pub last_mouse_position: Option<Vec2>,
}

/// Lowest and highest layer the camera can switch to.
#[derive(Resource, Clone, Copy, Debug)]
pub struct LayerRange {
    pub lowest: i32,
    pub highest: i32,
}

impl Default for LayerRange {
    fn default() -> Self {
        Self {
            lowest: crate::constants::layers::UNDERGROUND_LAYER,
            highest: crate::constants::layers::SURFACE_LAYER,
        }
    }
}

impl LayerRange {
    pub fn step(&self, layer: i32, delta: i32) -> i32 {
        (layer + delta).clamp(self.lowest, self.highest)
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, GameCamera::default()));
    commands.insert_resource(CameraInput::default());
}

fn ortho_scale(projection: &Projection) -> f32 {
    match projection {
        Projection::Orthographic(ortho) => ortho.scale,
        _ => 1.0,
    }
}

pub fn handle_camera_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut camera_query: Query<(&mut Transform, &mut GameCamera, &Projection), With<Camera2d>>,
) {
    let Ok((mut camera_transform, mut game_camera, projection)) = camera_query.single_mut() else {
        return;
    };

    let mut target_velocity = Vec2::ZERO;

    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        target_velocity.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        target_velocity.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        target_velocity.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        target_velocity.x += 1.0;
    }

    if target_velocity.length() > 0.0 {
        target_velocity = target_velocity.normalize();
    }

    // Move faster when zoomed out
    target_velocity *= game_camera.base_speed * ortho_scale(projection);

    let delta_time = time.delta_secs();
    let rate = if target_velocity.length() > 0.0 {
        game_camera.acceleration
    } else {
        game_camera.deceleration
    };
    game_camera.velocity = game_camera
        .velocity
        .lerp(target_velocity, (rate * delta_time).min(1.0));

    camera_transform.translation += game_camera.velocity.extend(0.0) * delta_time;
}

/// Middle-button drag pans the camera; the other buttons place and remove.
pub fn handle_camera_mouse_drag(
    mut camera_input: ResMut<CameraInput>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    windows: Query<&Window>,
    mut camera_query: Query<(&mut Transform, &Projection), With<Camera2d>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((mut camera_transform, projection)) = camera_query.single_mut() else {
        return;
    };

    if mouse_button.just_pressed(MouseButton::Middle) {
        camera_input.is_dragging = true;
        camera_input.last_mouse_position = window.cursor_position();
    }
    if mouse_button.just_released(MouseButton::Middle) {
        camera_input.is_dragging = false;
        camera_input.last_mouse_position = None;
    }

    if camera_input.is_dragging {
        let scale = ortho_scale(projection);
        for motion in mouse_motion.read() {
            // Dragging left moves the world left, so the camera goes right
            let world_delta = Vec2::new(-motion.delta.x, motion.delta.y) * scale;
            camera_transform.translation += world_delta.extend(0.0);
        }
    } else {
        mouse_motion.clear();
    }
}

pub fn handle_camera_zoom(
    mut mouse_wheel: MessageReader<MouseWheel>,
    mut camera_query: Query<(&mut Projection, &GameCamera), With<Camera2d>>,
) {
    let Ok((mut projection, game_camera)) = camera_query.single_mut() else {
        return;
    };
    let Projection::Orthographic(ortho) = projection.as_mut() else {
        return;
    };

    for scroll in mouse_wheel.read() {
        // Scrolling up zooms in
        let zoom_factor = 1.0 - scroll.y * 0.1;
        ortho.scale = (ortho.scale * zoom_factor).clamp(game_camera.min_zoom, game_camera.max_zoom);
    }
}

/// Page Up and Page Down move between layers.
pub fn handle_layer_switch(
    keyboard: Res<ButtonInput<KeyCode>>,
    range: Res<LayerRange>,
    mut visible_layer: ResMut<VisibleLayer>,
) {
    let delta = i32::from(keyboard.just_pressed(KeyCode::PageUp))
        - i32::from(keyboard.just_pressed(KeyCode::PageDown));
    if delta == 0 {
        return;
    }
    let layer = range.step(visible_layer.0, delta);
    if layer != visible_layer.0 {
        visible_layer.0 = layer;
        info!("Showing layer {layer}");
    }
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LayerRange>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    handle_camera_keyboard_input,
                    handle_camera_mouse_drag,
                    handle_camera_zoom,
                    handle_layer_switch.before(crate::GameplaySet::Display),
                ),
            );
    }
}
