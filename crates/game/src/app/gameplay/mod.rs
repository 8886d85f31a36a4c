use std::fs;
use std::path::Path;

use engine::{
    Camera, Facing, GameWorld, InputAction, InputSnapshot, PlayerVisual, Scene, SceneCommand,
    TileGrid, Vec2, Viewport,
};
use serde::Deserialize;
use tracing::{info, warn};

/// Kinematics constants are expressed in pixels per 60 Hz reference frame;
/// `delta` rescales them when the simulation runs at another tick rate.
const REFERENCE_FRAME_RATE: f32 = 60.0;
const PLAYER_SPAWN: Vec2 = Vec2 { x: 30.0, y: 50.0 };
const TILE_FALLBACK_SIZE: f32 = 16.0;
const RESTART_COOLDOWN_SECONDS: f32 = 1.0;
const TUNING_FILE_NAME: &str = "tuning.json";
const ENDED_TITLE: &str = "Tile Runner: fell out of the world, press R to restart";

include!("types.rs");
include!("physics.rs");
include!("scene_impl.rs");
include!("util.rs");

pub(crate) fn build_scene(tuning: PhysicsTuning) -> Box<dyn Scene> {
    Box::new(PlatformerScene::new(tuning))
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
