use crate::app::{Camera, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// World pixel space is y-down with the map origin at the top-left; the
/// camera offset is the world point under the viewport's top-left corner.
pub fn world_to_screen_px(camera: &Camera, world: Vec2) -> (i32, i32) {
    let scale = camera.effective_scale();
    let x = (world.x - camera.offset.x) * scale;
    let y = (world.y - camera.offset.y) * scale;
    (x.floor() as i32, y.floor() as i32)
}
