use super::input::{ActionStates, InputAction};
use super::rendering::Viewport;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Reset,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    jump_pressed: bool,
    restart_pressed: bool,
    actions: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        jump_pressed: bool,
        restart_pressed: bool,
        actions: ActionStates,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            jump_pressed,
            restart_pressed,
            actions,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    pub fn restart_pressed(&self) -> bool {
        self.restart_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_jump_pressed(mut self, jump_pressed: bool) -> Self {
        self.jump_pressed = jump_pressed;
        self
    }

    pub fn with_restart_pressed(mut self, restart_pressed: bool) -> Self {
        self.restart_pressed = restart_pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerVisual {
    pub position: Vec2,
    pub size: Vec2,
    pub facing: Facing,
}

pub const RENDER_SCALE_DEFAULT: f32 = 2.0;

/// Camera convention: `offset` is the world-pixel point mapped to the
/// viewport's top-left corner; `scale` is whole world pixels per screen pixel
/// group (2.0 doubles every world pixel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub scale: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::default(),
            scale: RENDER_SCALE_DEFAULT,
        }
    }
}

impl Camera {
    /// Centers the view on `target` and clamps so the camera never shows
    /// area outside `map_extent_px`. An axis where the map is smaller than
    /// the view collapses to offset 0. Offsets are floored to whole pixels.
    pub fn follow(target: Vec2, map_extent_px: Vec2, viewport: Viewport, scale: f32) -> Self {
        let scale = normalize_scale(scale);
        Self {
            offset: Vec2 {
                x: follow_axis(target.x, map_extent_px.x, viewport.width as f32, scale),
                y: follow_axis(target.y, map_extent_px.y, viewport.height as f32, scale),
            },
            scale,
        }
    }

    pub fn effective_scale(&self) -> f32 {
        normalize_scale(self.scale)
    }
}

fn follow_axis(center: f32, map_extent: f32, viewport_extent: f32, scale: f32) -> f32 {
    let max_offset = (map_extent - viewport_extent / scale).max(0.0);
    (center - viewport_extent / (2.0 * scale))
        .clamp(0.0, max_offset)
        .floor()
}

fn normalize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        RENDER_SCALE_DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    Solid,
    Decoration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub role: LayerRole,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileGridError {
    #[error("layer '{layer}' tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },
    #[error("tile dimensions must be non-zero, got {tile_width}x{tile_height}")]
    ZeroTileSize { tile_width: u32, tile_height: u32 },
}

/// The immutable world grid. Layers stack in document order for rendering;
/// only layers tagged `LayerRole::Solid` participate in collision queries.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width_in_tiles: u32,
    height_in_tiles: u32,
    tile_width: u32,
    tile_height: u32,
    first_gid: u32,
    layers: Vec<TileLayer>,
}

impl TileGrid {
    pub fn new(
        width_in_tiles: u32,
        height_in_tiles: u32,
        tile_width: u32,
        tile_height: u32,
        first_gid: u32,
        layers: Vec<TileLayer>,
    ) -> Result<Self, TileGridError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(TileGridError::ZeroTileSize {
                tile_width,
                tile_height,
            });
        }
        for layer in &layers {
            let expected = layer.width as usize * layer.height as usize;
            let actual = layer.data.len();
            if expected != actual {
                return Err(TileGridError::TileCountMismatch {
                    layer: layer.name.clone(),
                    expected,
                    actual,
                });
            }
        }
        Ok(Self {
            width_in_tiles,
            height_in_tiles,
            tile_width,
            tile_height,
            first_gid,
            layers,
        })
    }

    pub fn width_in_tiles(&self) -> u32 {
        self.width_in_tiles
    }

    pub fn height_in_tiles(&self) -> u32 {
        self.height_in_tiles
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn first_gid(&self) -> u32 {
        self.first_gid
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn width_px(&self) -> f32 {
        (self.width_in_tiles * self.tile_width) as f32
    }

    pub fn height_px(&self) -> f32 {
        (self.height_in_tiles * self.tile_height) as f32
    }

    /// Out-of-bounds coordinates are never solid: the world edge is an open
    /// boundary unless the map itself places border tiles.
    pub fn is_solid(&self, tile_x: i32, tile_y: i32) -> bool {
        if tile_x < 0
            || tile_y < 0
            || tile_x >= self.width_in_tiles as i32
            || tile_y >= self.height_in_tiles as i32
        {
            return false;
        }
        self.layers
            .iter()
            .filter(|layer| layer.role == LayerRole::Solid)
            .any(|layer| {
                let index = tile_x as usize + tile_y as usize * layer.width as usize;
                layer.data.get(index).copied().unwrap_or(0) != 0
            })
    }
}

#[derive(Debug, Default)]
pub struct GameWorld {
    tile_grid: Option<TileGrid>,
    camera: Camera,
    player_visual: Option<PlayerVisual>,
    session_ended: bool,
}

impl GameWorld {
    pub fn set_tile_grid(&mut self, tile_grid: TileGrid) {
        self.tile_grid = Some(tile_grid);
    }

    pub fn tile_grid(&self) -> Option<&TileGrid> {
        self.tile_grid.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_player_visual(&mut self, visual: Option<PlayerVisual>) {
        self.player_visual = visual;
    }

    pub fn player_visual(&self) -> Option<&PlayerVisual> {
        self.player_visual.as_ref()
    }

    pub fn set_session_ended(&mut self, ended: bool) {
        self.session_ended = ended;
    }

    /// The outcome signal surfaced to the host UI: true once the player has
    /// fallen out of the world, false again after a reset.
    pub fn session_ended(&self) -> bool {
        self.session_ended
    }

    /// Resets per-session dynamic state. The tile grid and the configured
    /// camera scale survive: the grid is immutable for the whole session.
    pub fn clear(&mut self) {
        self.player_visual = None;
        self.session_ended = false;
        self.camera.offset = Vec2::default();
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut GameWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut GameWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut GameWorld);
    fn debug_title(&self, _world: &GameWorld) -> Option<String> {
        None
    }
}
