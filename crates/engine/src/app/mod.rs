mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{world_to_screen_px, Renderer, Viewport};
pub use scene::{
    Camera, Facing, GameWorld, InputSnapshot, LayerRole, PlayerVisual, Scene, SceneCommand,
    TileGrid, TileGridError, TileLayer, Vec2, RENDER_SCALE_DEFAULT,
};
