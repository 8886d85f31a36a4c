/// One parameterized record drives kinematics and collision; the defaults are
/// the classic tuning for 16px tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PhysicsTuning {
    pub(crate) move_speed: f32,
    pub(crate) jump_impulse: f32,
    pub(crate) gravity: f32,
    pub(crate) max_fall_speed: f32,
    pub(crate) coyote_window_ms: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            jump_impulse: 6.0,
            gravity: 0.3,
            max_fall_speed: 10.0,
            coyote_window_ms: 100.0,
        }
    }
}

/// On-disk override of the default tuning; absent fields keep their defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TuningOverrides {
    move_speed: Option<f32>,
    jump_impulse: Option<f32>,
    gravity: Option<f32>,
    max_fall_speed: Option<f32>,
    coyote_window_ms: Option<f32>,
}

impl TuningOverrides {
    fn apply_over(self, base: PhysicsTuning) -> PhysicsTuning {
        PhysicsTuning {
            move_speed: self.move_speed.unwrap_or(base.move_speed),
            jump_impulse: self.jump_impulse.unwrap_or(base.jump_impulse),
            gravity: self.gravity.unwrap_or(base.gravity),
            max_fall_speed: self.max_fall_speed.unwrap_or(base.max_fall_speed),
            coyote_window_ms: self.coyote_window_ms.unwrap_or(base.coyote_window_ms),
        }
    }
}

/// The single player entity, top-left anchored in world pixel space.
/// `since_grounded_seconds` is derived timing for the coyote window only; it
/// starts saturated so a fresh spawn cannot jump mid-air.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Player {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    width: f32,
    height: f32,
    facing: Facing,
    on_ground: bool,
    since_grounded_seconds: f32,
}

impl Player {
    fn spawned_at(spawn: Vec2, size: Vec2) -> Self {
        Self {
            x: spawn.x,
            y: spawn.y,
            vx: 0.0,
            vy: 0.0,
            width: size.x,
            height: size.y,
            facing: Facing::Right,
            on_ground: false,
            since_grounded_seconds: f32::INFINITY,
        }
    }

    fn position(&self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }

    fn size(&self) -> Vec2 {
        Vec2 {
            x: self.width,
            y: self.height,
        }
    }

    fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    Running,
    Ended,
}
