// Axis-separated collision: the horizontal displacement resolves fully
// before the vertical one, which avoids corner snagging against the grid.
// The sweep is discrete and tests only the tile the leading edge has
// entered, so it is correct while per-frame displacement stays under one
// tile; at the shipped 60 Hz timestep the terminal fall speed is well below
// that. There is no sub-stepping for faster movers.

/// One full simulation step for the player, in the fixed order: jump
/// request, horizontal intent, gravity, horizontal resolve, vertical
/// resolve, coyote bookkeeping.
fn step_player(
    grid: &TileGrid,
    player: &mut Player,
    input: &InputSnapshot,
    tuning: &PhysicsTuning,
    fixed_dt_seconds: f32,
) {
    let delta = fixed_dt_seconds * REFERENCE_FRAME_RATE;

    if input.jump_pressed() {
        try_jump(player, tuning);
    }
    apply_horizontal_input(player, input, tuning, delta);
    apply_gravity(player, tuning, delta);
    resolve_horizontal(grid, player);
    resolve_vertical(grid, player);

    if !player.on_ground {
        player.since_grounded_seconds += fixed_dt_seconds;
    }
}

/// Horizontal intent is an instantaneous direction, no acceleration curve.
/// Left wins when both directions are held.
fn apply_horizontal_input(
    player: &mut Player,
    input: &InputSnapshot,
    tuning: &PhysicsTuning,
    delta: f32,
) {
    if input.is_down(InputAction::MoveLeft) {
        player.vx = -tuning.move_speed * delta;
        player.facing = Facing::Left;
    } else if input.is_down(InputAction::MoveRight) {
        player.vx = tuning.move_speed * delta;
        player.facing = Facing::Right;
    } else {
        player.vx = 0.0;
    }
}

/// Gravity only accumulates while airborne; a resting player keeps zero
/// vertical velocity so there is no one-frame sink-then-correct jitter.
fn apply_gravity(player: &mut Player, tuning: &PhysicsTuning, delta: f32) {
    if player.on_ground {
        player.vy = 0.0;
    } else {
        player.vy = (player.vy + tuning.gravity * delta).min(tuning.max_fall_speed);
    }
}

/// Grants a jump while grounded, or within the coyote window after ground
/// contact was lost. The window is consumed on use so an airborne press can
/// never re-trigger it; requests outside both conditions are dropped, not
/// buffered.
fn try_jump(player: &mut Player, tuning: &PhysicsTuning) -> bool {
    let within_coyote = player.since_grounded_seconds * 1000.0 < tuning.coyote_window_ms;
    if !player.on_ground && !within_coyote {
        return false;
    }
    player.vy = -tuning.jump_impulse;
    player.on_ground = false;
    player.since_grounded_seconds = f32::INFINITY;
    true
}

fn resolve_horizontal(grid: &TileGrid, player: &mut Player) {
    player.x += player.vx;

    let tile_w = grid.tile_width() as f32;
    let tile_h = grid.tile_height() as f32;
    let top_row = (player.y / tile_h).floor() as i32;
    let bottom_row = ((player.y + player.height - 1.0) / tile_h).floor() as i32;

    if player.vx > 0.0 {
        let lead_col = ((player.x + player.width - 1.0) / tile_w).floor() as i32;
        for row in top_row..=bottom_row {
            if grid.is_solid(lead_col, row) {
                player.x = lead_col as f32 * tile_w - player.width;
                player.vx = 0.0;
            }
        }
    } else if player.vx < 0.0 {
        let lead_col = (player.x / tile_w).floor() as i32;
        for row in top_row..=bottom_row {
            if grid.is_solid(lead_col, row) {
                player.x = (lead_col + 1) as f32 * tile_w;
                player.vx = 0.0;
            }
        }
    }
}

fn resolve_vertical(grid: &TileGrid, player: &mut Player) {
    player.y += player.vy;
    player.on_ground = false;

    let tile_w = grid.tile_width() as f32;
    let tile_h = grid.tile_height() as f32;
    let left_col = (player.x / tile_w).floor() as i32;
    let right_col = ((player.x + player.width - 1.0) / tile_w).floor() as i32;

    if player.vy > 0.0 {
        let lead_row = ((player.y + player.height - 1.0) / tile_h).floor() as i32;
        for col in left_col..=right_col {
            if grid.is_solid(col, lead_row) {
                player.y = lead_row as f32 * tile_h - player.height;
                player.vy = 0.0;
                player.on_ground = true;
                player.since_grounded_seconds = 0.0;
            }
        }
    } else if player.vy < 0.0 {
        let lead_row = (player.y / tile_h).floor() as i32;
        for col in left_col..=right_col {
            if grid.is_solid(col, lead_row) {
                player.y = (lead_row + 1) as f32 * tile_h;
                player.vy = 0.0;
            }
        }
    }
}
