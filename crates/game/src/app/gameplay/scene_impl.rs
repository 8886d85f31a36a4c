pub(crate) struct PlatformerScene {
    tuning: PhysicsTuning,
    phase: SessionPhase,
    player: Player,
    restart_cooldown_seconds: f32,
}

impl PlatformerScene {
    pub(crate) fn new(tuning: PhysicsTuning) -> Self {
        Self {
            tuning,
            phase: SessionPhase::Running,
            player: Player::spawned_at(
                PLAYER_SPAWN,
                Vec2 {
                    x: TILE_FALLBACK_SIZE,
                    y: TILE_FALLBACK_SIZE,
                },
            ),
            restart_cooldown_seconds: 0.0,
        }
    }

    fn sync_player_visual(&self, world: &mut GameWorld) {
        world.set_player_visual(Some(PlayerVisual {
            position: self.player.position(),
            size: self.player.size(),
            facing: self.player.facing,
        }));
    }
}

impl Scene for PlatformerScene {
    fn load(&mut self, world: &mut GameWorld) {
        let tile_size = world
            .tile_grid()
            .map(|grid| Vec2 {
                x: grid.tile_width() as f32,
                y: grid.tile_height() as f32,
            })
            .unwrap_or(Vec2 {
                x: TILE_FALLBACK_SIZE,
                y: TILE_FALLBACK_SIZE,
            });
        self.player = Player::spawned_at(PLAYER_SPAWN, tile_size);
        self.phase = SessionPhase::Running;
        self.restart_cooldown_seconds = 0.0;
        world.set_session_ended(false);
        self.sync_player_visual(world);
        info!(
            x = self.player.x,
            y = self.player.y,
            move_speed = self.tuning.move_speed,
            "session_loaded"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut GameWorld,
    ) -> SceneCommand {
        if self.restart_cooldown_seconds > 0.0 {
            self.restart_cooldown_seconds =
                (self.restart_cooldown_seconds - fixed_dt_seconds).max(0.0);
        }

        if self.phase == SessionPhase::Ended {
            if input.restart_pressed() && self.restart_cooldown_seconds <= 0.0 {
                info!("session_restart");
                return SceneCommand::Reset;
            }
            return SceneCommand::None;
        }

        let (map_extent, fell_out) = {
            let Some(grid) = world.tile_grid() else {
                return SceneCommand::None;
            };
            step_player(grid, &mut self.player, input, &self.tuning, fixed_dt_seconds);
            (
                Vec2 {
                    x: grid.width_px(),
                    y: grid.height_px(),
                },
                self.player.y > grid.height_px(),
            )
        };

        if fell_out {
            self.phase = SessionPhase::Ended;
            self.restart_cooldown_seconds = RESTART_COOLDOWN_SECONDS;
            world.set_session_ended(true);
            world.set_player_visual(None);
            info!(y = self.player.y, "player_fell_out");
            return SceneCommand::None;
        }

        self.sync_player_visual(world);
        let (window_width, window_height) = input.window_size();
        let viewport = Viewport {
            width: window_width,
            height: window_height,
        };
        let scale = world.camera().scale;
        *world.camera_mut() = Camera::follow(self.player.center(), map_extent, viewport, scale);

        SceneCommand::None
    }

    fn unload(&mut self, world: &mut GameWorld) {
        world.set_player_visual(None);
    }

    fn debug_title(&self, _world: &GameWorld) -> Option<String> {
        match self.phase {
            SessionPhase::Ended => Some(ENDED_TITLE.to_string()),
            SessionPhase::Running => None,
        }
    }
}
