//! Composition root wiring board, input, animation and overlay together.
//!
//! One [`Game::tick`] per display frame: drain queued directions in order,
//! resolve each against the live board, push a snapshot for every move that
//! changed something, sync best score, then advance and draw the animation
//! and the status overlay.

use log::info;

use crate::animation::{AnimationPlayer, Clock, Renderer};
use crate::board::{Direction, GameState, GameStatus};
use crate::config::GameConfig;
use crate::input::{InputQueue, WIN_INPUT_PAUSE_MS};
use crate::overlay::OverlayTint;

pub struct Game<C: Clock + Clone> {
    config: GameConfig,
    clock: C,
    state: GameState,
    player: AnimationPlayer<C>,
    input: InputQueue,
    overlay: OverlayTint,
    best_score: u64,
}

impl<C: Clock + Clone> Game<C> {
    pub fn new(config: GameConfig, clock: C) -> Self {
        Self::with_state(GameState::new(config), clock)
    }

    /// Start from an existing board (restarts still use its dimensions and target).
    pub fn with_state(state: GameState, clock: C) -> Self {
        let config = GameConfig {
            rows: state.rows(),
            columns: state.columns(),
            target_tile_level: state.target_tile_level(),
        };
        info!(
            "new game {}x{} target {}",
            config.rows,
            config.columns,
            1u64 << config.target_tile_level
        );
        let player = AnimationPlayer::new(clock.clone(), &state);
        Self {
            config,
            clock,
            best_score: state.score(),
            state,
            player,
            input: InputQueue::new(),
            overlay: OverlayTint::new(),
        }
    }

    /// Queue a direction at the current time; dropped while input is paused.
    pub fn queue(&mut self, direction: Direction) -> bool {
        let now = self.clock.now_ms();
        self.input.push(direction, now)
    }

    /// Queue a key press; unknown keys are ignored.
    pub fn queue_key(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.input.push_key(key, now)
    }

    /// Apply every queued direction in order. Returns how many changed the board.
    pub fn resolve_input(&mut self) -> usize {
        let mut changed = 0;
        while let Some(direction) = self.input.pop() {
            if self.state.status() == GameStatus::Lost {
                continue;
            }
            let before = self.state.status();
            if !self.state.move_tiles(direction) {
                continue;
            }
            changed += 1;
            self.player.add_state(&self.state);
            if before != GameStatus::Won && self.state.status() == GameStatus::Won {
                self.input
                    .block_until(self.clock.now_ms() + WIN_INPUT_PAUSE_MS);
            }
        }
        self.best_score = self.best_score.max(self.state.score());
        changed
    }

    pub fn tick<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.resolve_input();
        self.player.draw(renderer);
        self.overlay.update(self.state.status());
        renderer.draw_overlay(&self.overlay);
    }

    /// Fresh board and animation queue with the same parameters. Best score survives.
    pub fn restart(&mut self) {
        info!("restart after score {} (best {})", self.state.score(), self.best_score);
        self.state = GameState::new(self.config);
        self.player = AnimationPlayer::new(self.clock.clone(), &self.state);
        self.input.clear();
        self.overlay = OverlayTint::new();
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn status(&self) -> GameStatus {
        self.state.status()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> &AnimationPlayer<C> {
        &self.player
    }

    pub fn overlay(&self) -> &OverlayTint {
        &self.overlay
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn is_input_paused(&self) -> bool {
        self.input.is_blocked(self.clock.now_ms())
    }
}
