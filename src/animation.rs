//! Animated playback of board snapshots.
//!
//! Every successful move pushes a deep copy of the board onto the
//! [`AnimationPlayer`] queue. Each frame the player advances its progress by
//! elapsed wall time and hands the oldest snapshot plus progress to a
//! [`Renderer`]. Progress splits in two halves: tiles slide from their
//! recorded origins during the first, then spawned and merged tiles pop in
//! during the second (see [`tile_sprites`]).

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::board::{GameState, Tile, TileStatus};
use crate::overlay::OverlayTint;

/// Seconds one snapshot takes to play when nothing else is queued.
pub const BASE_DURATION_SECS: f64 = 0.2;

/// Progress at which sliding ends and the appear/bump phase begins.
pub const MOVE_PHASE_END: f64 = 0.5;

// --- Capabilities ------------------------------------------------------------

/// Monotonic time source in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Clock driven by hand. Clones share the same timeline.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Read-only consumer of what the player shows each frame.
pub trait Renderer {
    fn draw_board(&mut self, state: &GameState, progress: f64);

    fn draw_overlay(&mut self, _tint: &OverlayTint) {}
}

// --- Player ------------------------------------------------------------------

pub struct AnimationPlayer<C: Clock> {
    clock: C,
    queue: VecDeque<GameState>,
    progress: f64,
    last_sample_ms: f64,
}

impl<C: Clock> AnimationPlayer<C> {
    /// Start playback with `initial` as the first snapshot.
    pub fn new(clock: C, initial: &GameState) -> Self {
        let last_sample_ms = clock.now_ms();
        let mut queue = VecDeque::new();
        queue.push_back(initial.clone());
        Self {
            clock,
            queue,
            progress: 0.0,
            last_sample_ms,
        }
    }

    pub fn add_state(&mut self, state: &GameState) {
        self.queue.push_back(state.clone());
    }

    /// Step progress by time since the previous call. Playback speeds up in
    /// proportion to queue depth so it never falls permanently behind input.
    pub fn advance(&mut self) {
        let now = self.clock.now_ms();
        let elapsed_secs = ((now - self.last_sample_ms) / 1000.0).max(0.0);
        self.last_sample_ms = now;

        if self.progress >= 1.0 {
            if self.queue.len() <= 1 {
                return;
            }
            self.queue.pop_front();
            self.progress = 0.0;
        }
        let step = elapsed_secs / BASE_DURATION_SECS * self.queue.len() as f64;
        self.progress = (self.progress + step).clamp(0.0, 1.0);
    }

    pub fn draw<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.advance();
        if let Some(head) = self.queue.front() {
            renderer.draw_board(head, self.progress);
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Snapshot currently on screen.
    pub fn current(&self) -> Option<&GameState> {
        self.queue.front()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Last snapshot fully played and nothing waiting behind it.
    pub fn is_idle(&self) -> bool {
        self.queue.len() <= 1 && self.progress >= 1.0
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

// --- Per-tile interpolation ----------------------------------------------------

/// `3p^2 - 2p^3`
pub fn smoothstep(p: f64) -> f64 {
    p * p * (3.0 - 2.0 * p)
}

/// `-p^2 + p + 1`: 1 at both ends, peaks at 1.25 halfway.
pub fn bump(p: f64) -> f64 {
    -p * p + p + 1.0
}

/// One tile image to draw, in board-cell units (row 0 / column 0 is top left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub row: f64,
    pub column: f64,
    pub level: u32,
    pub scale: f64,
}

fn cell(index: usize, columns: usize) -> (f64, f64) {
    ((index / columns) as f64, (index % columns) as f64)
}

/// Sprites for `tile` at `progress`. While sliding, every recorded origin is
/// drawn moving towards the tile's slot with its pre-move level; spawned tiles
/// stay hidden. Afterwards the tile rests in its slot, spawned tiles growing
/// from nothing and merged tiles bumping past full size.
pub fn tile_sprites(tile: &Tile, columns: usize, progress: f64) -> Vec<Sprite> {
    let Some(level) = tile.level() else {
        return Vec::new();
    };
    let (row, column) = cell(tile.index(), columns);

    if progress < MOVE_PHASE_END {
        if tile.status() == TileStatus::Spawned {
            return Vec::new();
        }
        let t = smoothstep((progress / MOVE_PHASE_END).min(1.0));
        return tile
            .history()
            .iter()
            .map(|origin| {
                let (from_row, from_column) = cell(origin.index, columns);
                Sprite {
                    row: from_row + (row - from_row) * t,
                    column: from_column + (column - from_column) * t,
                    level: origin.level,
                    scale: 1.0,
                }
            })
            .collect();
    }

    let p = ((progress - MOVE_PHASE_END) / (1.0 - MOVE_PHASE_END)).clamp(0.0, 1.0);
    let scale = match tile.status() {
        TileStatus::Spawned => p,
        TileStatus::Merged => bump(p),
        _ => 1.0,
    };
    vec![Sprite {
        row,
        column,
        level,
        scale,
    }]
}
