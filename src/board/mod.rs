//! Board model and move resolution.
//!
//! A [`GameState`] is a flat, row-major vector of [`Tile`] slots plus score and
//! win/loss status. [`GameState::move_tiles`] slides every tile one way,
//! merges equal neighbours, spawns a fresh tile when anything changed and
//! re-evaluates the status.
//!
//! Resolution walks indices in ascending order and, before a tile decides to
//! follow or merge, recursively settles the neighbour it is sliding towards.
//! That single pass is correct for all four directions; there is no
//! direction-specific iteration order.

use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::config::GameConfig;

mod tile;

pub use tile::{Origin, Tile, TileStatus};

// --- Direction / Status -------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    /// Signed step through the flattened board.
    pub fn index_delta(self, columns: usize) -> isize {
        match self {
            Direction::Right => 1,
            Direction::Left => -1,
            Direction::Up => -(columns as isize),
            Direction::Down => columns as isize,
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// `InProgress -> Won -> Continued`, or `InProgress -> Lost`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    #[default]
    InProgress,
    Won,
    Continued,
    Lost,
}

// --- Board -------------------------------------------------------------------

/// Runtime board state. Cloning yields an independent snapshot (tile history
/// is owned per tile), which is what the animation queue stores.
#[derive(Clone, Debug)]
pub struct GameState {
    rows: usize,
    columns: usize,
    target_tile_level: u32,
    tiles: Vec<Tile>,
    score: u64,
    status: GameStatus,
    rng: SmallRng,
}

impl GameState {
    /// Fresh board with two spawned tiles, seeded from OS entropy.
    pub fn new(config: GameConfig) -> Self {
        Self::seeded(config, SmallRng::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::seeded(config, SmallRng::seed_from_u64(seed))
    }

    fn seeded(config: GameConfig, rng: SmallRng) -> Self {
        let mut state = Self::blank(config, rng);
        state.spawn_random_tile();
        state.spawn_random_tile();
        state
    }

    /// Board laid out from row-major levels (`None` = empty), no opening spawns.
    /// Panics when `levels` does not cover every cell.
    pub fn from_levels(config: GameConfig, levels: &[Option<u32>], seed: u64) -> Self {
        assert_eq!(
            levels.len(),
            config.cells(),
            "expected {} levels for a {}x{} board",
            config.cells(),
            config.rows,
            config.columns
        );
        let mut state = Self::blank(config, SmallRng::seed_from_u64(seed));
        for (tile, level) in state.tiles.iter_mut().zip(levels) {
            if let Some(level) = *level {
                *tile = Tile::with_level(tile.index(), level);
            }
        }
        state
    }

    fn blank(config: GameConfig, rng: SmallRng) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid config {config:?}");
        Self {
            rows: config.rows,
            columns: config.columns,
            target_tile_level: config.target_tile_level,
            tiles: (0..config.cells()).map(Tile::new).collect(),
            score: 0,
            status: GameStatus::InProgress,
            rng,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn target_tile_level(&self) -> u32 {
        self.target_tile_level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    pub fn empty_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.tiles.iter().all(|t| !t.is_empty())
    }

    pub fn max_level(&self) -> Option<u32> {
        self.tiles.iter().filter_map(Tile::level).max()
    }

    /// Apply one player move. Returns `true` when the board changed; in that
    /// case a tile has been spawned and the status re-evaluated. Otherwise the
    /// board is left exactly as it was.
    pub fn move_tiles(&mut self, direction: Direction) -> bool {
        let before = self.clone();
        self.gravitate(direction);
        if *self == before {
            *self = before;
            return false;
        }
        self.spawn_random_tile();
        self.update_status();
        debug!(
            "moved {:?}: score {} empty {}",
            direction,
            self.score,
            self.empty_count()
        );
        true
    }

    /// Slide and merge every tile towards `direction` without spawning.
    pub fn gravitate(&mut self, direction: Direction) {
        for tile in &mut self.tiles {
            tile.prepare_for_move();
        }
        for index in 0..self.tiles.len() {
            self.gravitate_tile(index, direction);
        }
    }

    fn gravitate_tile(&mut self, index: usize, direction: Direction) {
        if self.tiles[index].is_empty() {
            return;
        }
        let Some(next) = self.neighbor(index, direction) else {
            return;
        };
        // Settle whatever is ahead first so this tile sees its final position.
        if !self.tiles[next].is_empty() {
            self.gravitate_tile(next, direction);
        }
        let (current, ahead) = pair_mut(&mut self.tiles, index, next);
        if ahead.is_empty() {
            current.move_to(ahead);
            self.gravitate_tile(next, direction);
        } else if current.able_to_merge() && ahead.able_to_merge() && current.level() == ahead.level()
        {
            current.merge_with(ahead);
            self.score += ahead.score_value().unwrap_or(0);
        }
    }

    /// Grid neighbour of `index` one step towards `direction`. Flat index
    /// arithmetic that wraps onto another row is not adjacency.
    fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        let next = index as isize + direction.index_delta(self.columns);
        if next < 0 || next as usize >= self.tiles.len() {
            return None;
        }
        let next = next as usize;
        let adjacent = if direction.is_horizontal() {
            next / self.columns == index / self.columns
        } else {
            next % self.columns == index % self.columns
        };
        adjacent.then_some(next)
    }

    /// Spawn into a uniformly random empty slot and return its index.
    fn spawn_random_tile(&mut self) -> usize {
        assert!(
            !self.is_full(),
            "spawn requested on a full {}x{} board",
            self.rows,
            self.columns
        );
        let size = self.tiles.len();
        loop {
            let index = self.rng.gen_range(0..size);
            if self.tiles[index].is_empty() {
                self.tiles[index].spawn(&mut self.rng);
                return index;
            }
        }
    }

    /// Full and no direction changes anything. Probes run on clones.
    pub fn is_game_over(&self) -> bool {
        self.is_full()
            && Direction::ALL.iter().all(|&direction| {
                let mut probe = self.clone();
                probe.gravitate(direction);
                probe == *self
            })
    }

    pub fn has_reached_target(&self) -> bool {
        self.max_level()
            .is_some_and(|level| level >= self.target_tile_level)
    }

    /// Advance the status machine after a successful move.
    pub fn update_status(&mut self) -> GameStatus {
        let next = if self.is_game_over() {
            GameStatus::Lost
        } else if self.status == GameStatus::InProgress && self.has_reached_target() {
            GameStatus::Won
        } else if self.status == GameStatus::Won {
            GameStatus::Continued
        } else {
            self.status
        };
        if next != self.status {
            info!("status {:?} -> {:?} (score {})", self.status, next, self.score);
            self.status = next;
        }
        next
    }
}

/// Boards are equal when dimensions, score and every slot's level match.
impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.columns == other.columns
            && self.score == other.score
            && self.tiles == other.tiles
    }
}

fn pair_mut(tiles: &mut [Tile], a: usize, b: usize) -> (&mut Tile, &mut Tile) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = tiles.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = tiles.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> GameConfig {
        GameConfig::default()
    }

    fn board(levels: &[u32]) -> GameState {
        let levels: Vec<Option<u32>> = levels
            .iter()
            .map(|&l| if l == 0 { None } else { Some(l) })
            .collect();
        GameState::from_levels(classic(), &levels, 9)
    }

    fn levels(state: &GameState) -> Vec<u32> {
        state.tiles().iter().map(|t| t.level().unwrap_or(0)).collect()
    }

    #[test]
    fn test_new_board_has_two_spawns() {
        let state = GameState::with_seed(classic(), 3);
        assert_eq!(state.empty_count(), 14);
        assert_eq!(state.score(), 0);
        assert_eq!(state.status(), GameStatus::InProgress);
        for t in state.tiles().iter().filter(|t| !t.is_empty()) {
            assert_eq!(t.status(), TileStatus::Spawned);
            assert!(matches!(t.level(), Some(1) | Some(2)));
        }
    }

    #[test]
    fn test_neighbor_does_not_wrap_rows() {
        let state = board(&[0; 16]);
        assert_eq!(state.neighbor(3, Direction::Right), None);
        assert_eq!(state.neighbor(4, Direction::Left), None);
        assert_eq!(state.neighbor(2, Direction::Up), None);
        assert_eq!(state.neighbor(13, Direction::Down), None);
        assert_eq!(state.neighbor(5, Direction::Right), Some(6));
        assert_eq!(state.neighbor(5, Direction::Up), Some(1));
        assert_eq!(state.neighbor(5, Direction::Down), Some(9));
    }

    #[test]
    fn test_gravitate_right_three_equal() {
        let mut state = board(&[1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        state.gravitate(Direction::Right);
        assert_eq!(&levels(&state)[..4], &[0, 0, 1, 2]);
        assert_eq!(state.score(), 4);
        assert_eq!(state.tile(3).status(), TileStatus::Merged);
        assert_eq!(state.tile(2).status(), TileStatus::Moved);
        assert_eq!(
            state.tile(3).history(),
            &[Origin { index: 2, level: 1 }, Origin { index: 1, level: 1 }]
        );
        assert_eq!(state.tile(2).history(), &[Origin { index: 0, level: 1 }]);
    }

    #[test]
    fn test_gravitate_left_four_equal_merges_pairwise() {
        let mut state = board(&[2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        state.gravitate(Direction::Left);
        assert_eq!(&levels(&state)[..4], &[3, 3, 0, 0]);
        assert_eq!(state.score(), 16);
    }

    #[test]
    fn test_merged_tile_does_not_merge_again() {
        // 1 1 2 -> left gives 2 2, not 3
        let mut state = board(&[1, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        state.gravitate(Direction::Left);
        assert_eq!(&levels(&state)[..4], &[2, 2, 0, 0]);
        assert_eq!(state.score(), 4);
    }

    #[test]
    fn test_gravitate_vertical() {
        #[rustfmt::skip]
        let mut state = board(&[
            1, 0, 0, 3,
            1, 0, 0, 0,
            0, 2, 0, 3,
            0, 0, 0, 4,
        ]);
        state.gravitate(Direction::Down);
        #[rustfmt::skip]
        assert_eq!(levels(&state), vec![
            0, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 4,
            2, 2, 0, 4,
        ]);
        assert_eq!(state.score(), 4 + 16);
    }

    #[test]
    fn test_no_wraparound_on_horizontal_slide() {
        let mut state = board(&[0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        state.gravitate(Direction::Right);
        assert_eq!(&levels(&state)[..8], &[0, 0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_left_merge_scenario() {
        let mut state = board(&[1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(state.move_tiles(Direction::Left));
        assert_eq!(state.tile(0).level(), Some(2));
        assert_eq!(state.score(), 4);
        assert_eq!(state.empty_count(), 14);
        assert_eq!(state.status(), GameStatus::InProgress);
        let spawned: Vec<_> = state
            .tiles()
            .iter()
            .filter(|t| t.status() == TileStatus::Spawned)
            .collect();
        assert_eq!(spawned.len(), 1);
        assert_ne!(spawned[0].index(), 0);
    }

    #[test]
    fn test_unchanged_move_restores_board() {
        let mut state = board(&[1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let before = state.clone();
        assert!(!state.move_tiles(Direction::Left));
        assert!(!state.move_tiles(Direction::Up));
        assert_eq!(state, before);
        assert_eq!(state.tile(0).status(), TileStatus::Still);
        assert_eq!(state.empty_count(), 14);
    }

    #[test]
    fn test_clone_equality_round_trip() {
        let mut state = GameState::with_seed(classic(), 11);
        let snapshot = state.clone();
        assert_eq!(snapshot, state);
        let changed = Direction::ALL.iter().any(|&d| state.move_tiles(d));
        assert!(changed);
        assert_ne!(snapshot, state);
    }

    #[test]
    fn test_full_board_without_pairs_is_lost() {
        let levels: Vec<u32> = (0..16).map(|i| 1 + ((i / 4 + i % 4) % 2) as u32).collect();
        let mut state = board(&levels);
        assert!(state.is_full());
        assert!(state.is_game_over());
        for d in Direction::ALL {
            assert!(!state.move_tiles(d));
        }
        assert_eq!(state.update_status(), GameStatus::Lost);
        assert_eq!(state.status(), GameStatus::Lost);
    }

    #[test]
    fn test_full_board_with_pair_is_not_over() {
        let mut levels: Vec<u32> = (0..16).map(|i| 1 + ((i / 4 + i % 4) % 2) as u32).collect();
        levels[15] = levels[14];
        let state = board(&levels);
        assert!(state.is_full());
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_non_full_board_is_never_over() {
        let mut levels: Vec<u32> = (0..16).map(|i| 1 + ((i / 4 + i % 4) % 2) as u32).collect();
        levels[5] = 0;
        assert!(!board(&levels).is_game_over());
    }

    #[test]
    fn test_win_then_continue() {
        let mut state = board(&[10, 10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(state.move_tiles(Direction::Left));
        assert_eq!(state.tile(0).level(), Some(11));
        assert_eq!(state.tile(0).value(), Some(2048));
        assert_eq!(state.score(), 2048);
        assert_eq!(state.status(), GameStatus::Won);
        assert!(state.move_tiles(Direction::Down));
        assert_eq!(state.status(), GameStatus::Continued);
        let any = Direction::ALL.iter().any(|&d| state.move_tiles(d));
        assert!(any);
        assert_eq!(state.status(), GameStatus::Continued);
    }

    #[test]
    #[should_panic(expected = "full")]
    fn test_spawn_on_full_board_fails_fast() {
        let mut state = board(&[1; 16]);
        state.spawn_random_tile();
    }

    #[test]
    fn test_random_play_invariants() {
        let mut state = GameState::with_seed(classic(), 2024);
        let mut picker = SmallRng::seed_from_u64(99);
        for _ in 0..500 {
            if state.is_game_over() {
                break;
            }
            let direction = Direction::ALL[picker.gen_range(0..4)];
            let empty_before = state.empty_count();
            let score_before = state.score();
            if !state.move_tiles(direction) {
                continue;
            }
            let merged: Vec<&Tile> = state
                .tiles()
                .iter()
                .filter(|t| t.status() == TileStatus::Merged)
                .collect();
            assert_eq!(state.empty_count(), empty_before + merged.len() - 1);
            let gained: u64 = merged.iter().filter_map(|t| t.score_value()).sum();
            assert_eq!(state.score(), score_before + gained);
            for t in state.tiles() {
                let expected = match t.status() {
                    TileStatus::Empty => 0,
                    TileStatus::Merged => 2,
                    _ => 1,
                };
                assert_eq!(t.history().len(), expected, "tile {}", t.index());
            }
            let spawned = state
                .tiles()
                .iter()
                .filter(|t| t.status() == TileStatus::Spawned)
                .count();
            assert_eq!(spawned, 1);
        }
    }
}
