// Single board cell: value level plus the per-turn history the animation
// player needs to slide tiles from where they started.
use rand::Rng;

/// Animation-facing state of a cell for the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TileStatus {
    #[default]
    Empty,
    Spawned,
    Still,
    Moved,
    Merged,
}

/// One source that contributes to a tile's displayed position this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Origin {
    pub index: usize,
    pub level: u32,
}

/// A board slot. `index` never changes; everything else is cleared and
/// refilled as tiles slide through the slot.
///
/// `history` is empty exactly when `status` is [`TileStatus::Empty`]. It
/// holds one origin normally and two right after a merge (the absorbing
/// tile's own origin first, the absorbed tile's second).
#[derive(Clone, Debug)]
pub struct Tile {
    index: usize,
    level: Option<u32>,
    status: TileStatus,
    history: Vec<Origin>,
}

impl Tile {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            level: None,
            status: TileStatus::Empty,
            history: Vec::new(),
        }
    }

    /// Occupied slot with single-source history, as if it sat still this turn.
    pub(crate) fn with_level(index: usize, level: u32) -> Self {
        Self {
            index,
            level: Some(level),
            status: TileStatus::Still,
            history: vec![Origin { index, level }],
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn level(&self) -> Option<u32> {
        self.level
    }

    pub fn status(&self) -> TileStatus {
        self.status
    }

    pub fn history(&self) -> &[Origin] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.level.is_none()
    }

    /// Displayed value, `2^level`; `None` for an empty slot.
    pub fn value(&self) -> Option<u64> {
        self.level.and_then(|l| 1u64.checked_shl(l))
    }

    /// Points awarded when a merge produces this tile.
    pub fn score_value(&self) -> Option<u64> {
        self.value()
    }

    /// A tile may absorb or be absorbed once per turn.
    pub fn able_to_merge(&self) -> bool {
        !matches!(self.status, TileStatus::Empty | TileStatus::Merged)
    }

    pub fn reset(&mut self) {
        self.level = None;
        self.status = TileStatus::Empty;
        self.history.clear();
    }

    /// Record the pre-turn position so the player can slide from it.
    pub fn prepare_for_move(&mut self) {
        if let Some(level) = self.level {
            self.history.clear();
            self.history.push(Origin {
                index: self.index,
                level,
            });
            self.status = TileStatus::Still;
        }
    }

    /// Fill an empty slot: level 1 nine times in ten, level 2 otherwise.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R) {
        debug_assert!(self.is_empty(), "spawn on occupied tile {}", self.index);
        let level = if rng.gen_range(0..10) < 9 { 1 } else { 2 };
        self.level = Some(level);
        self.status = TileStatus::Spawned;
        self.history.clear();
        self.history.push(Origin {
            index: self.index,
            level,
        });
    }

    /// Fold this tile into `other`, which gains one level and this tile's origin.
    pub fn merge_with(&mut self, other: &mut Tile) {
        debug_assert!(!self.is_empty(), "merge from empty tile {}", self.index);
        if let Some(level) = other.level.as_mut() {
            *level += 1;
        }
        if let Some(origin) = self.history.first() {
            other.history.push(*origin);
        }
        other.status = TileStatus::Merged;
        self.reset();
    }

    /// Slide this tile into the empty slot `other`.
    pub fn move_to(&mut self, other: &mut Tile) {
        debug_assert!(!self.is_empty(), "move from empty tile {}", self.index);
        other.level = self.level;
        other.history = std::mem::take(&mut self.history);
        other.status = TileStatus::Moved;
        self.reset();
    }
}

/// Structural equality: slot and level only. Status and history are
/// animation data and never make two boards differ.
impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.level == other.level
    }
}

impl Eq for Tile {}
