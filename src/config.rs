//! Board construction parameters.

use thiserror::Error;

/// Highest win level accepted; tile values are `2^level` in a `u64`.
pub const MAX_TARGET_LEVEL: u32 = 40;

/// Largest board the renderer and the rejection-sampling spawn are tuned for.
pub const MAX_CELLS: usize = 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board needs at least one row")]
    ZeroRows,
    #[error("board needs at least one column")]
    ZeroColumns,
    #[error("target tile level {level} is unreachable (minimum is 2)")]
    TargetTooLow { level: u32 },
    #[error("target tile level {level} is above the maximum of {}", MAX_TARGET_LEVEL)]
    TargetTooHigh { level: u32 },
    #[error("board of {cells} cells is too small to hold the two opening tiles")]
    TooSmall { cells: usize },
    #[error("board of {cells} cells exceeds the {} cell limit", MAX_CELLS)]
    BoardTooLarge { cells: usize },
    #[error("invalid config json: {0}")]
    Json(String),
}

/// Rows, columns and the level that counts as a win. Defaults to the classic
/// 4x4 board played to 2048 (level 11).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub target_tile_level: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            columns: 4,
            target_tile_level: 11,
        }
    }
}

impl GameConfig {
    pub fn new(rows: usize, columns: usize, target_tile_level: u32) -> Result<Self, ConfigError> {
        let cfg = Self {
            rows,
            columns,
            target_tile_level,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn cells(&self) -> usize {
        self.rows * self.columns
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::ZeroRows);
        }
        if self.columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        if self.target_tile_level < 2 {
            return Err(ConfigError::TargetTooLow {
                level: self.target_tile_level,
            });
        }
        if self.target_tile_level > MAX_TARGET_LEVEL {
            return Err(ConfigError::TargetTooHigh {
                level: self.target_tile_level,
            });
        }
        let cells = self.rows.saturating_mul(self.columns);
        if cells < 2 {
            return Err(ConfigError::TooSmall { cells });
        }
        if cells > MAX_CELLS {
            return Err(ConfigError::BoardTooLarge { cells });
        }
        Ok(())
    }

    /// Parse and validate e.g. `{"rows":5,"columns":5,"target_tile_level":12}`.
    #[cfg(feature = "serde_json")]
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Json(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
