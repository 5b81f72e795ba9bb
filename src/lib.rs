//! Slide Merge core crate.
//!
//! A 2048-style sliding-tile puzzle. The board model and move resolution live
//! in [`board`], animated playback of move snapshots in [`animation`], and the
//! status tint in [`overlay`]. [`game::Game`] wires them to an input queue and
//! a [`animation::Renderer`]; [`web`] supplies the browser collaborators and is
//! what `start_game()` launches.

use wasm_bindgen::prelude::*;

pub mod animation;
pub mod board;
pub mod config;
pub mod game;
pub mod input;
pub mod logging;
pub mod overlay;
pub mod web;

pub use animation::{AnimationPlayer, Clock, ManualClock, Renderer, Sprite, tile_sprites};
pub use board::{Direction, GameState, GameStatus, Origin, Tile, TileStatus};
pub use config::{ConfigError, GameConfig};
pub use game::Game;
pub use input::InputQueue;
pub use overlay::{OverlayTint, Rgba};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init();
}

// -----------------------------------------------------------------------------
// Browser entry points
// -----------------------------------------------------------------------------

/// Classic 4x4 board played to 2048.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::start(GameConfig::default())
}

#[wasm_bindgen]
pub fn start_game_with(rows: usize, columns: usize, target_tile_level: u32) -> Result<(), JsValue> {
    let config = GameConfig::new(rows, columns, target_tile_level)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::start(config)
}

#[wasm_bindgen]
pub fn restart_game() {
    web::restart();
}
