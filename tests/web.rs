// Browser tests, run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use slide_merge::{Clock, Direction, GameStatus};
use slide_merge::web::PerformanceClock;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn performance_clock_is_monotonic() {
    let clock = PerformanceClock;
    let a = clock.now_ms();
    let b = clock.now_ms();
    assert!(b >= a);
}

#[wasm_bindgen_test]
fn start_game_creates_canvas() {
    slide_merge::start_game().expect("start");
    let doc = web_sys::window().and_then(|w| w.document()).expect("document");
    assert!(doc.get_element_by_id("slide-merge-canvas").is_some());
    // second start swaps the game instead of failing
    slide_merge::start_game_with(5, 5, 12).expect("restart with new size");
    slide_merge::restart_game();
}

#[wasm_bindgen_test]
fn invalid_dimensions_are_rejected() {
    assert!(slide_merge::start_game_with(0, 4, 11).is_err());
    assert!(slide_merge::start_game_with(4, 4, 1).is_err());
}

#[wasm_bindgen_test]
fn key_mapping_in_browser() {
    assert_eq!(Direction::from_key("ArrowUp"), Some(Direction::Up));
    assert_ne!(GameStatus::default(), GameStatus::Lost);
}
