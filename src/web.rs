//! Browser glue: canvas renderer, DOM listeners and the frame loop.
//!
//! Everything here is a thin collaborator around [`Game`]: keydown events feed
//! its input queue, `#restart` restarts it, and every animation frame runs one
//! [`Game::tick`] against a [`CanvasRenderer`] before the score labels are
//! refreshed.
use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window, window};

use crate::animation::{Clock, Renderer, Sprite, tile_sprites};
use crate::board::{Direction, GameState};
use crate::config::GameConfig;
use crate::game::Game;
use crate::overlay::OverlayTint;

const CANVAS_ID: &str = "slide-merge-canvas";
const MAX_CANVAS_PX: f64 = 500.0;
const FONT_STACK: &str = "'Clear Sans', 'Helvetica Neue', Arial, sans-serif";

// --- Clock -------------------------------------------------------------------

/// `performance.now()`; falls back to 0 outside a browser window.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }
}

// --- Layout / palette ----------------------------------------------------------

/// Pixel layout of a board drawn `width` pixels wide.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Geometry {
    gap: f64,
    cell: f64,
    width: f64,
    height: f64,
}

impl Geometry {
    fn new(width: f64, rows: usize, columns: usize) -> Self {
        let gap = width / (columns as f64 * 8.0);
        let cell = (width - gap * (columns as f64 + 1.0)) / columns as f64;
        let height = rows as f64 * cell + (rows as f64 + 1.0) * gap;
        Self {
            gap,
            cell,
            width,
            height,
        }
    }

    /// Top-left pixel of a (possibly fractional) cell position.
    fn origin(&self, row: f64, column: f64) -> (f64, f64) {
        (
            self.gap + column * (self.cell + self.gap),
            self.gap + row * (self.cell + self.gap),
        )
    }
}

/// Background and text colour for a tile of `level`.
fn tile_colors(level: u32) -> (&'static str, &'static str) {
    let bg = match level {
        1 => "#eee4da",
        2 => "#ede0c8",
        3 => "#f2b179",
        4 => "#f59563",
        5 => "#f67c5f",
        6 => "#f65e3b",
        7 => "#edcf72",
        8 => "#edcc61",
        9 => "#edc850",
        10 => "#edc53f",
        11 => "#edc22e",
        _ => "#3c3a32",
    };
    let fg = if level <= 2 { "#776e65" } else { "#f9f6f2" };
    (bg, fg)
}

fn tile_label(level: u32) -> String {
    1u64.checked_shl(level)
        .map(|v| v.to_string())
        .unwrap_or_else(|| format!("2^{level}"))
}

/// Font size that keeps `digits` characters inside a cell.
fn font_px(cell: f64, digits: usize) -> f64 {
    let scale = match digits {
        0..=2 => 0.55,
        3 => 0.45,
        4 => 0.36,
        _ => 0.28,
    };
    (cell * scale).floor().max(8.0)
}

// --- Renderer ------------------------------------------------------------------

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    geometry: Geometry,
}

impl CanvasRenderer {
    fn new(canvas: HtmlCanvasElement, rows: usize, columns: usize) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let geometry = Geometry::new(canvas.width() as f64, rows, columns);
        Ok(Self {
            canvas,
            ctx,
            geometry,
        })
    }

    /// Fit the canvas to the window (capped) and recompute the layout.
    fn fit(&mut self, win: &Window, rows: usize, columns: usize) {
        let inner = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(MAX_CANVAS_PX);
        let avail = inner(win.inner_width()).min(inner(win.inner_height())) * 0.9;
        let width = avail.clamp(160.0, MAX_CANVAS_PX).floor();
        self.geometry = Geometry::new(width, rows, columns);
        self.canvas.set_width(self.geometry.width as u32);
        self.canvas.set_height(self.geometry.height.ceil() as u32);
    }

    fn draw_sprite(&self, sprite: &Sprite) {
        if sprite.scale <= 0.0 {
            return;
        }
        let g = &self.geometry;
        let (x, y) = g.origin(sprite.row, sprite.column);
        let size = g.cell * sprite.scale;
        let inset = (g.cell - size) / 2.0;
        let (bg, fg) = tile_colors(sprite.level);
        self.ctx.set_fill_style_str(bg);
        self.ctx.fill_rect(x + inset, y + inset, size, size);

        let label = tile_label(sprite.level);
        let px = font_px(size, label.len());
        self.ctx.set_fill_style_str(fg);
        self.ctx.set_font(&format!("bold {px}px {FONT_STACK}"));
        self.ctx
            .fill_text(&label, x + g.cell / 2.0, y + g.cell / 2.0)
            .ok();
    }
}

impl Renderer for CanvasRenderer {
    fn draw_board(&mut self, state: &GameState, progress: f64) {
        let g = self.geometry;
        self.ctx.set_fill_style_str("#bbada0");
        self.ctx.fill_rect(0.0, 0.0, g.width, g.height);

        self.ctx.set_fill_style_str("rgba(238,228,218,0.35)");
        for row in 0..state.rows() {
            for column in 0..state.columns() {
                let (x, y) = g.origin(row as f64, column as f64);
                self.ctx.fill_rect(x, y, g.cell, g.cell);
            }
        }

        // Bumping merges last so they overlap their neighbours.
        let mut sprites: Vec<Sprite> = state
            .tiles()
            .iter()
            .flat_map(|t| tile_sprites(t, state.columns(), progress))
            .collect();
        sprites.sort_by(|a, b| a.scale.total_cmp(&b.scale));
        for sprite in &sprites {
            self.draw_sprite(sprite);
        }
    }

    fn draw_overlay(&mut self, tint: &OverlayTint) {
        if !tint.is_visible() {
            return;
        }
        let g = self.geometry;
        self.ctx.set_fill_style_str(&tint.color().to_css());
        self.ctx.fill_rect(0.0, 0.0, g.width, g.height);
        if let Some(text) = tint.text() {
            self.ctx.set_fill_style_str("#776e65");
            self.ctx
                .set_font(&format!("bold {}px {FONT_STACK}", (g.width / 9.0).floor()));
            self.ctx.fill_text(text, g.width / 2.0, g.height / 2.0).ok();
        }
    }
}

// --- Entry / loop ----------------------------------------------------------------

struct WebGame {
    game: Game<PerformanceClock>,
    renderer: CanvasRenderer,
}

thread_local! {
    static WEB_GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
}

fn document(win: &Window) -> Result<Document, JsValue> {
    win.document().ok_or_else(|| JsValue::from_str("no document"))
}

/// Create the canvas, hook up listeners and start the frame loop. Calling it
/// again swaps in a new game without re-registering anything.
pub fn start(config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = document(&win)?;

    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        c.set_width(MAX_CANVAS_PX as u32);
        c.set_height(MAX_CANVAS_PX as u32);
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    let mut renderer = CanvasRenderer::new(canvas, config.rows, config.columns)?;
    renderer.fit(&win, config.rows, config.columns);
    let game = Game::new(config, PerformanceClock);

    let already_running = WEB_GAME.with(|cell| cell.replace(Some(WebGame { game, renderer })).is_some());
    if already_running {
        info!("game replaced");
        return Ok(());
    }

    attach_listeners(&win, &doc)?;
    start_frame_loop();
    Ok(())
}

pub fn restart() {
    WEB_GAME.with(|cell| {
        if let Some(web) = cell.borrow_mut().as_mut() {
            web.game.restart();
        }
    });
}

fn attach_listeners(win: &Window, doc: &Document) -> Result<(), JsValue> {
    // Keyboard -> direction queue
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let key = evt.key();
            if Direction::from_key(&key).is_none() {
                return;
            }
            if key.starts_with("Arrow") {
                evt.prevent_default();
            }
            WEB_GAME.with(|cell| {
                if let Some(web) = cell.borrow_mut().as_mut() {
                    web.game.queue_key(&key);
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Restart button (optional)
    if let Some(button) = doc.get_element_by_id("restart") {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            restart();
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Resize keeps the board inside the viewport
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let Some(win) = window() else {
                return;
            };
            WEB_GAME.with(|cell| {
                if let Some(web) = cell.borrow_mut().as_mut() {
                    let cfg = web.game.config();
                    web.renderer.fit(&win, cfg.rows, cfg.columns);
                }
            });
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(win: &Window, callback: &FrameCallback) {
    if let Some(cb) = callback.borrow().as_ref() {
        let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        WEB_GAME.with(|cell| {
            if let Some(web) = cell.borrow_mut().as_mut() {
                web.game.tick(&mut web.renderer);
                sync_labels(&web.game);
            }
        });
        if let Some(w) = window() {
            request_frame(&w, &f);
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        request_frame(&w, &g);
    }
}

/// Keep `#score` / `#best` in sync when the page provides them.
fn sync_labels(game: &Game<PerformanceClock>) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(el) = doc.get_element_by_id("score") {
        el.set_text_content(Some(&game.score().to_string()));
    }
    if let Some(el) = doc.get_element_by_id("best") {
        el.set_text_content(Some(&game.best_score().to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_fills_width() {
        let g = Geometry::new(400.0, 4, 4);
        assert!((g.gap - 12.5).abs() < 1e-9);
        let (x, _) = g.origin(0.0, 3.0);
        assert!((x + g.cell + g.gap - 400.0).abs() < 1e-9);
        assert!((g.height - 400.0).abs() < 1e-9);
        let wide = Geometry::new(400.0, 2, 4);
        assert!(wide.height < wide.width);
    }

    #[test]
    fn test_palette_and_labels() {
        assert_eq!(tile_colors(1), ("#eee4da", "#776e65"));
        assert_eq!(tile_colors(11).0, "#edc22e");
        assert_eq!(tile_colors(12).0, "#3c3a32");
        assert_eq!(tile_label(1), "2");
        assert_eq!(tile_label(11), "2048");
        assert!(font_px(100.0, 4) < font_px(100.0, 1));
    }
}
