// Status overlay: a tint that eases toward a per-status colour every frame.
use crate::board::GameStatus;

/// Weight of the current colour against the target in one smoothing step.
const SMOOTHING_KEEP: f64 = 24.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// `(24 * self + target) / 25` per channel.
    pub fn blend_toward(self, target: Rgba) -> Rgba {
        let mix = |c: f64, t: f64| (SMOOTHING_KEEP * c + t) / (SMOOTHING_KEEP + 1.0);
        Rgba {
            r: mix(self.r, target.r),
            g: mix(self.g, target.g),
            b: mix(self.b, target.b),
            a: mix(self.a, target.a),
        }
    }

    pub fn distance(self, other: Rgba) -> f64 {
        [
            (self.r - other.r) / 255.0,
            (self.g - other.g) / 255.0,
            (self.b - other.b) / 255.0,
            self.a - other.a,
        ]
        .iter()
        .fold(0.0_f64, |acc, d| acc.max(d.abs()))
    }

    /// CSS `rgba(...)` string for canvas fill styles.
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.r.round().clamp(0.0, 255.0) as u8,
            self.g.round().clamp(0.0, 255.0) as u8,
            self.b.round().clamp(0.0, 255.0) as u8,
            self.a.clamp(0.0, 1.0)
        )
    }
}

/// Colour and banner text the overlay settles on for `status`.
pub fn target_for(status: GameStatus) -> (Rgba, Option<&'static str>) {
    match status {
        GameStatus::InProgress | GameStatus::Continued => (Rgba::TRANSPARENT, None),
        GameStatus::Won => (Rgba::new(237.0, 194.0, 46.0, 0.5), Some("You win!")),
        GameStatus::Lost => (Rgba::new(238.0, 228.0, 218.0, 0.73), Some("Game over!")),
    }
}

#[derive(Clone, Debug)]
pub struct OverlayTint {
    color: Rgba,
    text: Option<&'static str>,
}

impl Default for OverlayTint {
    fn default() -> Self {
        Self {
            color: Rgba::TRANSPARENT,
            text: None,
        }
    }
}

impl OverlayTint {
    pub fn new() -> Self {
        Self::default()
    }

    /// One smoothing step toward the colour for `status`.
    pub fn update(&mut self, status: GameStatus) {
        let (target, text) = target_for(status);
        self.color = self.color.blend_toward(target);
        self.text = text;
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn text(&self) -> Option<&'static str> {
        self.text
    }

    pub fn is_visible(&self) -> bool {
        self.color.a > 0.005
    }
}
