use serde::{Deserialize, Serialize};

/// un-premultiplied 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// opaque `#rrggbb` form used by the SVG exporter (alpha is carried
    /// separately as `fill-opacity`).
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// alpha as a unit-interval opacity.
    pub fn opacity(&self) -> f64 {
        self.a as f64 / 255.0
    }
}
