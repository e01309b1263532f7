use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{gauss, int_offset};
use crate::scanline::Scanline;

/// axis-aligned rectangle stored as two opposite corners (unordered).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

const M: f32 = 16.0;

impl Rectangle {
    /// first corner uniform over the canvas, second within +/-16px of it.
    pub fn random<R: Rng>(width: u32, height: u32, rng: &mut R) -> Self {
        let w = width as f32;
        let h = height as f32;

        let x1 = rng.random_range(0..width) as f32;
        let y1 = rng.random_range(0..height) as f32;
        let x2 = (x1 + int_offset(rng, -16, 16)).clamp(0.0, w - 1.0);
        let y2 = (y1 + int_offset(rng, -16, 16)).clamp(0.0, h - 1.0);

        Self {
            width,
            height,
            x1,
            y1,
            x2,
            y2,
        }
    }

    /// corners ordered so that x1 <= x2 and y1 <= y2.
    fn bounds(&self) -> (f32, f32, f32, f32) {
        let (x1, x2) = if self.x1 > self.x2 {
            (self.x2, self.x1)
        } else {
            (self.x1, self.x2)
        };
        let (y1, y2) = if self.y1 > self.y2 {
            (self.y2, self.y1)
        } else {
            (self.y1, self.y2)
        };
        (x1, y1, x2, y2)
    }

    /// perturb one corner.
    pub fn mutate<R: Rng>(&self, rng: &mut R) -> Self {
        let w = self.width as f32;
        let h = self.height as f32;
        let mut shape = self.clone();

        match rng.random_range(0..2) {
            0 => {
                shape.x1 = (shape.x1 + gauss(rng) * M).clamp(0.0, w - 1.0);
                shape.y1 = (shape.y1 + gauss(rng) * M).clamp(0.0, h - 1.0);
            }
            _ => {
                shape.x2 = (shape.x2 + gauss(rng) * M).clamp(0.0, w - 1.0);
                shape.y2 = (shape.y2 + gauss(rng) * M).clamp(0.0, h - 1.0);
            }
        }

        shape
    }

    /// one span per covered row. corners are always clamped in-bounds, so no
    /// filtering pass is needed.
    pub fn rasterize(&self) -> Vec<Scanline> {
        let (x1, y1, x2, y2) = self.bounds();
        let mut lines = Vec::new();

        let mut y = y1;
        while y <= y2 {
            lines.push(Scanline::new(y, x1, x2));
            y += 1.0;
        }

        lines
    }

    pub fn svg(&self, attrs: &str) -> String {
        let (x1, y1, x2, y2) = self.bounds();
        let w = x2 - x1 + 1.0;
        let h = y2 - y1 + 1.0;
        format!(r#"<rect {attrs} x="{x1}" y="{y1}" width="{w}" height="{h}" />"#)
    }
}
