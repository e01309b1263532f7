use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{gauss, int_offset};
use crate::raster;
use crate::scanline::Scanline;

/// triangle with a compactness constraint: every interior angle must exceed
/// 15 degrees, so near-degenerate slivers are rejected at construction and
/// mutation time. vertices may overscan the canvas by up to 16px; the
/// scanline filter clips coverage back to the canvas.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub x3: f32,
    pub y3: f32,
}

const M: f32 = 16.0;
const MIN_DEGREES: f32 = 15.0;
const MAX_MUTATE_RETRIES: u32 = 128;

impl Triangle {
    /// first vertex uniform over the canvas, the other two within +/-15px of
    /// it. resampled until the angle constraint holds.
    pub fn random<R: Rng>(width: u32, height: u32, rng: &mut R) -> Self {
        loop {
            let x1 = rng.random_range(0..width) as f32;
            let y1 = rng.random_range(0..height) as f32;

            let shape = Self {
                width,
                height,
                x1,
                y1,
                x2: x1 + int_offset(rng, -15, 15),
                y2: y1 + int_offset(rng, -15, 15),
                x3: x1 + int_offset(rng, -15, 15),
                y3: y1 + int_offset(rng, -15, 15),
            };

            if shape.is_valid() {
                return shape;
            }
        }
    }

    /// perturb one vertex, keeping it within the 16px overscan margin.
    /// invalid results are re-rolled; after 128 failed attempts the working
    /// copy resets to the unmutated shape and the search starts over.
    pub fn mutate<R: Rng>(&self, rng: &mut R) -> Self {
        let lo_x = -M;
        let hi_x = self.width as f32 - 1.0 + M;
        let lo_y = -M;
        let hi_y = self.height as f32 - 1.0 + M;

        let mut shape = self.clone();
        let mut attempts = 0;

        loop {
            match rng.random_range(0..3) {
                0 => {
                    shape.x1 = (shape.x1 + gauss(rng) * M).clamp(lo_x, hi_x);
                    shape.y1 = (shape.y1 + gauss(rng) * M).clamp(lo_y, hi_y);
                }
                1 => {
                    shape.x2 = (shape.x2 + gauss(rng) * M).clamp(lo_x, hi_x);
                    shape.y2 = (shape.y2 + gauss(rng) * M).clamp(lo_y, hi_y);
                }
                _ => {
                    shape.x3 = (shape.x3 + gauss(rng) * M).clamp(lo_x, hi_x);
                    shape.y3 = (shape.y3 + gauss(rng) * M).clamp(lo_y, hi_y);
                }
            }

            if shape.is_valid() {
                return shape;
            }

            attempts += 1;
            if attempts > MAX_MUTATE_RETRIES {
                shape = self.clone();
                attempts = 0;
            }
        }
    }

    /// all three interior angles exceed 15 degrees. the first two come from
    /// the law of cosines on normalized edge vectors; the third is derived as
    /// `180 - a1 - a2`. degenerate edges produce NaN angles, which fail the
    /// comparison and reject the shape.
    pub fn is_valid(&self) -> bool {
        let angle = |ox: f32, oy: f32, px: f32, py: f32, qx: f32, qy: f32| -> f32 {
            let mut x1 = px - ox;
            let mut y1 = py - oy;
            let mut x2 = qx - ox;
            let mut y2 = qy - oy;
            let d1 = (x1 * x1 + y1 * y1).sqrt();
            let d2 = (x2 * x2 + y2 * y2).sqrt();
            x1 /= d1;
            y1 /= d1;
            x2 /= d2;
            y2 /= d2;
            (x1 * x2 + y1 * y2).acos().to_degrees()
        };

        let a1 = angle(self.x1, self.y1, self.x2, self.y2, self.x3, self.y3);
        let a2 = angle(self.x2, self.y2, self.x1, self.y1, self.x3, self.y3);
        let a3 = 180.0 - a1 - a2;

        a1 > MIN_DEGREES && a2 > MIN_DEGREES && a3 > MIN_DEGREES
    }

    pub fn rasterize(&self) -> Vec<Scanline> {
        let lines = raster::triangle(self.x1, self.y1, self.x2, self.y2, self.x3, self.y3);
        Scanline::filter(lines, self.width, self.height)
    }

    pub fn svg(&self, attrs: &str) -> String {
        format!(
            r#"<polygon {attrs} points="{},{} {},{} {},{}" />"#,
            self.x1, self.y1, self.x2, self.y2, self.x3, self.y3
        )
    }
}
