use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{gauss, int_offset};
use crate::raster;
use crate::scanline::Scanline;

/// rectangle with an arbitrary rotation (degrees) about its center.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RotatedRectangle {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub angle: f32,
}

const M: f32 = 16.0;

impl RotatedRectangle {
    pub fn random<R: Rng>(width: u32, height: u32, rng: &mut R) -> Self {
        let w = width as f32;
        let h = height as f32;

        let x1 = rng.random_range(0..width) as f32;
        let y1 = rng.random_range(0..height) as f32;
        let x2 = (x1 + int_offset(rng, -16, 16)).clamp(0.0, w - 1.0);
        let y2 = (y1 + int_offset(rng, -16, 16)).clamp(0.0, h - 1.0);
        let angle = rng.random::<f32>() * 360.0;

        Self {
            width,
            height,
            x1,
            y1,
            x2,
            y2,
            angle,
        }
    }

    /// three-way mutate: first corner, second corner, or angle.
    pub fn mutate<R: Rng>(&self, rng: &mut R) -> Self {
        let w = self.width as f32;
        let h = self.height as f32;
        let mut shape = self.clone();

        match rng.random_range(0..3) {
            0 => {
                shape.x1 = (shape.x1 + gauss(rng) * M).clamp(0.0, w - 1.0);
                shape.y1 = (shape.y1 + gauss(rng) * M).clamp(0.0, h - 1.0);
            }
            1 => {
                shape.x2 = (shape.x2 + gauss(rng) * M).clamp(0.0, w - 1.0);
                shape.y2 = (shape.y2 + gauss(rng) * M).clamp(0.0, h - 1.0);
            }
            _ => {
                shape.angle += gauss(rng) * M;
            }
        }

        shape
    }

    /// rotated corner points, clockwise from the upper-left corner.
    pub fn points(&self) -> [(i32, i32); 4] {
        let xm1 = self.x1.min(self.x2);
        let xm2 = self.x1.max(self.x2);
        let ym1 = self.y1.min(self.y2);
        let ym2 = self.y1.max(self.y2);

        let cx = (xm1 + xm2) / 2.0;
        let cy = (ym1 + ym2) / 2.0;

        let ox1 = xm1 - cx;
        let ox2 = xm2 - cx;
        let oy1 = ym1 - cy;
        let oy2 = ym2 - cy;

        let rads = self.angle.to_radians();
        let c = rads.cos();
        let s = rads.sin();

        let rot = |ox: f32, oy: f32| {
            (
                (ox * c - oy * s + cx).trunc() as i32,
                (ox * s + oy * c + cy).trunc() as i32,
            )
        };

        [
            rot(ox1, oy1),
            rot(ox2, oy1),
            rot(ox2, oy2),
            rot(ox1, oy2),
        ]
    }

    pub fn rasterize(&self) -> Vec<Scanline> {
        let lines = raster::polygon(&self.points());
        Scanline::filter(lines, self.width, self.height)
    }

    pub fn svg(&self, attrs: &str) -> String {
        let points = self
            .points()
            .iter()
            .map(|(x, y)| format!("{x} {y}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(r#"<polygon {attrs} points="{points}" />"#)
    }
}
