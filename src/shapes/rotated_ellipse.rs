use rand::Rng;
use serde::{Deserialize, Serialize};

use super::gauss;
use crate::raster;
use crate::scanline::Scanline;

/// rotated ellipse, approximated for rasterization as a 20-vertex sampled
/// polygon fed through the generic edge-walk rasterizer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RotatedEllipse {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub x: f32,
    pub y: f32,
    pub rx: f32,
    pub ry: f32,
    pub angle: f32,
}

const M: f32 = 16.0;
const NUM_POINTS: usize = 20;

impl RotatedEllipse {
    pub fn random<R: Rng>(width: u32, height: u32, rng: &mut R) -> Self {
        Self {
            width,
            height,
            x: rng.random_range(0..width) as f32,
            y: rng.random_range(0..height) as f32,
            rx: rng.random_range(1..=32) as f32,
            ry: rng.random_range(1..=32) as f32,
            angle: rng.random::<f32>() * 360.0,
        }
    }

    /// three-way mutate: move, resize both radii, or rotate.
    pub fn mutate<R: Rng>(&self, rng: &mut R) -> Self {
        let w = self.width as f32;
        let h = self.height as f32;
        let mut shape = self.clone();

        match rng.random_range(0..3) {
            0 => {
                shape.x = (shape.x + gauss(rng) * M).clamp(0.0, w - 1.0);
                shape.y = (shape.y + gauss(rng) * M).clamp(0.0, h - 1.0);
            }
            1 => {
                shape.rx = (shape.rx + gauss(rng) * M).clamp(1.0, w - 1.0);
                shape.ry = (shape.ry + gauss(rng) * M).clamp(1.0, h - 1.0);
            }
            _ => {
                shape.angle += gauss(rng) * M;
            }
        }

        shape
    }

    /// sampled perimeter, rotated into place.
    pub fn points(&self) -> Vec<(i32, i32)> {
        let rads = self.angle.to_radians();
        let c = rads.cos();
        let s = rads.sin();

        (0..NUM_POINTS)
            .map(|i| {
                let rot = (360.0 / NUM_POINTS as f32) * i as f32;
                let rot = rot.to_radians();
                let crx = self.rx * rot.cos();
                let cry = self.ry * rot.sin();

                (
                    (crx * c - cry * s + self.x) as i32,
                    (crx * s + cry * c + self.y) as i32,
                )
            })
            .collect()
    }

    pub fn rasterize(&self) -> Vec<Scanline> {
        let lines = raster::polygon(&self.points());
        Scanline::filter(lines, self.width, self.height)
    }

    pub fn svg(&self, attrs: &str) -> String {
        // exported as the sampled polygon; a native rotated ellipse element
        // would render smoother but diverge from the rasterized coverage
        let points = self
            .points()
            .iter()
            .map(|(x, y)| format!("{x} {y}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(r#"<polygon {attrs} points="{points}" />"#)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn perimeter_has_twenty_vertices() {
        let mut rng = Pcg32::seed_from_u64(4);
        let shape = RotatedEllipse::random(64, 64, &mut rng);
        assert_eq!(shape.points().len(), 20);
    }

    #[test]
    fn unrotated_points_respect_radii() {
        let shape = RotatedEllipse {
            width: 64,
            height: 64,
            x: 32.0,
            y: 32.0,
            rx: 10.0,
            ry: 5.0,
            angle: 0.0,
        };
        for (x, y) in shape.points() {
            assert!((x - 32).abs() <= 10);
            assert!((y - 32).abs() <= 5);
        }
    }

    #[test]
    fn radii_mutation_keeps_minimum_of_one() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut shape = RotatedEllipse::random(32, 32, &mut rng);
        for _ in 0..200 {
            shape = shape.mutate(&mut rng);
            assert!(shape.rx >= 1.0 && shape.ry >= 1.0);
        }
    }
}
