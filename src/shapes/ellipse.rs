use rand::Rng;
use serde::{Deserialize, Serialize};

use super::gauss;
use crate::scanline::Scanline;

/// axis-aligned ellipse; with `circle` set the two radii are pinned equal.
///
/// rasterized directly from the closed-form per-row half-width
/// `sqrt(ry^2 - dy^2) * (rx / ry)`, emitting symmetric rows above and below
/// the center. no generic polygon pass involved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) width: u32,
    pub(crate) height: u32,
    circle: bool,
    pub x: f32,
    pub y: f32,
    pub rx: f32,
    pub ry: f32,
}

const M: f32 = 16.0;

impl Ellipse {
    pub fn random<R: Rng>(width: u32, height: u32, rng: &mut R) -> Self {
        Self::construct(width, height, false, rng)
    }

    pub fn random_circle<R: Rng>(width: u32, height: u32, rng: &mut R) -> Self {
        Self::construct(width, height, true, rng)
    }

    fn construct<R: Rng>(width: u32, height: u32, circle: bool, rng: &mut R) -> Self {
        let x = rng.random_range(0..width) as f32;
        let y = rng.random_range(0..height) as f32;
        let rx = rng.random_range(1..=32) as f32;
        let ry = if circle {
            rx
        } else {
            rng.random_range(1..=32) as f32
        };

        Self {
            width,
            height,
            circle,
            x,
            y,
            rx,
            ry,
        }
    }

    pub fn is_circle(&self) -> bool {
        self.circle
    }

    /// three-way mutate: move center, resize rx, resize ry. a circle keeps
    /// both radii locked together whichever one was picked.
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
                if shape.circle {
                    shape.ry = shape.rx;
                }
            }
            _ => {
                shape.ry = (shape.ry + gauss(rng) * M).clamp(1.0, h - 1.0);
                if shape.circle {
                    shape.rx = shape.ry;
                }
            }
        }

        shape
    }

    pub fn rasterize(&self) -> Vec<Scanline> {
        let w = self.width as f32;
        let h = self.height as f32;
        let aspect = self.rx / self.ry;
        let mut lines = Vec::new();

        let mut dy = 0.0_f32;
        while dy < self.ry {
            let y1 = self.y - dy;
            let y2 = self.y + dy;

            if (y1 < 0.0 || y1 >= h) && (y2 < 0.0 || y2 >= h) {
                dy += 1.0;
                continue;
            }

            let s = (self.ry * self.ry - dy * dy).sqrt() * aspect;
            let x1 = (self.x - s).max(0.0);
            let x2 = (self.x + s).min(w - 1.0);

            if y1 >= 0.0 && y1 < h {
                lines.push(Scanline::new(y1, x1, x2));
            }
            if y2 >= 0.0 && y2 < h && dy > 0.0 {
                lines.push(Scanline::new(y2, x1, x2));
            }

            dy += 1.0;
        }

        lines
    }

    pub fn svg(&self, attrs: &str) -> String {
        format!(
            r#"<ellipse {attrs} cx="{}" cy="{}" rx="{}" ry="{}" />"#,
            self.x, self.y, self.rx, self.ry
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn circle_keeps_radii_equal_through_mutation() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut shape = Ellipse::random_circle(128, 128, &mut rng);
        for _ in 0..100 {
            shape = shape.mutate(&mut rng);
            assert_eq!(shape.rx, shape.ry);
        }
    }

    #[test]
    fn rows_are_symmetric_about_center() {
        let shape = Ellipse {
            width: 64,
            height: 64,
            circle: false,
            x: 32.0,
            y: 32.0,
            rx: 6.0,
            ry: 4.0,
        };
        let lines = shape.rasterize();
        // dy = 0 gives one row, dy = 1..4 give two each
        assert_eq!(lines.len(), 7);
        let widest = lines.iter().find(|l| l.y == 32).unwrap();
        assert_eq!((widest.x1, widest.x2), (26, 38));
        for line in &lines {
            let mirror = 64 - line.y;
            assert!(lines.iter().any(|l| l.y == mirror));
        }
    }

    #[test]
    fn spans_are_clamped_to_canvas() {
        let shape = Ellipse {
            width: 16,
            height: 16,
            circle: false,
            x: 1.0,
            y: 1.0,
            rx: 30.0,
            ry: 30.0,
        };
        for line in shape.rasterize() {
            assert!(line.y >= 0 && line.y < 16);
            assert!(line.x1 >= 0 && line.x2 <= 15);
        }
    }
}
