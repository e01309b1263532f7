//! the five primitive kinds and their closed polymorphic wrapper.
//!
//! every variant carries the canvas bounds it was constructed against and obeys
//! value semantics: `mutate` perturbs exactly one parameter by a Gaussian
//! offset and returns a new instance, never touching the receiver.

mod ellipse;
mod rectangle;
mod rotated_ellipse;
mod rotated_rectangle;
mod triangle;

pub use ellipse::Ellipse;
pub use rectangle::Rectangle;
pub use rotated_ellipse::RotatedEllipse;
pub use rotated_rectangle::RotatedRectangle;
pub use triangle::Triangle;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::scanline::Scanline;

/// standard-normal sample used for all mutation offsets (scale applied by the
/// caller, typically 16).
#[inline]
pub(crate) fn gauss<R: Rng>(rng: &mut R) -> f32 {
    rng.sample(StandardNormal)
}

/// inclusive uniform integer, as an f32 coordinate offset.
#[inline]
pub(crate) fn int_offset<R: Rng>(rng: &mut R, lo: i32, hi: i32) -> f32 {
    rng.random_range(lo..=hi) as f32
}

/// shape selection tag. `Random` draws uniformly from the non-redundant kinds
/// (plain ellipse, rectangle and circle are special cases of the rotated
/// variants, so they are excluded from the random pool).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    RotatedRectangle,
    Circle,
    Ellipse,
    RotatedEllipse,
    Triangle,
    Random,
}

const RANDOM_POOL: [ShapeKind; 3] = [
    ShapeKind::RotatedEllipse,
    ShapeKind::RotatedRectangle,
    ShapeKind::Triangle,
];

/// a committed or candidate primitive. closed tagged variant set; adding a
/// kind means extending every match below.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    RotatedRectangle(RotatedRectangle),
    Ellipse(Ellipse),
    RotatedEllipse(RotatedEllipse),
    Triangle(Triangle),
}

impl Shape {
    /// randomly construct a shape of the given kind, bounded by the canvas.
    pub fn random<R: Rng>(kind: ShapeKind, width: u32, height: u32, rng: &mut R) -> Shape {
        match kind {
            ShapeKind::Rectangle => Shape::Rectangle(Rectangle::random(width, height, rng)),
            ShapeKind::RotatedRectangle => {
                Shape::RotatedRectangle(RotatedRectangle::random(width, height, rng))
            }
            ShapeKind::Circle => Shape::Ellipse(Ellipse::random_circle(width, height, rng)),
            ShapeKind::Ellipse => Shape::Ellipse(Ellipse::random(width, height, rng)),
            ShapeKind::RotatedEllipse => {
                Shape::RotatedEllipse(RotatedEllipse::random(width, height, rng))
            }
            ShapeKind::Triangle => Shape::Triangle(Triangle::random(width, height, rng)),
            ShapeKind::Random => {
                let kind = RANDOM_POOL[rng.random_range(0..RANDOM_POOL.len())];
                Shape::random(kind, width, height, rng)
            }
        }
    }

    /// derive a new shape with exactly one parameter perturbed.
    pub fn mutate<R: Rng>(&self, rng: &mut R) -> Shape {
        match self {
            Shape::Rectangle(s) => Shape::Rectangle(s.mutate(rng)),
            Shape::RotatedRectangle(s) => Shape::RotatedRectangle(s.mutate(rng)),
            Shape::Ellipse(s) => Shape::Ellipse(s.mutate(rng)),
            Shape::RotatedEllipse(s) => Shape::RotatedEllipse(s.mutate(rng)),
            Shape::Triangle(s) => Shape::Triangle(s.mutate(rng)),
        }
    }

    /// scan-convert to clipped scanlines ready for compositing.
    pub fn rasterize(&self) -> Vec<Scanline> {
        profiling::scope!("shape::rasterize");
        match self {
            Shape::Rectangle(s) => s.rasterize(),
            Shape::RotatedRectangle(s) => s.rasterize(),
            Shape::Ellipse(s) => s.rasterize(),
            Shape::RotatedEllipse(s) => s.rasterize(),
            Shape::Triangle(s) => s.rasterize(),
        }
    }

    /// vector-path export; `attrs` is injected verbatim into the element.
    pub fn svg(&self, attrs: &str) -> String {
        match self {
            Shape::Rectangle(s) => s.svg(attrs),
            Shape::RotatedRectangle(s) => s.svg(attrs),
            Shape::Ellipse(s) => s.svg(attrs),
            Shape::RotatedEllipse(s) => s.svg(attrs),
            Shape::Triangle(s) => s.svg(attrs),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::RotatedRectangle(_) => ShapeKind::RotatedRectangle,
            Shape::Ellipse(s) if s.is_circle() => ShapeKind::Circle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::RotatedEllipse(_) => ShapeKind::RotatedEllipse,
            Shape::Triangle(_) => ShapeKind::Triangle,
        }
    }

    /// canvas width the shape was constructed against.
    pub fn width(&self) -> u32 {
        match self {
            Shape::Rectangle(s) => s.width,
            Shape::RotatedRectangle(s) => s.width,
            Shape::Ellipse(s) => s.width,
            Shape::RotatedEllipse(s) => s.width,
            Shape::Triangle(s) => s.width,
        }
    }

    /// canvas height the shape was constructed against.
    pub fn height(&self) -> u32 {
        match self {
            Shape::Rectangle(s) => s.height,
            Shape::RotatedRectangle(s) => s.height,
            Shape::Ellipse(s) => s.height,
            Shape::RotatedEllipse(s) => s.height,
            Shape::Triangle(s) => s.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const KINDS: [ShapeKind; 6] = [
        ShapeKind::Rectangle,
        ShapeKind::RotatedRectangle,
        ShapeKind::Circle,
        ShapeKind::Ellipse,
        ShapeKind::RotatedEllipse,
        ShapeKind::Triangle,
    ];

    #[test]
    fn mutate_preserves_canvas_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for kind in KINDS {
            for _ in 0..50 {
                let shape = Shape::random(kind, 128, 96, &mut rng);
                let mutated = shape.mutate(&mut rng);
                assert_eq!(mutated.width(), 128);
                assert_eq!(mutated.height(), 96);
            }
        }
    }

    #[test]
    fn random_pool_excludes_redundant_kinds() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let shape = Shape::random(ShapeKind::Random, 64, 64, &mut rng);
            assert!(matches!(
                shape.kind(),
                ShapeKind::RotatedEllipse | ShapeKind::RotatedRectangle | ShapeKind::Triangle
            ));
        }
    }

    #[test]
    fn rasterized_shapes_stay_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(23);
        for kind in KINDS {
            for _ in 0..100 {
                let shape = Shape::random(kind, 48, 32, &mut rng);
                for line in shape.rasterize() {
                    assert!(line.y >= 0 && line.y < 32, "{kind:?} row {line:?}");
                    assert!(line.x1 >= 0 && line.x2 < 48, "{kind:?} span {line:?}");
                    assert!(line.x1 <= line.x2);
                }
            }
        }
    }

    #[test]
    fn provenance_json_round_trips() {
        let mut rng = Pcg32::seed_from_u64(3);
        let shape = Shape::random(ShapeKind::RotatedEllipse, 64, 64, &mut rng);
        let json = serde_json::to_string(&shape).unwrap();
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), shape.kind());
        assert_eq!(back.width(), 64);
    }
}
