use std::sync::Arc;

use rand_pcg::Pcg32;

use crate::bitmap::Bitmap;
use crate::color::Rgba;
use crate::core;
use crate::error::Result;
use crate::scanline::Scanline;
use crate::shapes::Shape;

/// one search lane: a private scratch canvas, an evaluation counter, and its
/// own RNG stream, scoring candidates against read-only snapshots.
///
/// workers never write the shared snapshot; all compositing happens in the
/// owned scratch buffer, which makes the per-step fan-out safe to run on
/// rayon with no synchronization beyond the initial hand-off.
#[derive(Debug)]
pub struct Worker {
    target: Arc<Bitmap>,
    current: Arc<Bitmap>,
    buffer: Bitmap,
    score: f64,
    counter: u64,
    partials: bool,
    rng: Pcg32,
}

impl Worker {
    pub fn new(
        target: Arc<Bitmap>,
        current: Arc<Bitmap>,
        partials: bool,
        rng: Pcg32,
    ) -> Result<Self> {
        let buffer = Bitmap::new(target.width(), target.height())?;
        Ok(Self {
            target,
            current,
            buffer,
            score: 0.0,
            counter: 0,
            partials,
            rng,
        })
    }

    /// rebind the canvas snapshot and baseline score for a new step and reset
    /// the evaluation counter.
    pub fn init(&mut self, current: Arc<Bitmap>, score: f64) {
        self.current = current;
        self.score = score;
        self.counter = 0;
    }

    /// score a candidate against the bound snapshot.
    ///
    /// partial path: snapshot only the affected rows into scratch, composite,
    /// rescore incrementally from the baseline. full path: copy the whole
    /// snapshot and recompute from scratch. both paths agree on the result.
    pub fn energy(&mut self, shape: &Shape, alpha: u8) -> Result<f64> {
        profiling::scope!("worker::energy");
        self.counter += 1;

        let lines = shape.rasterize();
        let color = self.compute_color(&lines, alpha);

        if self.partials {
            core::copy_lines(&mut self.buffer, &self.current, &lines)?;
            core::draw_lines(&mut self.buffer, color, &lines);
            core::difference_partial(&self.target, &self.current, &self.buffer, self.score, &lines)
        } else {
            self.buffer.data.copy_from_slice(self.current.data());
            core::draw_lines(&mut self.buffer, color, &lines);
            core::difference(&self.target, &self.buffer)
        }
    }

    fn compute_color(&self, lines: &[Scanline], alpha: u8) -> Rgba {
        core::compute_color(&self.target, &self.current, lines, alpha)
    }

    /// evaluations since the last `init`. a diagnostic progress signal, not a
    /// correctness input.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn width(&self) -> u32 {
        self.target.width()
    }

    pub fn height(&self) -> u32 {
        self.target.height()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeKind;
    use rand::SeedableRng;

    fn worker_pair(partials: bool) -> (Worker, Arc<Bitmap>) {
        let target = Arc::new(Bitmap::filled(32, 32, Rgba::new(220, 40, 40, 255)).unwrap());
        let current = Arc::new(Bitmap::filled(32, 32, Rgba::new(128, 128, 128, 255)).unwrap());
        let score = core::difference(&target, &current).unwrap();
        let mut worker = Worker::new(
            Arc::clone(&target),
            Arc::clone(&current),
            partials,
            Pcg32::seed_from_u64(77),
        )
        .unwrap();
        worker.init(Arc::clone(&current), score);
        (worker, current)
    }

    #[test]
    fn partial_and_full_paths_agree() {
        let (mut partial, _) = worker_pair(true);
        let (mut full, _) = worker_pair(false);

        for _ in 0..20 {
            let shape = Shape::random(ShapeKind::Rectangle, 32, 32, partial.rng_mut());
            let ep = partial.energy(&shape, 128).unwrap();
            let ef = full.energy(&shape, 128).unwrap();
            assert!((ep - ef).abs() < 1e-9, "partial {ep} vs full {ef}");
        }
    }

    #[test]
    fn energy_never_mutates_the_snapshot() {
        let (mut worker, current) = worker_pair(true);
        let snapshot = current.data().to_vec();
        for _ in 0..10 {
            let shape = Shape::random(ShapeKind::Triangle, 32, 32, worker.rng_mut());
            worker.energy(&shape, 200).unwrap();
        }
        assert_eq!(current.data(), &snapshot[..]);
    }

    #[test]
    fn counter_tracks_evaluations_and_resets() {
        let (mut worker, current) = worker_pair(true);
        let shape = Shape::random(ShapeKind::Ellipse, 32, 32, worker.rng_mut());
        worker.energy(&shape, 128).unwrap();
        worker.energy(&shape, 128).unwrap();
        assert_eq!(worker.counter(), 2);

        worker.init(current, 0.1);
        assert_eq!(worker.counter(), 0);
    }
}
