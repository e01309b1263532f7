use rand::Rng;

use crate::error::Result;
use crate::shapes::{Shape, ShapeKind};
use crate::worker::Worker;

/// a candidate: a shape, its alpha, and a lazily cached score.
///
/// value semantics throughout: [`State::mutate`] returns a fresh state with
/// the cache cleared; the receiver is never touched. the score is computed at
/// most once per derivation, against whichever worker evaluates it first.
#[derive(Clone, Debug)]
pub struct State {
    pub shape: Shape,
    pub alpha: u8,
    mutate_alpha: bool,
    score: Option<f64>,
}

impl State {
    /// wrap a shape. `alpha == 0` means "unpinned": start at 128 and let
    /// mutation jitter it; any other value is held fixed for the state's
    /// whole lineage.
    pub fn new(shape: Shape, alpha: u8) -> Self {
        let (alpha, mutate_alpha) = if alpha == 0 { (128, true) } else { (alpha, false) };
        Self {
            shape,
            alpha,
            mutate_alpha,
            score: None,
        }
    }

    /// randomly constructed candidate bounded by the canvas.
    pub fn create<R: Rng>(
        kind: ShapeKind,
        width: u32,
        height: u32,
        alpha: u8,
        rng: &mut R,
    ) -> Self {
        Self::new(Shape::random(kind, width, height, rng), alpha)
    }

    /// candidate energy, evaluated on first call and cached until the next
    /// `mutate`.
    pub fn energy(&mut self, worker: &mut Worker) -> Result<f64> {
        match self.score {
            Some(score) => Ok(score),
            None => {
                let score = worker.energy(&self.shape, self.alpha)?;
                self.score = Some(score);
                Ok(score)
            }
        }
    }

    /// score if already evaluated.
    pub fn cached_score(&self) -> Option<f64> {
        self.score
    }

    /// derive a new candidate: mutate the shape, jitter alpha by [-10, 10]
    /// (clamped to [1, 255]) when unpinned, clear the score cache.
    pub fn mutate<R: Rng>(&self, rng: &mut R) -> State {
        let mut state = self.clone();
        state.shape = state.shape.mutate(rng);
        if state.mutate_alpha {
            state.alpha = (state.alpha as i32 + rng.random_range(-10..=10)).clamp(1, 255) as u8;
        }
        state.score = None;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn zero_alpha_unpins_mutation() {
        let mut rng = Pcg32::seed_from_u64(1);
        let state = State::create(ShapeKind::Rectangle, 64, 64, 0, &mut rng);
        assert_eq!(state.alpha, 128);

        let mut seen_change = false;
        let mut s = state;
        for _ in 0..50 {
            s = s.mutate(&mut rng);
            assert!(s.alpha >= 1);
            seen_change |= s.alpha != 128;
        }
        assert!(seen_change);
    }

    #[test]
    fn pinned_alpha_never_moves() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut s = State::create(ShapeKind::Triangle, 64, 64, 200, &mut rng);
        for _ in 0..50 {
            s = s.mutate(&mut rng);
            assert_eq!(s.alpha, 200);
        }
    }

    #[test]
    fn mutate_clears_score_cache() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut s = State::create(ShapeKind::Ellipse, 32, 32, 128, &mut rng);
        s.score = Some(0.5);
        let derived = s.mutate(&mut rng);
        assert_eq!(derived.cached_score(), None);
        assert_eq!(s.cached_score(), Some(0.5));
    }
}
