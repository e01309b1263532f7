//! randomized local search over [`State`] space: random restart followed by
//! hill climbing with a patience-based stop.

use crate::error::Result;
use crate::shapes::ShapeKind;
use crate::state::State;
use crate::worker::Worker;

/// knobs for one worker's candidate search.
#[derive(Clone, Copy, Debug)]
pub struct SearchOptions {
    pub shape_kind: ShapeKind,
    /// 0 = unpinned (start at 128, jitter per mutation)
    pub shape_alpha: u8,
    pub num_candidate_shapes: u32,
    pub num_candidate_mutations: u32,
}

/// draw `num_candidate_shapes` independent random candidates and keep the
/// strict minimum-energy one; the first seen wins ties.
pub fn best_random_state(worker: &mut Worker, opts: &SearchOptions) -> Result<State> {
    profiling::scope!("optimize::best_random_state");

    let (width, height) = (worker.width(), worker.height());

    let mut best = State::create(
        opts.shape_kind,
        width,
        height,
        opts.shape_alpha,
        worker.rng_mut(),
    );
    let mut best_energy = best.energy(worker)?;

    for _ in 1..opts.num_candidate_shapes {
        let mut state = State::create(
            opts.shape_kind,
            width,
            height,
            opts.shape_alpha,
            worker.rng_mut(),
        );
        let energy = state.energy(worker)?;

        // strict comparison: the first-seen candidate wins ties
        if energy < best_energy {
            best_energy = energy;
            best = state;
        }
    }

    Ok(best)
}

/// greedy local search: repeatedly mutate the best state, accepting only
/// strict improvements. `max_age` bounds *consecutive* non-improving
/// attempts, not total iterations; each improvement resets the patience.
pub fn hill_climb(worker: &mut Worker, state: State, max_age: u32) -> Result<State> {
    profiling::scope!("optimize::hill_climb");

    let mut best = state;
    let mut best_energy = best.energy(worker)?;

    let mut age = 0;
    while age < max_age {
        let mut candidate = best.mutate(worker.rng_mut());
        let energy = candidate.energy(worker)?;

        if energy < best_energy {
            best_energy = energy;
            best = candidate;
            age = 0;
        } else {
            age += 1;
        }
    }

    Ok(best)
}

/// the full per-worker search: random restart, then hill climbing with
/// patience equal to `num_candidate_mutations`.
pub fn best_hill_climb_state(worker: &mut Worker, opts: &SearchOptions) -> Result<State> {
    let state = best_random_state(worker, opts)?;
    hill_climb(worker, state, opts.num_candidate_mutations)
}
