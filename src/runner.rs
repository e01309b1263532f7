//! validated top-level driver: builds a [`Model`] with a mean-color
//! background and steps it until a stop condition, invoking a per-step hook
//! after every commit.

use crate::bitmap::Bitmap;
use crate::core;
use crate::error::{Error, Result};
use crate::model::{Model, ModelConfig, StepOptions};
use crate::shapes::ShapeKind;

/// everything a run needs, validated up front. defaults mirror a reasonable
/// interactive configuration: triangles, pinned alpha 128, one worker, 50
/// random candidates and 100 mutations of patience per step.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub shape_kind: ShapeKind,
    /// 0 = unpinned alpha (starts at 128, jittered per mutation)
    pub shape_alpha: u8,
    pub num_candidates: usize,
    pub num_candidate_shapes: u32,
    pub num_candidate_mutations: u32,
    pub num_candidate_extras: u32,
    /// longest edge of the vector output; `None` keeps the target size.
    pub output_size: Option<u32>,
    /// stop once the score drops to this energy.
    pub min_energy: Option<f64>,
    /// incremental scoring; disable to force full recomputes.
    pub partials: bool,
    pub seed: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            shape_kind: ShapeKind::Triangle,
            shape_alpha: 128,
            num_candidates: 1,
            num_candidate_shapes: 50,
            num_candidate_mutations: 100,
            num_candidate_extras: 0,
            output_size: None,
            min_energy: None,
            partials: true,
            seed: 0xDEAD_BEEF,
        }
    }
}

impl RunOptions {
    /// fail fast on anything out of range, before any search starts.
    pub fn validate(&self) -> Result<()> {
        if self.num_candidates == 0 {
            return Err(Error::option("num_candidates", "must be at least 1"));
        }
        if self.num_candidate_shapes == 0 {
            return Err(Error::option("num_candidate_shapes", "must be at least 1"));
        }
        if self.num_candidate_mutations == 0 {
            return Err(Error::option("num_candidate_mutations", "must be at least 1"));
        }
        if self.output_size == Some(0) {
            return Err(Error::option("output_size", "must be positive"));
        }
        if let Some(energy) = self.min_energy {
            if !(0.0..=1.0).contains(&energy) {
                return Err(Error::option(
                    "min_energy",
                    format!("{energy} is outside [0, 1]"),
                ));
            }
        }
        Ok(())
    }
}

/// what one driver step observed.
#[derive(Clone, Copy, Debug)]
pub struct StepOutcome {
    /// total candidate evaluations across the worker pool. zero means the
    /// search is no longer making progress and the caller should stop.
    pub evaluations: u64,
    /// the `min_energy` stop condition was reached.
    pub reached_min_energy: bool,
}

/// per-step callback; runs to completion after each commit, before the next
/// candidate search begins. an error aborts the run.
pub type StepHook<'a> = dyn FnMut(&Model, usize) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>
    + 'a;

pub struct Runner {
    model: Model,
    opts: RunOptions,
    steps: usize,
}

impl Runner {
    /// validate options, pick the target's mean color as background, and set
    /// up the model and worker pool.
    pub fn new(target: Bitmap, opts: RunOptions) -> Result<Self> {
        opts.validate()?;

        let background = core::mean_color(&target);
        let cfg = ModelConfig {
            output_size: opts.output_size,
            num_candidates: opts.num_candidates,
            partials: opts.partials,
            seed: opts.seed,
        };
        let model = Model::new(target, background, &cfg)?;

        log::info!(
            "run start: {}x{} target, {:?} shapes, {} worker(s), initial score {:.6}",
            model.target().width(),
            model.target().height(),
            opts.shape_kind,
            opts.num_candidates,
            model.score()
        );

        Ok(Self {
            model,
            opts,
            steps: 0,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// steps committed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// commit one primitive (plus any extras) and report progress.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let evaluations = self.model.step(&StepOptions {
            shape_kind: self.opts.shape_kind,
            shape_alpha: self.opts.shape_alpha,
            num_candidate_shapes: self.opts.num_candidate_shapes,
            num_candidate_mutations: self.opts.num_candidate_mutations,
            num_candidate_extras: self.opts.num_candidate_extras,
        })?;
        self.steps += 1;

        let reached_min_energy = self
            .opts
            .min_energy
            .is_some_and(|min| self.model.score() <= min);

        Ok(StepOutcome {
            evaluations,
            reached_min_energy,
        })
    }

    /// drive up to `max_steps` steps, invoking `on_step` once per committed
    /// step. the hook finishes before the next search begins; its error
    /// aborts the run. returns the number of committed steps.
    pub fn run(&mut self, max_steps: usize, on_step: &mut StepHook<'_>) -> Result<usize> {
        for _ in 0..max_steps {
            let outcome = self.step()?;
            on_step(&self.model, self.steps).map_err(Error::StepHook)?;

            if outcome.reached_min_energy {
                log::info!("min energy reached after {} steps", self.steps);
                break;
            }
            if outcome.evaluations == 0 {
                log::info!("search stalled after {} steps", self.steps);
                break;
            }
        }
        Ok(self.steps)
    }
}
