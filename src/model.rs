//! canonical canvas, provenance log, and the per-step fan-out/commit cycle.

use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use rayon::prelude::*;
use serde::Serialize;

use crate::bitmap::Bitmap;
use crate::color::Rgba;
use crate::core;
use crate::error::{Error, Result};
use crate::optimize::{self, SearchOptions};
use crate::shapes::{Shape, ShapeKind};
use crate::worker::Worker;

/// construction-time knobs for a [`Model`].
#[derive(Clone, Copy, Debug)]
pub struct ModelConfig {
    /// longest output edge for vector export; `None` keeps target size.
    pub output_size: Option<u32>,
    /// worker pool size; each worker runs an independent candidate search
    /// per step.
    pub num_candidates: usize,
    /// use the incremental scoring path. full recompute gives the same
    /// result, slower.
    pub partials: bool,
    /// base RNG seed; each worker derives its own stream.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            output_size: None,
            num_candidates: 1,
            partials: true,
            seed: 0xDEAD_BEEF,
        }
    }
}

/// per-step search knobs.
#[derive(Clone, Copy, Debug)]
pub struct StepOptions {
    pub shape_kind: ShapeKind,
    /// 0 = unpinned alpha (see [`crate::state::State::new`])
    pub shape_alpha: u8,
    pub num_candidate_shapes: u32,
    pub num_candidate_mutations: u32,
    /// after the main commit, keep climbing and committing while the energy
    /// strictly improves, at most this many times.
    pub num_candidate_extras: u32,
}

/// the optimization model: target image, canonical canvas and score,
/// append-only provenance (shapes, colors, scores in commit order), and a
/// fixed pool of workers.
#[derive(Debug)]
pub struct Model {
    target: Arc<Bitmap>,
    background: Rgba,
    current: Bitmap,
    /// scratch copy of the canvas for the partial-score commit path
    before: Bitmap,
    score: f64,
    shapes: Vec<Shape>,
    colors: Vec<Rgba>,
    scores: Vec<f64>,
    workers: Vec<Worker>,
    partials: bool,
    sw: u32,
    sh: u32,
    scale: f64,
}

#[derive(Serialize)]
struct Provenance<'a> {
    width: u32,
    height: u32,
    background: Rgba,
    shapes: &'a [Shape],
    colors: &'a [Rgba],
    scores: &'a [f64],
}

impl Model {
    pub fn new(target: Bitmap, background: Rgba, cfg: &ModelConfig) -> Result<Self> {
        if cfg.num_candidates == 0 {
            return Err(Error::option("num_candidates", "must be at least 1"));
        }
        if cfg.output_size == Some(0) {
            return Err(Error::option("output_size", "must be positive"));
        }

        let width = target.width();
        let height = target.height();

        // aspect-preserving output scale for vector export
        let (sw, sh, scale) = match cfg.output_size {
            Some(size) => {
                let aspect = width as f64 / height as f64;
                if aspect >= 1.0 {
                    (size, (size as f64 / aspect) as u32, size as f64 / width as f64)
                } else {
                    ((size as f64 * aspect) as u32, size, size as f64 / height as f64)
                }
            }
            None => (width, height, 1.0),
        };

        let target = Arc::new(target);
        let current = Bitmap::filled(width, height, background)?;
        let before = current.clone();
        let score = core::difference(&target, &current)?;

        let snapshot = Arc::new(current.clone());
        let workers = (0..cfg.num_candidates)
            .map(|i| {
                // one decorrelated stream per worker; golden-ratio stride
                let seed = cfg.seed.wrapping_add(i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                Worker::new(
                    Arc::clone(&target),
                    Arc::clone(&snapshot),
                    cfg.partials,
                    Pcg32::seed_from_u64(seed),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            target,
            background,
            current,
            before,
            score,
            shapes: Vec::new(),
            colors: Vec::new(),
            scores: Vec::new(),
            workers,
            partials: cfg.partials,
            sw,
            sh,
            scale,
        })
    }

    /// commit a candidate: recompute the blend color against the *current*
    /// canonical canvas (a worker's snapshot may be stale by now), composite,
    /// rescore, append to the provenance log.
    pub fn add(&mut self, shape: Shape, alpha: u8) -> Result<()> {
        profiling::scope!("model::add");

        if alpha == 0 {
            return Err(Error::option("alpha", "must be in [1, 255]"));
        }

        let lines = shape.rasterize();
        let color = core::compute_color(&self.target, &self.current, &lines, alpha);

        let score = if self.partials {
            self.before.data.copy_from_slice(self.current.data());
            core::draw_lines(&mut self.current, color, &lines);
            core::difference_partial(&self.target, &self.before, &self.current, self.score, &lines)?
        } else {
            core::draw_lines(&mut self.current, color, &lines);
            core::difference(&self.target, &self.current)?
        };

        log::debug!(
            "commit #{}: {:?} alpha={} score={:.6}",
            self.shapes.len(),
            shape.kind(),
            alpha,
            score
        );

        self.score = score;
        self.shapes.push(shape);
        self.colors.push(color);
        self.scores.push(score);
        Ok(())
    }

    /// run one step: fan the candidate search out across the worker pool,
    /// commit the global best, then run the extras loop. returns the summed
    /// evaluation counters (zero means the caller should stop).
    pub fn step(&mut self, opts: &StepOptions) -> Result<u64> {
        profiling::scope!("model::step");

        let search = SearchOptions {
            shape_kind: opts.shape_kind,
            shape_alpha: opts.shape_alpha,
            num_candidate_shapes: opts.num_candidate_shapes,
            num_candidate_mutations: opts.num_candidate_mutations,
        };

        // read-only snapshot shared by every worker for this step
        let snapshot = Arc::new(self.current.clone());
        let score = self.score;

        let mut states = self
            .workers
            .par_iter_mut()
            .map(|worker| {
                worker.init(Arc::clone(&snapshot), score);
                optimize::best_hill_climb_state(worker, &search)
            })
            .collect::<Result<Vec<_>>>()?;

        // global strict minimum; the first-seen state wins ties
        let mut best_idx = 0;
        let mut best_energy = f64::INFINITY;
        for (i, state) in states.iter().enumerate() {
            let energy = state.cached_score().unwrap_or(f64::INFINITY);
            if energy < best_energy {
                best_energy = energy;
                best_idx = i;
            }
        }

        let mut state = states.swap_remove(best_idx);
        self.add(state.shape.clone(), state.alpha)?;

        for _ in 0..opts.num_candidate_extras {
            let worker = &mut self.workers[best_idx];
            worker.init(Arc::new(self.current.clone()), self.score);

            // energy as of loop entry; cached, so this reads the value the
            // state carried in rather than rescoring against the new canvas
            let entry_energy = state.energy(worker)?;
            state = optimize::hill_climb(worker, state, opts.num_candidate_mutations)?;
            let energy = state.energy(worker)?;

            // commit only strict improvements; first non-improvement ends
            // the extras loop
            if energy < entry_energy {
                self.add(state.shape.clone(), state.alpha)?;
            } else {
                break;
            }
        }

        Ok(self.workers.iter().map(|w| w.counter()).sum())
    }

    /// vector export: background rect plus one element per committed shape in
    /// commit order, scaled to the configured output size.
    pub fn to_svg(&self) -> String {
        let body = self
            .shapes
            .iter()
            .zip(&self.colors)
            .map(|(shape, color)| {
                let attrs = format!(
                    r#"fill="{}" fill-opacity="{}""#,
                    color.hex(),
                    color.opacity()
                );
                shape.svg(&attrs)
            })
            .collect::<Vec<_>>()
            .join("\n    ");

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{sw}" height="{sh}">
  <rect x="0" y="0" width="{sw}" height="{sh}" fill="{bg}" />
  <g transform="scale({scale}) translate(0.5 0.5)">
    {body}
  </g>
</svg>
"#,
            sw = self.sw,
            sh = self.sh,
            bg = self.background.hex(),
            scale = self.scale,
        )
    }

    /// provenance log as JSON: dimensions, background, and the committed
    /// shapes/colors/scores in commit order.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Provenance {
            width: self.target.width(),
            height: self.target.height(),
            background: self.background,
            shapes: &self.shapes,
            colors: &self.colors,
            scores: &self.scores,
        })
    }

    /// canonical score in [0, 1]; lower is better.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn current(&self) -> &Bitmap {
        &self.current
    }

    pub fn target(&self) -> &Bitmap {
        &self.target
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// canonical score after each commit, in commit order.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone_target() -> Bitmap {
        let mut data = Vec::with_capacity(64 * 64 * 4);
        for _y in 0..64 {
            for x in 0..64 {
                let v = if x < 32 { 20 } else { 235 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Bitmap::from_raw(64, 64, data).unwrap()
    }

    fn step_opts() -> StepOptions {
        StepOptions {
            shape_kind: ShapeKind::Rectangle,
            shape_alpha: 128,
            num_candidate_shapes: 30,
            num_candidate_mutations: 30,
            num_candidate_extras: 0,
        }
    }

    #[test]
    fn rejects_empty_worker_pool() {
        let cfg = ModelConfig {
            num_candidates: 0,
            ..ModelConfig::default()
        };
        let err = Model::new(two_tone_target(), Rgba::new(0, 0, 0, 255), &cfg).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { name: "num_candidates", .. }));
    }

    #[test]
    fn empty_model_svg_has_only_background() {
        let model = Model::new(
            two_tone_target(),
            Rgba::new(127, 127, 127, 255),
            &ModelConfig::default(),
        )
        .unwrap();
        let svg = model.to_svg();
        assert!(svg.contains(r##"<rect x="0" y="0" width="64" height="64" fill="#7f7f7f" />"##));
        assert!(!svg.contains("<polygon"));
        assert!(!svg.contains("<ellipse"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn output_size_scales_svg_dimensions() {
        let mut data = Vec::new();
        for _ in 0..32 * 16 {
            data.extend_from_slice(&[9, 9, 9, 255]);
        }
        let target = Bitmap::from_raw(32, 16, data).unwrap();
        let cfg = ModelConfig {
            output_size: Some(128),
            ..ModelConfig::default()
        };
        let model = Model::new(target, Rgba::new(9, 9, 9, 255), &cfg).unwrap();
        let svg = model.to_svg();
        assert!(svg.contains(r#"width="128" height="64""#));
        assert!(svg.contains("scale(4)"));
    }

    #[test]
    fn add_keeps_provenance_in_sync() {
        let mut model = Model::new(
            two_tone_target(),
            Rgba::new(127, 127, 127, 255),
            &ModelConfig::default(),
        )
        .unwrap();
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..3 {
            let shape = Shape::random(ShapeKind::Rectangle, 64, 64, &mut rng);
            model.add(shape, 128).unwrap();
        }
        assert_eq!(model.shapes().len(), 3);
        assert_eq!(model.colors().len(), 3);
        assert_eq!(model.scores().len(), 3);
        assert_eq!(model.score(), model.scores()[2]);
    }

    #[test]
    fn commit_score_matches_full_recompute() {
        let mut model = Model::new(
            two_tone_target(),
            Rgba::new(127, 127, 127, 255),
            &ModelConfig::default(),
        )
        .unwrap();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..5 {
            let shape = Shape::random(ShapeKind::Triangle, 64, 64, &mut rng);
            model.add(shape, 160).unwrap();
            let full = core::difference(&model.target, &model.current).unwrap();
            assert!((model.score() - full).abs() < 1e-9);
        }
    }

    #[test]
    fn add_rejects_zero_alpha() {
        let mut model = Model::new(
            two_tone_target(),
            Rgba::new(127, 127, 127, 255),
            &ModelConfig::default(),
        )
        .unwrap();
        let mut rng = Pcg32::seed_from_u64(8);
        let shape = Shape::random(ShapeKind::Rectangle, 64, 64, &mut rng);
        let err = model.add(shape, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { name: "alpha", .. }));
        assert!(model.shapes().is_empty());
    }

    #[test]
    fn extras_commit_only_improving_shapes() {
        let mut model = Model::new(
            two_tone_target(),
            Rgba::new(127, 127, 127, 255),
            &ModelConfig::default(),
        )
        .unwrap();
        let opts = StepOptions {
            num_candidate_extras: 8,
            ..step_opts()
        };

        for _ in 0..3 {
            let before = model.shapes().len();
            model.step(&opts).unwrap();
            let committed = model.shapes().len() - before;
            assert!(committed >= 1);

            // every commit past the step's main one came from the extras
            // loop, which only accepts strict improvements on the score it
            // entered with
            let scores = model.scores();
            for i in before + 1..before + committed {
                assert!(
                    scores[i] < scores[i - 1] + 1e-9,
                    "extra commit {i} did not improve: {} -> {}",
                    scores[i - 1],
                    scores[i]
                );
            }
        }

        // the full trajectory, extras included, never worsens
        for pair in model.scores().windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9, "score rose: {pair:?}");
        }
        assert_eq!(model.score(), *model.scores().last().unwrap());
    }

    #[test]
    fn step_reports_evaluations_and_commits() {
        let mut model = Model::new(
            two_tone_target(),
            Rgba::new(127, 127, 127, 255),
            &ModelConfig {
                num_candidates: 2,
                ..ModelConfig::default()
            },
        )
        .unwrap();
        let evaluations = model.step(&step_opts()).unwrap();
        assert!(evaluations > 0);
        assert_eq!(model.shapes().len(), 1);
    }

    #[test]
    fn provenance_json_lists_commits() {
        let mut model = Model::new(
            two_tone_target(),
            Rgba::new(127, 127, 127, 255),
            &ModelConfig::default(),
        )
        .unwrap();
        model.step(&step_opts()).unwrap();
        let json = model.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["width"], 64);
        assert_eq!(value["shapes"].as_array().unwrap().len(), 1);
        assert_eq!(value["scores"].as_array().unwrap().len(), 1);
    }
}
