//! facet: approximates a target image with layered translucent geometric
//! primitives, searched by randomized hill climbing.
//!
//! the pipeline: a [`model::Model`] holds the target and a canvas seeded with
//! a solid background; each step fans candidate searches out across a
//! [`worker::Worker`] pool, commits the best shape found, and records its
//! provenance. [`runner::Runner`] wraps the loop with validated options, a
//! mean-color background, and per-step hooks. results export as SVG or JSON.

pub mod bitmap;
pub mod color;
pub mod core;
pub mod error;
pub mod model;
pub mod optimize;
pub mod raster;
pub mod runner;
pub mod scanline;
pub mod shapes;
pub mod state;
pub mod worker;

pub use bitmap::Bitmap;
pub use color::Rgba;
pub use error::{Error, Result};
pub use model::{Model, ModelConfig, StepOptions};
pub use runner::{RunOptions, Runner, StepOutcome};
pub use scanline::Scanline;
pub use shapes::{Shape, ShapeKind};
pub use state::State;
pub use worker::Worker;
