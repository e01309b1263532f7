use thiserror::Error;

/// crate-wide error type. every variant is a non-retryable usage or
/// host-integration error; shape construction edge cases never surface here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("image buffer is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// two buffers that must cover the same canvas disagree in length.
    /// indicates a host-integration bug, so we fail instead of truncating.
    #[error("incompatible image buffers ({left} vs {right} bytes)")]
    ImageMismatch { left: usize, right: usize },

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("step hook failed")]
    StepHook(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn option(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
