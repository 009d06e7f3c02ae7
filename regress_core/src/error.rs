use std::fmt;

use crate::bands::FrequencyBand;

/// The result type used throughout the pipeline crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors produced while building or fitting a regression pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A shape invariant was violated (e.g. mismatched lengths).
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    /// A band name in a selection string is not part of the closed band set.
    UnknownBand { name: String },

    /// The same band appears twice in a selection or feature set.
    DuplicateBand { band: FrequencyBand },

    /// A configured band has no matching feature block.
    MissingBand { band: FrequencyBand },

    /// A band selection or feature set contains no bands.
    EmptySelection,

    /// A feature block holds zero samples.
    EmptyBlock { band: FrequencyBand },

    /// The derived projection rank is outside `[1, n_channels]`.
    InvalidRank { rank: usize, n_channels: usize },

    /// A covariance matrix is not positive definite.
    NotPositiveDefinite {
        band: FrequencyBand,
        eigenvalue: f64,
    },

    /// A covariance diagonal entry is non-positive, so its log is undefined.
    NonPositiveVariance {
        band: FrequencyBand,
        channel: usize,
    },

    /// A projected component has non-positive power under some sample.
    DegenerateComponent {
        band: FrequencyBand,
        component: usize,
    },

    /// The regression target is constant, so supervised projections are undefined.
    ConstantTarget,

    /// Variance thresholding removed every feature column.
    NoFeaturesLeft { threshold: f64 },

    /// Too few samples for the requested operation.
    TooFewSamples { got: usize, min: usize },

    /// A numeric routine failed to produce a usable decomposition.
    Numeric(&'static str),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ShapeMismatch {
                what,
                got,
                expected,
            } => {
                write!(f, "shape mismatch for {what}: got {got}, expected {expected}")
            }
            PipelineError::UnknownBand { name } => write!(f, "unknown frequency band `{name}`"),
            PipelineError::DuplicateBand { band } => {
                write!(f, "frequency band `{band}` appears more than once")
            }
            PipelineError::MissingBand { band } => {
                write!(f, "no feature block for configured band `{band}`")
            }
            PipelineError::EmptySelection => write!(f, "no frequency bands selected"),
            PipelineError::EmptyBlock { band } => {
                write!(f, "feature block for band `{band}` holds no samples")
            }
            PipelineError::InvalidRank { rank, n_channels } => write!(
                f,
                "projection rank {rank} is outside the valid range [1, {n_channels}]"
            ),
            PipelineError::NotPositiveDefinite { band, eigenvalue } => write!(
                f,
                "mean covariance for band `{band}` is not positive definite \
                 (eigenvalue {eigenvalue:e})"
            ),
            PipelineError::NonPositiveVariance { band, channel } => write!(
                f,
                "channel {channel} in band `{band}` has non-positive variance"
            ),
            PipelineError::DegenerateComponent { band, component } => write!(
                f,
                "projected component {component} in band `{band}` has non-positive power"
            ),
            PipelineError::ConstantTarget => {
                write!(f, "target is constant; supervised projection is undefined")
            }
            PipelineError::NoFeaturesLeft { threshold } => write!(
                f,
                "all feature columns fall below the variance threshold {threshold:e}"
            ),
            PipelineError::TooFewSamples { got, min } => {
                write!(f, "got {got} samples but at least {min} are required")
            }
            PipelineError::Numeric(what) => write!(f, "numeric failure in {what}"),
        }
    }
}

impl std::error::Error for PipelineError {}
