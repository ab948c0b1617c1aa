//! Configuration error types
//!
//! The engine does no I/O, so the only fallible step is building a game from
//! its settings. Invalid settings fail fast at construction.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A size or count that must be strictly positive was not
    NonPositiveDimension { name: &'static str, value: f32 },
    /// Memory grid has an odd number of cards, so pairing is impossible
    OddCardCount { rows: u32, cols: u32 },
    /// A `min..max` range is inverted or otherwise unusable
    InvalidRange { name: &'static str, min: f32, max: f32 },
    /// Weighted table probabilities are negative or sum to zero
    InvalidProbabilities { total: f32 },
    /// Brick grid does not fit inside the play area
    BrickGridOverflow { grid_width: f32, area_width: f32 },
    /// A grid reaches past the edge it has to stay inside
    GridOutOfBounds { name: &'static str, extent: f32, limit: f32 },
    /// Settings document could not be parsed
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveDimension { name, value } => {
                write!(f, "{name} must be positive, got {value}")
            }
            Self::OddCardCount { rows, cols } => write!(
                f,
                "card grid {rows}x{cols} has an odd number of cards; pairs are impossible"
            ),
            Self::InvalidRange { name, min, max } => {
                write!(f, "invalid range for {name}: min={min}, max={max}")
            }
            Self::InvalidProbabilities { total } => {
                write!(f, "weighted table probabilities must be non-negative with a positive sum (sum={total})")
            }
            Self::BrickGridOverflow {
                grid_width,
                area_width,
            } => write!(
                f,
                "brick grid is {grid_width}px wide but the play area is only {area_width}px"
            ),
            Self::GridOutOfBounds { name, extent, limit } => {
                write!(f, "{name} reaches {extent}px, past the limit of {limit}px")
            }
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Fail with `NonPositiveDimension` unless `value > 0`
pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveDimension { name, value })
    }
}

/// Fail with `InvalidRange` unless `0 <= min <= max`
pub(crate) fn require_range(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min >= 0.0 && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { name, min, max })
    }
}
