//! Mini Arcade - headless engine for a mini-game collection
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (physics, collisions, spawning, game phases)
//! - `session`: One running game plus its collaborators
//! - `renderer`: Draw-list snapshots handed to an external renderer
//! - `platform`: Pointer routing and clock abstraction
//! - `progress`: Score reporting boundary and an in-memory progress tracker
//! - `settings`: Data-driven per-game tuning

pub mod error;
pub mod highscores;
pub mod platform;
pub mod progress;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use highscores::HighScores;
pub use progress::{ProgressEvent, ProgressReporter, ProgressTracker};
pub use session::{GameId, Session};
pub use settings::{BouncePreset, Settings};

use rand::Rng;

/// Engine-wide constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one display frame)
    pub const TICK_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the accumulator will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;
}

/// Clamp a value into `[min, max]` (tolerates `min > max` by returning `min`)
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max.max(min)
    } else {
        value
    }
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Uniform draw from `[min, max)`; returns `min` for an empty range
#[inline]
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}

/// Convert seconds to whole simulation ticks (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    ((secs / consts::TICK_DT).round() as u64).max(1)
}
