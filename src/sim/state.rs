//! Game phases, intents and tick events
//!
//! Shared by every game in the collection.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Initial screen, waiting for a start tap
    #[default]
    Ready,
    /// Active simulation
    Playing,
    /// Simulation frozen, resumable
    Paused,
    /// Run ended; a tap resets to Ready
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Ready => "ready",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "gameOver",
        }
    }
}

/// Discrete player/host intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Start,
    Pause,
    Resume,
    Reset,
    Exit,
}

/// Phase reached by honouring `intent` in `phase`, or `None` if the intent is
/// not legal there. Exit is handled by the session (it tears everything
/// down), so it never maps to a phase.
pub fn apply_intent(phase: GamePhase, intent: Intent) -> Option<GamePhase> {
    match (phase, intent) {
        (GamePhase::Ready, Intent::Start) => Some(GamePhase::Playing),
        (GamePhase::Playing, Intent::Pause) => Some(GamePhase::Paused),
        (GamePhase::Paused, Intent::Resume) => Some(GamePhase::Playing),
        (GamePhase::GameOver, Intent::Reset) => Some(GamePhase::Ready),
        _ => None,
    }
}

/// Side effects produced during a tick, for the host to forward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Score moved (positive or negative delta)
    ScoreChanged { score: u64, delta: i64 },
    /// Ball bounced off the paddle
    PaddleHit { speed: f32 },
    /// A brick was destroyed
    BrickHit { index: usize, points: u64 },
    /// A life was lost; `lives` is what remains
    LifeLost { lives: u8 },
    /// All bricks cleared
    LevelComplete { level: u32, bonus: u64 },
    /// Shooter difficulty rose
    DifficultyUp { level: u32 },
    /// Shooter enemy destroyed
    EnemyKilled { points: u64 },
    /// Shooter power-up collected
    PowerUpCollected { kind: super::PowerUpKind },
    /// Shield absorbed a hit
    ShieldAbsorbed,
    /// Memory pair resolved
    PairResolved { matched: bool },
    /// Terminal transition
    GameOver { score: u64, won: bool },
}

/// Result of one game tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep playing
    Continue,
    /// The run reached a terminal state
    Finished { won: bool },
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Derive a fresh generator; each call advances the stream so resets
    /// within one session get different layouts
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream.wrapping_mul(2).wrapping_add(1));
        self.stream += 1;
        rng
    }
}
