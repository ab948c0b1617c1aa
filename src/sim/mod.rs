//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (velocities per tick, timers in ticks)
//! - Seeded RNG only
//! - Virtual time for delayed actions
//! - No rendering or platform dependencies

pub mod breakout;
pub mod collision;
pub mod memory;
pub mod shooter;
pub mod spawn;
pub mod state;
pub mod timer;

pub use breakout::{Ball, BounceState, Brick, Paddle};
pub use collision::{HitAxis, Rect};
pub use memory::{Card, FlipRejected, MatchTask, MemoryState};
pub use shooter::{Buffs, Bullet, Enemy, Player, PowerUp, PowerUpKind, ShooterState};
pub use spawn::{Difficulty, SpawnCounter, weighted_pick};
pub use state::{GameEvent, GamePhase, Intent, RngState, TickOutcome, apply_intent};
pub use timer::{Scheduler, TaskId};
