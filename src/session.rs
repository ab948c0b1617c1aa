//! One running game and everything it talks to
//!
//! A [`Session`] owns the game state, the phase machine, the fixed-step
//! accumulator and the collaborators. The host feeds it frames and pointer
//! events, reads back snapshots, and finally calls [`Session::exit`], which
//! consumes it.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, TICK_DT};
use crate::error::ConfigError;
use crate::platform::{Clock, PointerEvent, PointerKind, Routed, UiLayout, route_pointer};
use crate::progress::{ProgressEvent, ProgressReporter, ProgressUpdate, ResultMetadata};
use crate::renderer::{self, Hud, RenderSnapshot};
use crate::settings::Settings;
use crate::sim::{
    BounceState, GameEvent, GamePhase, Intent, MemoryState, RngState, ShooterState, TickOutcome,
    apply_intent, breakout, memory, shooter,
};

/// Games in the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    Bounce,
    Memory,
    Shooter,
}

impl GameId {
    pub const ALL: [GameId; 3] = [GameId::Bounce, GameId::Memory, GameId::Shooter];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Bounce => "bounce",
            GameId::Memory => "memory",
            GameId::Shooter => "shooter",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

#[derive(Debug, Clone)]
enum Game {
    Bounce(BounceState),
    Memory(MemoryState),
    Shooter(ShooterState),
}

impl Game {
    fn build(id: GameId, settings: &Settings, rng: &mut RngState) -> Result<Self, ConfigError> {
        Ok(match id {
            GameId::Bounce => Game::Bounce(BounceState::new(&settings.bounce)?),
            GameId::Memory => Game::Memory(MemoryState::new(&settings.memory, rng.next_rng())?),
            GameId::Shooter => {
                Game::Shooter(ShooterState::new(&settings.shooter, rng.next_rng())?)
            }
        })
    }

    fn score(&self) -> u64 {
        match self {
            Game::Bounce(s) => s.score,
            Game::Memory(s) => s.score,
            Game::Shooter(s) => s.score,
        }
    }

    fn metadata(&self) -> ResultMetadata {
        match self {
            Game::Bounce(s) => ResultMetadata {
                lives_lost: s.lives_lost,
                moves: 0,
                level: s.level,
                duration_ticks: s.time_ticks,
            },
            Game::Memory(s) => ResultMetadata {
                lives_lost: 0,
                moves: s.moves,
                level: 1,
                duration_ticks: s.time_ticks,
            },
            Game::Shooter(s) => ResultMetadata {
                lives_lost: s.lives_lost,
                moves: 0,
                level: s.difficulty.level,
                duration_ticks: s.time_ticks,
            },
        }
    }
}

/// What a pointer event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Changed the phase or reached the game
    Consumed,
    Ignored,
    /// The back button was pressed; the host should call [`Session::exit`]
    ExitRequested,
}

pub struct Session {
    game_id: GameId,
    settings: Settings,
    phase: GamePhase,
    game: Game,
    rng: RngState,
    layout: UiLayout,
    accumulator: f32,
    /// The current run's result went to the reporter
    reported: bool,
    won: bool,
    /// Leaderboard best from the last accepted report
    best_score: Option<u64>,
    reporter: Box<dyn ProgressReporter>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("game_id", &self.game_id)
            .field("phase", &self.phase)
            .field("score", &self.score())
            .field("reported", &self.reported)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        game_id: GameId,
        settings: &Settings,
        seed: u64,
        reporter: Box<dyn ProgressReporter>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let mut rng = RngState::new(seed);
        let game = Game::build(game_id, settings, &mut rng)?;
        log::info!("Session started: {} (seed {})", game_id.as_str(), seed);
        Ok(Self {
            game_id,
            settings: settings.clone(),
            phase: GamePhase::Ready,
            game,
            rng,
            layout: UiLayout::default(),
            accumulator: 0.0,
            reported: false,
            won: false,
            best_score: None,
            reporter,
            clock,
        })
    }

    pub fn with_layout(mut self, layout: UiLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.game.score()
    }

    /// Whether the last finished run was won
    pub fn won(&self) -> bool {
        self.won
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn bounce(&self) -> Option<&BounceState> {
        match &self.game {
            Game::Bounce(s) => Some(s),
            _ => None,
        }
    }

    pub fn bounce_mut(&mut self) -> Option<&mut BounceState> {
        match &mut self.game {
            Game::Bounce(s) => Some(s),
            _ => None,
        }
    }

    pub fn memory(&self) -> Option<&MemoryState> {
        match &self.game {
            Game::Memory(s) => Some(s),
            _ => None,
        }
    }

    pub fn memory_mut(&mut self) -> Option<&mut MemoryState> {
        match &mut self.game {
            Game::Memory(s) => Some(s),
            _ => None,
        }
    }

    pub fn shooter(&self) -> Option<&ShooterState> {
        match &self.game {
            Game::Shooter(s) => Some(s),
            _ => None,
        }
    }

    pub fn shooter_mut(&mut self) -> Option<&mut ShooterState> {
        match &mut self.game {
            Game::Shooter(s) => Some(s),
            _ => None,
        }
    }

    /// Apply a phase intent. Returns false when it is not legal in the
    /// current phase. Exit is not an intent here: call [`Session::exit`].
    pub fn handle_intent(&mut self, intent: Intent) -> bool {
        if intent == Intent::Exit {
            log::debug!("Exit intent must go through Session::exit");
            return false;
        }
        let Some(next) = apply_intent(self.phase, intent) else {
            log::debug!("Ignored {:?} in {}", intent, self.phase.as_str());
            return false;
        };

        if intent == Intent::Reset {
            match Game::build(self.game_id, &self.settings, &mut self.rng) {
                Ok(game) => self.game = game,
                Err(e) => {
                    // Settings were validated when the session was built
                    log::warn!("Reset failed, keeping finished run: {}", e);
                    return false;
                }
            }
            self.reported = false;
            self.won = false;
        }
        self.accumulator = 0.0;
        log::debug!("{} -> {}", self.phase.as_str(), next.as_str());
        self.phase = next;
        true
    }

    /// Route a pointer event: UI regions and phase taps first, then the game
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        match route_pointer(event, self.phase, &self.layout) {
            Routed::Intent(Intent::Exit) => PointerOutcome::ExitRequested,
            Routed::Intent(intent) => {
                if self.handle_intent(intent) {
                    PointerOutcome::Consumed
                } else {
                    PointerOutcome::Ignored
                }
            }
            Routed::Game(event) => self.game_pointer(event),
            Routed::Ignored => PointerOutcome::Ignored,
        }
    }

    fn game_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        let settings = &self.settings;
        match &mut self.game {
            Game::Bounce(state) => {
                breakout::steer(state, event.pos.x, &settings.bounce);
                PointerOutcome::Consumed
            }
            Game::Shooter(state) => {
                shooter::steer(state, event.pos.x, &settings.shooter);
                PointerOutcome::Consumed
            }
            Game::Memory(state) => {
                if event.kind != PointerKind::Press {
                    return PointerOutcome::Ignored;
                }
                let Some(index) = state.card_at(event.pos) else {
                    return PointerOutcome::Ignored;
                };
                match memory::flip(state, index) {
                    Ok(()) => PointerOutcome::Consumed,
                    Err(reason) => {
                        log::debug!("Flip of card {} rejected: {:?}", index, reason);
                        PointerOutcome::Ignored
                    }
                }
            }
        }
    }

    /// Run one fixed tick. Nothing changes unless the phase is Playing.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Playing {
            return events;
        }

        let settings = &self.settings;
        let outcome = match &mut self.game {
            Game::Bounce(state) => breakout::tick(state, &settings.bounce, &mut events),
            Game::Memory(state) => memory::tick(state, &settings.memory, &mut events),
            Game::Shooter(state) => shooter::tick(state, &settings.shooter, &mut events),
        };

        if let TickOutcome::Finished { won } = outcome {
            self.finish(won, &mut events);
        }
        events
    }

    /// Advance by one display frame of `frame_dt` seconds, running as many
    /// fixed ticks as fit (capped per frame)
    pub fn update(&mut self, frame_dt: f32) -> Vec<GameEvent> {
        if self.phase != GamePhase::Playing {
            self.accumulator = 0.0;
            return Vec::new();
        }

        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= TICK_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.tick());
            self.accumulator -= TICK_DT;
            substeps += 1;
            if self.phase != GamePhase::Playing {
                self.accumulator = 0.0;
                break;
            }
        }
        events
    }

    fn finish(&mut self, won: bool, events: &mut Vec<GameEvent>) {
        let score = self.score();
        self.phase = GamePhase::GameOver;
        self.won = won;
        events.push(GameEvent::GameOver { score, won });
        log::info!(
            "Game over: {} scored {} ({})",
            self.game_id.as_str(),
            score,
            if won { "won" } else { "lost" }
        );
        if let Some(update) = self.report(won) {
            self.best_score = update.best_score.or(self.best_score);
        }
    }

    fn report(&mut self, won: bool) -> Option<ProgressUpdate> {
        if self.reported {
            return None;
        }
        self.reported = true;

        let event = ProgressEvent {
            game_id: self.game_id,
            score: self.score(),
            won,
            completed_at: self.clock.now_ms(),
            metadata: self.game.metadata(),
        };
        match self.reporter.report_result(&event) {
            Ok(update) => {
                log::debug!(
                    "Reported {}: +{} points ({} total)",
                    self.game_id.as_str(),
                    update.earned_points,
                    update.points
                );
                Some(update)
            }
            Err(e) => {
                log::warn!("Failed to report {} result: {}", self.game_id.as_str(), e);
                None
            }
        }
    }

    /// Current frame for the renderer
    pub fn snapshot(&self) -> RenderSnapshot {
        let settings = &self.settings;
        let (mut drawables, hud, width, height) = match &self.game {
            Game::Bounce(s) => (
                renderer::bounce_drawables(s, &settings.bounce),
                Hud {
                    lives: Some(s.lives),
                    level: Some(s.level),
                    moves: None,
                },
                settings.bounce.width,
                settings.bounce.height,
            ),
            Game::Memory(s) => (
                renderer::memory_drawables(s, &settings.memory),
                Hud {
                    lives: None,
                    level: None,
                    moves: Some(s.moves),
                },
                settings.memory.width,
                settings.memory.height,
            ),
            Game::Shooter(s) => (
                renderer::shooter_drawables(s, &settings.shooter),
                Hud {
                    lives: Some(s.player.lives),
                    level: Some(s.difficulty.level),
                    moves: None,
                },
                settings.shooter.width,
                settings.shooter.height,
            ),
        };
        let score = self.score();
        drawables.extend(renderer::chrome(&self.layout, score));
        drawables.extend(renderer::phase_overlay(
            self.phase,
            score,
            self.won,
            self.best_score,
            width,
            height,
        ));

        RenderSnapshot {
            phase: self.phase,
            score,
            hud,
            drawables,
        }
    }

    /// Tear the session down. Pending timers are dropped first; an
    /// unreported run with a positive score is reported. Returns the
    /// collaborator's answer when a report was made and accepted.
    pub fn exit(mut self) -> Option<ProgressUpdate> {
        if let Game::Memory(state) = &mut self.game {
            let cancelled = state.cancel_pending();
            if cancelled > 0 {
                log::debug!("Cancelled {} pending comparison(s)", cancelled);
            }
        }

        let score = self.score();
        log::info!(
            "Session exit: {} in {} with score {}",
            self.game_id.as_str(),
            self.phase.as_str(),
            score
        );
        if score > 0 && !self.reported {
            let won = self.won;
            return self.report(won);
        }
        None
    }
}
