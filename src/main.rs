//! Headless demo host
//!
//! Plays every game (or the one named on the command line) with a simple
//! autopilot, feeding pointer events and 60 Hz frames exactly as a real host
//! would, and reports results to an in-memory progress tracker.
//!
//! Usage: `mini-arcade [bounce|memory|shooter|all] [--seed N] [--preset NAME]
//! [--settings FILE] [--frames N]` (see `--help`)

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, ValueEnum};
use rand::Rng;
use rand_pcg::Pcg32;

use mini_arcade::platform::{Clock, PointerEvent, SystemClock};
use mini_arcade::progress::ProgressConfig;
use mini_arcade::renderer::{RenderSnapshot, Renderer};
use mini_arcade::session::PointerOutcome;
use mini_arcade::settings::BounceSettings;
use mini_arcade::sim::{GamePhase, breakout, memory, shooter};
use mini_arcade::{BouncePreset, GameId, ProgressTracker, Session, Settings};

/// Renderer that only logs what it would draw
#[derive(Default)]
struct LogRenderer {
    frames: u64,
}

impl Renderer for LogRenderer {
    fn render(&mut self, snapshot: &RenderSnapshot) {
        self.frames += 1;
        if self.frames % 600 == 0 {
            log::debug!(
                "frame {}: {} drawables, phase {}, score {}",
                self.frames,
                snapshot.drawables.len(),
                snapshot.phase.as_str(),
                snapshot.score
            );
        }
    }
}

#[derive(Parser)]
#[command(name = "mini-arcade")]
#[command(about = "Play the arcade collection headlessly with an autopilot")]
struct Cli {
    /// Game to play; `all` runs every unlocked game in catalog order
    #[arg(value_enum, default_value_t = GameArg::All)]
    game: GameArg,
    /// RNG seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,
    /// Frame limit per game
    #[arg(long, default_value_t = 60 * 60 * 10)]
    frames: u64,
    /// Bounce preset, applied over the settings file
    #[arg(long, value_parser = parse_preset)]
    preset: Option<BouncePreset>,
    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GameArg {
    Bounce,
    Memory,
    Shooter,
    All,
}

fn parse_preset(name: &str) -> Result<BouncePreset, String> {
    BouncePreset::from_str(name).ok_or_else(|| format!("unknown preset: {}", name))
}

struct Options {
    games: Vec<GameId>,
    /// A single game was named; play it even if still locked
    explicit: bool,
    seed: u64,
    settings: Settings,
    max_frames: u64,
}

impl Options {
    fn from_cli(cli: Cli) -> Result<Self, String> {
        let mut settings = match &cli.settings {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
                Settings::from_json(&json).map_err(|e| e.to_string())?
            }
            None => Settings::default(),
        };
        if let Some(preset) = cli.preset {
            settings.bounce = BounceSettings::from_preset(preset);
        }

        let games = match cli.game {
            GameArg::Bounce => vec![GameId::Bounce],
            GameArg::Memory => vec![GameId::Memory],
            GameArg::Shooter => vec![GameId::Shooter],
            GameArg::All => GameId::ALL.to_vec(),
        };
        Ok(Self {
            games,
            explicit: cli.game != GameArg::All,
            seed: cli.seed.unwrap_or_else(|| SystemClock.now_ms()),
            settings,
            max_frames: cli.frames,
        })
    }
}

/// Where the autopilot would put the pointer this frame
struct Autopilot {
    rng: Pcg32,
    aim: f32,
    seen: Vec<Option<u32>>,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::new(seed, 0xa02b_dbf7_bb3c_0a7),
            aim: 0.0,
            seen: Vec::new(),
        }
    }

    fn next_event(&mut self, session: &Session) -> Option<PointerEvent> {
        if let Some(state) = session.bounce() {
            if state.ball.vel.y < 0.0 {
                self.aim = self.rng.random_range(-0.8..0.8);
            }
            let x = breakout::autopilot_x(state, self.aim);
            return Some(PointerEvent::moved(x, state.paddle.y));
        }
        if let Some(state) = session.shooter() {
            let x = shooter::autopilot_x(state);
            return Some(PointerEvent::moved(x, state.player.rect.y));
        }
        if let Some(state) = session.memory() {
            self.seen.resize(state.cards.len(), None);
            for (i, card) in state.cards.iter().enumerate() {
                if card.face_up() {
                    self.seen[i] = Some(card.pair_id);
                }
            }
            if !state.can_flip {
                return None;
            }
            let index = memory::autopilot_pick(state, &self.seen)?;
            let center = state.cards[index].rect.center();
            return Some(PointerEvent::press(center.x, center.y));
        }
        None
    }
}

fn play(
    game: GameId,
    options: &Options,
    tracker: &Rc<RefCell<ProgressTracker>>,
    renderer: &mut LogRenderer,
) -> Result<(), String> {
    let mut session = Session::new(
        game,
        &options.settings,
        options.seed,
        Box::new(tracker.clone()),
        Box::new(SystemClock),
    )
    .map_err(|e| e.to_string())?;
    let mut pilot = Autopilot::new(options.seed);

    // Tap to start
    session.handle_pointer(PointerEvent::press(200.0, 400.0));

    let mut frames = 0;
    while session.phase() == GamePhase::Playing && frames < options.max_frames {
        if let Some(event) = pilot.next_event(&session) {
            if session.handle_pointer(event) == PointerOutcome::ExitRequested {
                break;
            }
        }
        for event in session.update(mini_arcade::consts::TICK_DT) {
            log::trace!("{:?}", event);
        }
        renderer.render(&session.snapshot());
        frames += 1;
    }

    println!(
        "{:<8} {:>6} points  {:<5} after {} frames",
        game.as_str(),
        session.score(),
        match session.phase() {
            GamePhase::GameOver if session.won() => "won",
            GamePhase::GameOver => "lost",
            _ => "quit",
        },
        frames
    );
    session.exit();
    Ok(())
}

fn main() {
    env_logger::init();

    let options = match Options::from_cli(Cli::parse()) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("error: {}", msg);
            std::process::exit(2);
        }
    };
    log::info!("Mini Arcade demo starting (seed {})", options.seed);

    let config = ProgressConfig::default();
    let initial_points = if options.explicit {
        config.catalog.iter().map(|e| e.unlock_points).max().unwrap_or(0)
    } else {
        config.initial_points
    };
    let tracker = Rc::new(RefCell::new(ProgressTracker::new(ProgressConfig {
        initial_points,
        ..config
    })));
    let mut renderer = LogRenderer::default();
    for &game in &options.games {
        if !tracker.borrow().is_unlocked(game) {
            println!("{:<8} locked ({} points)", game.as_str(), tracker.borrow().points());
            continue;
        }
        if let Err(msg) = play(game, &options, &tracker, &mut renderer) {
            eprintln!("error: {}", msg);
            std::process::exit(1);
        }
    }

    println!("Total points: {}", tracker.borrow().points());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mini_arcade::settings::LevelClearPolicy;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_single_game_with_preset() {
        let cli =
            Cli::try_parse_from(["mini-arcade", "memory", "--seed", "5", "--preset", "endless"])
                .unwrap();
        let options = Options::from_cli(cli).unwrap();
        assert_eq!(options.games, vec![GameId::Memory]);
        assert!(options.explicit);
        assert_eq!(options.seed, 5);
        assert_eq!(options.settings.bounce.level_clear, LevelClearPolicy::NextLevel);
    }

    #[test]
    fn test_defaults_play_everything() {
        let options = Options::from_cli(Cli::try_parse_from(["mini-arcade"]).unwrap()).unwrap();
        assert_eq!(options.games, GameId::ALL.to_vec());
        assert!(!options.explicit);
        assert_eq!(options.max_frames, 60 * 60 * 10);
    }

    #[test]
    fn test_bad_arguments_rejected() {
        assert!(Cli::try_parse_from(["mini-arcade", "tetris"]).is_err());
        assert!(Cli::try_parse_from(["mini-arcade", "--preset", "hard"]).is_err());
        assert!(Cli::try_parse_from(["mini-arcade", "--seed", "abc"]).is_err());
    }
}
