//! End-to-end runs through the public session API

use std::cell::RefCell;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use mini_arcade::platform::{FixedClock, PointerEvent};
use mini_arcade::progress::{ProgressReporter, RecordingReporter};
use mini_arcade::sim::{
    Bullet, Enemy, GameEvent, GamePhase, Intent, MemoryState, Rect, breakout,
};
use mini_arcade::{GameId, ProgressTracker, Session, Settings};

fn start<R: ProgressReporter + 'static>(game: GameId, settings: &Settings, reporter: R) -> Session {
    let mut session = Session::new(
        game,
        settings,
        11,
        Box::new(reporter),
        Box::new(FixedClock::new(1_700_000_000_000)),
    )
    .unwrap();
    assert!(session.handle_intent(Intent::Start));
    session
}

#[test]
fn bounce_clears_default_wall_for_500() {
    let reporter = Rc::new(RefCell::new(RecordingReporter::default()));
    let mut session = start(GameId::Bounce, &Settings::default(), reporter.clone());
    let mut rng = Pcg32::seed_from_u64(3);
    let mut aim = 0.0;

    let mut events = Vec::new();
    for _ in 0..500_000 {
        let state = session.bounce().unwrap();
        if state.ball.vel.y < 0.0 {
            aim = rng.random_range(-0.5..0.5);
        }
        let x = breakout::autopilot_x(state, aim);
        session.handle_pointer(PointerEvent::moved(x, 700.0));
        events.extend(session.tick());
        if session.phase() != GamePhase::Playing {
            break;
        }
    }

    assert_eq!(session.phase(), GamePhase::GameOver);
    assert!(session.won());
    assert_eq!(session.bounce().unwrap().alive_bricks(), 0);
    assert_eq!(session.score(), 500);
    let bricks = events
        .iter()
        .filter(|e| matches!(e, GameEvent::BrickHit { .. }))
        .count();
    assert_eq!(bricks, 40);

    let recorded = reporter.borrow();
    let reported = &recorded.events;
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].score, 500);
    assert!(reported[0].won);
}

#[test]
fn memory_first_pair_matches_after_delay() {
    let settings = Settings::default();
    let mut session = start(GameId::Memory, &settings, RecordingReporter::default());
    // Card (0,0) and (0,1) share pair 0
    let layout: Vec<u32> = (0..8).flat_map(|id| [id, id]).collect();
    *session.memory_mut().unwrap() = MemoryState::with_layout(&settings.memory, &layout).unwrap();

    for index in [0, 1] {
        let center = session.memory().unwrap().cards[index].rect.center();
        session.handle_pointer(PointerEvent::press(center.x, center.y));
    }
    assert_eq!(session.memory().unwrap().moves, 1);

    // A third tap during the comparison is refused
    let third = session.memory().unwrap().cards[2].rect.center();
    session.handle_pointer(PointerEvent::press(third.x, third.y));
    assert!(!session.memory().unwrap().cards[2].flipped);

    let mut events = Vec::new();
    for _ in 0..60 {
        events.extend(session.tick());
    }
    let state = session.memory().unwrap();
    assert!(state.cards[0].matched && state.cards[1].matched);
    assert_eq!(state.score, 20);
    assert_eq!(state.moves, 1);
    assert!(events.contains(&GameEvent::PairResolved { matched: true }));
}

#[test]
fn shooter_difficulty_rises_once_past_1000() {
    let mut session = start(GameId::Shooter, &Settings::default(), RecordingReporter::default());
    let before = {
        let state = session.shooter_mut().unwrap();
        state.score = 990;
        state.fire_cooldown = 100;
        state.enemies.push(Enemy {
            rect: Rect::new(100.0, 300.0, 40.0, 40.0),
            speed: 0.0,
            color: 0xF44336,
            health: 1,
        });
        state.bullets.push(Bullet {
            rect: Rect::new(110.0, 320.0, 6.0, 15.0),
            speed: 10.0,
        });
        state.enemy_spawn_interval()
    };

    let mut events = Vec::new();
    for _ in 0..30 {
        events.extend(session.tick());
    }

    let ups: Vec<&GameEvent> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::DifficultyUp { .. }))
        .collect();
    assert_eq!(ups, vec![&GameEvent::DifficultyUp { level: 2 }]);
    let state = session.shooter().unwrap();
    assert_eq!(state.score, 1030);
    assert_eq!(state.difficulty.level, 2);
    assert!(state.enemy_spawn_interval() < before);
}

#[test]
fn winning_bounce_unlocks_memory() {
    let tracker = Rc::new(RefCell::new(ProgressTracker::default()));
    let mut session = start(GameId::Bounce, &Settings::default(), tracker.clone());
    {
        let state = session.bounce_mut().unwrap();
        for brick in state.bricks.iter_mut().skip(1) {
            brick.hit = true;
        }
        state.score = 390;
        let target = state.bricks[0].rect.center();
        state.ball.pos = target + glam::Vec2::new(0.0, 25.0);
        state.ball.vel = glam::Vec2::new(0.0, -5.0);
    }
    for _ in 0..10 {
        session.tick();
    }
    assert_eq!(session.phase(), GamePhase::GameOver);
    assert_eq!(session.score(), 500);

    let tracker = tracker.borrow();
    assert!(tracker.is_unlocked(GameId::Memory));
    assert_eq!(tracker.record(GameId::Bounce).unwrap().wins, 1);
    assert_eq!(tracker.leaderboard(GameId::Bounce).unwrap().top_score(), Some(500));
}

#[test]
fn settings_json_drives_the_session() {
    let json = r#"{ "memory": { "rows": 2, "cols": 3 }, "bounce": { "lives": 1 } }"#;
    let settings = Settings::from_json(json).unwrap();
    let session = start(GameId::Memory, &settings, RecordingReporter::default());
    assert_eq!(session.memory().unwrap().cards.len(), 6);

    let bad = r#"{ "memory": { "rows": 3, "cols": 3 } }"#;
    assert!(Settings::from_json(bad).is_err());
}
