//! Bounce: paddle, ball and brick grid
//!
//! One fixed tick moves the ball by its velocity, then resolves walls, paddle,
//! bricks, level completion and fall-through, in that order. Velocities are in
//! pixels per tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{
    Rect, accelerate, circle_rect_overlap, hit_offset, paddle_bounce, penetration_axis,
    reflect_axis,
};
use super::state::{GameEvent, TickOutcome};
use crate::error::ConfigError;
use crate::settings::{BounceSettings, LevelClearPolicy};

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Max travel per tick when steered (0 = unlimited)
    pub speed: f32,
    /// Where the pointer last asked the paddle centre to go
    #[serde(default)]
    pub target_x: Option<f32>,
}

impl Paddle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Aim the paddle centre at `target_x`. An unlimited paddle snaps there at
    /// once; a speed-limited one closes in a step per tick.
    pub fn steer_to(&mut self, target_x: f32, bounds_width: f32) {
        self.target_x = Some(target_x);
        if self.speed <= 0.0 {
            self.follow_target(bounds_width);
        }
    }

    /// One tick of travel toward the stored target, clamped to the play area
    pub fn follow_target(&mut self, bounds_width: f32) {
        let Some(target_x) = self.target_x else {
            return;
        };
        let delta = target_x - self.width / 2.0 - self.x;
        let step = if self.speed > 0.0 {
            delta.clamp(-self.speed, self.speed)
        } else {
            delta
        };
        self.x += step;
        self.clamp_to(bounds_width);
    }

    /// Pull the paddle back inside `[0, bounds_width - width]`; true if it had drifted
    pub fn clamp_to(&mut self, bounds_width: f32) -> bool {
        let max_x = (bounds_width - self.width).max(0.0);
        let clamped = self.x.clamp(0.0, max_x);
        let drifted = clamped != self.x;
        self.x = clamped;
        drifted
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub max_speed: f32,
}

impl Ball {
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// A brick in the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    pub row: u32,
    pub col: u32,
    pub color: u32,
    /// Once set, the brick is gone for good
    pub hit: bool,
}

/// Complete bounce game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BounceState {
    pub paddle: Paddle,
    pub ball: Ball,
    pub bricks: Vec<Brick>,
    pub score: u64,
    pub lives: u8,
    /// Lives lost this run (for the "perfect" achievement)
    pub lives_lost: u8,
    /// 1-based level
    pub level: u32,
    pub time_ticks: u64,
}

impl BounceState {
    /// Create a fresh run; fails on invalid settings
    pub fn new(settings: &BounceSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut state = Self {
            paddle: Paddle {
                x: 0.0,
                y: settings.paddle_y(),
                width: settings.paddle_width,
                height: settings.paddle_height,
                speed: settings.paddle_speed,
                target_x: None,
            },
            ball: Ball {
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
                radius: settings.ball_radius,
                max_speed: settings.ball_max_speed,
            },
            bricks: build_bricks(settings),
            score: 0,
            lives: settings.lives,
            lives_lost: 0,
            level: 1,
            time_ticks: 0,
        };
        state.reset_ball_and_paddle(settings);
        Ok(state)
    }

    /// Put the paddle in the middle and the ball back at its launch point
    pub fn reset_ball_and_paddle(&mut self, settings: &BounceSettings) {
        self.paddle.x = (settings.width - self.paddle.width) / 2.0;
        self.paddle.target_x = None;
        self.paddle.y = settings.paddle_y();
        self.ball.pos = Vec2::new(settings.width / 2.0, settings.height - settings.ball_offset_bottom);
        self.ball.vel = Vec2::new(settings.ball_start_vx, settings.ball_start_vy)
            .clamp_length_max(self.ball.max_speed);
    }

    pub fn alive_bricks(&self) -> usize {
        self.bricks.iter().filter(|b| !b.hit).count()
    }
}

/// Lay out the brick grid, centred horizontally
pub fn build_bricks(settings: &BounceSettings) -> Vec<Brick> {
    let left = settings.brick_offset_left();
    let mut bricks = Vec::with_capacity(
        (settings.brick_rows as usize).saturating_mul(settings.brick_cols as usize),
    );
    for row in 0..settings.brick_rows {
        let color = if settings.brick_colors.is_empty() {
            0xFFFFFF
        } else {
            settings.brick_colors[row as usize % settings.brick_colors.len()]
        };
        for col in 0..settings.brick_cols {
            bricks.push(Brick {
                rect: Rect::new(
                    left + col as f32 * (settings.brick_width + settings.brick_padding),
                    settings.brick_offset_top
                        + row as f32 * (settings.brick_height + settings.brick_padding),
                    settings.brick_width,
                    settings.brick_height,
                ),
                row,
                col,
                color,
                hit: false,
            });
        }
    }
    bricks
}

/// Pointer steering (only called while playing)
pub fn steer(state: &mut BounceState, target_x: f32, settings: &BounceSettings) {
    state.paddle.steer_to(target_x, settings.width);
}

/// Reflect off left/right/top walls, clamping the ball back inside.
/// Returns `(hit_side, hit_top)`.
pub fn resolve_walls(ball: &mut Ball, width: f32) -> (bool, bool) {
    let r = ball.radius;
    let mut hit_side = false;
    let mut hit_top = false;

    if ball.pos.x - r < 0.0 || ball.pos.x + r > width {
        ball.vel.x = -ball.vel.x;
        ball.pos.x = if ball.pos.x - r < 0.0 { r } else { width - r };
        hit_side = true;
    }

    if ball.pos.y - r < 0.0 {
        ball.vel.y = -ball.vel.y;
        ball.pos.y = r;
        hit_top = true;
    }

    (hit_side, hit_top)
}

/// Bounce off the paddle; true if it hit
pub fn resolve_paddle(
    ball: &mut Ball,
    paddle: &Paddle,
    max_angle: f32,
    speed_increment: f32,
) -> bool {
    let band_overlap =
        ball.pos.y + ball.radius > paddle.y && ball.pos.y - ball.radius < paddle.y + paddle.height;
    let within = ball.pos.x > paddle.x && ball.pos.x < paddle.x + paddle.width;

    // Only a descending ball can hit, so a ball already leaving never re-triggers
    if !(band_overlap && within && ball.vel.y > 0.0) {
        return false;
    }

    let offset = hit_offset(ball.pos.x, paddle.x, paddle.width);
    ball.vel = paddle_bounce(ball.vel, offset, max_angle);
    ball.pos.y = paddle.y - ball.radius;
    ball.vel = accelerate(ball.vel, speed_increment, ball.max_speed);
    true
}

/// Destroy at most one brick the ball overlaps; returns its index
pub fn resolve_bricks(ball: &mut Ball, bricks: &mut [Brick]) -> Option<usize> {
    let (index, brick) = bricks
        .iter_mut()
        .enumerate()
        .find(|(_, b)| !b.hit && circle_rect_overlap(ball.pos, ball.radius, &b.rect))?;

    brick.hit = true;
    let axis = penetration_axis(ball.pos, &brick.rect);
    ball.vel = reflect_axis(ball.vel, axis);
    Some(index)
}

/// Advance the bounce game by one tick
pub fn tick(
    state: &mut BounceState,
    settings: &BounceSettings,
    events: &mut Vec<GameEvent>,
) -> TickOutcome {
    state.time_ticks += 1;

    if state.paddle.clamp_to(settings.width) {
        log::debug!("Paddle drifted out of bounds, clamped to x={}", state.paddle.x);
    }
    state.paddle.follow_target(settings.width);

    // Integrate
    state.ball.pos += state.ball.vel;

    resolve_walls(&mut state.ball, settings.width);

    if resolve_paddle(
        &mut state.ball,
        &state.paddle,
        settings.max_bounce_angle(),
        settings.speed_increment,
    ) {
        events.push(GameEvent::PaddleHit {
            speed: state.ball.speed(),
        });
    }

    if let Some(index) = resolve_bricks(&mut state.ball, &mut state.bricks) {
        let points = settings
            .brick_scoring
            .points_for(state.bricks[index].row, settings.brick_rows);
        state.score += points;
        events.push(GameEvent::BrickHit { index, points });
        events.push(GameEvent::ScoreChanged {
            score: state.score,
            delta: points as i64,
        });
    }

    // Level complete
    if state.alive_bricks() == 0 {
        let bonus = settings.level_bonus;
        state.score += bonus;
        events.push(GameEvent::LevelComplete {
            level: state.level,
            bonus,
        });
        events.push(GameEvent::ScoreChanged {
            score: state.score,
            delta: bonus as i64,
        });
        log::info!(
            "Bounce level {} complete, score {}",
            state.level,
            state.score
        );

        match settings.level_clear {
            LevelClearPolicy::EndGame => return TickOutcome::Finished { won: true },
            LevelClearPolicy::NextLevel => {
                state.level += 1;
                state.bricks = build_bricks(settings);
                state.reset_ball_and_paddle(settings);
                return TickOutcome::Continue;
            }
        }
    }

    // Fall-through
    if state.ball.pos.y + state.ball.radius > settings.height {
        state.lives = state.lives.saturating_sub(1);
        state.lives_lost = state.lives_lost.saturating_add(1);
        events.push(GameEvent::LifeLost { lives: state.lives });
        if state.lives == 0 {
            // Endless runs always end this way; they still count as a win
            // once at least one level was cleared
            let won = settings.level_clear == LevelClearPolicy::NextLevel && state.level > 1;
            return TickOutcome::Finished { won };
        }
        log::debug!("Ball lost, {} lives left", state.lives);
        state.reset_ball_and_paddle(settings);
    }

    TickOutcome::Continue
}

/// Pointer x an idle/demo player would use: keep the paddle under the ball,
/// offset by `aim` (-1..1, fraction of the half-width) to steer the bounce
pub fn autopilot_x(state: &BounceState, aim: f32) -> f32 {
    state.ball.pos.x - aim.clamp(-0.9, 0.9) * state.paddle.width / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state() -> (BounceState, BounceSettings) {
        let settings = BounceSettings::default();
        (BounceState::new(&settings).unwrap(), settings)
    }

    #[test]
    fn test_new_layout() {
        let (state, settings) = state();
        assert_eq!(state.bricks.len(), 40);
        assert_eq!(state.alive_bricks(), 40);
        assert_eq!(state.paddle.x, (settings.width - settings.paddle_width) / 2.0);
        assert_eq!(state.ball.pos, Vec2::new(300.0, 750.0));
        assert_eq!(state.ball.vel, Vec2::new(5.0, -5.0));
        // Grid is centred
        let first = &state.bricks[0].rect;
        let last = &state.bricks[7].rect;
        assert!((first.x - (settings.width - last.right())).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = BounceSettings {
            brick_cols: 0,
            ..Default::default()
        };
        assert!(BounceState::new(&settings).is_err());
    }

    #[test]
    fn test_steer_clamps() {
        let (mut state, settings) = state();
        steer(&mut state, -100.0, &settings);
        assert_eq!(state.paddle.x, 0.0);
        steer(&mut state, 10_000.0, &settings);
        assert_eq!(state.paddle.x, settings.width - settings.paddle_width);
    }

    #[test]
    fn test_steer_respects_paddle_speed() {
        let settings = BounceSettings {
            paddle_speed: 8.0,
            ..Default::default()
        };
        let mut state = BounceState::new(&settings).unwrap();
        let start = state.paddle.x;
        steer(&mut state, 0.0, &settings);
        assert_eq!(state.paddle.x, start);
        tick(&mut state, &settings, &mut Vec::new());
        assert_eq!(state.paddle.x, start - 8.0);
    }

    #[test]
    fn test_paddle_keeps_moving_after_pointer_stops() {
        let settings = BounceSettings {
            paddle_speed: 8.0,
            ..Default::default()
        };
        let mut state = BounceState::new(&settings).unwrap();
        steer(&mut state, 0.0, &settings);
        for _ in 0..40 {
            tick(&mut state, &settings, &mut Vec::new());
        }
        assert_eq!(state.paddle.x, 0.0);
        assert_eq!(state.paddle.target_x, Some(0.0));
    }

    #[test]
    fn test_paddle_hit_reflects_up_and_speeds_up() {
        let (mut state, settings) = state();
        state.ball.pos = Vec2::new(state.paddle.center_x(), state.paddle.y - 5.0);
        state.ball.vel = Vec2::new(0.0, 5.0);
        let before = state.ball.speed();
        let hit = resolve_paddle(
            &mut state.ball,
            &state.paddle,
            settings.max_bounce_angle(),
            settings.speed_increment,
        );
        assert!(hit);
        assert!(state.ball.vel.y < 0.0);
        assert!((state.ball.speed() - (before + 0.2)).abs() < 1e-4);
        assert_eq!(state.ball.pos.y, state.paddle.y - state.ball.radius);
    }

    #[test]
    fn test_paddle_edge_hit_angles_outward() {
        let (mut state, settings) = state();
        let paddle = state.paddle.clone();
        state.ball.pos = Vec2::new(paddle.x + paddle.width - 1.0, paddle.y);
        state.ball.vel = Vec2::new(0.0, 6.0);
        assert!(resolve_paddle(
            &mut state.ball,
            &paddle,
            settings.max_bounce_angle(),
            0.0
        ));
        assert!(state.ball.vel.x > 0.0);
        let angle = state.ball.vel.x.atan2(-state.ball.vel.y);
        assert!(angle <= 60f32.to_radians() + 1e-4);
    }

    #[test]
    fn test_rising_ball_ignores_paddle() {
        let (mut state, settings) = state();
        state.ball.pos = Vec2::new(state.paddle.center_x(), state.paddle.y);
        state.ball.vel = Vec2::new(0.0, -5.0);
        assert!(!resolve_paddle(
            &mut state.ball,
            &state.paddle,
            settings.max_bounce_angle(),
            0.2
        ));
    }

    #[test]
    fn test_brick_hit_from_below() {
        let (mut state, settings) = state();
        let target = state.bricks[0].rect;
        state.ball.pos = Vec2::new(target.center().x, target.bottom() + state.ball.radius - 1.0);
        state.ball.vel = Vec2::new(0.0, -5.0);
        let mut events = Vec::new();
        // Move the ball back so the tick's integration lands it overlapping
        state.ball.pos.y += 5.0;
        let outcome = tick(&mut state, &settings, &mut events);
        assert_eq!(outcome, TickOutcome::Continue);
        assert!(state.bricks[0].hit);
        assert_eq!(state.score, 10);
        assert!(state.ball.vel.y > 0.0);
        assert!(events.contains(&GameEvent::BrickHit {
            index: 0,
            points: 10
        }));
    }

    #[test]
    fn test_one_brick_per_tick() {
        let (mut state, _settings) = state();
        // Ball straddling the gap between two bricks in the bottom row
        let a = state.bricks[32].rect;
        let b = state.bricks[33].rect;
        state.ball.pos = Vec2::new((a.right() + b.x) / 2.0, a.bottom());
        state.ball.vel = Vec2::new(0.0, -5.0);
        let hit = resolve_bricks(&mut state.ball, &mut state.bricks);
        assert_eq!(hit, Some(32));
        assert!(!state.bricks[33].hit);
    }

    #[test]
    fn test_fall_through_costs_life_and_resets() {
        let (mut state, settings) = state();
        state.ball.pos = Vec2::new(20.0, settings.height - 5.0);
        state.ball.vel = Vec2::new(0.0, 5.0);
        let mut events = Vec::new();
        let outcome = tick(&mut state, &settings, &mut events);
        assert_eq!(outcome, TickOutcome::Continue);
        assert_eq!(state.lives, 2);
        assert_eq!(state.lives_lost, 1);
        assert_eq!(state.ball.pos, Vec2::new(300.0, 750.0));
        assert!(events.contains(&GameEvent::LifeLost { lives: 2 }));
    }

    #[test]
    fn test_last_life_ends_run() {
        let settings = BounceSettings {
            lives: 1,
            ..Default::default()
        };
        let mut state = BounceState::new(&settings).unwrap();
        state.ball.pos = Vec2::new(20.0, settings.height - 5.0);
        state.ball.vel = Vec2::new(0.0, 5.0);
        let outcome = tick(&mut state, &settings, &mut Vec::new());
        assert_eq!(outcome, TickOutcome::Finished { won: false });
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_last_brick_completes_level() {
        let (mut state, settings) = state();
        for brick in state.bricks.iter_mut().skip(1) {
            brick.hit = true;
        }
        let target = state.bricks[0].rect;
        state.ball.pos = Vec2::new(target.center().x, target.bottom() + 14.0);
        state.ball.vel = Vec2::new(0.0, -5.0);
        let mut events = Vec::new();
        let outcome = tick(&mut state, &settings, &mut events);
        assert_eq!(outcome, TickOutcome::Finished { won: true });
        assert_eq!(state.score, 10 + 100);
        assert!(events.contains(&GameEvent::LevelComplete {
            level: 1,
            bonus: 100
        }));
    }

    #[test]
    fn test_next_level_policy_rebuilds_grid() {
        let settings = BounceSettings {
            level_clear: LevelClearPolicy::NextLevel,
            ..Default::default()
        };
        let mut state = BounceState::new(&settings).unwrap();
        for brick in &mut state.bricks {
            brick.hit = true;
        }
        let outcome = tick(&mut state, &settings, &mut Vec::new());
        assert_eq!(outcome, TickOutcome::Continue);
        assert_eq!(state.level, 2);
        assert_eq!(state.alive_bricks(), 40);
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_paddle_drift_repaired_on_tick() {
        let (mut state, settings) = state();
        state.paddle.x = settings.width + 0.001;
        tick(&mut state, &settings, &mut Vec::new());
        assert_eq!(state.paddle.x, settings.width - settings.paddle_width);
    }

    proptest! {
        #[test]
        fn prop_wall_reflection(
            x in -30.0f32..630.0,
            y in -30.0f32..700.0,
            vx in -15.0f32..15.0,
            vy in -15.0f32..15.0,
        ) {
            let width = 600.0;
            let mut ball = Ball { pos: Vec2::new(x, y), vel: Vec2::new(vx, vy), radius: 10.0, max_speed: 15.0 };
            let past_left = x - 10.0 < 0.0;
            let past_right = x + 10.0 > width;
            let past_top = y - 10.0 < 0.0;

            resolve_walls(&mut ball, width);

            if past_left {
                prop_assert_eq!(ball.pos.x, 10.0);
                prop_assert_eq!(ball.vel.x, -vx);
            } else if past_right {
                prop_assert_eq!(ball.pos.x, width - 10.0);
                prop_assert_eq!(ball.vel.x, -vx);
            } else {
                prop_assert_eq!(ball.pos.x, x);
                prop_assert_eq!(ball.vel.x, vx);
            }
            if past_top {
                prop_assert_eq!(ball.pos.y, 10.0);
                prop_assert_eq!(ball.vel.y, -vy);
            } else {
                prop_assert_eq!(ball.vel.y, vy);
            }
        }

        #[test]
        fn prop_speed_never_exceeds_max(aims in proptest::collection::vec(-0.9f32..0.9, 1..40)) {
            let settings = BounceSettings::default();
            let mut state = BounceState::new(&settings).unwrap();
            let mut events = Vec::new();
            for (i, aim) in aims.iter().cycle().take(3000).enumerate() {
                let target = autopilot_x(&state, *aim);
                steer(&mut state, target, &settings);
                let alive_before = state.alive_bricks();
                if tick(&mut state, &settings, &mut events) != TickOutcome::Continue {
                    break;
                }
                prop_assert!(state.ball.speed() <= settings.ball_max_speed + 1e-3, "tick {}", i);
                prop_assert!(state.alive_bricks() <= alive_before);
            }
        }
    }
}
