//! Shooter: auto-firing ship, falling enemies, power-ups
//!
//! Enemies and power-ups come from tick counters whose thresholds shrink as
//! the difficulty level rises with score.

use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::spawn::{Difficulty, SpawnCounter, weighted_pick};
use super::state::{GameEvent, TickOutcome};
use crate::error::ConfigError;
use crate::random_range;
use crate::settings::ShooterSettings;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// One more life, up to the cap
    ExtraLife,
    /// Absorbs the next hit while it lasts
    Shield,
    /// Shorter cooldown and triple shot while it lasts
    RapidFire,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    pub lives: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub rect: Rect,
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub rect: Rect,
    pub speed: f32,
    pub color: u32,
    pub health: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub rect: Rect,
    pub speed: f32,
    pub kind: PowerUpKind,
}

/// Time-boxed player buffs (tick countdowns, 0 = inactive)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buffs {
    pub shield_ticks: u32,
    pub rapid_fire_ticks: u32,
    pub invincible_ticks: u32,
}

impl Buffs {
    pub fn shield(&self) -> bool {
        self.shield_ticks > 0
    }

    pub fn rapid_fire(&self) -> bool {
        self.rapid_fire_ticks > 0
    }

    pub fn invincible(&self) -> bool {
        self.invincible_ticks > 0
    }

    fn decay(&mut self) {
        self.shield_ticks = self.shield_ticks.saturating_sub(1);
        self.rapid_fire_ticks = self.rapid_fire_ticks.saturating_sub(1);
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
    }
}

/// Complete shooter game state
#[derive(Debug, Clone)]
pub struct ShooterState {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub powerups: Vec<PowerUp>,
    pub buffs: Buffs,
    pub fire_cooldown: u32,
    pub enemy_spawner: SpawnCounter,
    pub powerup_spawner: SpawnCounter,
    pub difficulty: Difficulty,
    pub score: u64,
    pub lives_lost: u8,
    pub time_ticks: u64,
    rng: Pcg32,
}

impl ShooterState {
    pub fn new(settings: &ShooterSettings, rng: Pcg32) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            player: Player {
                rect: Rect::new(
                    (settings.width - settings.player_width) / 2.0,
                    settings.player_y(),
                    settings.player_width,
                    settings.player_height,
                ),
                lives: settings.lives,
            },
            bullets: Vec::new(),
            enemies: Vec::new(),
            powerups: Vec::new(),
            buffs: Buffs::default(),
            fire_cooldown: 0,
            enemy_spawner: SpawnCounter::new(
                settings.enemy_spawn_interval,
                settings.enemy_min_spawn_interval,
                settings.spawn_interval_scale,
            ),
            powerup_spawner: SpawnCounter::fixed(settings.powerup_spawn_interval),
            difficulty: Difficulty::new(
                settings.difficulty_score_interval,
                settings.enemy_speed_step,
            ),
            score: 0,
            lives_lost: 0,
            time_ticks: 0,
            rng,
        })
    }

    /// Current enemy spawn threshold in ticks
    pub fn enemy_spawn_interval(&self) -> u32 {
        self.enemy_spawner.interval_for(self.difficulty.level)
    }
}

/// Pointer steering: centre the ship on `target_x`, clamped to the play area
pub fn steer(state: &mut ShooterState, target_x: f32, settings: &ShooterSettings) {
    let rect = &mut state.player.rect;
    let max_x = (settings.width - rect.width).max(0.0);
    rect.x = (target_x - rect.width / 2.0).clamp(0.0, max_x);
}

/// Lose one life; true if that was the last one
fn lose_life(state: &mut ShooterState, settings: &ShooterSettings, events: &mut Vec<GameEvent>) -> bool {
    state.player.lives = state.player.lives.saturating_sub(1);
    state.lives_lost = state.lives_lost.saturating_add(1);
    events.push(GameEvent::LifeLost {
        lives: state.player.lives,
    });
    if state.player.lives == 0 {
        return true;
    }
    state.buffs.invincible_ticks = settings.invincible_ticks;
    false
}

fn finished(state: &ShooterState, settings: &ShooterSettings) -> TickOutcome {
    TickOutcome::Finished {
        won: state.score >= settings.win_score,
    }
}

fn fire(state: &mut ShooterState, settings: &ShooterSettings) {
    if state.fire_cooldown > 0 {
        return;
    }
    let player = state.player.rect;
    let (bw, bh) = (settings.bullet_width, settings.bullet_height);
    state.bullets.push(Bullet {
        rect: Rect::new(player.x + player.width / 2.0 - bw / 2.0, player.y, bw, bh),
        speed: settings.bullet_speed,
    });

    if state.buffs.rapid_fire() {
        // Wing guns
        state.bullets.push(Bullet {
            rect: Rect::new(player.x + 10.0, player.y + 10.0, bw, bh),
            speed: settings.bullet_speed,
        });
        state.bullets.push(Bullet {
            rect: Rect::new(player.right() - 10.0 - bw, player.y + 10.0, bw, bh),
            speed: settings.bullet_speed,
        });
        state.fire_cooldown = settings.rapid_fire_cooldown;
    } else {
        state.fire_cooldown = settings.fire_cooldown;
    }
}

fn spawn_enemy(state: &mut ShooterState, settings: &ShooterSettings) {
    let rng = &mut state.rng;
    let width = random_range(rng, settings.enemy_min_width, settings.enemy_max_width);
    let height = random_range(rng, settings.enemy_min_height, settings.enemy_max_height);
    let x = random_range(rng, 0.0, settings.width - width);
    let speed = random_range(rng, settings.enemy_min_speed, settings.enemy_max_speed)
        * state.difficulty.speed_multiplier();
    let color = settings.enemy_colors.choose(rng).copied().unwrap_or(0xFFFFFF);
    let health = ((width / settings.enemy_health_per_width).ceil() as u32).max(1);

    state.enemies.push(Enemy {
        rect: Rect::new(x, -height, width, height),
        speed,
        color,
        health,
    });
}

fn spawn_powerup(state: &mut ShooterState, settings: &ShooterSettings) {
    let table: Vec<(PowerUpKind, f32)> = settings
        .powerup_weights
        .iter()
        .map(|w| (w.kind, w.chance))
        .collect();
    let Some(kind) = weighted_pick(&mut state.rng, &table) else {
        return;
    };
    let size = settings.powerup_size;
    let x = random_range(&mut state.rng, 0.0, settings.width - size);
    state.powerups.push(PowerUp {
        rect: Rect::new(x, -size, size, size),
        speed: settings.powerup_speed,
        kind,
    });
}

fn apply_powerup(state: &mut ShooterState, kind: PowerUpKind, settings: &ShooterSettings) {
    match kind {
        PowerUpKind::ExtraLife => {
            state.player.lives = state.player.lives.saturating_add(1).min(settings.max_lives);
        }
        PowerUpKind::Shield => state.buffs.shield_ticks = settings.shield_ticks,
        PowerUpKind::RapidFire => state.buffs.rapid_fire_ticks = settings.rapid_fire_ticks,
    }
}

/// Bullets against enemies: each bullet damages at most one enemy
fn resolve_bullet_hits(state: &mut ShooterState, events: &mut Vec<GameEvent>) {
    let mut i = 0;
    while i < state.bullets.len() {
        let bullet = state.bullets[i].rect;
        let Some(j) = state.enemies.iter().position(|e| bullet.overlaps(&e.rect)) else {
            i += 1;
            continue;
        };
        state.bullets.swap_remove(i);

        let enemy = &mut state.enemies[j];
        enemy.health = enemy.health.saturating_sub(1);
        if enemy.health == 0 {
            let points = enemy.rect.width.ceil() as u64;
            state.enemies.remove(j);
            state.score += points;
            events.push(GameEvent::EnemyKilled { points });
            events.push(GameEvent::ScoreChanged {
                score: state.score,
                delta: points as i64,
            });
        }
    }
}

/// Advance the shooter by one tick
pub fn tick(
    state: &mut ShooterState,
    settings: &ShooterSettings,
    events: &mut Vec<GameEvent>,
) -> TickOutcome {
    state.time_ticks += 1;
    let level = state.difficulty.level;

    // Buffs and cooldown
    state.buffs.decay();
    state.fire_cooldown = state.fire_cooldown.saturating_sub(1);

    fire(state, settings);
    for bullet in &mut state.bullets {
        bullet.rect.y -= bullet.speed;
    }
    state.bullets.retain(|b| b.rect.bottom() >= 0.0);

    // Enemies
    if state.enemy_spawner.step(level) {
        spawn_enemy(state, settings);
    }
    for enemy in &mut state.enemies {
        enemy.rect.y += enemy.speed;
    }
    let before = state.enemies.len();
    state.enemies.retain(|e| e.rect.y <= settings.height);
    let escaped = before - state.enemies.len();
    for _ in 0..escaped {
        if state.buffs.invincible() {
            break;
        }
        if lose_life(state, settings, events) {
            return finished(state, settings);
        }
    }

    // Power-ups
    if state.powerup_spawner.step(level) {
        spawn_powerup(state, settings);
    }
    for powerup in &mut state.powerups {
        powerup.rect.y += powerup.speed;
    }
    state.powerups.retain(|p| p.rect.y <= settings.height);

    resolve_bullet_hits(state, events);

    // Ship against enemies
    if !state.buffs.invincible() {
        let player = state.player.rect;
        if let Some(j) = state.enemies.iter().position(|e| player.overlaps(&e.rect)) {
            state.enemies.remove(j);
            if state.buffs.shield() {
                state.buffs.shield_ticks = 0;
                events.push(GameEvent::ShieldAbsorbed);
            } else if lose_life(state, settings, events) {
                return finished(state, settings);
            }
        }
    }

    // Pickups
    let player = state.player.rect;
    let mut collected = Vec::new();
    state.powerups.retain(|p| {
        if player.overlaps(&p.rect) {
            collected.push(p.kind);
            false
        } else {
            true
        }
    });
    for kind in collected {
        apply_powerup(state, kind, settings);
        events.push(GameEvent::PowerUpCollected { kind });
    }

    if state.difficulty.observe(state.score) {
        log::info!(
            "Shooter difficulty {} (spawn every {} ticks)",
            state.difficulty.level,
            state.enemy_spawn_interval()
        );
        events.push(GameEvent::DifficultyUp {
            level: state.difficulty.level,
        });
    }

    TickOutcome::Continue
}

/// Pointer x an idle/demo pilot would use: chase the lowest enemy, grab
/// power-ups when nothing is threatening
pub fn autopilot_x(state: &ShooterState) -> f32 {
    let player = state.player.rect;
    let threat = state
        .enemies
        .iter()
        .max_by(|a, b| a.rect.y.total_cmp(&b.rect.y));
    let pickup = state.powerups.iter().max_by(|a, b| a.rect.y.total_cmp(&b.rect.y));

    match (threat, pickup) {
        (Some(enemy), _) if enemy.rect.y > player.y * 0.5 => enemy.rect.center().x,
        (_, Some(powerup)) => powerup.rect.center().x,
        (Some(enemy), None) => enemy.rect.center().x,
        (None, None) => player.center().x,
    }
}
