//! Per-game tuning
//!
//! Every game is built from a settings struct fixed at construction. Defaults
//! reproduce the collection's stock constants; any subset can be overridden
//! from a JSON document (missing keys fall back to the defaults).

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, require_positive, require_range};
use crate::sim::PowerUpKind;

/// How bricks are scored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrickScoring {
    /// Every brick is worth the same
    Flat { points: u64 },
    /// Top rows are worth more: `base + rows_below * per_row`
    RowWeighted { base: u64, per_row: u64 },
}

impl BrickScoring {
    /// Points for a brick in `row` of a grid with `rows` rows (row 0 is the top)
    pub fn points_for(&self, row: u32, rows: u32) -> u64 {
        match *self {
            BrickScoring::Flat { points } => points,
            BrickScoring::RowWeighted { base, per_row } => {
                let rows_below = rows.saturating_sub(row + 1) as u64;
                base + rows_below * per_row
            }
        }
    }
}

/// What happens when the last brick falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelClearPolicy {
    /// Award the bonus and end the run as a win
    #[default]
    EndGame,
    /// Award the bonus, rebuild the grid and keep playing
    NextLevel,
}

/// Named parameter sets for the bounce game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BouncePreset {
    /// Three lives, one level, flat scoring
    #[default]
    Classic,
    /// Single life: the ball falling out ends the run
    Arcade,
    /// Levels repeat with row-weighted scoring until lives run out
    Endless,
}

impl BouncePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            BouncePreset::Classic => "Classic",
            BouncePreset::Arcade => "Arcade",
            BouncePreset::Endless => "Endless",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(BouncePreset::Classic),
            "arcade" => Some(BouncePreset::Arcade),
            "endless" => Some(BouncePreset::Endless),
            _ => None,
        }
    }
}

/// Bounce (breakout) tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceSettings {
    // === Play area ===
    pub width: f32,
    pub height: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Paddle top edge distance from the bottom of the play area
    pub paddle_offset_bottom: f32,
    /// Max paddle travel per tick when steered (0 = follow pointer exactly)
    pub paddle_speed: f32,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_start_vx: f32,
    pub ball_start_vy: f32,
    /// Ball spawn height above the bottom of the play area
    pub ball_offset_bottom: f32,
    pub ball_max_speed: f32,
    /// Scalar speed added on every paddle bounce
    pub speed_increment: f32,
    /// Largest bounce angle from vertical (degrees)
    pub max_bounce_angle_deg: f32,

    // === Bricks ===
    pub brick_rows: u32,
    pub brick_cols: u32,
    pub brick_width: f32,
    pub brick_height: f32,
    pub brick_padding: f32,
    pub brick_offset_top: f32,
    /// Row colors (cycled)
    pub brick_colors: Vec<u32>,
    pub brick_scoring: BrickScoring,
    pub level_bonus: u64,

    // === Rules ===
    pub lives: u8,
    pub level_clear: LevelClearPolicy,
}

impl Default for BounceSettings {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 800.0,

            paddle_width: 100.0,
            paddle_height: 15.0,
            paddle_offset_bottom: 30.0,
            paddle_speed: 0.0,

            ball_radius: 10.0,
            ball_start_vx: 5.0,
            ball_start_vy: -5.0,
            ball_offset_bottom: 50.0,
            ball_max_speed: 15.0,
            speed_increment: 0.2,
            max_bounce_angle_deg: 60.0,

            brick_rows: 5,
            brick_cols: 8,
            brick_width: 60.0,
            brick_height: 20.0,
            brick_padding: 10.0,
            brick_offset_top: 80.0,
            brick_colors: vec![0xF44336, 0xE91E63, 0x9C27B0, 0x673AB7, 0x3F51B5],
            brick_scoring: BrickScoring::Flat { points: 10 },
            level_bonus: 100,

            lives: 3,
            level_clear: LevelClearPolicy::EndGame,
        }
    }
}

impl BounceSettings {
    /// Settings for a named preset
    pub fn from_preset(preset: BouncePreset) -> Self {
        let mut settings = Self::default();
        match preset {
            BouncePreset::Classic => {}
            BouncePreset::Arcade => {
                settings.lives = 1;
            }
            BouncePreset::Endless => {
                settings.level_clear = LevelClearPolicy::NextLevel;
                settings.brick_scoring = BrickScoring::RowWeighted {
                    base: 10,
                    per_row: 5,
                };
                settings.ball_max_speed = 18.0;
            }
        }
        settings
    }

    /// Total width of the brick grid
    pub fn brick_grid_width(&self) -> f32 {
        self.brick_cols as f32 * (self.brick_width + self.brick_padding) - self.brick_padding
    }

    /// Bottom edge of the lowest brick row
    pub fn brick_grid_bottom(&self) -> f32 {
        self.brick_offset_top + self.brick_rows as f32 * (self.brick_height + self.brick_padding)
            - self.brick_padding
    }

    /// Left offset that centres the brick grid
    pub fn brick_offset_left(&self) -> f32 {
        ((self.width - self.brick_grid_width()) / 2.0).max(0.0)
    }

    /// Paddle top edge
    pub fn paddle_y(&self) -> f32 {
        self.height - self.paddle_offset_bottom
    }

    pub fn max_bounce_angle(&self) -> f32 {
        self.max_bounce_angle_deg.to_radians()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("bounce.width", self.width)?;
        require_positive("bounce.height", self.height)?;
        require_positive("bounce.paddle_width", self.paddle_width)?;
        require_positive("bounce.paddle_height", self.paddle_height)?;
        require_positive("bounce.ball_radius", self.ball_radius)?;
        require_positive("bounce.ball_max_speed", self.ball_max_speed)?;
        require_positive("bounce.brick_rows", self.brick_rows as f32)?;
        require_positive("bounce.brick_cols", self.brick_cols as f32)?;
        require_positive("bounce.brick_width", self.brick_width)?;
        require_positive("bounce.brick_height", self.brick_height)?;
        require_positive("bounce.lives", self.lives as f32)?;
        require_range("bounce.max_bounce_angle_deg", 0.0, self.max_bounce_angle_deg)?;
        if self.max_bounce_angle_deg >= 90.0 {
            return Err(ConfigError::InvalidRange {
                name: "bounce.max_bounce_angle_deg",
                min: 0.0,
                max: self.max_bounce_angle_deg,
            });
        }
        if self.paddle_width > self.width {
            return Err(ConfigError::InvalidRange {
                name: "bounce.paddle_width",
                min: self.paddle_width,
                max: self.width,
            });
        }
        let grid_width = self.brick_grid_width();
        if grid_width > self.width {
            return Err(ConfigError::BrickGridOverflow {
                grid_width,
                area_width: self.width,
            });
        }
        // Bricks at or below the paddle could never be reached
        let grid_bottom = self.brick_grid_bottom();
        if grid_bottom >= self.paddle_y() {
            return Err(ConfigError::GridOutOfBounds {
                name: "bounce.brick_rows",
                extent: grid_bottom,
                limit: self.paddle_y(),
            });
        }
        Ok(())
    }
}

/// One entry of the power-up draw table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpWeight {
    pub kind: PowerUpKind,
    pub chance: f32,
}

/// Shooter tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterSettings {
    // === Play area ===
    pub width: f32,
    pub height: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    /// Player top edge distance from the bottom of the play area
    pub player_offset_bottom: f32,
    pub lives: u8,
    pub max_lives: u8,
    /// Ticks of invincibility after losing a life
    pub invincible_ticks: u32,

    // === Bullets ===
    pub bullet_width: f32,
    pub bullet_height: f32,
    pub bullet_speed: f32,
    pub fire_cooldown: u32,
    pub rapid_fire_cooldown: u32,

    // === Enemies ===
    pub enemy_min_width: f32,
    pub enemy_max_width: f32,
    pub enemy_min_height: f32,
    pub enemy_max_height: f32,
    pub enemy_min_speed: f32,
    pub enemy_max_speed: f32,
    /// Enemy health = ceil(width / health_per_width)
    pub enemy_health_per_width: f32,
    pub enemy_colors: Vec<u32>,

    // === Spawning & difficulty ===
    pub enemy_spawn_interval: u32,
    pub enemy_min_spawn_interval: u32,
    /// Interval multiplier per difficulty level
    pub spawn_interval_scale: f32,
    /// Enemy speed multiplier added per difficulty level
    pub enemy_speed_step: f32,
    /// Score needed per difficulty level
    pub difficulty_score_interval: u64,
    /// A run ending at or above this score counts as a win
    pub win_score: u64,

    // === Power-ups ===
    pub powerup_size: f32,
    pub powerup_speed: f32,
    pub powerup_spawn_interval: u32,
    pub powerup_weights: Vec<PowerUpWeight>,
    pub shield_ticks: u32,
    pub rapid_fire_ticks: u32,
}

impl Default for ShooterSettings {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 700.0,

            player_width: 50.0,
            player_height: 60.0,
            player_offset_bottom: 100.0,
            lives: 3,
            max_lives: 5,
            invincible_ticks: 60,

            bullet_width: 6.0,
            bullet_height: 15.0,
            bullet_speed: 10.0,
            fire_cooldown: 10,
            rapid_fire_cooldown: 5,

            enemy_min_width: 30.0,
            enemy_max_width: 60.0,
            enemy_min_height: 30.0,
            enemy_max_height: 60.0,
            enemy_min_speed: 2.0,
            enemy_max_speed: 5.0,
            enemy_health_per_width: 10.0,
            enemy_colors: vec![0xF44336, 0xE91E63, 0x9C27B0, 0x3F51B5, 0x2196F3],

            enemy_spawn_interval: 60,
            enemy_min_spawn_interval: 10,
            spawn_interval_scale: 0.92,
            enemy_speed_step: 0.2,
            difficulty_score_interval: 1000,
            win_score: 5000,

            powerup_size: 30.0,
            powerup_speed: 3.0,
            powerup_spawn_interval: 300,
            powerup_weights: vec![
                PowerUpWeight {
                    kind: PowerUpKind::ExtraLife,
                    chance: 0.2,
                },
                PowerUpWeight {
                    kind: PowerUpKind::Shield,
                    chance: 0.3,
                },
                PowerUpWeight {
                    kind: PowerUpKind::RapidFire,
                    chance: 0.5,
                },
            ],
            shield_ticks: 300,
            rapid_fire_ticks: 300,
        }
    }
}

impl ShooterSettings {
    pub fn player_y(&self) -> f32 {
        self.height - self.player_offset_bottom
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("shooter.width", self.width)?;
        require_positive("shooter.height", self.height)?;
        require_positive("shooter.player_width", self.player_width)?;
        require_positive("shooter.player_height", self.player_height)?;
        require_positive("shooter.lives", self.lives as f32)?;
        require_positive("shooter.bullet_speed", self.bullet_speed)?;
        require_positive("shooter.enemy_health_per_width", self.enemy_health_per_width)?;
        require_positive("shooter.enemy_spawn_interval", self.enemy_spawn_interval as f32)?;
        require_positive("shooter.powerup_spawn_interval", self.powerup_spawn_interval as f32)?;
        require_positive("shooter.difficulty_score_interval", self.difficulty_score_interval as f32)?;
        require_range("shooter.enemy_width", self.enemy_min_width, self.enemy_max_width)?;
        require_range("shooter.enemy_height", self.enemy_min_height, self.enemy_max_height)?;
        require_range("shooter.enemy_speed", self.enemy_min_speed, self.enemy_max_speed)?;
        require_range(
            "shooter.enemy_spawn_interval",
            self.enemy_min_spawn_interval as f32,
            self.enemy_spawn_interval as f32,
        )?;
        require_positive("shooter.enemy_min_width", self.enemy_min_width)?;
        if self.enemy_max_width > self.width {
            return Err(ConfigError::InvalidRange {
                name: "shooter.enemy_max_width",
                min: self.enemy_max_width,
                max: self.width,
            });
        }
        if !(self.spawn_interval_scale > 0.0 && self.spawn_interval_scale <= 1.0) {
            return Err(ConfigError::InvalidRange {
                name: "shooter.spawn_interval_scale",
                min: self.spawn_interval_scale,
                max: 1.0,
            });
        }
        if self.max_lives < self.lives {
            return Err(ConfigError::InvalidRange {
                name: "shooter.lives",
                min: self.lives as f32,
                max: self.max_lives as f32,
            });
        }
        let total: f32 = self.powerup_weights.iter().map(|w| w.chance).sum();
        if self.powerup_weights.iter().any(|w| w.chance < 0.0) || total <= 0.0 {
            return Err(ConfigError::InvalidProbabilities { total });
        }
        Ok(())
    }
}

/// Memory match tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub width: f32,
    pub height: f32,
    pub rows: u32,
    pub cols: u32,
    pub card_width: f32,
    pub card_height: f32,
    pub card_padding: f32,
    /// Grid is centred, then pushed down by this much to leave room for the title
    pub grid_offset_y: f32,
    pub match_reward: u64,
    pub mismatch_penalty: u64,
    /// Completion bonus per move saved, against a budget of twice the card count
    pub move_bonus_factor: u64,
    /// How long a flipped pair stays visible before it is compared
    pub flip_delay_secs: f32,
    pub back_color: u32,
    pub front_colors: Vec<u32>,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,
            rows: 4,
            cols: 4,
            card_width: 70.0,
            card_height: 70.0,
            card_padding: 10.0,
            grid_offset_y: 50.0,
            match_reward: 20,
            mismatch_penalty: 2,
            move_bonus_factor: 2,
            flip_delay_secs: 1.0,
            back_color: 0x3F51B5,
            front_colors: vec![
                0xF44336, 0xE91E63, 0x9C27B0, 0x673AB7, 0x2196F3, 0x00BCD4, 0x009688, 0x4CAF50,
            ],
        }
    }
}

impl MemorySettings {
    pub fn card_count(&self) -> usize {
        (self.rows as usize).saturating_mul(self.cols as usize)
    }

    /// Width and height of the card grid
    pub fn grid_size(&self) -> (f32, f32) {
        (
            self.cols as f32 * (self.card_width + self.card_padding) - self.card_padding,
            self.rows as f32 * (self.card_height + self.card_padding) - self.card_padding,
        )
    }

    /// Top edge of the card grid: centred, then shifted down by `grid_offset_y`
    pub fn grid_top(&self) -> f32 {
        (self.height - self.grid_size().1) / 2.0 + self.grid_offset_y
    }

    pub fn pair_count(&self) -> usize {
        self.card_count() / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("memory.width", self.width)?;
        require_positive("memory.height", self.height)?;
        require_positive("memory.rows", self.rows as f32)?;
        require_positive("memory.cols", self.cols as f32)?;
        require_positive("memory.card_width", self.card_width)?;
        require_positive("memory.card_height", self.card_height)?;
        require_range("memory.flip_delay_secs", 0.0, self.flip_delay_secs)?;
        require_range("memory.card_padding", 0.0, self.card_padding)?;
        let (grid_w, grid_h) = self.grid_size();
        if grid_w > self.width {
            return Err(ConfigError::GridOutOfBounds {
                name: "memory.cols",
                extent: grid_w,
                limit: self.width,
            });
        }
        let top = self.grid_top();
        if top < 0.0 || top + grid_h > self.height {
            return Err(ConfigError::GridOutOfBounds {
                name: "memory.rows",
                extent: top + grid_h,
                limit: self.height,
            });
        }
        if self.card_count() % 2 != 0 {
            return Err(ConfigError::OddCardCount {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

/// Settings for every game in the collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bounce: BounceSettings,
    pub shooter: ShooterSettings,
    pub memory: MemorySettings,
}

impl Settings {
    /// Parse and validate a JSON settings document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded settings from JSON");
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounce.validate()?;
        self.shooter.validate()?;
        self.memory.validate()
    }
}
