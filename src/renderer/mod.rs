//! Render adapter
//!
//! Games never draw. Each frame the session builds a [`RenderSnapshot`]: a
//! flat draw list plus HUD values, handed to whatever [`Renderer`] the host
//! plugs in.

pub mod shapes;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use shapes::{Color, Drawable, TextAlign};

use crate::platform::UiLayout;
use crate::settings::{BounceSettings, MemorySettings, ShooterSettings};
use crate::sim::{BounceState, GamePhase, MemoryState, PowerUpKind, ShooterState};

/// HUD values shown over the play area
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub lives: Option<u8>,
    pub level: Option<u32>,
    pub moves: Option<u32>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub hud: Hud,
    /// Back to front
    pub drawables: Vec<Drawable>,
}

impl RenderSnapshot {
    /// All text drawables in order, for quick inspection
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.drawables.iter().filter_map(|d| match d {
            Drawable::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Draw-list consumer supplied by the host
pub trait Renderer {
    fn render(&mut self, snapshot: &RenderSnapshot);
}

fn background(width: f32, height: f32) -> Drawable {
    shapes::rect(
        crate::sim::Rect::new(0.0, 0.0, width, height),
        Color::BACKGROUND,
    )
}

pub fn bounce_drawables(state: &BounceState, settings: &BounceSettings) -> Vec<Drawable> {
    let mut out = Vec::with_capacity(state.bricks.len() + 6);
    out.push(background(settings.width, settings.height));

    for brick in state.bricks.iter().filter(|b| !b.hit) {
        out.push(shapes::rounded_rect(brick.rect, Color(brick.color), 3.0));
    }
    out.push(shapes::rounded_rect(
        state.paddle.rect(),
        Color(0x2196F3),
        state.paddle.height / 2.0,
    ));
    out.push(shapes::circle(
        state.ball.pos,
        state.ball.radius,
        shapes::velocity_color(state.ball.speed(), state.ball.max_speed),
    ));

    out.push(shapes::text(
        Vec2::new(settings.width - 90.0, 30.0),
        format!("Lives: {}", state.lives),
        16.0,
        TextAlign::Left,
    ));
    out
}

fn powerup_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::ExtraLife => Color(0x4CAF50),
        PowerUpKind::Shield => Color(0x03A9F4),
        PowerUpKind::RapidFire => Color(0xFFC107),
    }
}

pub fn shooter_drawables(state: &ShooterState, settings: &ShooterSettings) -> Vec<Drawable> {
    let mut out = Vec::with_capacity(
        state.bullets.len() + state.enemies.len() + state.powerups.len() + 8,
    );
    out.push(background(settings.width, settings.height));

    for bullet in &state.bullets {
        out.push(shapes::rect(bullet.rect, Color(0xFFEB3B)));
    }
    for enemy in &state.enemies {
        out.push(shapes::rounded_rect(enemy.rect, Color(enemy.color), 4.0));
    }
    for powerup in &state.powerups {
        out.push(shapes::circle(
            powerup.rect.center(),
            powerup.rect.width / 2.0,
            powerup_color(powerup.kind),
        ));
    }

    // Blink while invincible
    let visible = !state.buffs.invincible() || (state.buffs.invincible_ticks / 6) % 2 == 0;
    if visible {
        out.push(shapes::rounded_rect(state.player.rect, Color(0x00BCD4), 6.0));
    }
    if state.buffs.shield() {
        let rect = state.player.rect;
        out.push(shapes::circle(
            rect.center(),
            rect.width.max(rect.height) * 0.75,
            Color(0x03A9F4).mix(Color::BACKGROUND, 0.6),
        ));
    }

    out.push(shapes::text(
        Vec2::new(settings.width - 90.0, 30.0),
        format!("Lives: {}", state.player.lives),
        16.0,
        TextAlign::Left,
    ));
    out.push(shapes::text(
        Vec2::new(settings.width - 90.0, 55.0),
        format!("Level: {}", state.difficulty.level),
        16.0,
        TextAlign::Left,
    ));
    out
}

pub fn memory_drawables(state: &MemoryState, settings: &MemorySettings) -> Vec<Drawable> {
    let mut out = Vec::with_capacity(state.cards.len() + 3);
    out.push(background(settings.width, settings.height));

    for card in &state.cards {
        let color = if card.face_up() {
            Color(card.color)
        } else {
            Color(settings.back_color)
        };
        out.push(shapes::rounded_rect(card.rect, color, 10.0));
        if card.matched {
            out.push(shapes::text(
                card.rect.center(),
                "✓",
                card.rect.height * 0.4,
                TextAlign::Center,
            ));
        }
    }

    out.push(shapes::text(
        Vec2::new(120.0, 60.0),
        format!("Moves: {}", state.moves),
        16.0,
        TextAlign::Left,
    ));
    out
}

/// Back button and score line drawn over every game
pub fn chrome(layout: &UiLayout, score: u64) -> Vec<Drawable> {
    let button = layout.back_button;
    vec![
        shapes::rounded_rect(button, Color(0x424242), 5.0),
        shapes::text(button.center(), "Back", 14.0, TextAlign::Center),
        shapes::text(
            Vec2::new(button.right() + 50.0, 30.0),
            format!("Score: {}", score),
            16.0,
            TextAlign::Left,
        ),
    ]
}

/// Phase banner over the play area (nothing while playing)
pub fn phase_overlay(
    phase: GamePhase,
    score: u64,
    won: bool,
    best: Option<u64>,
    width: f32,
    height: f32,
) -> Vec<Drawable> {
    let center = Vec2::new(width / 2.0, height / 2.0);
    let shade = shapes::rect(
        crate::sim::Rect::new(0.0, 0.0, width, height),
        Color::BLACK.mix(Color::BACKGROUND, 0.3),
    );
    match phase {
        GamePhase::Playing => Vec::new(),
        GamePhase::Ready => vec![
            shade,
            shapes::text(center, "Tap to start", 28.0, TextAlign::Center),
        ],
        GamePhase::Paused => vec![shade, shapes::text(center, "Paused", 28.0, TextAlign::Center)],
        GamePhase::GameOver => {
            let mut out = vec![
                shade,
                shapes::text(
                    center - Vec2::new(0.0, 40.0),
                    if won { "You win!" } else { "Game over" },
                    32.0,
                    TextAlign::Center,
                ),
                shapes::text(center, format!("Score: {}", score), 24.0, TextAlign::Center),
            ];
            let mut y = 40.0;
            if let Some(best) = best {
                out.push(shapes::text(
                    center + Vec2::new(0.0, y),
                    format!("Best: {}", best),
                    18.0,
                    TextAlign::Center,
                ));
                y += 30.0;
            }
            out.push(shapes::text(
                center + Vec2::new(0.0, y),
                "Tap to play again",
                18.0,
                TextAlign::Center,
            ));
            out
        }
    }
}
