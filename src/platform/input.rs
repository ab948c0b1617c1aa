//! Pointer input routing
//!
//! The host delivers one pointer stream in game-area coordinates. Presses on
//! fixed UI regions and presses outside active play become intents; the rest
//! goes to the running game.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::collision::Rect;
use crate::sim::{GamePhase, Intent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    /// Touch start / mouse down
    Press,
    /// Touch move / mouse move
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pos: Vec2,
}

impl PointerEvent {
    pub fn press(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Press,
            pos: Vec2::new(x, y),
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Move,
            pos: Vec2::new(x, y),
        }
    }
}

/// Fixed hit regions drawn over every game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UiLayout {
    pub back_button: Rect,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            back_button: Rect::new(10.0, 10.0, 60.0, 30.0),
        }
    }
}

/// Where a pointer event ends up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Routed {
    Intent(Intent),
    /// Forward to the game (paddle/ship steering, card flips)
    Game(PointerEvent),
    Ignored,
}

pub fn route_pointer(event: PointerEvent, phase: GamePhase, layout: &UiLayout) -> Routed {
    if event.kind == PointerKind::Press && layout.back_button.contains(event.pos) {
        return Routed::Intent(Intent::Exit);
    }
    match (phase, event.kind) {
        (GamePhase::Ready, PointerKind::Press) => Routed::Intent(Intent::Start),
        (GamePhase::GameOver, PointerKind::Press) => Routed::Intent(Intent::Reset),
        (GamePhase::Playing, _) => Routed::Game(event),
        _ => Routed::Ignored,
    }
}
