//! Draw-list primitives

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::sim::collision::Rect;

/// Packed 0xRRGGBB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFFFF);
    pub const BLACK: Color = Color(0x000000);
    pub const HUD: Color = Color(0xECEFF1);
    pub const BACKGROUND: Color = Color(0x212121);

    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        Color((channel(r) << 16) | (channel(g) << 8) | channel(b))
    }

    /// Channels as 0-1 floats
    pub fn rgb(self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xFF) as f32 / 255.0,
            ((self.0 >> 8) & 0xFF) as f32 / 255.0,
            (self.0 & 0xFF) as f32 / 255.0,
        ]
    }

    pub fn mix(self, other: Color, t: f32) -> Color {
        let [r1, g1, b1] = self.rgb();
        let [r2, g2, b2] = other.rgb();
        Color::from_rgb(lerp(r1, r2, t), lerp(g1, g2, t), lerp(b1, b2, t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
}

/// One entry in a frame's draw list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Drawable {
    Rect {
        rect: Rect,
        color: Color,
        corner_radius: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: Color,
        align: TextAlign,
    },
}

pub fn rect(rect: Rect, color: Color) -> Drawable {
    Drawable::Rect {
        rect,
        color,
        corner_radius: 0.0,
    }
}

pub fn rounded_rect(rect: Rect, color: Color, corner_radius: f32) -> Drawable {
    Drawable::Rect {
        rect,
        color,
        corner_radius,
    }
}

pub fn circle(center: Vec2, radius: f32, color: Color) -> Drawable {
    Drawable::Circle {
        center,
        radius,
        color,
    }
}

pub fn text(pos: Vec2, text: impl Into<String>, size: f32, align: TextAlign) -> Drawable {
    Drawable::Text {
        pos,
        text: text.into(),
        size,
        color: Color::HUD,
        align,
    }
}

/// Ball tint by speed: blue when slow through green and yellow to red at max
pub fn velocity_color(speed: f32, max_speed: f32) -> Color {
    let t = if max_speed > 0.0 {
        (speed / max_speed).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let (r, g, b) = if t < 0.25 {
        let u = t / 0.25;
        (0.2, 0.4 + 0.4 * u, 1.0)
    } else if t < 0.5 {
        let u = (t - 0.25) / 0.25;
        (0.2, 0.8, 1.0 - 0.6 * u)
    } else if t < 0.75 {
        let u = (t - 0.5) / 0.25;
        (0.2 + 0.8 * u, 0.8, 0.4 - 0.2 * u)
    } else {
        let u = (t - 0.75) / 0.25;
        (1.0, 0.8 - 0.5 * u, 0.2)
    };
    Color::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_channels() {
        assert_eq!(Color(0xFF8000).rgb(), [1.0, 128.0 / 255.0, 0.0]);
        assert_eq!(Color::from_rgb(1.0, 0.0, 0.0), Color(0xFF0000));
        assert_eq!(Color::from_rgb(2.0, -1.0, 0.0), Color(0xFF0000));
    }

    #[test]
    fn test_mix_endpoints() {
        let a = Color(0x3F51B5);
        let b = Color(0xF44336);
        assert_eq!(a.mix(b, 0.0), a);
        assert_eq!(a.mix(b, 1.0), b);
    }

    #[test]
    fn test_velocity_color_gradient() {
        let slow = velocity_color(0.0, 15.0).rgb();
        let fast = velocity_color(15.0, 15.0).rgb();
        assert!(slow[2] > slow[0]);
        assert!(fast[0] > fast[2]);
        assert_eq!(velocity_color(5.0, 0.0), velocity_color(0.0, 15.0));
    }
}
