//! Collision detection and response for axis-aligned play areas
//!
//! Everything here is a pure function over positions and sizes. Screen
//! coordinates: origin top-left, +y points down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp;

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive point test (used for pointer hit-testing)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Which velocity component a hit reflects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitAxis {
    /// Hit a left/right face: flip vx
    Horizontal,
    /// Hit a top/bottom face: flip vy
    Vertical,
}

/// Ball (as its bounding box) overlaps a rectangle
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    center.x + radius > rect.x
        && center.x - radius < rect.right()
        && center.y + radius > rect.y
        && center.y - radius < rect.bottom()
}

/// Axis of shallowest penetration, judged by the ball centre's distance to
/// each of the four edges. Ties go to the horizontal faces.
pub fn penetration_axis(center: Vec2, rect: &Rect) -> HitAxis {
    let dist_left = (center.x - rect.x).abs();
    let dist_right = (center.x - rect.right()).abs();
    let dist_top = (center.y - rect.y).abs();
    let dist_bottom = (center.y - rect.bottom()).abs();

    let min_horizontal = dist_left.min(dist_right);
    let min_vertical = dist_top.min(dist_bottom);

    if min_horizontal <= min_vertical {
        HitAxis::Horizontal
    } else {
        HitAxis::Vertical
    }
}

/// Flip the velocity component for `axis`
#[inline]
pub fn reflect_axis(velocity: Vec2, axis: HitAxis) -> Vec2 {
    match axis {
        HitAxis::Horizontal => Vec2::new(-velocity.x, velocity.y),
        HitAxis::Vertical => Vec2::new(velocity.x, -velocity.y),
    }
}

/// Normalised hit position on a paddle: 0 = centre, -1/+1 = edges
pub fn hit_offset(ball_x: f32, paddle_x: f32, paddle_width: f32) -> f32 {
    let half = paddle_width / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    clamp((ball_x - (paddle_x + half)) / half, -1.0, 1.0)
}

/// Outgoing velocity after a paddle bounce
///
/// The angle from vertical is `offset * max_angle`; the scalar speed is
/// preserved and the ball always leaves upward.
pub fn paddle_bounce(velocity: Vec2, offset: f32, max_angle: f32) -> Vec2 {
    let speed = velocity.length();
    let angle = clamp(offset, -1.0, 1.0) * max_angle;
    Vec2::new(speed * angle.sin(), -speed * angle.cos())
}

/// Add `increment` to the scalar speed, capped at `max_speed`
pub fn accelerate(velocity: Vec2, increment: f32, max_speed: f32) -> Vec2 {
    let speed = velocity.length();
    if speed <= f32::EPSILON {
        return velocity;
    }
    let target = (speed + increment).min(max_speed);
    velocity / speed * target
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_overlap_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Touching edges only
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rect_contains_inclusive() {
        let r = Rect::new(20.0, 20.0, 80.0, 40.0);
        assert!(r.contains(Vec2::new(20.0, 20.0)));
        assert!(r.contains(Vec2::new(100.0, 60.0)));
        assert!(!r.contains(Vec2::new(101.0, 30.0)));
    }

    #[test]
    fn test_penetration_axis() {
        let brick = Rect::new(100.0, 100.0, 60.0, 20.0);
        // Ball just below the brick's bottom face
        assert_eq!(
            penetration_axis(Vec2::new(130.0, 125.0), &brick),
            HitAxis::Vertical
        );
        // Ball beside the left face
        assert_eq!(
            penetration_axis(Vec2::new(95.0, 110.0), &brick),
            HitAxis::Horizontal
        );
    }

    #[test]
    fn test_center_hit_goes_straight_up() {
        let v = paddle_bounce(Vec2::new(3.0, 4.0), 0.0, 60f32.to_radians());
        assert!(v.x.abs() < 1e-5);
        assert!((v.y + 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_accelerate_caps() {
        let v = accelerate(Vec2::new(0.0, -14.9), 0.2, 15.0);
        assert!((v.length() - 15.0).abs() < 1e-4);
        assert!(v.y < 0.0);
        assert_eq!(accelerate(Vec2::ZERO, 1.0, 15.0), Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_paddle_angle_bounded_and_speed_kept(
            offset in -1.0f32..=1.0,
            vx in -15.0f32..15.0,
            vy in 0.5f32..15.0,
        ) {
            let max_angle = 60f32.to_radians();
            let before = Vec2::new(vx, vy);
            let after = paddle_bounce(before, offset, max_angle);

            // Angle from vertical (upward) never exceeds the cap
            let angle = after.x.atan2(-after.y).abs();
            prop_assert!(angle <= max_angle + 1e-4);
            prop_assert!(after.y < 0.0);
            prop_assert!((after.length() - before.length()).abs() < 1e-3);
        }

        #[test]
        fn prop_hit_offset_in_unit_range(ball_x in -500.0f32..500.0, paddle_x in 0.0f32..400.0) {
            let offset = hit_offset(ball_x, paddle_x, 100.0);
            prop_assert!((-1.0..=1.0).contains(&offset));
        }
    }
}
