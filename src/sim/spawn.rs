//! Spawn counters, difficulty progression and weighted draws
//!
//! Counters are tick-based: each source increments once per tick and fires
//! when it reaches a threshold that shrinks as difficulty rises.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-source spawn counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnCounter {
    pub counter: u32,
    /// Threshold at difficulty level 1
    pub base_interval: u32,
    /// Threshold never drops below this
    pub min_interval: u32,
    /// Threshold multiplier per level above 1
    pub interval_scale: f32,
}

impl SpawnCounter {
    pub fn new(base_interval: u32, min_interval: u32, interval_scale: f32) -> Self {
        Self {
            counter: 0,
            base_interval: base_interval.max(1),
            min_interval: min_interval.max(1),
            interval_scale,
        }
    }

    /// Fixed-rate counter (no difficulty scaling)
    pub fn fixed(interval: u32) -> Self {
        Self::new(interval, interval, 1.0)
    }

    /// Threshold at a given difficulty level
    pub fn interval_for(&self, level: u32) -> u32 {
        let exponent = level.saturating_sub(1) as i32;
        let scaled = (self.base_interval as f32 * self.interval_scale.powi(exponent)).floor();
        (scaled as u32).max(self.min_interval).min(self.base_interval)
    }

    /// Advance one tick; true when the source should spawn (counter resets)
    pub fn step(&mut self, level: u32) -> bool {
        self.counter += 1;
        if self.counter >= self.interval_for(level) {
            self.counter = 0;
            true
        } else {
            false
        }
    }
}

/// Stepwise difficulty derived from cumulative score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub level: u32,
    pub score_interval: u64,
    /// Enemy speed multiplier added per level above 1
    pub speed_step: f32,
}

impl Difficulty {
    pub fn new(score_interval: u64, speed_step: f32) -> Self {
        Self {
            level: 1,
            score_interval: score_interval.max(1),
            speed_step,
        }
    }

    /// Update from the current score; true exactly when the level rose.
    /// The level never decreases.
    pub fn observe(&mut self, score: u64) -> bool {
        let target = 1 + (score / self.score_interval) as u32;
        if target > self.level {
            self.level = target;
            true
        } else {
            false
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        1.0 + self.level.saturating_sub(1) as f32 * self.speed_step
    }
}

/// Draw an item by cumulative probability
///
/// Weights need not sum to 1; the draw is scaled by their total. Returns
/// `None` only for an empty or all-zero table.
pub fn weighted_pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, table: &[(T, f32)]) -> Option<T> {
    let total: f32 = table.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.random::<f32>() * total;
    let mut cumulative = 0.0;
    for &(item, weight) in table {
        cumulative += weight.max(0.0);
        if roll < cumulative {
            return Some(item);
        }
    }
    // Float rounding can leave roll == total; fall back to the last live entry
    table.iter().rev().find(|(_, w)| *w > 0.0).map(|(item, _)| *item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_counter_fires_on_threshold() {
        let mut counter = SpawnCounter::fixed(3);
        assert!(!counter.step(1));
        assert!(!counter.step(1));
        assert!(counter.step(1));
        assert_eq!(counter.counter, 0);
    }

    #[test]
    fn test_interval_shrinks_and_floors() {
        let counter = SpawnCounter::new(60, 10, 0.92);
        assert_eq!(counter.interval_for(1), 60);
        assert_eq!(counter.interval_for(2), 55);
        assert!(counter.interval_for(3) < counter.interval_for(2));
        assert_eq!(counter.interval_for(100), 10);
    }

    #[test]
    fn test_difficulty_rises_once_per_interval() {
        let mut difficulty = Difficulty::new(1000, 0.2);
        assert!(!difficulty.observe(999));
        assert_eq!(difficulty.level, 1);
        assert!(difficulty.observe(1000));
        assert_eq!(difficulty.level, 2);
        assert!(!difficulty.observe(1500));
        assert_eq!(difficulty.level, 2);
        assert!((difficulty.speed_multiplier() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_difficulty_can_skip_levels() {
        let mut difficulty = Difficulty::new(1000, 0.2);
        assert!(difficulty.observe(3200));
        assert_eq!(difficulty.level, 4);
    }

    #[test]
    fn test_weighted_pick_distribution() {
        let table = [("a", 0.2), ("b", 0.3), ("c", 0.5)];
        let mut rng = Pcg32::seed_from_u64(1);
        let mut counts = [0u32; 3];
        for _ in 0..10_000 {
            match weighted_pick(&mut rng, &table) {
                Some("a") => counts[0] += 1,
                Some("b") => counts[1] += 1,
                Some("c") => counts[2] += 1,
                _ => unreachable!(),
            }
        }
        assert!(counts[0] > 1500 && counts[0] < 2500);
        assert!(counts[1] > 2500 && counts[1] < 3500);
        assert!(counts[2] > 4500 && counts[2] < 5500);
    }

    #[test]
    fn test_weighted_pick_skips_zero_weights() {
        let mut rng = Pcg32::seed_from_u64(9);
        let table = [(1, 0.0), (2, 1.0)];
        for _ in 0..100 {
            assert_eq!(weighted_pick(&mut rng, &table), Some(2));
        }
        assert_eq!(weighted_pick::<i32, _>(&mut rng, &[]), None);
    }
}
