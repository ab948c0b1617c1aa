//! Score/progress reporting
//!
//! The session sends one [`ProgressEvent`] per finished run through a
//! [`ProgressReporter`]. The engine never depends on the answer; a failed
//! report is logged and dropped.
//!
//! [`ProgressTracker`] is a complete in-memory collaborator: points earned per
//! run, game unlocks, one-shot achievements and a leaderboard per game.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::highscores::{HighScoreEntry, HighScores};
use crate::session::GameId;

/// Extra facts about a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub lives_lost: u8,
    /// Memory moves (0 for other games)
    pub moves: u32,
    /// Level reached (1 for memory)
    pub level: u32,
    pub duration_ticks: u64,
}

/// Outbound result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub game_id: GameId,
    pub score: u64,
    pub won: bool,
    /// Milliseconds since the Unix epoch
    pub completed_at: u64,
    pub metadata: ResultMetadata,
}

/// What the collaborator says changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub points: u64,
    pub earned_points: u64,
    /// Games unlocked by this result
    pub unlocked: Vec<GameId>,
    /// Achievement ids awarded by this result
    pub achievements: Vec<String>,
    /// Leaderboard rank of this result (1-indexed)
    pub rank: Option<usize>,
    /// Best score on this game's leaderboard after the result
    pub best_score: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    /// Collaborator unreachable
    Unavailable(String),
    /// Collaborator refused the result
    Rejected(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Unavailable(msg) => write!(f, "progress service unavailable: {}", msg),
            ReportError::Rejected(msg) => write!(f, "result rejected: {}", msg),
        }
    }
}

impl std::error::Error for ReportError {}

/// Boundary to whatever persists player progress
pub trait ProgressReporter {
    fn report_result(&mut self, event: &ProgressEvent) -> Result<ProgressUpdate, ReportError>;
}

/// Per-game catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub game: GameId,
    pub unlock_points: u64,
    pub points_per_play: u64,
    pub points_per_win: u64,
}

/// Condition for an achievement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementRule {
    /// Finish a run
    FirstGame,
    /// Play every catalog game at least once
    PlayedAll,
    /// Reach a score in a single run
    ScoreAtLeast { score: u64 },
    /// Wins counted across the achievement's games
    WinsAtLeast { wins: u32 },
    /// Unlock every catalog game
    UnlockedAll,
    /// Win without losing a life
    Perfect,
    /// Win within a time limit
    FastWin { secs: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub points: u64,
    pub rule: AchievementRule,
    /// Only results of this game count; `None` means any game
    #[serde(default)]
    pub game: Option<GameId>,
}

impl Achievement {
    pub fn new(id: &str, name: &str, points: u64, rule: AchievementRule) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            points,
            rule,
            game: None,
        }
    }

    /// Restrict the achievement to one game
    pub fn for_game(mut self, game: GameId) -> Self {
        self.game = Some(game);
        self
    }
}

fn score_tier(game: GameId, score: u64, points: u64) -> Achievement {
    Achievement::new(
        &format!("{}_score_{}", game.as_str(), score),
        &format!("{} {} points", game.as_str(), score),
        points,
        AchievementRule::ScoreAtLeast { score },
    )
    .for_game(game)
}

fn win_tier(game: GameId, wins: u32, points: u64) -> Achievement {
    Achievement::new(
        &format!("{}_win_{}", game.as_str(), wins),
        &format!("{} {} wins", game.as_str(), wins),
        points,
        AchievementRule::WinsAtLeast { wins },
    )
    .for_game(game)
}

/// Points economy and achievement table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub initial_points: u64,
    /// Fraction of the game score converted to points
    pub score_multiplier: f64,
    pub catalog: Vec<CatalogEntry>,
    pub achievements: Vec<Achievement>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        let entry = |game, unlock_points| CatalogEntry {
            game,
            unlock_points,
            points_per_play: 5,
            points_per_win: 20,
        };
        Self {
            initial_points: 0,
            score_multiplier: 0.1,
            catalog: vec![
                entry(GameId::Bounce, 0),
                entry(GameId::Memory, 100),
                entry(GameId::Shooter, 300),
            ],
            achievements: vec![
                Achievement::new("first_game", "Newcomer", 20, AchievementRule::FirstGame),
                Achievement::new("played_all", "Explorer", 50, AchievementRule::PlayedAll),
                Achievement::new(
                    "high_scorer",
                    "High scorer",
                    40,
                    AchievementRule::ScoreAtLeast { score: 1000 },
                ),
                Achievement::new("collector", "Collector", 100, AchievementRule::UnlockedAll),
                Achievement::new("flawless", "Flawless", 60, AchievementRule::Perfect),
                Achievement::new(
                    "speed_run",
                    "Speed run",
                    60,
                    AchievementRule::FastWin { secs: 60 },
                ),
                Achievement::new(
                    "veteran",
                    "Veteran",
                    200,
                    AchievementRule::WinsAtLeast { wins: 10 },
                ),
                // Bounce
                score_tier(GameId::Bounce, 100, 10),
                score_tier(GameId::Bounce, 500, 30),
                score_tier(GameId::Bounce, 1000, 50),
                Achievement::new("bounce_perfect", "Perfect clear", 100, AchievementRule::Perfect)
                    .for_game(GameId::Bounce),
                // Memory
                win_tier(GameId::Memory, 1, 10),
                win_tier(GameId::Memory, 5, 30),
                win_tier(GameId::Memory, 10, 50),
                Achievement::new(
                    "memory_fast",
                    "Lightning memory",
                    100,
                    AchievementRule::FastWin { secs: 30 },
                )
                .for_game(GameId::Memory),
                // Shooter
                score_tier(GameId::Shooter, 1000, 10),
                score_tier(GameId::Shooter, 5000, 30),
                score_tier(GameId::Shooter, 10000, 50),
            ],
        }
    }
}

/// Lifetime stats for one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub high_score: u64,
    pub total_score: u64,
    pub plays: u32,
    pub wins: u32,
}

/// In-memory progress collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressTracker {
    config: ProgressConfig,
    points: u64,
    records: BTreeMap<GameId, GameRecord>,
    unlocked: BTreeSet<GameId>,
    achievements: BTreeSet<String>,
    boards: BTreeMap<GameId, HighScores>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(ProgressConfig::default())
    }
}

impl ProgressTracker {
    pub fn new(config: ProgressConfig) -> Self {
        let mut tracker = Self {
            points: config.initial_points,
            config,
            records: BTreeMap::new(),
            unlocked: BTreeSet::new(),
            achievements: BTreeSet::new(),
            boards: BTreeMap::new(),
        };
        tracker.refresh_unlocks();
        tracker
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn is_unlocked(&self, game: GameId) -> bool {
        self.unlocked.contains(&game)
    }

    pub fn record(&self, game: GameId) -> Option<&GameRecord> {
        self.records.get(&game)
    }

    pub fn leaderboard(&self, game: GameId) -> Option<&HighScores> {
        self.boards.get(&game)
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.contains(id)
    }

    /// Unlock every game the current points afford; returns the new ones
    fn refresh_unlocks(&mut self) -> Vec<GameId> {
        let mut fresh = Vec::new();
        for entry in &self.config.catalog {
            if entry.unlock_points <= self.points && self.unlocked.insert(entry.game) {
                log::info!("Unlocked {} at {} points", entry.game.as_str(), self.points);
                fresh.push(entry.game);
            }
        }
        fresh
    }

    fn rule_met(&self, achievement: &Achievement, event: &ProgressEvent) -> bool {
        if achievement.game.is_some_and(|game| game != event.game_id) {
            return false;
        }
        match achievement.rule {
            AchievementRule::FirstGame => true,
            AchievementRule::PlayedAll => self
                .config
                .catalog
                .iter()
                .all(|e| self.records.get(&e.game).is_some_and(|r| r.plays > 0)),
            AchievementRule::ScoreAtLeast { score } => event.score >= score,
            AchievementRule::WinsAtLeast { wins } => {
                self.records
                    .iter()
                    .filter(|(game, _)| achievement.game.is_none_or(|only| only == **game))
                    .map(|(_, r)| r.wins)
                    .sum::<u32>()
                    >= wins
            }
            AchievementRule::UnlockedAll => {
                self.config.catalog.iter().all(|e| self.unlocked.contains(&e.game))
            }
            AchievementRule::Perfect => event.won && event.metadata.lives_lost == 0,
            AchievementRule::FastWin { secs } => {
                event.won && event.metadata.duration_ticks <= crate::secs_to_ticks(secs as f32)
            }
        }
    }

    /// Award every achievement whose rule now holds; returns the new ids
    fn award_achievements(&mut self, event: &ProgressEvent) -> Vec<String> {
        let due: Vec<(String, u64)> = self
            .config
            .achievements
            .iter()
            .filter(|a| !self.achievements.contains(&a.id) && self.rule_met(a, event))
            .map(|a| (a.id.clone(), a.points))
            .collect();

        for (id, points) in &due {
            log::info!("Achievement {} (+{} points)", id, points);
            self.achievements.insert(id.clone());
            self.points += points;
        }
        due.into_iter().map(|(id, _)| id).collect()
    }
}

impl ProgressReporter for ProgressTracker {
    fn report_result(&mut self, event: &ProgressEvent) -> Result<ProgressUpdate, ReportError> {
        let entry = self
            .config
            .catalog
            .iter()
            .find(|e| e.game == event.game_id)
            .cloned()
            .ok_or_else(|| {
                ReportError::Rejected(format!("{} is not in the catalog", event.game_id.as_str()))
            })?;
        if !self.is_unlocked(event.game_id) {
            return Err(ReportError::Rejected(format!(
                "{} is locked",
                event.game_id.as_str()
            )));
        }

        let mut earned = entry.points_per_play
            + (event.score as f64 * self.config.score_multiplier).floor() as u64;
        if event.won {
            earned += entry.points_per_win;
        }
        self.points += earned;

        let record = self.records.entry(event.game_id).or_default();
        record.plays += 1;
        record.total_score += event.score;
        record.high_score = record.high_score.max(event.score);
        if event.won {
            record.wins += 1;
        }

        let detail = match event.game_id {
            GameId::Memory => event.metadata.moves,
            GameId::Bounce | GameId::Shooter => event.metadata.level,
        };
        let board = self.boards.entry(event.game_id).or_default();
        let rank = board.add(HighScoreEntry {
            score: event.score,
            detail,
            won: event.won,
            timestamp_ms: event.completed_at,
        });
        let best_score = board.top_score();

        // Achievement points can unlock more games, which can satisfy more
        // achievements
        let mut unlocked = self.refresh_unlocks();
        let mut achievements = self.award_achievements(event);
        loop {
            let more = self.refresh_unlocks();
            if more.is_empty() {
                break;
            }
            unlocked.extend(more);
            achievements.extend(self.award_achievements(event));
        }

        Ok(ProgressUpdate {
            points: self.points,
            earned_points: earned,
            unlocked,
            achievements,
            rank,
            best_score,
        })
    }
}

/// Reporter that keeps every event it is given
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    pub events: Vec<ProgressEvent>,
}

impl ProgressReporter for RecordingReporter {
    fn report_result(&mut self, event: &ProgressEvent) -> Result<ProgressUpdate, ReportError> {
        self.events.push(event.clone());
        Ok(ProgressUpdate::default())
    }
}

/// Shared handle so a test or host can inspect what a boxed reporter saw
impl<R: ProgressReporter> ProgressReporter for std::rc::Rc<std::cell::RefCell<R>> {
    fn report_result(&mut self, event: &ProgressEvent) -> Result<ProgressUpdate, ReportError> {
        self.borrow_mut().report_result(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(game_id: GameId, score: u64, won: bool) -> ProgressEvent {
        ProgressEvent {
            game_id,
            score,
            won,
            completed_at: 1_000,
            metadata: ResultMetadata {
                lives_lost: 1,
                moves: 0,
                level: 1,
                duration_ticks: 100_000,
            },
        }
    }

    fn bare_tracker() -> ProgressTracker {
        ProgressTracker::new(ProgressConfig {
            achievements: Vec::new(),
            ..Default::default()
        })
    }

    #[test]
    fn test_initial_unlocks() {
        let tracker = ProgressTracker::default();
        assert!(tracker.is_unlocked(GameId::Bounce));
        assert!(!tracker.is_unlocked(GameId::Memory));
        assert!(!tracker.is_unlocked(GameId::Shooter));
    }

    #[test]
    fn test_points_formula() {
        let mut tracker = bare_tracker();
        let update = tracker.report_result(&event(GameId::Bounce, 437, false)).unwrap();
        assert_eq!(update.earned_points, 5 + 43);
        let update = tracker.report_result(&event(GameId::Bounce, 500, true)).unwrap();
        assert_eq!(update.earned_points, 5 + 50 + 20);
        assert_eq!(tracker.points(), 48 + 75);
    }

    #[test]
    fn test_record_tracks_best_and_totals() {
        let mut tracker = bare_tracker();
        tracker.report_result(&event(GameId::Bounce, 300, false)).unwrap();
        tracker.report_result(&event(GameId::Bounce, 120, true)).unwrap();
        let record = tracker.record(GameId::Bounce).unwrap();
        assert_eq!(record.high_score, 300);
        assert_eq!(record.total_score, 420);
        assert_eq!(record.plays, 2);
        assert_eq!(record.wins, 1);
    }

    #[test]
    fn test_unlock_on_threshold() {
        let mut tracker = bare_tracker();
        let update = tracker.report_result(&event(GameId::Bounce, 950, false)).unwrap();
        // 5 + 95 = 100
        assert_eq!(update.unlocked, vec![GameId::Memory]);
        assert!(tracker.is_unlocked(GameId::Memory));
        let update = tracker.report_result(&event(GameId::Bounce, 10, false)).unwrap();
        assert!(update.unlocked.is_empty());
    }

    #[test]
    fn test_locked_game_rejected() {
        let mut tracker = bare_tracker();
        let err = tracker
            .report_result(&event(GameId::Shooter, 100, false))
            .unwrap_err();
        assert!(matches!(err, ReportError::Rejected(_)));
        assert_eq!(tracker.points(), 0);
        assert!(err.to_string().contains("shooter"));
    }

    #[test]
    fn test_achievements_awarded_once() {
        let mut tracker = ProgressTracker::new(ProgressConfig {
            achievements: vec![Achievement::new(
                "high_scorer",
                "High scorer",
                40,
                AchievementRule::ScoreAtLeast { score: 1000 },
            )],
            ..Default::default()
        });
        let update = tracker.report_result(&event(GameId::Bounce, 1200, false)).unwrap();
        assert_eq!(update.achievements, vec!["high_scorer".to_string()]);
        // 5 + 120 + 40
        assert_eq!(update.points, 165);

        let update = tracker.report_result(&event(GameId::Bounce, 1500, false)).unwrap();
        assert!(update.achievements.is_empty());
        assert_eq!(update.points, 165 + 5 + 150);
    }

    #[test]
    fn test_default_first_run_achievements() {
        let mut tracker = ProgressTracker::default();
        let update = tracker.report_result(&event(GameId::Bounce, 1200, false)).unwrap();
        assert!(update.achievements.contains(&"first_game".to_string()));
        assert!(update.achievements.contains(&"high_scorer".to_string()));
        assert!(update.achievements.contains(&"bounce_score_1000".to_string()));
        assert!(!tracker.has_achievement("played_all"));
        assert!(!tracker.has_achievement("shooter_score_1000"));
        // 5 + 120, then 20 + 40 + 10 + 30 + 50
        assert_eq!(update.points, 275);
    }

    #[test]
    fn test_perfect_and_fast_wins() {
        let mut tracker = ProgressTracker::default();
        let mut run = event(GameId::Bounce, 500, true);
        run.metadata.lives_lost = 0;
        run.metadata.duration_ticks = 30 * 60;
        let update = tracker.report_result(&run).unwrap();
        assert!(tracker.has_achievement("flawless"));
        assert!(tracker.has_achievement("speed_run"));
        assert!(tracker.has_achievement("bounce_perfect"));
        assert!(update.achievements.contains(&"speed_run".to_string()));
        // Fast, but not a memory run
        assert!(!tracker.has_achievement("memory_fast"));
    }

    #[test]
    fn test_game_scoped_achievements() {
        let wins = |wins| AchievementRule::WinsAtLeast { wins };
        let mut tracker = ProgressTracker::new(ProgressConfig {
            initial_points: 100,
            achievements: vec![
                Achievement::new("bounce_win", "Bounce win", 10, wins(1)).for_game(GameId::Bounce),
                Achievement::new("memory_two", "Memory twice", 10, wins(2)).for_game(GameId::Memory),
                Achievement::new("any_two", "Two wins", 10, wins(2)),
            ],
            ..Default::default()
        });

        let update = tracker.report_result(&event(GameId::Memory, 20, true)).unwrap();
        assert!(update.achievements.is_empty());
        assert!(!tracker.has_achievement("bounce_win"));

        let update = tracker.report_result(&event(GameId::Bounce, 20, true)).unwrap();
        assert_eq!(
            update.achievements,
            vec!["bounce_win".to_string(), "any_two".to_string()]
        );
        // One memory win plus one bounce win is not two memory wins
        assert!(!tracker.has_achievement("memory_two"));

        tracker.report_result(&event(GameId::Memory, 20, true)).unwrap();
        assert!(tracker.has_achievement("memory_two"));
    }

    #[test]
    fn test_default_table_has_per_game_tiers() {
        let config = ProgressConfig::default();
        let scoped = |game| config.achievements.iter().filter(|a| a.game == Some(game)).count();
        assert_eq!(scoped(GameId::Bounce), 4);
        assert_eq!(scoped(GameId::Memory), 4);
        assert_eq!(scoped(GameId::Shooter), 3);
        let json = serde_json::to_string(&config).unwrap();
        let back: ProgressConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.achievements, config.achievements);
    }

    #[test]
    fn test_collector_after_unlocking_everything() {
        let mut tracker = ProgressTracker::default();
        tracker.report_result(&event(GameId::Bounce, 3000, false)).unwrap();
        assert!(tracker.is_unlocked(GameId::Shooter));
        assert!(tracker.has_achievement("collector"));
    }

    #[test]
    fn test_leaderboard_rank() {
        let mut tracker = bare_tracker();
        let first = tracker.report_result(&event(GameId::Bounce, 100, false)).unwrap();
        let second = tracker.report_result(&event(GameId::Bounce, 250, false)).unwrap();
        assert_eq!(first.rank, Some(1));
        assert_eq!(second.rank, Some(1));
        assert_eq!(second.best_score, Some(250));
        assert_eq!(tracker.leaderboard(GameId::Bounce).unwrap().entries.len(), 2);
        let zero = tracker.report_result(&event(GameId::Bounce, 0, false)).unwrap();
        assert_eq!(zero.rank, None);
        assert_eq!(zero.best_score, Some(250));
    }

    #[test]
    fn test_recording_reporter() {
        let mut reporter = RecordingReporter::default();
        reporter.report_result(&event(GameId::Memory, 20, true)).unwrap();
        assert_eq!(reporter.events.len(), 1);
        assert_eq!(reporter.events[0].score, 20);
    }
}
