//! Memory match: a shuffled grid of card pairs with a delayed comparison
//!
//! The second flip of a move queues a [`MatchTask::Compare`] on the game's
//! scheduler. Until it fires, further flips are rejected.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::{GameEvent, TickOutcome};
use super::timer::Scheduler;
use crate::error::ConfigError;
use crate::secs_to_ticks;
use crate::settings::MemorySettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub row: u32,
    pub col: u32,
    pub rect: Rect,
    pub pair_id: u32,
    pub color: u32,
    pub flipped: bool,
    /// Set once, never cleared for the rest of the run
    pub matched: bool,
}

impl Card {
    /// Face is showing (flipped or already matched)
    pub fn face_up(&self) -> bool {
        self.flipped || self.matched
    }
}

/// Deferred actions on the memory board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTask {
    /// Resolve the two face-up cards
    Compare(usize, usize),
}

/// Why a flip was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipRejected {
    OutOfRange,
    /// A comparison is pending
    Locked,
    AlreadyFaceUp,
}

#[derive(Debug, Clone)]
pub struct MemoryState {
    pub cards: Vec<Card>,
    /// Indices of face-up unmatched cards in this move (at most 2)
    pub flipped: Vec<usize>,
    pub can_flip: bool,
    pub moves: u32,
    pub matched_pairs: usize,
    pub score: u64,
    pub time_ticks: u64,
    scheduler: Scheduler<MatchTask>,
    flip_delay_ticks: u64,
}

/// Top-left of the card grid
fn grid_origin(settings: &MemorySettings) -> Vec2 {
    let (grid_w, _) = settings.grid_size();
    Vec2::new((settings.width - grid_w) / 2.0, settings.grid_top())
}

/// Lay out cards row-major with the given pair ids
fn build_cards(settings: &MemorySettings, pair_ids: &[u32]) -> Vec<Card> {
    let origin = grid_origin(settings);
    let step_x = settings.card_width + settings.card_padding;
    let step_y = settings.card_height + settings.card_padding;
    let cols = settings.cols as usize;

    pair_ids
        .iter()
        .enumerate()
        .map(|(i, &pair_id)| {
            let row = (i / cols) as u32;
            let col = (i % cols) as u32;
            let color = if settings.front_colors.is_empty() {
                0xFFFFFF
            } else {
                settings.front_colors[pair_id as usize % settings.front_colors.len()]
            };
            Card {
                row,
                col,
                rect: Rect::new(
                    origin.x + col as f32 * step_x,
                    origin.y + row as f32 * step_y,
                    settings.card_width,
                    settings.card_height,
                ),
                pair_id,
                color,
                flipped: false,
                matched: false,
            }
        })
        .collect()
}

impl MemoryState {
    /// Shuffled board
    pub fn new(settings: &MemorySettings, mut rng: Pcg32) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut pair_ids: Vec<u32> = (0..settings.pair_count() as u32)
            .flat_map(|id| [id, id])
            .collect();
        pair_ids.shuffle(&mut rng);
        Self::with_layout(settings, &pair_ids)
    }

    /// Board with a fixed row-major layout. Every pair id must appear exactly
    /// twice and the layout must fill the grid.
    pub fn with_layout(settings: &MemorySettings, pair_ids: &[u32]) -> Result<Self, ConfigError> {
        settings.validate()?;
        let valid_pairs = pair_ids.len() == settings.card_count()
            && (0..settings.pair_count() as u32)
                .all(|id| pair_ids.iter().filter(|&&p| p == id).count() == 2);
        if !valid_pairs {
            return Err(ConfigError::Parse(format!(
                "card layout of {} ids does not hold {} complete pairs",
                pair_ids.len(),
                settings.pair_count()
            )));
        }

        Ok(Self {
            cards: build_cards(settings, pair_ids),
            flipped: Vec::with_capacity(2),
            can_flip: true,
            moves: 0,
            matched_pairs: 0,
            score: 0,
            time_ticks: 0,
            scheduler: Scheduler::new(),
            flip_delay_ticks: secs_to_ticks(settings.flip_delay_secs),
        })
    }

    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn is_complete(&self) -> bool {
        self.matched_pairs >= self.total_pairs()
    }

    /// Index of the card under `point`, if any
    pub fn card_at(&self, point: Vec2) -> Option<usize> {
        self.cards.iter().position(|c| c.rect.contains(point))
    }

    /// Comparison tasks still waiting
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Drop queued comparisons; the board is about to be torn down
    pub fn cancel_pending(&mut self) -> usize {
        self.scheduler.cancel_all()
    }
}

/// Turn a card face up. The second card of a move counts the move and
/// queues the comparison.
pub fn flip(state: &mut MemoryState, index: usize) -> Result<(), FlipRejected> {
    if !state.can_flip || state.flipped.len() >= 2 {
        return Err(FlipRejected::Locked);
    }
    let card = state.cards.get_mut(index).ok_or(FlipRejected::OutOfRange)?;
    if card.face_up() {
        return Err(FlipRejected::AlreadyFaceUp);
    }
    card.flipped = true;
    state.flipped.push(index);

    if let [first, second] = state.flipped[..] {
        state.moves += 1;
        state.can_flip = false;
        state
            .scheduler
            .schedule(state.flip_delay_ticks, MatchTask::Compare(first, second));
    }
    Ok(())
}

/// Completion bonus: fewer moves earn more, never negative
pub fn move_bonus(card_count: usize, moves: u32, factor: u64) -> u64 {
    (2 * card_count as u64).saturating_sub(moves as u64) * factor
}

/// Resolve a pending pair; true when this match cleared the board
fn compare(
    state: &mut MemoryState,
    a: usize,
    b: usize,
    settings: &MemorySettings,
    events: &mut Vec<GameEvent>,
) -> bool {
    let matched = state.cards[a].pair_id == state.cards[b].pair_id;
    let before = state.score;
    if matched {
        state.cards[a].matched = true;
        state.cards[b].matched = true;
        state.matched_pairs += 1;
        state.score += settings.match_reward;
    } else {
        state.cards[a].flipped = false;
        state.cards[b].flipped = false;
        state.score = state.score.saturating_sub(settings.mismatch_penalty);
    }
    state.flipped.clear();
    state.can_flip = true;

    events.push(GameEvent::PairResolved { matched });
    if state.score != before {
        events.push(GameEvent::ScoreChanged {
            score: state.score,
            delta: state.score as i64 - before as i64,
        });
    }
    matched && state.is_complete()
}

/// Advance the board by one tick, resolving any comparison that came due
pub fn tick(
    state: &mut MemoryState,
    settings: &MemorySettings,
    events: &mut Vec<GameEvent>,
) -> TickOutcome {
    state.time_ticks += 1;
    let mut cleared = false;
    for task in state.scheduler.advance(1) {
        match task {
            MatchTask::Compare(a, b) => cleared |= compare(state, a, b, settings, events),
        }
    }

    if cleared {
        let bonus = move_bonus(state.cards.len(), state.moves, settings.move_bonus_factor);
        state.score += bonus;
        if bonus > 0 {
            events.push(GameEvent::ScoreChanged {
                score: state.score,
                delta: bonus as i64,
            });
        }
        log::info!(
            "Memory board cleared in {} moves (bonus {})",
            state.moves,
            bonus
        );
    }
    if state.is_complete() {
        return TickOutcome::Finished { won: true };
    }
    TickOutcome::Continue
}

/// Next card an idle/demo player would flip. Remembers every face it has
/// seen and completes a known pair when it can.
pub fn autopilot_pick(state: &MemoryState, seen: &[Option<u32>]) -> Option<usize> {
    let hidden = |i: &usize| !state.cards[*i].face_up();

    if let [first] = state.flipped[..] {
        let pair_id = state.cards[first].pair_id;
        let known = (0..state.cards.len())
            .filter(hidden)
            .find(|&i| seen.get(i).copied().flatten() == Some(pair_id));
        return known.or_else(|| unseen(state, seen));
    }

    for i in (0..state.cards.len()).filter(hidden) {
        let Some(id) = seen.get(i).copied().flatten() else {
            continue;
        };
        if (i + 1..state.cards.len())
            .filter(hidden)
            .any(|j| seen.get(j).copied().flatten() == Some(id))
        {
            return Some(i);
        }
    }
    unseen(state, seen)
}

/// First face-down card never seen, else any face-down card
fn unseen(state: &MemoryState, seen: &[Option<u32>]) -> Option<usize> {
    let hidden = |i: &usize| !state.cards[*i].face_up();
    (0..state.cards.len())
        .filter(hidden)
        .find(|&i| seen.get(i).copied().flatten().is_none())
        .or_else(|| (0..state.cards.len()).find(|i| hidden(i)))
}
