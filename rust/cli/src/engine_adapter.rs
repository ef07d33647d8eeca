//! Shared helpers for driving the real two-seat hand state machine from the
//! practice-mode commands (`play`, `sim`, `eval`, `deal`). These commands
//! only ever need a fixed heads-up table, so this module wraps
//! [`GameState::create`]/[`engine::start_hand`] with the level-based blind
//! schedule the CLI has always used, and a tiny AI adapter over
//! [`holdem_ai::Suggester`] (the same pairing `holdem_web::ai` uses for the
//! live practice-table sessions).

use std::sync::Mutex;

use holdem_ai::Suggester;
use holdem_engine::deck::Deck;
use holdem_engine::engine;
use holdem_engine::errors::GameError;
use holdem_engine::game::GameState;
use holdem_engine::player::{PlayerAction, SeatedPlayer, STARTING_STACK};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::error::CliError;

pub const SEAT_COUNT: usize = 2;
pub const TURN_TIMEOUT_MS: u64 = 30_000;
pub const TABLE_ID: u64 = 1;

/// Blinds for a given tournament level (1-20, clamped above). Mirrors the
/// fixed schedule the engine used before it was generalized to arbitrary
/// caller-supplied blinds for multi-table play.
pub fn blinds_for_level(level: u8) -> Result<(u32, u32), CliError> {
    match level {
        0 => Err(CliError::InvalidInput(format!(
            "invalid level {}: minimum is 1",
            level
        ))),
        1 => Ok((50, 100)),
        2 => Ok((75, 150)),
        3 => Ok((100, 200)),
        4 => Ok((125, 250)),
        5 => Ok((150, 300)),
        6 => Ok((200, 400)),
        7 => Ok((250, 500)),
        8 => Ok((300, 600)),
        9 => Ok((400, 800)),
        10 => Ok((500, 1000)),
        11 => Ok((600, 1200)),
        12 => Ok((800, 1600)),
        13 => Ok((1000, 2000)),
        14 => Ok((1200, 2400)),
        15 => Ok((1500, 3000)),
        16 => Ok((2000, 4000)),
        17 => Ok((2500, 5000)),
        18 => Ok((3000, 6000)),
        19 => Ok((3500, 7000)),
        // 20 and anything above rides the top of the schedule.
        _ => Ok((4000, 8000)),
    }
}

/// A heads-up practice table that persists stacks across hands, the way the
/// old single-struct `Engine` did across repeated `deal_hand()` calls.
pub struct PracticeTable {
    stacks: [u32; SEAT_COUNT],
    hand_number: u64,
}

impl PracticeTable {
    pub fn new() -> Self {
        Self {
            stacks: [STARTING_STACK, STARTING_STACK],
            hand_number: 0,
        }
    }

    pub fn stacks(&self) -> [u32; SEAT_COUNT] {
        self.stacks
    }

    /// Deals a fresh hand at the given level and button seat, carrying over
    /// whatever stacks the previous hand left behind.
    pub fn deal_next_hand(
        &mut self,
        level: u8,
        button_seat: usize,
        seed: u64,
        now_ms: i64,
    ) -> Result<GameState, CliError> {
        self.hand_number += 1;
        let (sb, bb) = blinds_for_level(level)?;
        let seats = [
            SeatedPlayer::new(0, 0, self.stacks[0]),
            SeatedPlayer::new(1, 1, self.stacks[1]),
        ];
        let mut state = GameState::create(
            TABLE_ID,
            self.hand_number,
            &seats,
            Some(button_seat),
            sb,
            bb,
            TURN_TIMEOUT_MS,
            SEAT_COUNT,
        )
        .map_err(|e: GameError| CliError::Engine(e.to_string()))?;
        engine::start_hand(&mut state, Deck::new_with_seed(seed), now_ms)
            .map_err(|e| CliError::Engine(e.to_string()))?;
        Ok(state)
    }

    /// Records the stacks left behind by a completed hand so the next deal
    /// starts from them.
    pub fn settle(&mut self, state: &GameState) {
        for player in &state.players {
            if player.seat < self.stacks.len() {
                self.stacks[player.seat] = player.stack;
            }
        }
    }
}

impl Default for PracticeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a single action forward: validates and applies it, then runs
/// `advance_phase` for free whenever the betting round just closed but the
/// hand hasn't reached showdown yet. Mirrors the loop every engine caller
/// (the persistence harness, the practice-session manager) repeats around
/// `process_action`.
pub fn apply_action_and_advance(
    state: &mut GameState,
    player_id: u64,
    action: PlayerAction,
    now_ms: i64,
) -> Result<(), GameError> {
    engine::process_action(state, player_id, action, now_ms)?;
    while !state.is_hand_complete
        && state.current_player_index.is_none()
        && state.phase != holdem_engine::game::Phase::Showdown
    {
        engine::advance_phase(state, now_ms)?;
    }
    Ok(())
}

/// An opponent's decision source. Practice-mode commands only ever need one
/// implementation (chart + heuristic suggestions), but the trait keeps the
/// command code decoupled from `holdem_ai` the same way `holdem_web::ai`
/// keeps the web session loop decoupled from it.
pub trait AIOpponent: Send + Sync {
    fn name(&self) -> &str;
    fn decide(&self, state: &GameState, seat_index: usize) -> PlayerAction;
}

/// Wraps the stateless [`Suggester`] with a seeded RNG so its postflop
/// equity jitter stays deterministic across a whole CLI invocation.
pub struct SuggesterAI {
    name: String,
    suggester: Suggester,
    rng: Mutex<ChaCha20Rng>,
}

impl AIOpponent for SuggesterAI {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, state: &GameState, seat_index: usize) -> PlayerAction {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.suggester.suggest(state, seat_index, &mut *rng).action
    }
}

/// Builds a named AI opponent. The name is a label for reporting (so `eval`
/// can still tell "AI-A" from "AI-B" in its output); the decision strategy
/// itself is always the chart + heuristic suggester.
pub fn create_ai(name: &str, seed: u64) -> Box<dyn AIOpponent> {
    Box::new(SuggesterAI {
        name: name.to_string(),
        suggester: Suggester::new(),
        rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
    })
}
