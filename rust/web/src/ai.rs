//! AI opponent module for the web server.
//!
//! Wraps [`holdem_ai::Suggester`] (preflop charts + postflop heuristic)
//! behind a small trait so [`crate::session::GameSession`] can drive a
//! non-human seat without knowing anything about how the suggestion was
//! produced.

use std::sync::Mutex;

use holdem_ai::Suggester;
use holdem_engine::game::GameState;
use holdem_engine::player::PlayerAction;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Something that can choose an action for a seat it does not own.
pub trait AIOpponent: Send + Sync {
    /// Chooses the action for `seat_index`. Callers are expected to only
    /// invoke this when it's actually that seat's turn.
    fn decide(&self, state: &GameState, seat_index: usize) -> PlayerAction;

    fn name(&self) -> &str;
}

/// The only AI strategy currently offered: the chart/heuristic suggester,
/// seeded so the same session seed always plays the same way.
pub struct SuggesterAI {
    name: String,
    suggester: Suggester,
    rng: Mutex<ChaCha20Rng>,
}

impl SuggesterAI {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            suggester: Suggester::new(),
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }
}

impl AIOpponent for SuggesterAI {
    fn decide(&self, state: &GameState, seat_index: usize) -> PlayerAction {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.suggester.suggest(state, seat_index, &mut *rng).action
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Creates an AI opponent by name. Every strategy name currently resolves
/// to the same suggester; the name is kept distinct per session so hand
/// histories can tell strategies apart once more are added.
pub fn create_ai(name: &str, seed: u64) -> Box<dyn AIOpponent> {
    let label = if name.is_empty() { "baseline" } else { name };
    Box::new(SuggesterAI::new(label, seed))
}
