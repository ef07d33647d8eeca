//! # holdem-ai: preflop chart + postflop heuristic suggester
//!
//! A pure, stateless AI opponent/co-pilot: `suggest(state, playerIndex)`
//! reads only the public [`GameState`] plus that seat's own hole cards and
//! returns a [`Suggestion`] that is always legal under the current betting
//! rules. Preflop decisions come from position-indexed range charts
//! ([`charts`]); postflop decisions compose board texture, draw outs, and an
//! equity proxy ([`board`], [`postflop`], [`strength`]).
//!
//! Jitter in the equity proxy is injected through an explicit RNG so callers
//! can pin it for deterministic tests; production callers should seed one
//! per request from the hand id.

pub mod board;
pub mod charts;
pub mod postflop;
pub mod range;
pub mod strength;

use rand::Rng;

use holdem_engine::cards::Card;
use holdem_engine::game::{GameState, Phase};
use holdem_engine::logger::Street;
use holdem_engine::player::PlayerAction;
use holdem_engine::rules::{self, ValidActions};

use board::analyze_board;
use board::analyze_draws;
use charts::{decide_preflop, position_for, table_format_for, Charts, PreflopContext};
use postflop::{decide_postflop, decide_river, equity_proxy, PostflopContext};
use range::HandShape;
use strength::hand_strength;

/// A suggested action, confidence in `[0, 1]`, and a short human-readable
/// rationale. `action` is guaranteed legal given the current `GameState`.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub action: PlayerAction,
    pub confidence: f64,
    pub rationale: String,
}

/// Holds the preflop chart set so it isn't rebuilt on every call.
pub struct Suggester {
    charts: Charts,
}

impl Default for Suggester {
    fn default() -> Self {
        Suggester { charts: Charts::standard() }
    }
}

impl Suggester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure suggestion for `state.players[player_index]`.
    pub fn suggest(&self, state: &GameState, player_index: usize, rng: &mut impl Rng) -> Suggestion {
        let Some(player) = state.players.get(player_index) else {
            return Suggestion { action: PlayerAction::Fold, confidence: 0.0, rationale: "unknown seat".to_string() };
        };
        let (Some(a), Some(b)) = (player.hole[0], player.hole[1]) else {
            return Suggestion { action: PlayerAction::Fold, confidence: 0.0, rationale: "hole cards unavailable".to_string() };
        };

        let va = match rules::valid_actions(state) {
            Ok(va) if state.current_player_index == Some(player_index) => va,
            _ => return Suggestion { action: PlayerAction::Fold, confidence: 0.0, rationale: "not this seat's turn".to_string() },
        };

        let raw = if state.phase == Phase::Preflop {
            self.suggest_preflop(state, player_index, [a, b])
        } else {
            self.suggest_postflop(state, player_index, [a, b], rng)
        };

        Suggestion { action: ensure_legal(raw.action, &va), confidence: raw.confidence, rationale: raw.rationale }
    }

    fn suggest_preflop(&self, state: &GameState, player_index: usize, hole: [Card; 2]) -> Suggestion {
        let len = state.players.len();
        let dealer_index = state.dealer_index.unwrap_or(0);
        let distance = (player_index + len - dealer_index) % len;
        let format = table_format_for(len);
        let position = position_for(distance, len);
        let shape = HandShape::from_hole(hole);

        let limper_count = state
            .action_log
            .iter()
            .filter(|a| a.street == Street::Preflop && a.action == PlayerAction::Call)
            .count() as u32;
        let facing_raise = state.current_bet > state.big_blind;
        let is_first_in = !facing_raise && limper_count == 0;

        let player = &state.players[player_index];
        let max_total = player.current_bet + player.stack;
        let min_raise_total = if state.current_bet > 0 {
            Some(state.current_bet + state.last_raise_amount.max(state.big_blind))
        } else {
            None
        };
        let min_bet_total = if state.current_bet == 0 { Some(state.big_blind.min(max_total)) } else { None };

        let ctx = PreflopContext {
            format,
            position,
            shape,
            is_first_in,
            limper_count,
            facing_raise,
            current_bet: state.current_bet,
            big_blind: state.big_blind,
            min_raise_total,
            min_bet_total,
            max_total,
        };
        let decision = decide_preflop(&self.charts, &ctx);
        Suggestion { action: decision.action, confidence: decision.confidence, rationale: decision.rationale }
    }

    fn suggest_postflop(&self, state: &GameState, player_index: usize, hole: [Card; 2], rng: &mut impl Rng) -> Suggestion {
        let player = &state.players[player_index];
        let board = &state.community_cards;
        let mut all_cards = hole.to_vec();
        all_cards.extend_from_slice(board);
        let strength = hand_strength(&all_cards);

        let board_analysis = analyze_board(board);
        let draws = analyze_draws(hole, board);

        let street = phase_to_street(state.phase).unwrap_or(Street::River);
        let to_call = state.current_bet.saturating_sub(player.current_bet);
        let max_total = player.current_bet + player.stack;
        let min_raise_total = if state.current_bet > 0 {
            let min = state.current_bet + state.last_raise_amount.max(state.big_blind);
            if max_total > min { Some((min, max_total)) } else { None }
        } else {
            None
        };
        let min_bet_total =
            if state.current_bet == 0 && player.stack > 0 { Some((state.big_blind.min(max_total), max_total)) } else { None };

        let preflop_aggressor = state
            .action_log
            .iter()
            .rev()
            .find(|a| a.street == Street::Preflop && matches!(a.action, PlayerAction::Raise(_) | PlayerAction::Bet(_) | PlayerAction::AllIn))
            .map(|a| a.player_id);

        let ctx = PostflopContext {
            street,
            hand_strength: strength,
            outs: draws.outs,
            pot: state.pot_total(),
            to_call,
            player_stack: player.stack,
            is_preflop_aggressor: preflop_aggressor == Some(player.id),
            board_texture: board_analysis.texture,
            min_bet_total,
            min_raise_total,
            can_check: to_call == 0,
            current_bet: state.current_bet,
        };

        let decision = if state.phase == Phase::River {
            decide_river(&ctx, strength, rng)
        } else {
            let equity = equity_proxy(&ctx, rng);
            decide_postflop(&ctx, equity, draws.outs, rng)
        };
        Suggestion { action: decision.action, confidence: decision.confidence, rationale: decision.rationale }
    }
}

fn phase_to_street(phase: Phase) -> Option<Street> {
    match phase {
        Phase::Preflop => Some(Street::Preflop),
        Phase::Flop => Some(Street::Flop),
        Phase::Turn => Some(Street::Turn),
        Phase::River => Some(Street::River),
        _ => None,
    }
}

/// Converts a heuristic's chosen action into one guaranteed legal under
/// `va`: bet-when-closed becomes raise (and vice versa), amounts clamp into
/// bounds, and anything still impossible degrades to call/check/fold.
fn ensure_legal(action: PlayerAction, va: &ValidActions) -> PlayerAction {
    match action {
        PlayerAction::Fold => PlayerAction::Fold,
        PlayerAction::Check => {
            if va.can_check {
                PlayerAction::Check
            } else if va.can_call.is_some() {
                PlayerAction::Call
            } else {
                PlayerAction::Fold
            }
        }
        PlayerAction::Call => {
            if va.can_call.is_some() {
                PlayerAction::Call
            } else if va.can_check {
                PlayerAction::Check
            } else {
                PlayerAction::Fold
            }
        }
        PlayerAction::Bet(amount) => {
            if let Some((min, max)) = va.can_bet {
                PlayerAction::Bet(amount.clamp(min, max))
            } else if let Some((min, max)) = va.can_raise {
                PlayerAction::Raise(amount.clamp(min, max))
            } else if va.can_call.is_some() {
                PlayerAction::Call
            } else if va.can_check {
                PlayerAction::Check
            } else {
                PlayerAction::Fold
            }
        }
        PlayerAction::Raise(amount) => {
            if let Some((min, max)) = va.can_raise {
                PlayerAction::Raise(amount.clamp(min, max))
            } else if let Some((min, max)) = va.can_bet {
                PlayerAction::Bet(amount.clamp(min, max))
            } else if va.can_call.is_some() {
                PlayerAction::Call
            } else if va.can_check {
                PlayerAction::Check
            } else {
                PlayerAction::Fold
            }
        }
        PlayerAction::AllIn => {
            if va.can_all_in {
                PlayerAction::AllIn
            } else if va.can_check {
                PlayerAction::Check
            } else {
                PlayerAction::Fold
            }
        }
    }
}
