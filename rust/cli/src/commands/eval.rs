//! AI policy evaluation command.
//!
//! This module provides functionality to evaluate AI policies head-to-head across multiple hands,
//! comparing their performance metrics including win rates, chip deltas, and action distributions.

use crate::engine_adapter::{self, AIOpponent, PracticeTable};
use crate::error::CliError;
use holdem_engine::game::GameState;
use holdem_engine::logger::ActionRecord;
use std::io::Write;

/// Statistics tracked for AI evaluation comparison
#[derive(Debug, Clone)]
struct EvalStats {
    hands_played: u32,
    wins: u32,
    losses: u32,
    ties: u32,
    total_chips_won: i64,
    total_pot_size: u64,
    folds: u32,
    checks: u32,
    calls: u32,
    bets: u32,
    raises: u32,
    all_ins: u32,
}

impl EvalStats {
    fn new() -> Self {
        Self {
            hands_played: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            total_chips_won: 0,
            total_pot_size: 0,
            folds: 0,
            checks: 0,
            calls: 0,
            bets: 0,
            raises: 0,
            all_ins: 0,
        }
    }

    fn update_from_actions(&mut self, actions: &[ActionRecord], player_id: u64) {
        for action in actions {
            if action.player_id == player_id {
                use holdem_engine::player::PlayerAction;
                match action.action {
                    PlayerAction::Fold => self.folds += 1,
                    PlayerAction::Check => self.checks += 1,
                    PlayerAction::Call => self.calls += 1,
                    PlayerAction::Bet(_) => self.bets += 1,
                    PlayerAction::Raise(_) => self.raises += 1,
                    PlayerAction::AllIn => self.all_ins += 1,
                }
            }
        }
    }

    fn update_result(&mut self, won: bool, tied: bool, chip_delta: i64, pot: u32) {
        self.hands_played += 1;
        if tied {
            self.ties += 1;
        } else if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.total_chips_won += chip_delta;
        self.total_pot_size += pot as u64;
    }

    fn win_rate(&self) -> f64 {
        if self.hands_played == 0 {
            0.0
        } else {
            (self.wins as f64 / self.hands_played as f64) * 100.0
        }
    }

    fn avg_chip_delta(&self) -> f64 {
        if self.hands_played == 0 {
            0.0
        } else {
            self.total_chips_won as f64 / self.hands_played as f64
        }
    }

    fn avg_pot_size(&self) -> f64 {
        if self.hands_played == 0 {
            0.0
        } else {
            self.total_pot_size as f64 / self.hands_played as f64
        }
    }

    fn action_percentage(&self, count: u32) -> f64 {
        let total_actions =
            self.folds + self.checks + self.calls + self.bets + self.raises + self.all_ins;
        if total_actions == 0 {
            0.0
        } else {
            (count as f64 / total_actions as f64) * 100.0
        }
    }
}

/// Evaluates two AI policies head-to-head across multiple hands.
///
/// # Arguments
///
/// * `ai_a` - First AI policy identifier
/// * `ai_b` - Second AI policy identifier
/// * `hands` - Number of hands to play
/// * `seed` - Optional seed for reproducibility
/// * `out` - Output stream for evaluation results
///
/// # Returns
///
/// `Result<(), CliError>`: `Ok(())` when evaluation completes successfully.
pub fn handle_eval_command(
    ai_a: &str,
    ai_b: &str,
    hands: u32,
    seed: Option<u64>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let base_seed = seed.unwrap_or_else(rand::random);
    let ai_policy_a = engine_adapter::create_ai(ai_a, base_seed ^ 0x9E37_79B9);
    let ai_policy_b = engine_adapter::create_ai(ai_b, base_seed ^ 0x85EB_CA6B);

    let mut stats_a = EvalStats::new();
    let mut stats_b = EvalStats::new();

    for hand_num in 0..hands {
        let hand_seed = base_seed.wrapping_add(hand_num as u64);

        let mut table = PracticeTable::new();
        let mut state = table.deal_next_hand(1, 0, hand_seed, 0)?;
        let initial_stacks = [state.players[0].stack, state.players[1].stack];

        // Assign AIs to seats (alternate button for fairness)
        let (ai_0, ai_1, ai_a_seat) = if hand_num % 2 == 0 {
            (ai_policy_a.as_ref(), ai_policy_b.as_ref(), 0usize)
        } else {
            (ai_policy_b.as_ref(), ai_policy_a.as_ref(), 1usize)
        };

        play_hand_with_two_ais(&mut state, ai_0, ai_1)?;

        let (winner_ids, tied) = winners_of(&state);

        let final_stacks = [state.players[0].stack, state.players[1].stack];
        let delta_0 = final_stacks[0] as i64 - initial_stacks[0] as i64;
        let delta_1 = final_stacks[1] as i64 - initial_stacks[1] as i64;

        let (ai_a_won, ai_a_delta) = if ai_a_seat == 0 {
            (winner_ids.contains(&0), delta_0)
        } else {
            (winner_ids.contains(&1), delta_1)
        };
        let ai_b_won = !tied && !ai_a_won;
        let ai_b_delta = -ai_a_delta;

        let ai_a_id = state.players[ai_a_seat].id;
        let ai_b_id = state.players[1 - ai_a_seat].id;
        stats_a.update_from_actions(&state.action_log, ai_a_id);
        stats_b.update_from_actions(&state.action_log, ai_b_id);

        let pot = state.pots.iter().map(|p| p.amount).sum::<u32>();
        stats_a.update_result(ai_a_won, tied, ai_a_delta, pot);
        stats_b.update_result(ai_b_won, tied, ai_b_delta, pot);
    }

    print_eval_results(out, ai_a, ai_b, &stats_a, &stats_b, hands, base_seed)?;

    Ok(())
}

/// Determines the winning seat(s) of a completed hand from its `winners`
/// ledger, mapping player id back to seat index.
fn winners_of(state: &GameState) -> (Vec<usize>, bool) {
    let mut seats: Vec<usize> = state
        .winners
        .iter()
        .filter_map(|w| state.players.iter().find(|p| p.id == w.player_id).map(|p| p.seat))
        .collect();
    seats.sort_unstable();
    seats.dedup();
    let tied = seats.len() > 1;
    (seats, tied)
}

/// Plays a hand to completion with two AI opponents, one per seat.
fn play_hand_with_two_ais(
    state: &mut GameState,
    ai_0: &dyn AIOpponent,
    ai_1: &dyn AIOpponent,
) -> Result<(), CliError> {
    while let Some(current) = state.current_player_index {
        let action = if current == 0 {
            ai_0.decide(state, current)
        } else {
            ai_1.decide(state, current)
        };
        let id = state.players[current].id;
        engine_adapter::apply_action_and_advance(state, id, action, 0)
            .map_err(|e| CliError::Engine(e.to_string()))?;
        if state.is_hand_complete {
            break;
        }
    }
    Ok(())
}

/// Print evaluation results comparing two AIs
fn print_eval_results(
    out: &mut dyn Write,
    ai_a_name: &str,
    ai_b_name: &str,
    stats_a: &EvalStats,
    stats_b: &EvalStats,
    hands: u32,
    seed: u64,
) -> std::io::Result<()> {
    writeln!(out, "\nAI Comparison Results")?;
    writeln!(out, "═══════════════════════════════════════")?;
    writeln!(out, "Hands played: {}", hands)?;
    writeln!(out, "Seed: {}", seed)?;
    writeln!(out)?;

    writeln!(out, "AI-A ({}):", ai_a_name)?;
    writeln!(out, "  Wins: {} ({:.1}%)", stats_a.wins, stats_a.win_rate())?;
    writeln!(
        out,
        "  Losses: {} ({:.1}%)",
        stats_a.losses,
        (stats_a.losses as f64 / hands.max(1) as f64) * 100.0
    )?;
    writeln!(
        out,
        "  Ties: {} ({:.1}%)",
        stats_a.ties,
        (stats_a.ties as f64 / hands.max(1) as f64) * 100.0
    )?;
    writeln!(out, "  Avg chip delta: {:.1}", stats_a.avg_chip_delta())?;
    writeln!(out, "  Avg pot: {:.1}", stats_a.avg_pot_size())?;
    writeln!(
        out,
        "  Actions: Fold {:.1}% | Check {:.1}% | Call {:.1}% | Bet {:.1}% | Raise {:.1}% | All-in {:.1}%",
        stats_a.action_percentage(stats_a.folds),
        stats_a.action_percentage(stats_a.checks),
        stats_a.action_percentage(stats_a.calls),
        stats_a.action_percentage(stats_a.bets),
        stats_a.action_percentage(stats_a.raises),
        stats_a.action_percentage(stats_a.all_ins),
    )?;
    writeln!(out)?;

    writeln!(out, "AI-B ({}):", ai_b_name)?;
    writeln!(out, "  Wins: {} ({:.1}%)", stats_b.wins, stats_b.win_rate())?;
    writeln!(
        out,
        "  Losses: {} ({:.1}%)",
        stats_b.losses,
        (stats_b.losses as f64 / hands.max(1) as f64) * 100.0
    )?;
    writeln!(
        out,
        "  Ties: {} ({:.1}%)",
        stats_b.ties,
        (stats_b.ties as f64 / hands.max(1) as f64) * 100.0
    )?;
    writeln!(out, "  Avg chip delta: {:.1}", stats_b.avg_chip_delta())?;
    writeln!(out, "  Avg pot: {:.1}", stats_b.avg_pot_size())?;
    writeln!(
        out,
        "  Actions: Fold {:.1}% | Check {:.1}% | Call {:.1}% | Bet {:.1}% | Raise {:.1}% | All-in {:.1}%",
        stats_b.action_percentage(stats_b.folds),
        stats_b.action_percentage(stats_b.checks),
        stats_b.action_percentage(stats_b.calls),
        stats_b.action_percentage(stats_b.bets),
        stats_b.action_percentage(stats_b.raises),
        stats_b.action_percentage(stats_b.all_ins),
    )?;

    Ok(())
}
