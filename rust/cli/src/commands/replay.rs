//! Replay command handler.
//!
//! This module implements hand history replay functionality, allowing users to
//! step through previously recorded poker hands from JSONL files.
//!
//! ## Features
//!
//! - Interactive hand-by-hand replay
//! - Speed control parameter (planned, not yet implemented)
//! - Detailed action tracking and pot state display
//! - Support for both regular and compressed (.zst) JSONL files
//!
//! ## Format
//!
//! Replays hands from JSONL files containing `HandRecord` structures with:
//! - Hand metadata (seed, level, button position)
//! - Action sequences with street information
//! - Final results and showdown details

use crate::error::CliError;
use crate::formatters::{format_action, format_board};
use crate::io_utils::read_text_auto;
use crate::parse_json_or_continue;
use crate::validation::validate_speed;
use crate::{HandRecord, blinds_for_level, ui};
use holdem_engine::logger::Street;
use std::io::Write;

/// Handle the replay command.
///
/// Loads and replays hands from a JSONL file, displaying each hand's actions
/// and allowing user to step through them interactively.
///
/// # Arguments
///
/// * `input` - Path to JSONL file containing hand histories
/// * `speed` - Optional playback speed multiplier (currently unused)
/// * `out` - Output stream for hand replay display
/// * `err` - Error stream for warnings and errors
///
/// # Returns
///
/// `Ok(())` on successful replay, `Err(CliError)` if file reading or parsing fails
pub fn handle_replay_command(
    input: String,
    speed: Option<f64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    // Validate speed parameter
    if let Err(msg) = validate_speed(speed) {
        ui::write_error(err, &msg)?;
        return Err(CliError::InvalidInput(msg));
    }

    // Note about speed parameter not yet implemented
    if let Some(s) = speed {
        writeln!(
            err,
            "Note: --speed parameter ({}) is not yet used. Interactive mode only.",
            s
        )?;
    }

    // Read input file
    let content = read_text_auto(&input).map_err(|e| {
        let msg = format!("Failed to read {}: {}", input, e);
        let _ = ui::write_error(err, &msg);
        e
    })?;

    // Parse lines
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let total_hands = lines.len();

    if total_hands == 0 {
        writeln!(out, "No hands found in file.")?;
        return Ok(());
    }

    // Replay each hand
    let mut hand_num = 0;
    let mut hands_shown = 0usize;

    for line in lines {
        hand_num += 1;

        // Parse hand record
        let record: HandRecord = parse_json_or_continue!(line, err, format!("hand {}", hand_num));
        hands_shown += 1;

        // Extract level from metadata
        let level = if let Some(meta) = &record.meta {
            if let Some(level_val) = meta.get("level") {
                level_val.as_u64().unwrap_or(1) as u8
            } else {
                1
            }
        } else {
            1
        };

        // Extract button position from metadata
        let button_position_raw = if let Some(meta) = &record.meta {
            if let Some(button_val) = meta.get("button_position") {
                button_val.as_u64().unwrap_or(0) as usize
            } else {
                0
            }
        } else {
            0
        };

        // Get blinds for level
        let (sb, bb) = match blinds_for_level(level) {
            Ok(amounts) => amounts,
            Err(e) => {
                ui::write_error(err, &format!("Invalid blind level {}: {}", level, e))?;
                (0, 0)
            }
        };

        // Display hand header
        writeln!(
            out,
            "Hand #{} (Seed: {}, Level: {})",
            hand_num,
            record
                .seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            level
        )?;
        writeln!(out, "═══════════════════════════════════════")?;
        writeln!(out, "Blinds: SB={} BB={}", sb, bb)?;
        writeln!(out, "Button: Player {}", button_position)?;
        writeln!(out)?;

        // Initialize stack and pot tracking, sized from the record's actual
        // seat count (not assumed to be heads-up).
        const STARTING_STACK: u32 = 20000;
        let player_count = record
            .actions
            .iter()
            .map(|a| a.player_id as usize)
            .chain(
                record
                    .showdown
                    .as_ref()
                    .map(|s| s.winners.iter().map(|&w| w as usize))
                    .into_iter()
                    .flatten(),
            )
            .max()
            .map(|m| m + 1)
            .unwrap_or(2)
            .max(2);
        let button_position = button_position_raw % player_count;
        let mut stacks = vec![STARTING_STACK; player_count];
        let mut pot: u32 = 0;

        // Track commit amount and current bet for each street
        let mut committed = vec![0u32; player_count];
        let mut current_street: Option<Street> = None;
        #[allow(unused_assignments)]
        let mut current_bet: u32 = 0;

        // Heads-up posts Button=SB, Opponent=BB; multiway posts the two
        // seats after the button.
        let other_player = (button_position + 1) % player_count;
        let (sb_seat, bb_seat) = if player_count == 2 {
            (button_position, other_player)
        } else {
            (other_player, (button_position + 2) % player_count)
        };
        committed[sb_seat] = sb;
        committed[bb_seat] = bb;
        stacks[sb_seat] = stacks[sb_seat].saturating_sub(sb);
        stacks[bb_seat] = stacks[bb_seat].saturating_sub(bb);
        pot = pot.saturating_add(sb).saturating_add(bb);
        current_bet = bb;

        // Process actions by street
        let streets_order = [Street::Preflop, Street::Flop, Street::Turn, Street::River];

        for street in &streets_order {
            let actions_for_street: Vec<&holdem_engine::logger::ActionRecord> = record
                .actions
                .iter()
                .filter(|a| a.street == *street)
                .collect();

            if !actions_for_street.is_empty() {
                // Reset commit and current bet when street changes
                if current_street != Some(*street) {
                    current_street = Some(*street);
                    committed = vec![0u32; player_count];
                    current_bet = 0;

                    // For preflop only, reflect blinds as commits
                    if *street == Street::Preflop {
                        committed[sb_seat] = sb;
                        committed[bb_seat] = bb;
                        current_bet = bb;
                    }
                }

                // Display street header
                match street {
                    Street::Preflop => {
                        writeln!(out, "Preflop:")?;
                        for seat in 0..player_count {
                            let label = if player_count == 2 && seat == button_position {
                                "[BTN/SB]"
                            } else if seat == button_position {
                                "[BTN]"
                            } else if seat == sb_seat {
                                "[SB]"
                            } else if seat == bb_seat {
                                "[BB]"
                            } else {
                                ""
                            };
                            writeln!(
                                out,
                                "  Player {} {}: ?? ??  (Stack: {})",
                                seat, label, stacks[seat]
                            )?;
                        }
                        writeln!(out)?;
                    }
                    Street::Flop => {
                        let flop_cards = if record.board.len() >= 3 {
                            &record.board[0..3]
                        } else {
                            &record.board[..]
                        };
                        writeln!(out, "Flop: {}", format_board(flop_cards))?;
                    }
                    Street::Turn => {
                        let turn_cards = if record.board.len() >= 4 {
                            &record.board[0..4]
                        } else {
                            &record.board[..]
                        };
                        writeln!(out, "Turn: {}", format_board(turn_cards))?;
                    }
                    Street::River => {
                        let river_cards = &record.board[..];
                        writeln!(out, "River: {}", format_board(river_cards))?;
                    }
                }

                // Process actions
                for action_rec in &actions_for_street {
                    let player_id = action_rec.player_id as usize;
                    let action = &action_rec.action;

                    let mut delta: u32 = 0;

                    match action {
                        holdem_engine::player::PlayerAction::Bet(amount) => {
                            // Bet is treated as 'total commit for this street'
                            let target = *amount;
                            if target > committed[player_id] {
                                delta = target - committed[player_id];
                                committed[player_id] = target;
                                current_bet = current_bet.max(target);
                            }
                        }
                        holdem_engine::player::PlayerAction::Raise(amount) => {
                            // Raise is treated as increment to current bet
                            let target = current_bet.saturating_add(*amount);
                            if target > committed[player_id] {
                                delta = target - committed[player_id];
                                committed[player_id] = target;
                                current_bet = target;
                            }
                        }
                        holdem_engine::player::PlayerAction::Call => {
                            // Call commits difference from current bet
                            if current_bet > committed[player_id] {
                                let needed = current_bet - committed[player_id];
                                delta = needed.min(stacks[player_id]);
                                committed[player_id] = committed[player_id].saturating_add(delta);
                            }
                        }
                        holdem_engine::player::PlayerAction::AllIn => {
                            // AllIn puts in all remaining stack
                            delta = stacks[player_id];
                            committed[player_id] = committed[player_id].saturating_add(delta);
                            current_bet = current_bet.max(committed[player_id]);
                        }
                        holdem_engine::player::PlayerAction::Check
                        | holdem_engine::player::PlayerAction::Fold => {
                            // Check and Fold have no chip movement
                        }
                    }

                    if delta > 0 {
                        stacks[player_id] = stacks[player_id].saturating_sub(delta);
                        pot = pot.saturating_add(delta);
                    }

                    writeln!(out, "  Player {}: {}", player_id, format_action(action))?;
                    writeln!(out, "  Pot: {}", pot)?;
                }
                writeln!(out)?;
            }
        }

        // Display showdown or result
        if let Some(showdown) = &record.showdown {
            writeln!(out, "Showdown:")?;
            for winner in &showdown.winners {
                writeln!(out, "  Player {} wins {} chips", winner, pot)?;
            }
            if let Some(notes) = &showdown.notes {
                writeln!(out, "  Notes: {}", notes)?;
            }
            writeln!(out)?;
        } else if let Some(result_str) = &record.result {
            writeln!(out, "Result:")?;
            writeln!(out, "  {} wins {} chips", result_str, pot)?;
            writeln!(out)?;
        }

        // Interactive continuation prompt
        if hand_num < total_hands {
            writeln!(out, "Press Enter for next hand (or 'q' to quit)...")?;
            let mut user_input = String::new();
            if std::io::stdin().read_line(&mut user_input).is_ok() {
                let trimmed = user_input.trim().to_lowercase();
                if trimmed == "q" || trimmed == "quit" {
                    writeln!(out, "Replay stopped at hand {}/{}", hand_num, total_hands)?;
                    return Ok(());
                }
            }
        }
    }

    writeln!(out, "Replay complete. {} hands shown.", hands_shown)?;
    Ok(())
}
