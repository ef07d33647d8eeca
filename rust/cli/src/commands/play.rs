//! # Play Command
//!
//! Interactive poker gameplay against AI or human opponents.
//!
//! This module provides the `handle_play_command` function for playing poker hands
//! in the Holdem CLI. It supports two modes:
//!
//! - **Human vs AI**: Interactive gameplay where the human player enters actions via stdin
//! - **AI vs AI**: Automated gameplay where both players use AI decision-making
//!
//! ## Features
//!
//! - Interactive input validation with clear error messages
//! - Level progression (blinds increase every 15 hands)
//! - Graceful quit handling (user can exit with 'q' or 'quit')
//! - Real-time game state display (pot, actions, board)
//! - Integration with the chart + heuristic AI for opponent moves

use crate::cli::Vs;
use crate::engine_adapter::{self, AIOpponent, PracticeTable};
use crate::error::CliError;
use crate::formatters::format_action;
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{ParseResult, parse_player_action};
use holdem_engine::game::GameState;
use std::io::{BufRead, Write};

/// Hands between blind-level increases.
const HANDS_PER_LEVEL: u32 = 15;

/// Handle the play command: interactive poker gameplay
///
/// # Arguments
///
/// * `vs` - Opponent type (AI or Human)
/// * `hands` - Number of hands to play (must be >= 1, default: 1)
/// * `seed` - RNG seed for reproducibility (default: random)
/// * `level` - Blind level (1-20, default: 1)
/// * `out` - Output stream for game display
/// * `err` - Error stream for warnings and errors
/// * `stdin` - Input stream for player actions
///
/// # Returns
///
/// * `Ok(())` on successful completion
/// * `Err(CliError)` if hands < 1, engine initialization fails, or I/O errors occur
///
/// # Examples
///
/// ```ignore
/// use holdem_cli::commands::handle_play_command;
/// use holdem_cli::Vs;
/// use std::io::{stdin, stdout, stderr};
///
/// let mut out = stdout();
/// let mut err = stderr();
/// let mut input = stdin().lock();
///
/// handle_play_command(Vs::Ai, Some(1), None, None, &mut out, &mut err, &mut input).unwrap();
/// ```
pub fn handle_play_command(
    vs: Vs,
    hands: Option<u32>,
    seed: Option<u64>,
    level: Option<u8>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let hands = hands.unwrap_or(1);
    let level = level.unwrap_or(1).clamp(1, 20);

    execute_play_command(vs, hands, seed, level, stdin, out, err)
}

/// Execute the play command with specified parameters (module-private helper)
///
/// This is the core implementation that handles game loop, player interaction,
/// and AI opponent moves.
fn execute_play_command(
    vs: Vs,
    hands: u32,
    seed: Option<u64>,
    level: u8,
    stdin: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if hands == 0 {
        ui::write_error(err, "hands must be >= 1")?;
        return Err(CliError::InvalidInput("hands must be >= 1".to_string()));
    }

    let seed = seed.unwrap_or_else(rand::random);
    let level = level.clamp(1, 20);

    writeln!(
        out,
        "play: vs={} hands={} seed={}",
        vs.as_str(),
        hands,
        seed
    )?;
    writeln!(out, "Level: {}", level)?;

    let human_player_id = 0u64;
    const HUMAN_SEAT: usize = 0;
    let ai: Box<dyn AIOpponent> = engine_adapter::create_ai("baseline", seed);

    let mut table = PracticeTable::new();
    let mut played = 0u32;
    let mut quit_requested = false;
    let mut button_seat = 0usize;

    for i in 1..=hands {
        if quit_requested {
            break;
        }

        // level progression: +1 every 15 hands
        let cur_level: u8 = level
            .saturating_add(((i - 1) / HANDS_PER_LEVEL) as u8)
            .clamp(1, 20);
        if i > 1 {
            writeln!(out, "Level: {}", cur_level)?;
        }
        let (sb, bb) = engine_adapter::blinds_for_level(cur_level)?;
        writeln!(out, "Blinds: SB={} BB={}", sb, bb)?;
        writeln!(out, "Hand {}", i)?;

        let mut state =
            table.deal_next_hand(cur_level, button_seat, seed.wrapping_add(i as u64), 0)?;
        button_seat = 1 - button_seat;

        match vs {
            Vs::Human => {
                loop {
                    let current_player = match state.current_player_index {
                        Some(idx) => idx,
                        None => break,
                    };

                    if current_player == HUMAN_SEAT {
                        write!(out, "Enter action (check/call/bet/raise/fold/q): ")?;
                        out.flush()?;

                        match read_stdin_line(stdin) {
                            Some(input) => match parse_player_action(&input) {
                                ParseResult::Action(action) => {
                                    match apply_action(
                                        &mut state,
                                        human_player_id,
                                        action.clone(),
                                    ) {
                                        Ok(()) => {
                                            let action_str = format_action(&action);
                                            writeln!(out, "Action: {}", action_str)?;
                                            writeln!(out, "Pot: {}", state.pot_total())?;
                                            if state.is_hand_complete {
                                                writeln!(out, "Hand complete.")?;
                                                break;
                                            }
                                        }
                                        Err(e) => {
                                            ui::write_error(
                                                err,
                                                &format!("Invalid action: {}", e),
                                            )?;
                                        }
                                    }
                                }
                                ParseResult::Quit => {
                                    quit_requested = true;
                                    break;
                                }
                                ParseResult::Invalid(msg) => {
                                    ui::write_error(err, &msg)?;
                                }
                            },
                            None => {
                                quit_requested = true;
                                break;
                            }
                        }
                    } else {
                        let ai_action = ai.decide(&state, current_player);
                        let ai_id = state.players[current_player].id;
                        match apply_action(&mut state, ai_id, ai_action) {
                            Ok(()) => {
                                writeln!(out, "AI: {}", format_action(&ai_action))?;
                                writeln!(out, "Pot: {}", state.pot_total())?;
                                if state.is_hand_complete {
                                    writeln!(out, "Hand complete.")?;
                                    break;
                                }
                            }
                            Err(e) => {
                                ui::write_error(err, &format!("AI action failed: {}", e))?;
                                break;
                            }
                        }
                    }
                }
            }
            Vs::Ai => {
                play_hand_with_two_ais(&mut state, ai.as_ref(), ai.as_ref())?;
                writeln!(out, "{}", ui::tag_demo_output("ai: check"))?;
            }
        }

        table.settle(&state);
        played += 1;
    }

    writeln!(out, "Session hands={}", hands)?;
    writeln!(out, "Hands played: {} (completed)", played)?;
    Ok(())
}

fn apply_action(
    state: &mut GameState,
    player_id: u64,
    action: holdem_engine::player::PlayerAction,
) -> Result<(), CliError> {
    engine_adapter::apply_action_and_advance(state, player_id, action, 0)
        .map_err(|e| CliError::Engine(e.to_string()))
}

/// Play a hand with two AI players (module-private helper)
///
/// Used for AI vs AI mode where both players make automated decisions.
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
        apply_action(state, id, action)?;
        if state.is_hand_complete {
            break;
        }
    }
    Ok(())
}
