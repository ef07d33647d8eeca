use crate::errors::GameError;
use crate::game::{GameState, Phase};
use crate::player::PlayerAction;

/// Legal actions for the current player, computed fresh from [`GameState`]
/// before every decision point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidActions {
    pub can_fold: bool,
    pub can_check: bool,
    /// `Some(amount)` when a call is available and non-zero.
    pub can_call: Option<u32>,
    /// `Some((min, max))` total-bet bounds when betting into a closed pot is legal.
    pub can_bet: Option<(u32, u32)>,
    /// `Some((min, max))` total-bet bounds when raising an open pot is legal.
    pub can_raise: Option<(u32, u32)>,
    pub can_all_in: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    Call(u32),
    /// Total amount the player's bet will sit at after this action.
    Bet(u32),
    /// Total amount the player's bet will sit at after this action.
    Raise(u32),
    AllIn(u32),
}

fn current_player_index(state: &GameState) -> Result<usize, GameError> {
    state.current_player_index.ok_or(GameError::NoHandInProgress)
}

/// Returns the legal-action envelope for whoever `state.current_player_index`
/// names. Encodes the under-raise lock: a player whose last aggressive act
/// was a full raise may not re-raise after only an incomplete all-in
/// intervened against them.
pub fn valid_actions(state: &GameState) -> Result<ValidActions, GameError> {
    let idx = current_player_index(state)?;
    let player = &state.players[idx];
    if !player.can_act() {
        return Err(GameError::IllegalAction(
            "current player cannot act".into(),
        ));
    }

    let to_call = state.current_bet.saturating_sub(player.current_bet);
    let can_check = to_call == 0;
    let can_call = if to_call > 0 {
        Some(to_call.min(player.stack))
    } else {
        None
    };

    let under_raise_locked = !state.last_raise_was_complete
        && state.last_aggressor_id == Some(player.id);

    let min_raise_total = state.current_bet + state.last_raise_amount.max(state.big_blind);
    let max_total = player.current_bet + player.stack;

    let can_bet = if state.current_bet == 0 && player.stack > 0 {
        Some((state.big_blind.min(max_total), max_total))
    } else {
        None
    };

    let can_raise = if state.current_bet > 0 && !under_raise_locked && max_total > min_raise_total
    {
        Some((min_raise_total, max_total))
    } else {
        None
    };

    Ok(ValidActions {
        can_fold: true,
        can_check,
        can_call,
        can_bet,
        can_raise,
        can_all_in: player.stack > 0,
    })
}

/// Resolves a requested [`PlayerAction`] into a [`ValidatedAction`] given the
/// current legal-action envelope, converting undersized bets/raises into
/// all-ins the way the action table in the hand state machine expects.
pub fn validate_action(
    state: &GameState,
    player_id: crate::player::PlayerId,
    action: PlayerAction,
) -> Result<ValidatedAction, GameError> {
    let idx = current_player_index(state)?;
    let player = &state.players[idx];
    if player.id != player_id {
        return Err(GameError::NotPlayersTurn {
            expected: idx,
            actual: state.index_of(player_id).unwrap_or(usize::MAX),
        });
    }
    if !matches!(
        state.phase,
        Phase::Preflop | Phase::Flop | Phase::Turn | Phase::River
    ) {
        return Err(GameError::IllegalPhase {
            phase: state.phase,
        });
    }

    let va = valid_actions(state)?;
    let max_total = player.current_bet + player.stack;

    match action {
        PlayerAction::Fold => Ok(ValidatedAction::Fold),
        PlayerAction::Check => {
            if va.can_check {
                Ok(ValidatedAction::Check)
            } else {
                Err(GameError::IllegalAction("cannot check facing a bet".into()))
            }
        }
        PlayerAction::Call => match va.can_call {
            Some(amount) if amount >= player.stack => Ok(ValidatedAction::AllIn(player.stack)),
            Some(amount) => Ok(ValidatedAction::Call(amount)),
            None if va.can_check => Ok(ValidatedAction::Check),
            None => Err(GameError::IllegalAction("nothing to call".into())),
        },
        PlayerAction::Bet(total) => {
            let (min, max) = va.can_bet.ok_or(GameError::IllegalAction(
                "betting is not open".into(),
            ))?;
            if total >= max_total {
                Ok(ValidatedAction::AllIn(player.stack))
            } else if total < min {
                Err(GameError::InvalidBetAmount {
                    amount: total,
                    minimum: min,
                })
            } else {
                Ok(ValidatedAction::Bet(total))
            }
        }
        PlayerAction::Raise(total) => {
            let (min, max) = va.can_raise.ok_or(GameError::IllegalAction(
                "raising is not legal right now".into(),
            ))?;
            if total >= max {
                Ok(ValidatedAction::AllIn(player.stack))
            } else if total < min {
                Err(GameError::InvalidBetAmount {
                    amount: total,
                    minimum: min,
                })
            } else {
                Ok(ValidatedAction::Raise(total))
            }
        }
        PlayerAction::AllIn => {
            if !va.can_all_in {
                Err(GameError::InsufficientChips)
            } else {
                Ok(ValidatedAction::AllIn(player.stack))
            }
        }
    }
}

fn next_active_index_from(state: &GameState, from: usize) -> Option<usize> {
    let len = state.players.len();
    if len == 0 {
        return None;
    }
    for step in 1..=len {
        let candidate = (from + step) % len;
        if state.players[candidate].can_act() {
            return Some(candidate);
        }
    }
    None
}

/// Seat to act first in the given phase.
pub fn first_to_act(state: &GameState) -> Option<usize> {
    match state.phase {
        Phase::Preflop => {
            if state.players.len() == 2 {
                state.dealer_index.filter(|&i| state.players[i].can_act())
                    .or_else(|| state.dealer_index.and_then(|i| next_active_index_from(state, i)))
            } else {
                state.bb_index.and_then(|bb| next_active_index_from(state, bb))
            }
        }
        _ => {
            if state.players.len() == 2 {
                state.bb_index.filter(|&i| state.players[i].can_act())
                    .or_else(|| state.bb_index.and_then(|i| next_active_index_from(state, i)))
            } else {
                state.dealer_index.and_then(|d| next_active_index_from(state, d))
            }
        }
    }
}

/// Next seat to act after `current`, skipping folded/all-in/sitting-out seats.
pub fn next_to_act(state: &GameState, current: usize) -> Option<usize> {
    next_active_index_from(state, current)
}

/// Whether the current betting round is over: at most one player can still
/// act, or every player who can act has matched `state.current_bet` and has
/// already acted this round — with the preflop big-blind option honored.
pub fn is_round_complete(state: &GameState) -> bool {
    if state.unfolded_count() <= 1 {
        return true;
    }
    let can_still_act: Vec<_> = state.players.iter().filter(|p| p.can_act()).collect();
    if can_still_act.is_empty() {
        return true;
    }
    let all_matched_and_acted = can_still_act
        .iter()
        .all(|p| p.current_bet == state.current_bet && p.has_acted);
    if !all_matched_and_acted {
        return false;
    }
    if state.phase == Phase::Preflop && state.current_bet == state.big_blind && !state.bb_has_acted
    {
        return false;
    }
    true
}
