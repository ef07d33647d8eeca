//! Hand state machine: `startHand` / `processAction` / `advancePhase` /
//! `endHand` / `applyTimeout`. Pure transitions over [`GameState`] — no I/O,
//! no wall-clock reads. Callers (the persistence harness, the CLI) supply
//! `now_ms` and own the `Deck`'s construction so the engine stays testable
//! and replayable from a fixed seed.

use std::collections::HashMap;

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{GameState, Phase, WinnerRecord};
use crate::hand::{compare_hands, evaluate_hand};
use crate::logger::{ActionRecord, Street};
use crate::player::{PlayerAction, PlayerId};
use crate::pot;
use crate::rules::{self, ValidatedAction};

const TIMEOUT_GRACE_MS: i64 = 500;

fn phase_to_street(phase: Phase) -> Option<Street> {
    match phase {
        Phase::Preflop => Some(Street::Preflop),
        Phase::Flop => Some(Street::Flop),
        Phase::Turn => Some(Street::Turn),
        Phase::River => Some(Street::River),
        _ => None,
    }
}

/// `startHand`: attaches a freshly shuffled deck, posts blinds, deals two
/// hole cards to every dealt-in player starting left of the dealer, and
/// sets up the first preflop action.
pub fn start_hand(state: &mut GameState, mut deck: Deck, now_ms: i64) -> Result<(), GameError> {
    if state.phase != Phase::Waiting {
        return Err(GameError::IllegalPhase { phase: state.phase });
    }
    deck.shuffle();
    state.deck_seed = Some(deck.seed());

    let sb_index = state
        .sb_index
        .ok_or(GameError::Internal("missing small blind seat".into()))?;
    let bb_index = state
        .bb_index
        .ok_or(GameError::Internal("missing big blind seat".into()))?;

    let len = state.players.len();
    let deal_order: Vec<usize> = (0..len).map(|k| (sb_index + k) % len).collect();
    for _ in 0..2 {
        for &idx in &deal_order {
            let card = deck.deal_card().ok_or(GameError::DeckExhausted)?;
            state.players[idx]
                .give_card(card)
                .map_err(GameError::Internal)?;
        }
    }

    let sb_amount = state.players[sb_index].commit(state.small_blind);
    let bb_amount = state.players[bb_index].commit(state.big_blind);
    let _ = (sb_amount, bb_amount);

    state.current_bet = state.big_blind;
    state.last_raise_amount = state.big_blind;
    state.last_aggressor_id = Some(state.players[bb_index].id);
    state.last_raise_was_complete = true;
    state.bb_has_acted = false;
    state.phase = Phase::Preflop;
    state.deck = Some(deck);
    state.current_player_index = rules::first_to_act(state);
    state.turn_started_at_ms = now_ms;
    Ok(())
}

/// `processAction`: validates, applies, logs, and either ends the hand,
/// advances the street, or hands the turn to the next active seat.
pub fn process_action(
    state: &mut GameState,
    player_id: PlayerId,
    action: PlayerAction,
    now_ms: i64,
) -> Result<(), GameError> {
    process_action_inner(state, player_id, action, now_ms, false)
}

/// `claimTimeout`: accepted only once `turnTimeoutMs` plus a grace period has
/// elapsed, applying the policy action (check if free, else fold) for the
/// player on the clock.
pub fn apply_timeout(state: &mut GameState, now_ms: i64) -> Result<(), GameError> {
    if state.is_hand_complete {
        return Err(GameError::HandAlreadyComplete);
    }
    let idx = state
        .current_player_index
        .ok_or(GameError::NoHandInProgress)?;
    let elapsed = now_ms - state.turn_started_at_ms;
    if elapsed < state.turn_timeout_ms as i64 + TIMEOUT_GRACE_MS {
        return Err(GameError::IllegalAction(
            "too early to claim timeout".into(),
        ));
    }
    let player_id = state.players[idx].id;
    let to_call = state.current_bet.saturating_sub(state.players[idx].current_bet);
    let action = if to_call == 0 {
        PlayerAction::Check
    } else {
        PlayerAction::Fold
    };
    process_action_inner(state, player_id, action, now_ms, true)
}

fn process_action_inner(
    state: &mut GameState,
    player_id: PlayerId,
    action: PlayerAction,
    now_ms: i64,
    is_timeout: bool,
) -> Result<(), GameError> {
    if state.is_hand_complete {
        return Err(GameError::HandAlreadyComplete);
    }
    let validated = rules::validate_action(state, player_id, action)?;
    let idx = state
        .index_of(player_id)
        .ok_or(GameError::UnknownPlayer(player_id))?;
    let prev_current_bet = state.current_bet;

    match validated {
        ValidatedAction::Fold => {
            state.players[idx].folded = true;
        }
        ValidatedAction::Check => {}
        ValidatedAction::Call(amount) => {
            state.players[idx].commit(amount);
        }
        ValidatedAction::Bet(total) => {
            let add = total.saturating_sub(state.players[idx].current_bet);
            state.players[idx].commit(add);
            state.current_bet = state.players[idx].current_bet;
            state.last_raise_amount = state.players[idx].current_bet;
            state.last_aggressor_id = Some(player_id);
            state.last_raise_was_complete = true;
        }
        ValidatedAction::Raise(total) => {
            let add = total.saturating_sub(state.players[idx].current_bet);
            state.players[idx].commit(add);
            state.last_raise_amount = state.players[idx].current_bet - prev_current_bet;
            state.current_bet = state.players[idx].current_bet;
            state.last_aggressor_id = Some(player_id);
            state.last_raise_was_complete = true;
        }
        ValidatedAction::AllIn(amount) => {
            state.players[idx].commit(amount);
            if state.players[idx].current_bet > state.current_bet {
                let raise_size = state.players[idx].current_bet - state.current_bet;
                state.current_bet = state.players[idx].current_bet;
                if raise_size >= state.last_raise_amount.max(state.big_blind) {
                    state.last_raise_amount = raise_size;
                    state.last_aggressor_id = Some(player_id);
                    state.last_raise_was_complete = true;
                } else {
                    state.last_raise_was_complete = false;
                }
            }
        }
    }

    state.players[idx].has_acted = true;
    if state.phase == Phase::Preflop && Some(idx) == state.bb_index {
        state.bb_has_acted = true;
    }

    if let Some(street) = phase_to_street(state.phase) {
        state.action_log.push(ActionRecord {
            player_id: state.players[idx].id,
            street,
            action,
            is_timeout,
        });
    }

    if state.unfolded_count() <= 1 {
        return end_hand(state);
    }
    if rules::is_round_complete(state) {
        advance_phase(state, now_ms)
    } else {
        state.current_player_index = rules::next_to_act(state, idx);
        state.turn_started_at_ms = now_ms;
        Ok(())
    }
}

fn deal_community(state: &mut GameState) -> Result<(), GameError> {
    let deck = state
        .deck
        .as_mut()
        .ok_or(GameError::Internal("no deck attached to hand".into()))?;
    let mut deal_n = |n: usize, community: &mut Vec<Card>| -> Result<(), GameError> {
        deck.burn_card();
        for _ in 0..n {
            community.push(deck.deal_card().ok_or(GameError::DeckExhausted)?);
        }
        Ok(())
    };
    match state.phase {
        Phase::Preflop => {
            deal_n(3, &mut state.community_cards)?;
            state.phase = Phase::Flop;
        }
        Phase::Flop => {
            deal_n(1, &mut state.community_cards)?;
            state.phase = Phase::Turn;
        }
        Phase::Turn => {
            deal_n(1, &mut state.community_cards)?;
            state.phase = Phase::River;
        }
        _ => return Err(GameError::Internal("no street left to deal".into())),
    }
    Ok(())
}

/// `advancePhase`: refunds any uncalled excess, sweeps pots, deals the next
/// street's burn + community cards, and either hands off to the next actor
/// or — when at most one player can still act — runs the board out straight
/// through to showdown.
pub fn advance_phase(state: &mut GameState, now_ms: i64) -> Result<(), GameError> {
    pot::refund_uncalled_bet(&mut state.players);
    state.pots = pot::calculate_pots(&state.players);
    state.current_bet = 0;
    state.last_raise_amount = 0;
    state.last_aggressor_id = None;
    state.last_raise_was_complete = true;
    state.bb_has_acted = false;
    for p in &mut state.players {
        p.reset_for_new_round();
    }

    if state.phase == Phase::River {
        state.phase = Phase::Showdown;
        return end_hand(state);
    }

    deal_community(state)?;

    let can_act_count = state.players.iter().filter(|p| p.can_act()).count();
    if can_act_count <= 1 {
        return advance_phase(state, now_ms);
    }

    state.current_player_index = rules::first_to_act(state);
    state.turn_started_at_ms = now_ms;
    Ok(())
}

/// `endHand`: distributes every pot to its winner(s) — uncontested if only
/// one player remains, otherwise by 7-card showdown comparison — and marks
/// the hand complete.
pub fn end_hand(state: &mut GameState) -> Result<(), GameError> {
    state.is_hand_complete = true;
    pot::refund_uncalled_bet(&mut state.players);
    state.pots = pot::calculate_pots(&state.players);
    state.winners.clear();

    if state.unfolded_count() == 1 {
        let winner_idx = state
            .players
            .iter()
            .position(|p| !p.folded)
            .ok_or(GameError::Internal("no unfolded player at hand end".into()))?;
        let winner_id = state.players[winner_idx].id;
        for (i, pot) in state.pots.clone().iter().enumerate() {
            state.players[winner_idx].stack += pot.amount;
            state.winners.push(WinnerRecord {
                player_id: winner_id,
                pot_index: i,
                amount: pot.amount,
                hand_description: None,
            });
        }
        state.phase = Phase::Showdown;
        return Ok(());
    }

    let mut strengths = HashMap::new();
    for player in state.players.iter().filter(|p| !p.folded) {
        let hole_a = player
            .hole[0]
            .ok_or(GameError::Internal("missing hole card at showdown".into()))?;
        let hole_b = player
            .hole[1]
            .ok_or(GameError::Internal("missing hole card at showdown".into()))?;
        if state.community_cards.len() != 5 {
            return Err(GameError::Internal(
                "showdown reached without a full board".into(),
            ));
        }
        let mut seven = [hole_a, hole_b, hole_a, hole_a, hole_a, hole_a, hole_a];
        seven[2..7].copy_from_slice(&state.community_cards[0..5]);
        strengths.insert(player.id, evaluate_hand(&seven));
    }

    let dealer_seat = state.dealer_seat().unwrap_or(0);
    let max_seats = state.max_seats;
    let pots = state.pots.clone();
    for (i, this_pot) in pots.iter().enumerate() {
        let eligible: Vec<PlayerId> = this_pot.eligible_player_ids.iter().copied().collect();
        if eligible.is_empty() {
            continue;
        }
        let best = eligible
            .iter()
            .filter_map(|id| strengths.get(id))
            .max_by(|a, b| compare_hands(a, b))
            .cloned();
        let Some(best) = best else { continue };
        let winner_ids: Vec<PlayerId> = eligible
            .iter()
            .filter(|id| {
                strengths
                    .get(id)
                    .map(|s| compare_hands(s, &best) == std::cmp::Ordering::Equal)
                    .unwrap_or(false)
            })
            .copied()
            .collect();
        let seat_of = |id: PlayerId| {
            state
                .players
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.seat)
                .unwrap_or(0)
        };
        let payouts = pot::distribute(this_pot, &winner_ids, dealer_seat, seat_of, max_seats);
        for (pid, amount) in payouts {
            if let Some(player) = state.players.iter_mut().find(|p| p.id == pid) {
                player.stack += amount;
            }
            state.winners.push(WinnerRecord {
                player_id: pid,
                pot_index: i,
                amount,
                hand_description: strengths.get(&pid).map(|s| s.description()),
            });
        }
    }
    state.phase = Phase::Showdown;
    Ok(())
}
