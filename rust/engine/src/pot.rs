use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::player::{HandPlayer, PlayerId};

/// A single pot (main pot or a side pot), built by sweeping contribution
/// levels from [`calculate_pots`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: u32,
    pub eligible_player_ids: BTreeSet<PlayerId>,
}

/// Before any pot is swept, refunds the excess of the single highest
/// `total_bet_this_hand` over the second highest back to that player.
///
/// Returns `Some((player_id, amount))` when a refund was applied, matching
/// the uncalled-bet scenario: nobody called the extra chips, so they were
/// never really "bet" against anyone.
pub fn refund_uncalled_bet(players: &mut [HandPlayer]) -> Option<(PlayerId, u32)> {
    let mut totals: Vec<u32> = players
        .iter()
        .filter(|p| p.total_bet_this_hand > 0)
        .map(|p| p.total_bet_this_hand)
        .collect();
    if totals.len() < 2 {
        // A single contributor with no second bettor still gets their
        // entire uncalled amount back (nobody to award it to otherwise).
        if totals.len() == 1 {
            if let Some(p) = players.iter_mut().find(|p| p.total_bet_this_hand > 0) {
                let refund = p.total_bet_this_hand;
                p.stack += refund;
                p.total_bet_this_hand = 0;
                p.current_bet = p.current_bet.saturating_sub(refund);
                return Some((p.id, refund));
            }
        }
        return None;
    }
    totals.sort_unstable_by(|a, b| b.cmp(a));
    let highest = totals[0];
    let second = totals[1];
    if highest <= second {
        return None;
    }
    let excess = highest - second;
    let top = players
        .iter_mut()
        .filter(|p| p.total_bet_this_hand == highest)
        .max_by_key(|p| p.seat)?;
    top.stack += excess;
    top.total_bet_this_hand -= excess;
    top.current_bet = top.current_bet.saturating_sub(excess);
    Some((top.id, excess))
}

/// Sweeps every distinct `total_bet_this_hand` level in ascending order,
/// building one pot per level increment and merging consecutive pots that
/// end up with identical eligibility.
pub fn calculate_pots(players: &[HandPlayer]) -> Vec<Pot> {
    let mut levels: Vec<u32> = players
        .iter()
        .map(|p| p.total_bet_this_hand)
        .filter(|&v| v > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots: Vec<Pot> = Vec::new();
    let mut previous_level = 0u32;
    for &level in &levels {
        let delta = level - previous_level;
        let contributors_at_or_above: Vec<&HandPlayer> = players
            .iter()
            .filter(|p| p.total_bet_this_hand >= level)
            .collect();
        let amount = delta * contributors_at_or_above.len() as u32;
        let eligible: BTreeSet<PlayerId> = contributors_at_or_above
            .iter()
            .filter(|p| !p.folded)
            .map(|p| p.id)
            .collect();
        previous_level = level;

        if amount == 0 {
            continue;
        }

        match pots.last_mut() {
            Some(last) if last.eligible_player_ids == eligible => {
                last.amount += amount;
            }
            _ => pots.push(Pot {
                amount,
                eligible_player_ids: eligible,
            }),
        }
    }
    pots
}

/// Splits `pot.amount` evenly among `winner_ids`, awarding any odd-chip
/// remainder one at a time starting from the winner seated first clockwise
/// of the dealer.
///
/// `seat_of` must map every id in `winner_ids` to its seat index, and
/// `max_seats` is the table size used to compute clockwise distance.
pub fn distribute(
    pot: &Pot,
    winner_ids: &[PlayerId],
    dealer_seat: usize,
    seat_of: impl Fn(PlayerId) -> usize,
    max_seats: usize,
) -> Vec<(PlayerId, u32)> {
    if winner_ids.is_empty() {
        return Vec::new();
    }
    let share = pot.amount / winner_ids.len() as u32;
    let mut remainder = pot.amount % winner_ids.len() as u32;

    let mut ordered: Vec<PlayerId> = winner_ids.to_vec();
    ordered.sort_by_key(|&id| {
        let seat = seat_of(id);
        (seat + max_seats - dealer_seat - 1) % max_seats
    });

    let mut payouts: Vec<(PlayerId, u32)> = ordered.iter().map(|&id| (id, share)).collect();
    let mut i = 0;
    while remainder > 0 && !payouts.is_empty() {
        payouts[i % payouts.len()].1 += 1;
        remainder -= 1;
        i += 1;
    }
    payouts
}
