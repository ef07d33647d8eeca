use serde::{Deserialize, Serialize};

use crate::deck::Deck;
use crate::errors::GameError;
use crate::logger::ActionRecord;
use crate::player::{HandPlayer, PlayerId, SeatedPlayer};
use crate::pot::Pot;

/// Phase of a single hand. Transitions strictly `Waiting -> Preflop -> Flop
/// -> Turn -> River -> Showdown`; the machine in `engine.rs` never skips or
/// reorders these.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

/// Records a completed award from a pot at the end of a hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub player_id: PlayerId,
    pub pot_index: usize,
    pub amount: u32,
    pub hand_description: Option<String>,
}

/// The full authoritative state of one hand in progress at one table.
///
/// This is the value that gets mapped to and from the `active_hands` row by
/// the persistence harness; nothing outside `engine.rs`/`rules.rs`/`pot.rs`
/// mutates it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub table_id: u64,
    pub hand_number: u64,
    pub phase: Phase,
    pub max_seats: usize,
    /// Ordered by seat index; only players dealt into this hand.
    pub players: Vec<HandPlayer>,
    pub dealer_index: Option<usize>,
    pub sb_index: Option<usize>,
    pub bb_index: Option<usize>,
    pub current_player_index: Option<usize>,
    #[serde(skip)]
    pub deck: Option<Deck>,
    pub deck_seed: Option<u64>,
    pub community_cards: Vec<crate::cards::Card>,
    pub small_blind: u32,
    pub big_blind: u32,
    pub current_bet: u32,
    pub last_raise_amount: u32,
    pub last_aggressor_id: Option<PlayerId>,
    pub last_raise_was_complete: bool,
    pub pots: Vec<Pot>,
    pub action_log: Vec<ActionRecord>,
    pub turn_started_at_ms: i64,
    pub turn_timeout_ms: u64,
    pub bb_has_acted: bool,
    pub is_hand_complete: bool,
    pub winners: Vec<WinnerRecord>,
    pub version: u64,
}

/// Finds the next seat clockwise from `from_seat` (exclusive) that is
/// present in `seats` with `stack > 0` and not sitting out. This is the
/// single canonical dealer-rotation rule: "next active seat clockwise from
/// the previous dealer, with stack > 0".
pub fn next_active_seat(
    seats: &[SeatedPlayer],
    from_seat: usize,
    max_seats: usize,
) -> Option<usize> {
    for step in 1..=max_seats {
        let candidate = (from_seat + step) % max_seats;
        if let Some(player) = seats.iter().find(|p| p.seat == candidate) {
            if player.stack > 0 && !player.sitting_out {
                return Some(candidate);
            }
        }
    }
    None
}

fn active_seats(seats: &[SeatedPlayer]) -> Vec<&SeatedPlayer> {
    seats
        .iter()
        .filter(|p| p.stack > 0 && !p.sitting_out)
        .collect()
}

impl GameState {
    /// `createGameState`: rotates the button, derives small/big blind seats,
    /// and snapshots every active seat into a fresh set of `HandPlayer`s for
    /// this hand. Fails with [`GameError::NotEnoughPlayers`] unless at least
    /// two players can act.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        table_id: u64,
        hand_number: u64,
        seats: &[SeatedPlayer],
        previous_dealer_seat: Option<usize>,
        small_blind: u32,
        big_blind: u32,
        turn_timeout_ms: u64,
        max_seats: usize,
    ) -> Result<GameState, GameError> {
        let active = active_seats(seats);
        if active.len() < 2 {
            return Err(GameError::NotEnoughPlayers {
                have: active.len(),
                need: 2,
            });
        }

        let dealer_seat = match previous_dealer_seat {
            Some(prev) => next_active_seat(seats, prev, max_seats)
                .ok_or(GameError::Internal("no active seat for dealer".into()))?,
            None => active[0].seat,
        };

        let mut hand_players: Vec<HandPlayer> = active
            .iter()
            .map(|seated| HandPlayer::from_seated(seated))
            .collect();
        hand_players.sort_by_key(|p| p.seat);

        let index_of_seat = |target: usize, players: &[HandPlayer]| -> Option<usize> {
            players.iter().position(|p| p.seat == target)
        };

        let dealer_index = index_of_seat(dealer_seat, &hand_players)
            .ok_or(GameError::Internal("dealer seat not dealt in".into()))?;

        let (sb_seat, bb_seat) = if active.len() == 2 {
            // heads-up: dealer posts small blind, the other player posts big blind
            let other = active
                .iter()
                .find(|p| p.seat != dealer_seat)
                .ok_or(GameError::Internal("missing heads-up opponent".into()))?;
            (dealer_seat, other.seat)
        } else {
            let sb = next_active_seat(seats, dealer_seat, max_seats)
                .ok_or(GameError::Internal("no seat for small blind".into()))?;
            let bb = next_active_seat(seats, sb, max_seats)
                .ok_or(GameError::Internal("no seat for big blind".into()))?;
            (sb, bb)
        };

        let sb_index = index_of_seat(sb_seat, &hand_players);
        let bb_index = index_of_seat(bb_seat, &hand_players);

        Ok(GameState {
            table_id,
            hand_number,
            phase: Phase::Waiting,
            max_seats,
            players: hand_players,
            dealer_index: Some(dealer_index),
            sb_index,
            bb_index,
            current_player_index: None,
            deck: None,
            deck_seed: None,
            community_cards: Vec::new(),
            small_blind,
            big_blind,
            current_bet: 0,
            last_raise_amount: 0,
            last_aggressor_id: None,
            last_raise_was_complete: true,
            pots: Vec::new(),
            action_log: Vec::new(),
            turn_started_at_ms: 0,
            turn_timeout_ms,
            bb_has_acted: false,
            is_hand_complete: false,
            winners: Vec::new(),
            version: 0,
        })
    }

    pub fn dealer_seat(&self) -> Option<usize> {
        self.dealer_index.map(|i| self.players[i].seat)
    }

    pub fn player_by_id(&self, id: PlayerId) -> Option<&HandPlayer> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn pot_total(&self) -> u32 {
        self.players.iter().map(|p| p.total_bet_this_hand).sum()
    }

    pub fn unfolded_count(&self) -> usize {
        self.players.iter().filter(|p| !p.folded).count()
    }
}
