use crate::cards::Card;
use serde::{Deserialize, Serialize};

/// Identifies a player across seats, hands and tables.
pub type PlayerId = u64;

/// Represents a player action during a betting round.
/// Actions can involve betting amounts or no-cost moves like check/fold.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Check (no bet, only valid if no bet to call)
    Check,
    /// Call the current bet
    Call,
    /// Make a bet of specified amount (total, not on top of anything)
    Bet(u32),
    /// Raise the current bet to the specified total
    Raise(u32),
    /// Bet all remaining chips
    AllIn,
}

/// Default starting stack size for players created without an explicit buy-in.
pub const STARTING_STACK: u32 = 20_000;

/// A player seated at a table, independent of any particular hand in progress.
///
/// Owned by the table row; a [`HandPlayer`] is a per-hand snapshot of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatedPlayer {
    pub player_id: PlayerId,
    pub seat: usize,
    pub stack: u32,
    pub sitting_out: bool,
}

impl SeatedPlayer {
    pub fn new(player_id: PlayerId, seat: usize, stack: u32) -> Self {
        Self {
            player_id,
            seat,
            stack,
            sitting_out: false,
        }
    }
}

/// Per-hand projection of a [`SeatedPlayer`].
///
/// Invariants maintained by the hand state machine, not by this type itself:
/// `all_in ⇒ stack == 0`; `current_bet ≤ total_bet_this_hand`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandPlayer {
    pub id: PlayerId,
    pub seat: usize,
    pub stack: u32,
    pub hole: [Option<Card>; 2],
    pub current_bet: u32,
    pub total_bet_this_hand: u32,
    pub folded: bool,
    pub all_in: bool,
    pub sitting_out: bool,
    pub has_acted: bool,
}

impl HandPlayer {
    pub fn from_seated(seated: &SeatedPlayer) -> Self {
        Self {
            id: seated.player_id,
            seat: seated.seat,
            stack: seated.stack,
            hole: [None, None],
            current_bet: 0,
            total_bet_this_hand: 0,
            folded: false,
            all_in: false,
            sitting_out: seated.sitting_out,
            has_acted: false,
        }
    }

    /// Eligible to be dealt in and to act this hand.
    pub fn is_active_for_hand(&self) -> bool {
        !self.sitting_out && self.stack > 0
    }

    /// Can still take a betting action this round.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in && !self.sitting_out
    }

    pub fn give_card(&mut self, card: Card) -> Result<(), String> {
        if self.hole[0].is_none() {
            self.hole[0] = Some(card);
            Ok(())
        } else if self.hole[1].is_none() {
            self.hole[1] = Some(card);
            Ok(())
        } else {
            Err("hole cards already full".to_string())
        }
    }

    pub fn clear_cards(&mut self) {
        self.hole = [None, None];
    }

    /// Moves `amount` from stack into the current betting round, capping at
    /// the player's stack and flagging all-in when the stack hits zero.
    /// Returns the amount actually committed.
    pub fn commit(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.stack);
        self.stack -= actual;
        self.current_bet += actual;
        self.total_bet_this_hand += actual;
        if self.stack == 0 {
            self.all_in = true;
        }
        actual
    }

    pub fn reset_for_new_round(&mut self) {
        self.current_bet = 0;
        if !self.folded && !self.all_in {
            self.has_acted = false;
        }
    }
}
