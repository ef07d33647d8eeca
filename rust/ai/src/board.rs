//! Postflop board and draw analysis: texture classification and outs
//! counting, feeding the equity proxy in [`crate::postflop`].

use std::collections::HashMap;

use holdem_engine::cards::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Texture {
    Dry,
    Wet,
}

#[derive(Debug, Clone)]
pub struct BoardAnalysis {
    pub paired: bool,
    pub monotone: bool,
    pub two_tone: bool,
    pub rainbow: bool,
    pub straight_possible: bool,
    pub connectedness: f64,
    pub texture: Texture,
}

/// Classifies the board only (no hole cards): paired/monotone/two-tone,
/// 3-or-4-to-a-straight, and an average-gap connectedness score.
pub fn analyze_board(board: &[Card]) -> BoardAnalysis {
    let mut suit_counts: HashMap<_, u32> = HashMap::new();
    for c in board {
        *suit_counts.entry(c.suit).or_insert(0) += 1;
    }
    let max_suit = suit_counts.values().copied().max().unwrap_or(0);
    let monotone = board.len() >= 3 && max_suit as usize == board.len();
    let two_tone = max_suit == 2;
    let rainbow = suit_counts.len() == board.len();

    let mut ranks: Vec<u8> = board.iter().map(|c| c.rank as u8).collect();
    ranks.sort_unstable();
    let unique_len = {
        let mut dedup = ranks.clone();
        dedup.dedup();
        dedup.len()
    };
    let paired = unique_len < ranks.len();
    ranks.dedup();

    let connectedness = if ranks.len() >= 2 {
        let gaps: Vec<f64> = ranks.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
        gaps.iter().sum::<f64>() / gaps.len() as f64
    } else {
        99.0
    };

    let straight_possible = ranks.len() >= 3 && ranks.windows(3).any(|w| w[2] - w[0] <= 4);

    let texture = if paired || monotone || straight_possible || connectedness <= 2.0 {
        Texture::Wet
    } else {
        Texture::Dry
    };

    BoardAnalysis { paired, monotone, two_tone, rainbow, straight_possible, connectedness, texture }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DrawAnalysis {
    pub flush_draw: bool,
    pub open_ended: bool,
    pub gutshot: bool,
    pub backdoor_flush: bool,
    pub backdoor_straight: bool,
    pub outs: u32,
}

/// Combines a player's two hole cards with the board to find flush/straight
/// draws and their (de-duplicated) out count.
pub fn analyze_draws(hole: [Card; 2], board: &[Card]) -> DrawAnalysis {
    let mut all: Vec<Card> = hole.to_vec();
    all.extend_from_slice(board);

    let mut suit_counts: HashMap<_, u32> = HashMap::new();
    for c in &all {
        *suit_counts.entry(c.suit).or_insert(0) += 1;
    }
    let max_suit = suit_counts.values().copied().max().unwrap_or(0);
    let flush_draw = max_suit == 4;
    let backdoor_flush = max_suit == 3 && board.len() == 3;

    let mut ranks: Vec<u8> = all.iter().map(|c| c.rank as u8).collect();
    if ranks.contains(&14) {
        ranks.push(1); // wheel-straight ace-low
    }
    ranks.sort_unstable();
    ranks.dedup();

    let mut open_ended = false;
    let mut gutshot = false;
    for window_start in 1u8..=10 {
        let window: Vec<u8> = (window_start..window_start + 5).collect();
        let present = window.iter().filter(|r| ranks.contains(r)).count();
        if present == 4 {
            if let Some(&missing) = window.iter().find(|r| !ranks.contains(r)) {
                if missing == window[0] || missing == window[4] {
                    open_ended = true;
                } else {
                    gutshot = true;
                }
            }
        }
    }

    let backdoor_straight = board.len() == 3 && {
        let mut found = false;
        for i in 0..ranks.len() {
            for j in (i + 1)..ranks.len() {
                for k in (j + 1)..ranks.len() {
                    if ranks[k] - ranks[i] <= 4 {
                        found = true;
                    }
                }
            }
        }
        found && !open_ended && !gutshot
    };

    let mut outs = 0u32;
    if flush_draw {
        outs += 9;
    }
    if open_ended {
        outs += 8;
    } else if gutshot {
        outs += 4;
    }
    // Overlap de-duplication: a handful of straight outs also complete the
    // flush, so don't double-count them when both draws are live.
    if flush_draw && open_ended {
        outs = outs.saturating_sub(2);
    } else if flush_draw && gutshot {
        outs = outs.saturating_sub(1);
    }

    DrawAnalysis { flush_draw, open_ended, gutshot, backdoor_flush, backdoor_straight, outs }
}
