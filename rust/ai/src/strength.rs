//! Made-hand classification for incomplete boards (flop/turn), where the
//! engine's 7-card [`holdem_engine::hand::evaluate_hand`] doesn't apply yet.
//! This is a coarser category-only classifier — it does not rank kickers
//! precisely, it only feeds the equity proxy's `handStrength` term.

use std::collections::HashMap;

use holdem_engine::cards::{Card, Suit};
use holdem_engine::hand::Category;

use crate::postflop::category_strength;

fn unique_ranks_with_wheel(ranks: &[u8]) -> Vec<u8> {
    let mut out = ranks.to_vec();
    if out.contains(&14) {
        out.push(1);
    }
    out.sort_unstable();
    out.dedup();
    out
}

fn has_straight(ranks: &[u8]) -> bool {
    let ranks = unique_ranks_with_wheel(ranks);
    ranks.len() >= 5 && ranks.windows(5).any(|w| w[4] - w[0] == 4)
}

/// Classifies the best hand category available from 5, 6, or 7 cards
/// (two hole cards plus whatever community cards have been dealt).
pub fn made_hand_category(cards: &[Card]) -> Category {
    let mut rank_counts: HashMap<u8, u8> = HashMap::new();
    let mut suit_counts: HashMap<Suit, u8> = HashMap::new();
    for c in cards {
        *rank_counts.entry(c.rank as u8).or_insert(0) += 1;
        *suit_counts.entry(c.suit).or_insert(0) += 1;
    }

    let flush_suit = suit_counts.iter().find(|&(_, &n)| n >= 5).map(|(&s, _)| s);
    let straight_flush = flush_suit
        .map(|fs| {
            let suited_ranks: Vec<u8> = cards.iter().filter(|c| c.suit == fs).map(|c| c.rank as u8).collect();
            has_straight(&suited_ranks)
        })
        .unwrap_or(false);

    let all_ranks: Vec<u8> = cards.iter().map(|c| c.rank as u8).collect();
    let mut counts: Vec<u8> = rank_counts.values().copied().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    if straight_flush {
        return Category::StraightFlush;
    }
    if counts.first() == Some(&4) {
        return Category::FourOfAKind;
    }
    if counts.first().copied().unwrap_or(0) >= 3 && counts.get(1).copied().unwrap_or(0) >= 2 {
        return Category::FullHouse;
    }
    if flush_suit.is_some() {
        return Category::Flush;
    }
    if has_straight(&all_ranks) {
        return Category::Straight;
    }
    if counts.first() == Some(&3) {
        return Category::ThreeOfAKind;
    }
    if counts.first() == Some(&2) && counts.get(1) == Some(&2) {
        return Category::TwoPair;
    }
    if counts.first() == Some(&2) {
        return Category::OnePair;
    }
    Category::HighCard
}

/// `handStrength` on the `0..1` scale: the category floor, nudged upward by
/// the highest rank involved so e.g. top pair beats bottom pair.
pub fn hand_strength(cards: &[Card]) -> f64 {
    let category = made_hand_category(cards);
    let top_rank = cards.iter().map(|c| c.rank as u8).max().unwrap_or(2);
    let nudge = (top_rank as f64 - 2.0) / 12.0 * 0.05;
    (category_strength(category) + nudge).min(1.0)
}
