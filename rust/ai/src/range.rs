//! Preflop range syntax: direct hands (`AKs`, `TT`), `+`-extensions
//! (`66+`, `A2s+`) and bounded `-`-ranges (`AA-22`, `AKs-A2s`).

use std::collections::HashSet;

use holdem_engine::cards::{Card, Rank};

const RANK_ORDER: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

fn rank_index(r: Rank) -> usize {
    RANK_ORDER.iter().position(|&x| x == r).expect("exhaustive rank table")
}

fn rank_from_char(c: char) -> Option<Rank> {
    match c.to_ascii_uppercase() {
        '2' => Some(Rank::Two),
        '3' => Some(Rank::Three),
        '4' => Some(Rank::Four),
        '5' => Some(Rank::Five),
        '6' => Some(Rank::Six),
        '7' => Some(Rank::Seven),
        '8' => Some(Rank::Eight),
        '9' => Some(Rank::Nine),
        'T' => Some(Rank::Ten),
        'J' => Some(Rank::Jack),
        'Q' => Some(Rank::Queen),
        'K' => Some(Rank::King),
        'A' => Some(Rank::Ace),
        _ => None,
    }
}

fn rank_to_char(r: Rank) -> char {
    match r {
        Rank::Two => '2',
        Rank::Three => '3',
        Rank::Four => '4',
        Rank::Five => '5',
        Rank::Six => '6',
        Rank::Seven => '7',
        Rank::Eight => '8',
        Rank::Nine => '9',
        Rank::Ten => 'T',
        Rank::Jack => 'J',
        Rank::Queen => 'Q',
        Rank::King => 'K',
        Rank::Ace => 'A',
    }
}

/// A concrete starting-hand shape: a pocket pair, or a suited/offsuit
/// combination of two distinct ranks (`high >= low`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandShape {
    pub high: Rank,
    pub low: Rank,
    /// `None` for pairs.
    pub suited: Option<bool>,
}

impl HandShape {
    pub fn from_hole(cards: [Card; 2]) -> HandShape {
        let (a, b) = (cards[0], cards[1]);
        let (high, low) = if a.rank >= b.rank { (a, b) } else { (b, a) };
        if high.rank == low.rank {
            HandShape { high: high.rank, low: low.rank, suited: None }
        } else {
            HandShape { high: high.rank, low: low.rank, suited: Some(high.suit == low.suit) }
        }
    }

    pub fn notation(&self) -> String {
        match self.suited {
            None => format!("{}{}", rank_to_char(self.high), rank_to_char(self.high)),
            Some(true) => format!("{}{}s", rank_to_char(self.high), rank_to_char(self.low)),
            Some(false) => format!("{}{}o", rank_to_char(self.high), rank_to_char(self.low)),
        }
    }

    fn parse_one(token: &str) -> Option<HandShape> {
        let chars: Vec<char> = token.chars().collect();
        match chars.len() {
            2 => {
                let r = rank_from_char(chars[0])?;
                let r2 = rank_from_char(chars[1])?;
                if r != r2 {
                    return None;
                }
                Some(HandShape { high: r, low: r2, suited: None })
            }
            3 => {
                let a = rank_from_char(chars[0])?;
                let b = rank_from_char(chars[1])?;
                let suited = match chars[2].to_ascii_lowercase() {
                    's' => true,
                    'o' => false,
                    _ => return None,
                };
                if a == b {
                    return None;
                }
                let (high, low) = if a >= b { (a, b) } else { (b, a) };
                Some(HandShape { high, low, suited: Some(suited) })
            }
            _ => None,
        }
    }
}

/// A parsed preflop range: a concrete set of hand shapes.
#[derive(Debug, Clone, Default)]
pub struct Range {
    shapes: HashSet<HandShape>,
}

impl Range {
    pub fn parse(spec: &str) -> Range {
        let mut shapes = HashSet::new();
        for raw in spec.split(',') {
            let token = raw.trim();
            if token.is_empty() {
                continue;
            }
            Self::expand_token(token, &mut shapes);
        }
        Range { shapes }
    }

    pub fn contains(&self, shape: &HandShape) -> bool {
        self.shapes.contains(shape)
    }

    fn expand_token(token: &str, out: &mut HashSet<HandShape>) {
        if let Some((lo_str, hi_str)) = token.split_once('-') {
            if let (Some(top), Some(bottom)) =
                (HandShape::parse_one(hi_str.trim()), HandShape::parse_one(lo_str.trim()))
            {
                Self::expand_bounded(top, bottom, out);
            }
            return;
        }
        if let Some(stripped) = token.strip_suffix('+') {
            if let Some(base) = HandShape::parse_one(stripped) {
                Self::expand_plus(base, out);
            }
            return;
        }
        if let Some(shape) = HandShape::parse_one(token) {
            out.insert(shape);
        }
    }

    /// `66+`, `A2s+`: every hand at least as strong as `base`, up to the nuts
    /// of that shape (pairs climb to `AA`; suited/offsuit combos climb the
    /// kicker toward, but excluding, the pair itself).
    fn expand_plus(base: HandShape, out: &mut HashSet<HandShape>) {
        if base.suited.is_none() {
            for idx in rank_index(base.high)..RANK_ORDER.len() {
                let r = RANK_ORDER[idx];
                out.insert(HandShape { high: r, low: r, suited: None });
            }
        } else {
            let high_idx = rank_index(base.high);
            for idx in rank_index(base.low)..high_idx {
                out.insert(HandShape { high: base.high, low: RANK_ORDER[idx], suited: base.suited });
            }
        }
    }

    /// `AA-22`, `AKs-A2s`: every hand between the two bounds, inclusive.
    fn expand_bounded(top: HandShape, bottom: HandShape, out: &mut HashSet<HandShape>) {
        if top.suited.is_none() && bottom.suited.is_none() {
            let lo = rank_index(top.high).min(rank_index(bottom.high));
            let hi = rank_index(top.high).max(rank_index(bottom.high));
            for idx in lo..=hi {
                let r = RANK_ORDER[idx];
                out.insert(HandShape { high: r, low: r, suited: None });
            }
            return;
        }
        if top.high == bottom.high && top.suited == bottom.suited {
            let high_idx = rank_index(top.high);
            let lo = rank_index(top.low).min(rank_index(bottom.low));
            let hi = rank_index(top.low).max(rank_index(bottom.low)).min(high_idx.saturating_sub(1));
            for idx in lo..=hi {
                out.insert(HandShape { high: top.high, low: RANK_ORDER[idx], suited: top.suited });
            }
        }
    }
}
