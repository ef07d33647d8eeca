//! Position-specific preflop open/vs-limp/vs-raise charts, indexed by table
//! format (headsUp, 6max, 9max) and seat (UTG, MP, CO, BTN, SB, BB).

use std::collections::HashMap;

use holdem_engine::player::PlayerAction;

use crate::range::{HandShape, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    HeadsUp,
    SixMax,
    NineMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Utg,
    Mp,
    Co,
    Btn,
    Sb,
    Bb,
}

/// Buckets the number of players dealt into the hand into a chart format.
pub fn table_format_for(active_players: usize) -> TableFormat {
    match active_players {
        0..=2 => TableFormat::HeadsUp,
        3..=6 => TableFormat::SixMax,
        _ => TableFormat::NineMax,
    }
}

/// Maps clockwise seat distance from the dealer button to a chart position.
/// Heads-up collapses to SB(=button)/BB; 3+-handed tables fix BTN/SB/BB/CO
/// and bucket everything else into UTG (first half of the remaining seats)
/// or MP (second half).
pub fn position_for(distance_from_dealer: usize, active_players: usize) -> Position {
    if active_players <= 2 {
        return if distance_from_dealer == 0 { Position::Sb } else { Position::Bb };
    }
    match distance_from_dealer {
        0 => Position::Btn,
        1 => Position::Sb,
        2 => Position::Bb,
        d if d == active_players - 1 => Position::Co,
        d => {
            let midpoint = active_players / 2;
            if d <= midpoint { Position::Utg } else { Position::Mp }
        }
    }
}

/// One position's preflop behavior.
pub struct ChartEntry {
    /// Range to open-raise with when first in.
    pub open: Range,
    /// Range to raise with vs limpers ("premium" bucket: `(3+limpers)xBB`).
    pub vs_limp_raise: Range,
    /// Range to raise with vs limpers ("strong" bucket, smaller sizing).
    pub vs_limp_call: Range,
    /// Range to 3-bet with facing an open.
    pub three_bet: Range,
    /// Range to flat-call with facing an open.
    pub call_vs_raise: Range,
    pub open_raise_size_bb: f64,
    pub three_bet_size_mult: f64,
}

fn entry(open: &str, vs_limp_raise: &str, vs_limp_call: &str, three_bet: &str, call_vs_raise: &str, open_bb: f64, threebet_mult: f64) -> ChartEntry {
    ChartEntry {
        open: Range::parse(open),
        vs_limp_raise: Range::parse(vs_limp_raise),
        vs_limp_call: Range::parse(vs_limp_call),
        three_bet: Range::parse(three_bet),
        call_vs_raise: Range::parse(call_vs_raise),
        open_raise_size_bb: open_bb,
        three_bet_size_mult: threebet_mult,
    }
}

pub struct Charts {
    table: HashMap<(TableFormat, Position), ChartEntry>,
}

impl Charts {
    pub fn standard() -> Charts {
        let mut table = HashMap::new();

        // Heads-up: both seats see nearly every hand; button (=SB) opens
        // very wide, BB defends/3-bets wide facing an open.
        table.insert(
            (TableFormat::HeadsUp, Position::Sb),
            entry(
                "22+,A2s+,A2o+,K2s+,K5o+,Q4s+,Q8o+,J6s+,J9o+,T7s+,T9o,97s+,87s,76s,65s,54s",
                "55+,A9s+,AJo+,KTs+",
                "22+,A2s+,ATo+,K9s+",
                "99+,AJs+,AQo+,KQs",
                "22+,A2s+,A8o+,K8s+,KTo+,Q9s+",
                2.5,
                3.0,
            ),
        );
        table.insert(
            (TableFormat::HeadsUp, Position::Bb),
            entry(
                "22+,A2s+,A2o+,K2s+,K7o+,Q6s+,Q9o+,J8s+,T8s+,98s",
                "55+,A9s+,AJo+,KTs+",
                "22+,A2s+,ATo+,K9s+",
                "TT+,AQs+,AKo,KQs",
                "22+,A2s+,A9o+,K8s+,KTo+,Q9s+,J9s+",
                2.5,
                3.5,
            ),
        );

        // 6-max.
        table.insert(
            (TableFormat::SixMax, Position::Utg),
            entry(
                "66+,ATs+,AJo+,KQs",
                "TT+,AQs+,AKo",
                "88+,AJs+,AQo+",
                "TT+,AQs+,AKo",
                "66+,ATs+,AJo+,KQs",
                2.5,
                3.0,
            ),
        );
        table.insert(
            (TableFormat::SixMax, Position::Mp),
            entry(
                "44+,A9s+,ATo+,KJs+,KQo,QJs",
                "99+,AJs+,AQo+",
                "77+,ATs+,AJo+,KQs",
                "99+,AJs+,AQo+,KQs",
                "44+,A9s+,ATo+,KJs+",
                2.5,
                3.0,
            ),
        );
        table.insert(
            (TableFormat::SixMax, Position::Co),
            entry(
                "22+,A2s+,A9o+,K7s+,KTo+,Q9s+,QTo+,J9s+,JTo,T9s,98s",
                "77+,A9s+,AJo+,KQs",
                "55+,A5s+,ATo+,K9s+",
                "88+,A9s+,AQo+,KJs+",
                "22+,A2s+,A8o+,K7s+,KTo+",
                2.3,
                3.0,
            ),
        );
        table.insert(
            (TableFormat::SixMax, Position::Btn),
            entry(
                "22+,A2s+,A2o+,K2s+,K5o+,Q4s+,Q8o+,J6s+,J9o+,T7s+,T9o,97s+,87s,76s,65s",
                "55+,A7s+,ATo+,K9s+",
                "22+,A2s+,A8o+,K6s+",
                "77+,A8s+,ATo+,KQs",
                "22+,A2s+,A5o+,K5s+,K9o+,Q8s+",
                2.2,
                3.0,
            ),
        );
        table.insert(
            (TableFormat::SixMax, Position::Sb),
            entry(
                "33+,A5s+,ATo+,K9s+,KJo+,Q9s+,QJo,J9s+,T9s",
                "66+,A8s+,ATo+,K9s+",
                "33+,A2s+,A8o+,K7s+",
                "88+,A9s+,AQo+,KQs",
                "33+,A2s+,A7o+,K7s+,KTo+",
                3.0,
                4.0,
            ),
        );
        table.insert(
            (TableFormat::SixMax, Position::Bb),
            entry(
                "55+,A8s+,ATo+,K9s+,KQo,Q9s+",
                "55+,A7s+,ATo+,K9s+",
                "22+,A2s+,A7o+,K6s+",
                "99+,AJs+,AQo+,KQs",
                "22+,A2s+,A6o+,K6s+,K9o+,Q8s+,QTo+,J9s+",
                3.0,
                4.0,
            ),
        );

        // 9-max: noticeably tighter up front, same BTN/CO/blinds shape.
        table.insert(
            (TableFormat::NineMax, Position::Utg),
            entry("88+,AJs+,AQo+,KQs", "JJ+,AQs+,AKo", "99+,AQs+,AKo", "JJ+,AQs+,AKo", "88+,AJs+,AQo+", 2.5, 3.0),
        );
        table.insert(
            (TableFormat::NineMax, Position::Mp),
            entry(
                "66+,ATs+,AJo+,KQs",
                "TT+,AJs+,AQo+",
                "88+,ATs+,AJo+",
                "TT+,AJs+,AQo+,KQs",
                "66+,ATs+,AJo+",
                2.5,
                3.0,
            ),
        );
        table.insert(
            (TableFormat::NineMax, Position::Co),
            entry(
                "44+,A8s+,ATo+,K9s+,KQo,QTs+",
                "88+,A9s+,AJo+",
                "55+,A5s+,ATo+",
                "99+,A9s+,AQo+,KQs",
                "44+,A7s+,ATo+,K9s+",
                2.3,
                3.0,
            ),
        );
        table.insert(
            (TableFormat::NineMax, Position::Btn),
            entry(
                "22+,A2s+,A5o+,K6s+,K9o+,Q8s+,QTo+,J8s+,JTo,T8s+,98s,87s",
                "66+,A7s+,ATo+,K9s+",
                "33+,A2s+,A7o+,K7s+",
                "88+,A8s+,ATo+,KQs",
                "22+,A2s+,A5o+,K6s+,K9o+",
                2.2,
                3.0,
            ),
        );
        table.insert(
            (TableFormat::NineMax, Position::Sb),
            entry(
                "55+,A6s+,ATo+,K9s+,KQo,Q9s+",
                "77+,A8s+,ATo+,K9s+",
                "33+,A2s+,A8o+,K7s+",
                "99+,A9s+,AQo+,KQs",
                "33+,A2s+,A7o+,K7s+",
                3.0,
                4.0,
            ),
        );
        table.insert(
            (TableFormat::NineMax, Position::Bb),
            entry(
                "66+,A8s+,ATo+,K9s+,KQo",
                "66+,A8s+,ATo+,K9s+",
                "33+,A2s+,A8o+,K7s+",
                "TT+,AJs+,AQo+,KQs",
                "33+,A2s+,A7o+,K7s+,K9o+,Q9s+",
                3.0,
                4.0,
            ),
        );

        Charts { table }
    }

    pub fn lookup(&self, format: TableFormat, position: Position) -> Option<&ChartEntry> {
        self.table.get(&(format, position))
    }
}

/// Inputs to a single preflop decision, already resolved from [`GameState`].
pub struct PreflopContext {
    pub format: TableFormat,
    pub position: Position,
    pub shape: HandShape,
    pub is_first_in: bool,
    pub limper_count: u32,
    pub facing_raise: bool,
    pub current_bet: u32,
    pub big_blind: u32,
    pub min_raise_total: Option<u32>,
    pub min_bet_total: Option<u32>,
    pub max_total: u32,
}

pub struct PreflopDecision {
    pub action: PlayerAction,
    pub confidence: f64,
    pub rationale: String,
}

fn clamp_total(amount: u32, min: Option<u32>, max: u32) -> u32 {
    let amount = amount.min(max);
    match min {
        Some(min) if min <= max => amount.max(min),
        _ => max,
    }
}

/// `suggest`'s preflop leg: chart lookup + range membership + sizing.
pub fn decide_preflop(charts: &Charts, ctx: &PreflopContext) -> PreflopDecision {
    let Some(chart) = charts.lookup(ctx.format, ctx.position) else {
        return PreflopDecision {
            action: PlayerAction::Fold,
            confidence: 0.5,
            rationale: "no preflop chart available for this seat".to_string(),
        };
    };

    if ctx.facing_raise {
        if chart.three_bet.contains(&ctx.shape) {
            let total = clamp_total(
                (ctx.current_bet as f64 * chart.three_bet_size_mult).round() as u32,
                ctx.min_raise_total,
                ctx.max_total,
            );
            return PreflopDecision {
                action: PlayerAction::Raise(total),
                confidence: 0.8,
                rationale: format!("{} is in the 3-bet range facing a raise", ctx.shape.notation()),
            };
        }
        if chart.call_vs_raise.contains(&ctx.shape) {
            return PreflopDecision {
                action: PlayerAction::Call,
                confidence: 0.65,
                rationale: format!("{} is in the flat-calling range facing a raise", ctx.shape.notation()),
            };
        }
        return PreflopDecision {
            action: PlayerAction::Fold,
            confidence: 0.7,
            rationale: format!("{} is outside the calling/3-bet range facing a raise", ctx.shape.notation()),
        };
    }

    if !ctx.is_first_in {
        if chart.vs_limp_raise.contains(&ctx.shape) {
            let total = clamp_total(
                (3 + ctx.limper_count) * ctx.big_blind,
                ctx.min_raise_total,
                ctx.max_total,
            );
            return PreflopDecision {
                action: PlayerAction::Raise(total),
                confidence: 0.85,
                rationale: format!("{} is a premium hand against limpers", ctx.shape.notation()),
            };
        }
        if chart.vs_limp_call.contains(&ctx.shape) {
            let total = clamp_total(
                (2 + ctx.limper_count) * ctx.big_blind,
                ctx.min_raise_total,
                ctx.max_total,
            );
            return PreflopDecision {
                action: PlayerAction::Raise(total),
                confidence: 0.6,
                rationale: format!("{} is strong enough to isolate limpers", ctx.shape.notation()),
            };
        }
        return PreflopDecision {
            action: PlayerAction::Check,
            confidence: 0.55,
            rationale: "checking the option behind limpers".to_string(),
        };
    }

    if chart.open.contains(&ctx.shape) {
        let total = clamp_total(
            (chart.open_raise_size_bb * ctx.big_blind as f64).round() as u32,
            ctx.min_raise_total.or(ctx.min_bet_total),
            ctx.max_total,
        );
        return PreflopDecision {
            action: PlayerAction::Raise(total),
            confidence: 0.75,
            rationale: format!("{} opens from this seat", ctx.shape.notation()),
        };
    }

    PreflopDecision {
        action: PlayerAction::Fold,
        confidence: 0.6,
        rationale: format!("{} is outside the opening range for this seat", ctx.shape.notation()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heads_up_collapses_to_sb_bb() {
        assert_eq!(position_for(0, 2), Position::Sb);
        assert_eq!(position_for(1, 2), Position::Bb);
    }

    #[test]
    fn six_max_assigns_button_and_blinds() {
        assert_eq!(position_for(0, 6), Position::Btn);
        assert_eq!(position_for(1, 6), Position::Sb);
        assert_eq!(position_for(2, 6), Position::Bb);
        assert_eq!(position_for(5, 6), Position::Co);
    }

    #[test]
    fn missing_chart_folds_with_half_confidence() {
        let charts = Charts { table: HashMap::new() };
        let ctx = PreflopContext {
            format: TableFormat::SixMax,
            position: Position::Utg,
            shape: HandShape { high: holdem_engine::cards::Rank::Ace, low: holdem_engine::cards::Rank::Ace, suited: None },
            is_first_in: true,
            limper_count: 0,
            facing_raise: false,
            current_bet: 0,
            big_blind: 10,
            min_raise_total: None,
            min_bet_total: Some(10),
            max_total: 1000,
        };
        let decision = decide_preflop(&charts, &ctx);
        assert_eq!(decision.action, PlayerAction::Fold);
        assert_eq!(decision.confidence, 0.5);
    }

    #[test]
    fn pocket_aces_opens_from_button() {
        let charts = Charts::standard();
        let ctx = PreflopContext {
            format: TableFormat::SixMax,
            position: Position::Btn,
            shape: HandShape { high: holdem_engine::cards::Rank::Ace, low: holdem_engine::cards::Rank::Ace, suited: None },
            is_first_in: true,
            limper_count: 0,
            facing_raise: false,
            current_bet: 10,
            big_blind: 10,
            min_raise_total: Some(20),
            min_bet_total: Some(10),
            max_total: 1000,
        };
        let decision = decide_preflop(&charts, &ctx);
        assert!(matches!(decision.action, PlayerAction::Raise(_)));
    }
}
