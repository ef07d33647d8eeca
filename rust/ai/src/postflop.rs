//! Postflop decision ladder: combines hand strength, draw equity, board
//! texture and stack-to-pot ratio into a single bet/raise/call/check/fold
//! recommendation.

use rand::Rng;

use holdem_engine::hand::Category;
use holdem_engine::logger::Street;
use holdem_engine::player::PlayerAction;

use crate::board::Texture;

/// Maps a showdown category onto the `0..1` hand-strength scale the equity
/// proxy composes with outs. Mid-category hands get a kicker-aware nudge by
/// the caller; this table only fixes the category floor.
pub fn category_strength(category: Category) -> f64 {
    match category {
        Category::HighCard => 0.12,
        Category::OnePair => 0.30,
        Category::TwoPair => 0.50,
        Category::ThreeOfAKind => 0.62,
        Category::Straight => 0.75,
        Category::Flush => 0.82,
        Category::FullHouse => 0.90,
        Category::FourOfAKind => 0.97,
        Category::StraightFlush => 1.0,
    }
}

pub struct PostflopContext {
    pub street: Street,
    pub hand_strength: f64,
    pub outs: u32,
    pub pot: u32,
    pub to_call: u32,
    pub player_stack: u32,
    pub is_preflop_aggressor: bool,
    pub board_texture: Texture,
    pub min_bet_total: Option<(u32, u32)>,
    pub min_raise_total: Option<(u32, u32)>,
    pub can_check: bool,
    pub current_bet: u32,
}

pub struct PostflopDecision {
    pub action: PlayerAction,
    pub confidence: f64,
    pub rationale: String,
}

/// `handStrength + outs*(0.04 on flop, 0.02 on turn/river) + jitter`.
pub fn equity_proxy(ctx: &PostflopContext, rng: &mut impl Rng) -> f64 {
    let outs_coeff = if ctx.street == Street::Flop { 0.04 } else { 0.02 };
    let jitter: f64 = rng.random_range(-0.03..0.03);
    (ctx.hand_strength + ctx.outs as f64 * outs_coeff + jitter).clamp(0.0, 1.0)
}

fn spr(ctx: &PostflopContext) -> f64 {
    if ctx.pot == 0 {
        return f64::INFINITY;
    }
    ctx.player_stack as f64 / ctx.pot as f64
}

fn pot_odds_threshold(ctx: &PostflopContext) -> f64 {
    let ratio = ctx.to_call as f64 / (ctx.pot + ctx.to_call).max(1) as f64;
    let spr_value = spr(ctx);
    // Lower SPR widens the calling range: commit looser when stacks are short
    // relative to the pot.
    let spr_adjustment = if spr_value < 1.5 {
        0.85
    } else if spr_value < 4.0 {
        0.95
    } else {
        1.0
    };
    ratio * spr_adjustment
}

fn clamp_total(amount: u32, bounds: (u32, u32)) -> u32 {
    amount.clamp(bounds.0, bounds.1)
}

fn sized_bet(ctx: &PostflopContext, pot_fraction: f64) -> Option<u32> {
    ctx.min_bet_total.map(|bounds| clamp_total((ctx.pot as f64 * pot_fraction).round() as u32, bounds))
}

fn sized_raise(ctx: &PostflopContext, pot_fraction: f64) -> Option<u32> {
    ctx.min_raise_total
        .map(|bounds| clamp_total((ctx.current_bet as f64 + ctx.pot as f64 * pot_fraction).round() as u32, bounds))
}

/// `suggest`'s postflop leg, covering flop/turn. River uses
/// [`decide_river`] instead since no draws remain.
pub fn decide_postflop(ctx: &PostflopContext, equity: f64, draw_outs: u32, rng: &mut impl Rng) -> PostflopDecision {
    if equity > 0.75 {
        let total = sized_raise(ctx, 0.66).or_else(|| sized_bet(ctx, 0.66));
        return action_with_amount(
            ctx,
            total,
            0.85,
            "hand strength and outs clear the value-raise threshold".to_string(),
        );
    }

    if equity > 0.5 {
        if ctx.to_call > 0 {
            return PostflopDecision {
                action: PlayerAction::Call,
                confidence: 0.7,
                rationale: "equity supports a value call".to_string(),
            };
        }
        let total = sized_bet(ctx, 0.5);
        return action_with_amount(ctx, total, 0.7, "equity supports a value bet".to_string());
    }

    if ctx.to_call > 0 {
        let threshold = pot_odds_threshold(ctx);
        if equity > threshold {
            return PostflopDecision {
                action: PlayerAction::Call,
                confidence: 0.55,
                rationale: format!("combined equity {:.2} clears the pot-odds threshold {:.2}", equity, threshold),
            };
        }
        if draw_outs >= 12 && rng.random_range(0.0..1.0) < 0.35 {
            let total = sized_raise(ctx, 0.75);
            return action_with_amount(ctx, total, 0.5, "semi-bluff raise with a big combined draw".to_string());
        }
        let bet_to_pot = ctx.to_call as f64 / ctx.pot.max(1) as f64;
        if draw_outs >= 4 && bet_to_pot < 0.25 {
            return PostflopDecision {
                action: PlayerAction::Call,
                confidence: 0.4,
                rationale: "small bet is cheap enough to chase a gutshot".to_string(),
            };
        }
        return PostflopDecision { action: PlayerAction::Fold, confidence: 0.65, rationale: "no equity to continue".to_string() };
    }

    if ctx.is_preflop_aggressor {
        let cbet_equity_ok = ctx.board_texture == Texture::Dry || equity >= 0.5;
        if cbet_equity_ok {
            let total = sized_bet(ctx, if ctx.board_texture == Texture::Dry { 0.5 } else { 0.66 });
            return action_with_amount(ctx, total, 0.65, "continuation bet as the preflop aggressor".to_string());
        }
    }

    if ctx.can_check {
        return PostflopDecision { action: PlayerAction::Check, confidence: 0.6, rationale: "checking with no made hand or equity edge".to_string() };
    }
    PostflopDecision { action: PlayerAction::Fold, confidence: 0.5, rationale: "no equity and no check available".to_string() }
}

/// River-only leg: no draws remain, so polarize to value or a bluff.
pub fn decide_river(ctx: &PostflopContext, hand_strength: f64, rng: &mut impl Rng) -> PostflopDecision {
    if hand_strength > 0.6 {
        let total = sized_bet(ctx, 0.75).or_else(|| sized_raise(ctx, 0.75));
        return action_with_amount(ctx, total, 0.8, "river value bet with a strong made hand".to_string());
    }
    if ctx.to_call == 0 && hand_strength < 0.2 && rng.random_range(0.0..1.0) < 0.25 {
        let total = sized_bet(ctx, 0.75);
        return action_with_amount(ctx, total, 0.45, "river bluff with a missed draw".to_string());
    }
    if ctx.to_call > 0 {
        let threshold = pot_odds_threshold(ctx);
        if hand_strength > threshold {
            return PostflopDecision { action: PlayerAction::Call, confidence: 0.5, rationale: "thin value call on the river".to_string() };
        }
        return PostflopDecision { action: PlayerAction::Fold, confidence: 0.65, rationale: "no showdown value on the river".to_string() };
    }
    if ctx.can_check {
        return PostflopDecision { action: PlayerAction::Check, confidence: 0.6, rationale: "giving up with no river value".to_string() };
    }
    PostflopDecision { action: PlayerAction::Fold, confidence: 0.5, rationale: "no equity and no check available".to_string() }
}

fn action_with_amount(ctx: &PostflopContext, total: Option<u32>, confidence: f64, rationale: String) -> PostflopDecision {
    match total {
        Some(total) if ctx.current_bet == 0 => PostflopDecision { action: PlayerAction::Bet(total), confidence, rationale },
        Some(total) => PostflopDecision { action: PlayerAction::Raise(total), confidence, rationale },
        None if ctx.to_call > 0 => PostflopDecision { action: PlayerAction::Call, confidence: confidence * 0.8, rationale },
        None if ctx.can_check => PostflopDecision { action: PlayerAction::Check, confidence: confidence * 0.8, rationale },
        None => PostflopDecision { action: PlayerAction::Fold, confidence: 0.5, rationale },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn base_ctx() -> PostflopContext {
        PostflopContext {
            street: Street::Flop,
            hand_strength: 0.9,
            outs: 0,
            pot: 100,
            to_call: 0,
            player_stack: 900,
            is_preflop_aggressor: true,
            board_texture: Texture::Dry,
            min_bet_total: Some((10, 900)),
            min_raise_total: Some((20, 900)),
            can_check: true,
            current_bet: 0,
        }
    }

    #[test]
    fn strong_hand_value_bets() {
        let ctx = base_ctx();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let decision = decide_postflop(&ctx, 0.9, 0, &mut rng);
        assert!(matches!(decision.action, PlayerAction::Bet(_)));
    }

    #[test]
    fn air_folds_to_a_bet() {
        let mut ctx = base_ctx();
        ctx.hand_strength = 0.1;
        ctx.to_call = 60;
        ctx.pot = 100;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let decision = decide_postflop(&ctx, 0.1, 0, &mut rng);
        assert_eq!(decision.action, PlayerAction::Fold);
    }

    #[test]
    fn river_polarizes_strong_hands_to_value() {
        let mut ctx = base_ctx();
        ctx.street = Street::River;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let decision = decide_river(&ctx, 0.8, &mut rng);
        assert!(matches!(decision.action, PlayerAction::Bet(_) | PlayerAction::Raise(_)));
    }
}
