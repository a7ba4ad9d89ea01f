use rust_decimal::Decimal;
use serde::Serialize;

use crate::enums::{ AssetStatus, Confidence, MacdSignal, MaPosition, SignalAction };
use crate::money::percent_change;
use crate::services::indicator_service::IndicatorSnapshot;

/// Everything the engine needs to score one asset. Target/stop flags are
/// computed by the caller in EUR against the stored EUR thresholds;
/// percentages shown in reasons come from native prices so FX noise never
/// mislabels a signal.
#[derive(Debug, Clone)]
pub struct SignalContext {
    pub status: AssetStatus,
    pub price_native: Decimal,
    pub price_eur: Decimal,
    pub entry_price_native: Option<Decimal>,
    pub target_reached: bool,
    pub stop_loss_reached: bool,
    pub indicators: IndicatorSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalDecision {
    pub action: SignalAction,
    pub confidence: Confidence,
    pub reason: String,
    pub sell_score: u8,
    pub buy_score: u8,
}

/// One scoring rule: a fixed weight, a predicate, and the clause that goes
/// into the reason text when the predicate holds. Rules are evaluated in
/// declaration order and their clauses concatenate in that order.
struct ScoringRule {
    weight: u8,
    applies: fn(&SignalContext) -> bool,
    clause: fn(&SignalContext) -> String,
}

fn native_change_suffix(ctx: &SignalContext) -> String {
    let Some(entry) = ctx.entry_price_native else {
        return String::new();
    };
    match percent_change(entry, ctx.price_native) {
        Some(pct) if pct >= Decimal::ZERO => format!(" (up {}% since entry)", pct),
        Some(pct) => format!(" (down {}% since entry)", pct.abs()),
        None => String::new(),
    }
}

const SELL_RULES: &[ScoringRule] = &[
    ScoringRule {
        weight: 3,
        applies: |ctx| ctx.target_reached,
        clause: |ctx| format!("target price reached{}", native_change_suffix(ctx)),
    },
    ScoringRule {
        weight: 4,
        applies: |ctx| ctx.stop_loss_reached,
        clause: |ctx| format!("stop-loss reached{}", native_change_suffix(ctx)),
    },
    ScoringRule {
        weight: 1,
        applies: |ctx| ctx.indicators.rsi.map(|rsi| rsi > 70.0).unwrap_or(false),
        clause: |ctx| format!("RSI {:.1} overbought", ctx.indicators.rsi.unwrap_or_default()),
    },
    ScoringRule {
        weight: 1,
        applies: |ctx| ctx.indicators.macd == Some(MacdSignal::Bearish),
        clause: |_| "MACD bearish crossover".to_string(),
    },
    ScoringRule {
        weight: 1,
        applies: |ctx| ctx.indicators.sentiment.map(|s| s < -0.3).unwrap_or(false),
        clause: |_| "news sentiment negative".to_string(),
    },
];

const BUY_RULES: &[ScoringRule] = &[
    ScoringRule {
        weight: 2,
        applies: |ctx| ctx.indicators.rsi.map(|rsi| rsi < 30.0).unwrap_or(false),
        clause: |ctx| format!("RSI {:.1} oversold", ctx.indicators.rsi.unwrap_or_default()),
    },
    ScoringRule {
        weight: 1,
        applies: |ctx| {
            ctx.indicators.rsi
                .map(|rsi| (40.0..=60.0).contains(&rsi))
                .unwrap_or(false)
        },
        clause: |ctx| format!("RSI {:.1} in neutral range", ctx.indicators.rsi.unwrap_or_default()),
    },
    ScoringRule {
        weight: 2,
        applies: |ctx| ctx.indicators.macd == Some(MacdSignal::Bullish),
        clause: |_| "MACD bullish crossover".to_string(),
    },
    ScoringRule {
        weight: 1,
        applies: |ctx| ctx.indicators.price_vs_ma20 == Some(MaPosition::Above),
        clause: |_| "price above 20-day moving average".to_string(),
    },
    ScoringRule {
        weight: 1,
        applies: |ctx| ctx.indicators.sentiment.map(|s| s > 0.3).unwrap_or(false),
        clause: |_| "news sentiment positive".to_string(),
    },
    ScoringRule {
        weight: 1,
        applies: |ctx| ctx.indicators.volume_ratio.map(|r| r > 1.5).unwrap_or(false),
        clause: |ctx| {
            format!(
                "volume {:.1}x above average",
                ctx.indicators.volume_ratio.unwrap_or_default()
            )
        },
    },
];

fn score(rules: &[ScoringRule], ctx: &SignalContext) -> (u8, Vec<String>) {
    let mut total = 0u8;
    let mut clauses = Vec::new();

    for rule in rules {
        if (rule.applies)(ctx) {
            total += rule.weight;
            clauses.push((rule.clause)(ctx));
        }
    }

    (total, clauses)
}

/// Deterministic decision for one asset. No side effects: persistence,
/// deduplication and notification all live with the caller.
pub fn evaluate(ctx: &SignalContext) -> SignalDecision {
    let (sell_score, sell_clauses) = if ctx.status == AssetStatus::Bought {
        score(SELL_RULES, ctx)
    } else {
        (0, Vec::new())
    };

    let (buy_score, buy_clauses) = if ctx.status == AssetStatus::Watching {
        score(BUY_RULES, ctx)
    } else {
        (0, Vec::new())
    };

    if sell_score >= 2 {
        let confidence = if sell_score >= 4 {
            Confidence::High
        } else if sell_score >= 3 {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        return SignalDecision {
            action: SignalAction::Sell,
            confidence,
            reason: sell_clauses.join("; "),
            sell_score,
            buy_score,
        };
    }

    if buy_score >= 3 {
        let confidence = if buy_score >= 5 {
            Confidence::High
        } else if buy_score >= 4 {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        return SignalDecision {
            action: SignalAction::Buy,
            confidence,
            reason: buy_clauses.join("; "),
            sell_score,
            buy_score,
        };
    }

    SignalDecision {
        action: SignalAction::Hold,
        confidence: Confidence::Low,
        reason: String::new(),
        sell_score,
        buy_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bought_ctx() -> SignalContext {
        SignalContext {
            status: AssetStatus::Bought,
            price_native: dec!(100),
            price_eur: dec!(90),
            entry_price_native: Some(dec!(100)),
            target_reached: false,
            stop_loss_reached: false,
            indicators: IndicatorSnapshot::empty(),
        }
    }

    fn watching_ctx() -> SignalContext {
        SignalContext {
            status: AssetStatus::Watching,
            price_native: dec!(100),
            price_eur: dec!(90),
            entry_price_native: None,
            target_reached: false,
            stop_loss_reached: false,
            indicators: IndicatorSnapshot::empty(),
        }
    }

    #[test]
    fn target_reached_alone_sells_with_medium_confidence() {
        // Profile target 10%, entry $100 at 0.9 → €90, target €99; the
        // price rising to a native-equivalent €100 reaches it.
        let mut ctx = bought_ctx();
        ctx.price_native = dec!(111.11);
        ctx.price_eur = dec!(100);
        ctx.target_reached = true;

        let decision = evaluate(&ctx);
        assert_eq!(decision.action, SignalAction::Sell);
        assert_eq!(decision.sell_score, 3);
        assert_eq!(decision.confidence, Confidence::Medium);
        assert_eq!(decision.reason, "target price reached (up 11.11% since entry)");
    }

    #[test]
    fn stop_loss_sells_with_high_confidence() {
        let mut ctx = bought_ctx();
        ctx.price_native = dec!(85);
        ctx.stop_loss_reached = true;

        let decision = evaluate(&ctx);
        assert_eq!(decision.action, SignalAction::Sell);
        assert_eq!(decision.sell_score, 4);
        assert_eq!(decision.confidence, Confidence::High);
        assert_eq!(decision.reason, "stop-loss reached (down 15.00% since entry)");
    }

    #[test]
    fn indicator_only_sell_needs_two_points() {
        let mut ctx = bought_ctx();
        ctx.indicators.rsi = Some(75.0);

        // One point alone holds.
        assert_eq!(evaluate(&ctx).action, SignalAction::Hold);

        ctx.indicators.macd = Some(MacdSignal::Bearish);
        let decision = evaluate(&ctx);
        assert_eq!(decision.action, SignalAction::Sell);
        assert_eq!(decision.sell_score, 2);
        assert_eq!(decision.confidence, Confidence::Low);
        assert_eq!(decision.reason, "RSI 75.0 overbought; MACD bearish crossover");
    }

    #[test]
    fn reasons_follow_rule_declaration_order() {
        let mut ctx = bought_ctx();
        ctx.target_reached = true;
        ctx.indicators.rsi = Some(72.0);
        ctx.indicators.macd = Some(MacdSignal::Bearish);
        ctx.indicators.sentiment = Some(-0.5);

        let decision = evaluate(&ctx);
        assert_eq!(decision.sell_score, 6);
        assert_eq!(
            decision.reason,
            "target price reached (up 0.00% since entry); RSI 72.0 overbought; \
             MACD bearish crossover; news sentiment negative"
        );
    }

    #[test]
    fn buy_requires_three_points() {
        let mut ctx = watching_ctx();
        ctx.indicators.macd = Some(MacdSignal::Bullish);

        assert_eq!(evaluate(&ctx).action, SignalAction::Hold);

        ctx.indicators.price_vs_ma20 = Some(MaPosition::Above);
        let decision = evaluate(&ctx);
        assert_eq!(decision.action, SignalAction::Buy);
        assert_eq!(decision.buy_score, 3);
        assert_eq!(decision.confidence, Confidence::Low);
        assert_eq!(decision.reason, "MACD bullish crossover; price above 20-day moving average");
    }

    #[test]
    fn strong_buy_reaches_high_confidence() {
        let mut ctx = watching_ctx();
        ctx.indicators.rsi = Some(25.0);
        ctx.indicators.macd = Some(MacdSignal::Bullish);
        ctx.indicators.sentiment = Some(0.6);

        let decision = evaluate(&ctx);
        assert_eq!(decision.action, SignalAction::Buy);
        assert_eq!(decision.buy_score, 5);
        assert_eq!(decision.confidence, Confidence::High);
    }

    #[test]
    fn oversold_and_neutral_rsi_are_mutually_exclusive() {
        let mut ctx = watching_ctx();
        ctx.indicators.rsi = Some(50.0);
        ctx.indicators.macd = Some(MacdSignal::Bullish);

        let decision = evaluate(&ctx);
        assert_eq!(decision.buy_score, 3);
        assert_eq!(decision.reason, "RSI 50.0 in neutral range; MACD bullish crossover");
    }

    #[test]
    fn watching_assets_never_sell_and_bought_never_buy() {
        let mut watching = watching_ctx();
        watching.target_reached = true;
        watching.stop_loss_reached = true;
        assert_eq!(evaluate(&watching).action, SignalAction::Hold);

        let mut bought = bought_ctx();
        bought.indicators.rsi = Some(25.0);
        bought.indicators.macd = Some(MacdSignal::Bullish);
        bought.indicators.sentiment = Some(0.6);
        assert_eq!(evaluate(&bought).action, SignalAction::Hold);
    }

    #[test]
    fn hold_has_empty_reason() {
        let decision = evaluate(&watching_ctx());
        assert_eq!(decision.action, SignalAction::Hold);
        assert_eq!(decision.reason, "");
    }

    #[test]
    fn sold_assets_always_hold() {
        let mut ctx = bought_ctx();
        ctx.status = AssetStatus::Sold;
        ctx.target_reached = true;
        assert_eq!(evaluate(&ctx).action, SignalAction::Hold);
    }
}
