//! Edge detection against market odds.
//!
//! Pure numeric functions comparing model output (margin, sigma, win
//! probability, total) against market spreads, moneylines, and totals:
//! cover probability, implied probability, expected value, Kelly stake,
//! and an edge-strength classification with recommendation strings.

use serde::{Deserialize, Serialize};

use crate::math::normal_cdf;
use crate::models::MarketOdds;

/// Spread edge (points) required before a play is recommended.
pub const SPREAD_PLAY_THRESHOLD: f64 = 3.0;

/// Total edge (points) required before an over/under play is recommended.
pub const TOTAL_PLAY_THRESHOLD: f64 = 8.0;

// ============================================================================
// Odds conversions
// ============================================================================

/// Implied probability of American odds (vig included).
pub fn implied_probability(odds: i32) -> f64 {
    if odds > 0 {
        100.0 / (odds as f64 + 100.0)
    } else {
        let a = odds.unsigned_abs() as f64;
        a / (a + 100.0)
    }
}

/// Decimal odds (total return per unit staked) for American odds.
pub fn decimal_odds(odds: i32) -> f64 {
    if odds > 0 {
        odds as f64 / 100.0 + 1.0
    } else {
        100.0 / odds.unsigned_abs() as f64 + 1.0
    }
}

/// Probability the home side covers `market_spread` given a predicted margin
/// and game sigma (spread from the home perspective, negative = home
/// favored).
pub fn cover_probability(predicted_margin: f64, market_spread: f64, sigma: f64) -> f64 {
    normal_cdf((predicted_margin + market_spread) / sigma)
}

/// Expected value per unit staked.
pub fn expected_value(win_prob: f64, decimal_odds: f64) -> f64 {
    win_prob * (decimal_odds - 1.0) - (1.0 - win_prob)
}

/// Kelly stake fraction, floored at zero (no negative stakes).
pub fn kelly_fraction(win_prob: f64, decimal_odds: f64) -> f64 {
    let b = decimal_odds - 1.0;
    if b <= 0.0 {
        return 0.0;
    }
    ((win_prob * decimal_odds - 1.0) / b).max(0.0)
}

// ============================================================================
// Edge strength classification
// ============================================================================

/// Fixed-threshold edge classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
}

impl EdgeStrength {
    /// Classification in spread units (points).
    pub fn from_spread_points(edge: f64) -> Self {
        let e = edge.abs();
        if e >= 3.0 {
            EdgeStrength::VeryStrong
        } else if e >= 2.0 {
            EdgeStrength::Strong
        } else if e >= 1.0 {
            EdgeStrength::Moderate
        } else {
            EdgeStrength::Weak
        }
    }

    /// Classification in probability units (moneyline edges).
    pub fn from_prob_edge(edge: f64) -> Self {
        let e = edge.abs();
        if e >= 0.10 {
            EdgeStrength::VeryStrong
        } else if e >= 0.05 {
            EdgeStrength::Strong
        } else if e >= 0.03 {
            EdgeStrength::Moderate
        } else {
            EdgeStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeStrength::VeryStrong => "very_strong",
            EdgeStrength::Strong => "strong",
            EdgeStrength::Moderate => "moderate",
            EdgeStrength::Weak => "weak",
        }
    }
}

// ============================================================================
// Per-market edge evaluation
// ============================================================================

/// Spread edge for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadEdge {
    pub market_spread: f64,
    /// Model margin minus the market's implied home margin
    /// (positive = home side is the value).
    pub edge_points: f64,
    /// Probability the home side covers the spread.
    pub cover_prob_home: f64,
    /// EV and Kelly for the value side at the quoted spread price.
    pub expected_value: f64,
    pub kelly: f64,
    pub strength: EdgeStrength,
    /// "<team> -7.5", "<team> +3.5", or "PASS".
    pub recommendation: String,
}

/// Moneyline edge for one game (absent when the book offers no moneyline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneylineEdge {
    /// Model win probability minus implied, home side.
    pub home_edge: f64,
    pub away_edge: f64,
    pub expected_value: f64,
    pub kelly: f64,
    pub strength: EdgeStrength,
    pub recommendation: String,
}

/// Total (over/under) edge for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalEdge {
    pub market_total: f64,
    /// Model total minus market total (positive = over value).
    pub edge_points: f64,
    pub recommendation: String,
}

/// Evaluate the spread market.
///
/// `predicted_margin` is from the home perspective; the market's implied
/// home margin is `-home_spread`, so the edge is `margin + home_spread`.
pub fn evaluate_spread(predicted_margin: f64, sigma: f64, odds: &MarketOdds) -> SpreadEdge {
    let edge_points = predicted_margin + odds.home_spread;
    let cover_prob_home = cover_probability(predicted_margin, odds.home_spread, sigma);

    let dec = decimal_odds(odds.home_spread_price);
    // Probability of the value side covering.
    let side_prob = if edge_points >= 0.0 {
        cover_prob_home
    } else {
        1.0 - cover_prob_home
    };
    let ev = expected_value(side_prob, dec);
    let kelly = kelly_fraction(side_prob, dec);

    let recommendation = if edge_points.abs() >= SPREAD_PLAY_THRESHOLD {
        if edge_points > 0.0 {
            format!("{} {:+.1}", odds.home_team, odds.home_spread)
        } else {
            format!("{} {:+.1}", odds.away_team, -odds.home_spread)
        }
    } else {
        "PASS".to_string()
    };

    SpreadEdge {
        market_spread: odds.home_spread,
        edge_points,
        cover_prob_home,
        expected_value: ev,
        kelly,
        strength: EdgeStrength::from_spread_points(edge_points),
        recommendation,
    }
}

/// Evaluate the moneyline market. Returns `None` when neither side has a
/// quoted moneyline.
pub fn evaluate_moneyline(win_prob_home: f64, odds: &MarketOdds) -> Option<MoneylineEdge> {
    let (home_ml, away_ml) = (odds.home_ml?, odds.away_ml?);

    let home_edge = win_prob_home - implied_probability(home_ml);
    let away_edge = (1.0 - win_prob_home) - implied_probability(away_ml);

    // Take the better side.
    let (edge, prob, price, team) = if home_edge >= away_edge {
        (home_edge, win_prob_home, home_ml, odds.home_team.as_str())
    } else {
        (away_edge, 1.0 - win_prob_home, away_ml, odds.away_team.as_str())
    };

    let dec = decimal_odds(price);
    let ev = expected_value(prob, dec);
    let kelly = kelly_fraction(prob, dec);
    let strength = EdgeStrength::from_prob_edge(edge);

    let recommendation = if edge >= 0.03 {
        format!("{} ML {:+}", team, price)
    } else {
        "PASS".to_string()
    };

    Some(MoneylineEdge {
        home_edge,
        away_edge,
        expected_value: ev,
        kelly,
        strength,
        recommendation,
    })
}

/// Evaluate the total market. Returns `None` when the book posts no total.
pub fn evaluate_total(model_total: f64, odds: &MarketOdds) -> Option<TotalEdge> {
    let market_total = odds.total?;
    let edge_points = model_total - market_total;
    let recommendation = if edge_points.abs() >= TOTAL_PLAY_THRESHOLD {
        if edge_points > 0.0 {
            format!("OVER {:.1}", market_total)
        } else {
            format!("UNDER {:.1}", market_total)
        }
    } else {
        "PASS".to_string()
    };
    Some(TotalEdge {
        market_total,
        edge_points,
        recommendation,
    })
}
