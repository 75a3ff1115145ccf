//! Margin prediction with matchup modifiers and game-specific variance.
//!
//! This module provides:
//! - Baseline model: margin = home AdjEM - away AdjEM + home court
//! - Enhanced model: baseline + capped heuristic adjustments
//! - Game-level sigma from an additive variance model with interaction terms
//! - Injectable coefficients so a data-fit replacement needs no code change
//!
//! All margins are from the home team perspective (positive = home favored).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::math::normal_cdf;
use crate::matchup::{compute_features, MatchupFeatures, PaceControl, StyleClash};
use crate::models::TeamRating;

// ============================================================================
// Coefficients
// ============================================================================

/// Heuristic and variance coefficients for the enhanced model.
///
/// Defaults are the conservative research-derived values; every field can be
/// overridden from a deserialized mapping to swap in fitted coefficients
/// without touching the algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCoefficients {
    /// Points per 5 possessions of tempo difference when one side controls pace.
    pub pace_control_per_5_tempo: f64,
    /// Points per 5% of net eFG% matchup advantage.
    pub shooting_matchup_per_5_efg: f64,
    /// Points per 2% of turnover-battle advantage.
    pub turnover_battle_per_2_to: f64,
    /// Points per 3% of offensive-rebounding advantage.
    pub rebounding_edge_per_3_or: f64,
    /// Hard cap on the summed adjustment magnitude.
    pub max_total_adjustment: f64,
    /// Variance added per squared possession of tempo mismatch.
    pub tempo_mismatch_factor: f64,
    /// Interaction-variance multiplier for 3PT-vs-interior matchups.
    pub style_clash_boost: f64,
}

impl Default for ModelCoefficients {
    fn default() -> Self {
        Self {
            pace_control_per_5_tempo: 0.10,
            shooting_matchup_per_5_efg: 0.06,
            turnover_battle_per_2_to: 0.10,
            rebounding_edge_per_3_or: 0.033,
            max_total_adjustment: 2.0,
            tempo_mismatch_factor: 0.015,
            style_clash_boost: 1.10,
        }
    }
}

// ============================================================================
// Prediction output
// ============================================================================

/// Per-component adjustment breakdown (points, home perspective).
///
/// Components are reported unclamped: when the total-adjustment cap triggers,
/// `total()` may exceed the applied `margin_adjustment` in magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentBreakdown {
    pub pace_control: f64,
    pub shooting_matchup: f64,
    pub turnover_battle: f64,
    pub rebounding_edge: f64,
}

impl AdjustmentBreakdown {
    /// Unclamped sum of the components.
    pub fn total(&self) -> f64 {
        self.pace_control + self.shooting_matchup + self.turnover_battle + self.rebounding_edge
    }
}

/// Variance breakdown behind the game-level sigma.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaComponents {
    pub var_away: f64,
    pub var_home: f64,
    pub var_interaction: f64,
    pub var_total: f64,
}

/// Complete prediction output with baseline and enhanced models.
///
/// Away win probabilities are always derived as `1 - home`, never computed
/// independently, so the pair sums to 1.0 exactly within one prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginPrediction {
    // Baseline model
    pub margin_baseline: f64,
    pub sigma_baseline: f64,
    pub win_prob_baseline_home: f64,
    pub win_prob_baseline_away: f64,

    // Enhanced model
    pub margin_enhanced: f64,
    /// Applied (possibly clamped) total adjustment.
    pub margin_adjustment: f64,
    pub adjustment_breakdown: AdjustmentBreakdown,

    // Game-level sigma
    pub sigma_game: f64,
    pub sigma_components: SigmaComponents,

    pub win_prob_enhanced_home: f64,
    pub win_prob_enhanced_away: f64,
}

// ============================================================================
// Baseline model
// ============================================================================

/// Baseline margin: home AdjEM - away AdjEM + home court advantage.
pub fn calculate_margin_baseline(home_adj_em: f64, away_adj_em: f64, home_court: f64) -> f64 {
    home_adj_em - away_adj_em + home_court
}

/// Baseline sigma: arithmetic mean of the two team sigmas.
pub fn calculate_sigma_baseline(away_sigma: f64, home_sigma: f64) -> f64 {
    (away_sigma + home_sigma) / 2.0
}

// ============================================================================
// Enhanced model adjustments
// ============================================================================

fn adjust_for_pace(features: &MatchupFeatures, coef: &ModelCoefficients) -> f64 {
    let pace_diff = features.delta_tempo.abs();
    match features.pace_control {
        PaceControl::HomeControls => (pace_diff / 5.0) * coef.pace_control_per_5_tempo,
        PaceControl::AwayControls => -(pace_diff / 5.0) * coef.pace_control_per_5_tempo,
        PaceControl::Neutral => 0.0,
    }
}

fn adjust_for_shooting(features: &MatchupFeatures, coef: &ModelCoefficients) -> f64 {
    // Net shooting advantage from the home perspective.
    let net = features.shooting_defense_advantage - features.shooting_advantage;
    (net / 5.0) * coef.shooting_matchup_per_5_efg
}

fn adjust_for_turnovers(features: &MatchupFeatures, coef: &ModelCoefficients) -> f64 {
    (features.turnover_advantage / 2.0) * coef.turnover_battle_per_2_to
}

fn adjust_for_rebounding(features: &MatchupFeatures, coef: &ModelCoefficients) -> f64 {
    // An away rebounding advantage hurts the home side, hence the sign flip.
    -(features.rebounding_advantage / 3.0) * coef.rebounding_edge_per_3_or
}

/// Enhanced margin with heuristic adjustments.
///
/// Sums the four component adjustments and clamps the total to
/// `max_total_adjustment`, preserving sign. The returned breakdown is
/// unclamped; only the realized margin shift is capped.
pub fn calculate_margin_enhanced(
    home_adj_em: f64,
    away_adj_em: f64,
    features: &MatchupFeatures,
    coef: &ModelCoefficients,
) -> (f64, AdjustmentBreakdown) {
    let margin_baseline =
        calculate_margin_baseline(home_adj_em, away_adj_em, features.home_court_factor);

    let breakdown = AdjustmentBreakdown {
        pace_control: adjust_for_pace(features, coef),
        shooting_matchup: adjust_for_shooting(features, coef),
        turnover_battle: adjust_for_turnovers(features, coef),
        rebounding_edge: adjust_for_rebounding(features, coef),
    };

    let mut total = breakdown.total();
    if total.abs() > coef.max_total_adjustment {
        total = coef.max_total_adjustment.copysign(total);
    }

    (margin_baseline + total, breakdown)
}

/// Game-level sigma from the additive variance model.
///
/// sigma_game = sqrt(var_away + var_home + var_interaction), floored so it
/// never drops below either team's own sigma.
pub fn calculate_sigma_game(
    away_sigma: f64,
    home_sigma: f64,
    features: &MatchupFeatures,
    coef: &ModelCoefficients,
) -> (f64, SigmaComponents) {
    let var_away = away_sigma * away_sigma;
    let var_home = home_sigma * home_sigma;

    let style_multiplier = match features.style_clash {
        StyleClash::ThreePointVsInterior => coef.style_clash_boost,
        StyleClash::Similar => 1.0,
    };
    let var_interaction =
        coef.tempo_mismatch_factor * features.tempo_mismatch * features.tempo_mismatch
            * style_multiplier;

    let var_total = var_away + var_home + var_interaction;
    let sigma_game = var_total.sqrt().max(away_sigma).max(home_sigma);

    (
        sigma_game,
        SigmaComponents {
            var_away,
            var_home,
            var_interaction,
            var_total,
        },
    )
}

// ============================================================================
// Entry point
// ============================================================================

/// Complete game prediction with baseline and enhanced models.
///
/// Computes matchup features when not supplied (with no HCA table injected in
/// that path). Rejects non-positive or non-finite sigmas up front; everything
/// else degrades through documented defaults.
pub fn predict_game(
    away: &TeamRating,
    home: &TeamRating,
    features: Option<MatchupFeatures>,
    coefficients: Option<&ModelCoefficients>,
) -> Result<MarginPrediction, ModelError> {
    for (rating, side) in [(away, "away"), (home, "home")] {
        if !(rating.sigma.is_finite() && rating.sigma > 0.0) {
            return Err(ModelError::InvalidConfiguration(format!(
                "{side} team '{}' has non-positive sigma {}",
                rating.team, rating.sigma
            )));
        }
    }

    let default_coef = ModelCoefficients::default();
    let coef = coefficients.unwrap_or(&default_coef);
    let features = features.unwrap_or_else(|| compute_features(away, home, None, None));

    let margin_baseline =
        calculate_margin_baseline(home.adj_em, away.adj_em, features.home_court_factor);
    let sigma_baseline = calculate_sigma_baseline(away.sigma, home.sigma);
    let win_prob_baseline_home = normal_cdf(margin_baseline / sigma_baseline);

    let (margin_enhanced, adjustment_breakdown) =
        calculate_margin_enhanced(home.adj_em, away.adj_em, &features, coef);
    let (sigma_game, sigma_components) =
        calculate_sigma_game(away.sigma, home.sigma, &features, coef);
    let win_prob_enhanced_home = normal_cdf(margin_enhanced / sigma_game);

    debug!(
        away = %away.team,
        home = %home.team,
        margin_baseline,
        margin_enhanced,
        sigma_game,
        "game prediction"
    );

    Ok(MarginPrediction {
        margin_baseline,
        sigma_baseline,
        win_prob_baseline_home,
        win_prob_baseline_away: 1.0 - win_prob_baseline_home,
        margin_enhanced,
        margin_adjustment: margin_enhanced - margin_baseline,
        adjustment_breakdown,
        sigma_game,
        sigma_components,
        win_prob_enhanced_home,
        win_prob_enhanced_away: 1.0 - win_prob_enhanced_home,
    })
}
