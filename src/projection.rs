//! Score projection via efficiency crossover.
//!
//! Two independent formulations project team scores directly from rating
//! records, bypassing the matchup feature layer:
//!
//! 1. Simple average: E = (OE + opp DE) / 2, home court split at the score
//!    level, logistic win probability.
//! 2. Log-linear: E = OE + opp DE - 100 relative to the D1 baseline, home
//!    court applied as an offensive-efficiency boost, optional luck
//!    regression, normal-CDF win probability.
//!
//! The two variants intentionally use different win-probability functions;
//! they are calibrated separately and kept as two named strategies rather
//! than silently unified (see DESIGN.md).

use serde::{Deserialize, Serialize};

use crate::math::{logistic, normal_cdf};
use crate::models::TeamRating;

/// D1 average efficiency baseline (points per 100 possessions).
pub const D1_AVERAGE_EFFICIENCY: f64 = 100.0;

/// Default win-probability calibration scale.
pub const DEFAULT_K: f64 = 11.0;

/// Default home advantage in points for the projection models.
pub const DEFAULT_HOME_ADV: f64 = 3.0;

/// Fraction of the luck metric expected to regress.
pub const LUCK_REGRESSION_FACTOR: f64 = 0.5;

/// Efficiency points per unit of luck.
pub const POINTS_PER_LUCK: f64 = 10.0;

/// Which projection formulation to use; a call-site configuration switch,
/// not internal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMethod {
    SimpleAverage,
    LogLinear,
}

impl ProjectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionMethod::SimpleAverage => "simple_average",
            ProjectionMethod::LogLinear => "loglinear",
        }
    }
}

/// Efficiency-points correction for a team's luck metric. Teams that have
/// over-won their underlying efficiency are expected to regress toward it.
/// Missing luck means no adjustment.
pub fn luck_adjustment(luck: Option<f64>) -> f64 {
    match luck {
        Some(l) => -(l * LUCK_REGRESSION_FACTOR * POINTS_PER_LUCK),
        None => 0.0,
    }
}

// ============================================================================
// Projection outputs
// ============================================================================

/// Simple-average projection output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreProjection {
    pub home_team: String,
    pub visitor_team: String,
    pub score_home: f64,
    pub score_visitor: f64,
    pub total: f64,
    /// home - visitor.
    pub margin: f64,
    pub possessions: f64,
    pub win_prob_home: f64,
    pub win_prob_visitor: f64,
}

/// Log-linear projection output with diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedScoreProjection {
    pub home_team: String,
    pub visitor_team: String,
    pub score_home: f64,
    pub score_visitor: f64,
    pub total: f64,
    pub margin: f64,
    pub possessions: f64,
    pub win_prob_home: f64,
    pub win_prob_visitor: f64,

    // Diagnostics
    /// Home efficiency before HCA and luck adjustments.
    pub eff_home_raw: f64,
    pub eff_visitor_raw: f64,
    /// Final efficiencies actually projected.
    pub eff_home: f64,
    pub eff_visitor: f64,
    /// Home advantage expressed as an efficiency delta.
    pub hca_efficiency: f64,
    pub luck_adj_home: f64,
    pub luck_adj_visitor: f64,
}

// ============================================================================
// Simple-average variant
// ============================================================================

/// Project scores with the simple-average efficiency crossover.
///
/// Possessions are the mean of both tempos; each side's efficiency is the
/// mean of its offense and the opponent's defense; home advantage is split
/// evenly at the score level. Win probability is logistic in margin with
/// scale `k`.
pub fn project_scores(
    home: &TeamRating,
    visitor: &TeamRating,
    home_adv: f64,
    k: f64,
) -> ScoreProjection {
    let poss = (home.tempo() + visitor.tempo()) / 2.0;

    let eff_home = (home.adj_oe + visitor.adj_de) / 2.0;
    let eff_visitor = (visitor.adj_oe + home.adj_de) / 2.0;

    let score_home = poss * eff_home / 100.0 + home_adv / 2.0;
    let score_visitor = poss * eff_visitor / 100.0 - home_adv / 2.0;

    let margin = score_home - score_visitor;
    let p_home = logistic(margin / k);

    ScoreProjection {
        home_team: home.team.clone(),
        visitor_team: visitor.team.clone(),
        score_home,
        score_visitor,
        total: score_home + score_visitor,
        margin,
        possessions: poss,
        win_prob_home: p_home,
        win_prob_visitor: 1.0 - p_home,
    }
}

// ============================================================================
// Log-linear variant
// ============================================================================

/// Project scores with the log-linear efficiency combination.
///
/// Efficiency is OE + opp DE - 100 relative to the D1 baseline; home
/// advantage becomes an offensive-efficiency boost of
/// `home_adv * 100 / possessions`; when `apply_luck_regression` is set, each
/// side's efficiency is corrected by `luck_adjustment`. A supplied
/// `pred_tempo` (e.g. a published predicted tempo) overrides the team-tempo
/// average. Win probability is the normal CDF of margin / k.
pub fn project_scores_loglinear(
    home: &TeamRating,
    visitor: &TeamRating,
    home_adv: f64,
    k: f64,
    pred_tempo: Option<f64>,
    apply_luck_regression: bool,
) -> EnhancedScoreProjection {
    let poss = pred_tempo.unwrap_or_else(|| (home.tempo() + visitor.tempo()) / 2.0);

    let eff_home_raw = home.adj_oe + visitor.adj_de - D1_AVERAGE_EFFICIENCY;
    let eff_visitor_raw = visitor.adj_oe + home.adj_de - D1_AVERAGE_EFFICIENCY;

    let (luck_adj_home, luck_adj_visitor) = if apply_luck_regression {
        (luck_adjustment(home.luck), luck_adjustment(visitor.luck))
    } else {
        (0.0, 0.0)
    };

    let hca_efficiency = home_adv * 100.0 / poss;

    let eff_home = eff_home_raw + hca_efficiency + luck_adj_home;
    let eff_visitor = eff_visitor_raw + luck_adj_visitor;

    let score_home = poss * eff_home / 100.0;
    let score_visitor = poss * eff_visitor / 100.0;

    let margin = score_home - score_visitor;
    let p_home = normal_cdf(margin / k);

    EnhancedScoreProjection {
        home_team: home.team.clone(),
        visitor_team: visitor.team.clone(),
        score_home,
        score_visitor,
        total: score_home + score_visitor,
        margin,
        possessions: poss,
        win_prob_home: p_home,
        win_prob_visitor: 1.0 - p_home,
        eff_home_raw,
        eff_visitor_raw,
        eff_home,
        eff_visitor,
        hca_efficiency,
        luck_adj_home,
        luck_adj_visitor,
    }
}
