//! Matchup feature engineering for game predictions.
//!
//! Derives comparative signals between two team rating records: efficiency
//! deltas, shooting/turnover/rebounding mismatches, tempo control, and style
//! clash. Feature extraction is a pure function over its inputs; missing
//! stats resolve through the league-average defaults in `models` and are
//! never an error.

use serde::{Deserialize, Serialize};

use crate::hca::{home_court_factor, HcaTable};
use crate::models::{GameContext, TeamRating};

/// Tempo-delta deadband (possessions) inside which neither side is judged to
/// control pace.
pub const PACE_CONTROL_DEADBAND: f64 = 5.0;

/// Gap in 3PT point share (percentage points) beyond which the matchup is a
/// style clash.
pub const STYLE_CLASH_THRESHOLD: f64 = 10.0;

// ============================================================================
// Classification enums
// ============================================================================

/// Which side dictates tempo, from the signed tempo delta with a 5.0-point
/// deadband. Pure function of the threshold comparison; no hysteresis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceControl {
    HomeControls,
    AwayControls,
    Neutral,
}

impl PaceControl {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaceControl::HomeControls => "home_controls",
            PaceControl::AwayControls => "away_controls",
            PaceControl::Neutral => "neutral",
        }
    }
}

/// Shooting-style classification from the 3PT-reliance gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleClash {
    /// One team leans on the 3-pointer, the other scores inside.
    #[serde(rename = "3pt_vs_interior")]
    ThreePointVsInterior,
    Similar,
}

impl StyleClash {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleClash::ThreePointVsInterior => "3pt_vs_interior",
            StyleClash::Similar => "similar",
        }
    }
}

// ============================================================================
// Matchup Features
// ============================================================================

/// Matchup-specific features derived from two team rating records.
///
/// All delta fields are `away - home` (negative = home advantage).
/// Constructed fresh for every prediction, never mutated, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupFeatures {
    // Efficiency deltas (away - home)
    pub delta_adj_em: f64,
    pub delta_adj_oe: f64,
    pub delta_adj_de: f64,
    pub delta_tempo: f64,

    // Shooting matchup signals
    /// Away offense eFG% vs home defense eFG% allowed.
    pub shooting_advantage: f64,
    /// Home offense eFG% vs away defense eFG% allowed.
    pub shooting_defense_advantage: f64,

    // Ball control signals
    /// Home turnover-forcing rate minus away turnover-commit rate
    /// (positive = home forces more than away commits).
    pub turnover_advantage: f64,
    /// Away offensive-rebound rate minus home offensive-rebound rate allowed
    /// (positive = away crashes the glass better than home prevents).
    pub rebounding_advantage: f64,

    // Tempo & pace control
    /// Absolute tempo difference (matchup volatility driver).
    pub tempo_mismatch: f64,
    pub pace_control: PaceControl,

    // Shooting style
    pub home_3pt_reliance: f64,
    pub away_3pt_reliance: f64,
    pub style_clash: StyleClash,

    /// Home court advantage in points (team-specific when the table has an
    /// entry, else national average, else the 3.5 default).
    pub home_court_factor: f64,

    // Context passthrough (populated from GameContext, not yet consumed by
    // the engine)
    pub rest_advantage: Option<i32>,
    pub travel_distance: Option<f64>,
}

/// Derive matchup features for an (away, home) pair.
///
/// Performs no I/O; the optional HCA table is an injected dependency and a
/// missing team name or entry silently falls back (see `home_court_factor`).
pub fn compute_features(
    away: &TeamRating,
    home: &TeamRating,
    hca: Option<&HcaTable>,
    ctx: Option<&GameContext>,
) -> MatchupFeatures {
    // Efficiency deltas
    let delta_adj_em = away.adj_em - home.adj_em;
    let delta_adj_oe = away.adj_oe - home.adj_oe;
    let delta_adj_de = away.adj_de - home.adj_de;
    let delta_tempo = away.tempo() - home.tempo();

    // Shooting matchup, both directions
    let shooting_advantage = away.efg() - home.defg();
    let shooting_defense_advantage = home.efg() - away.defg();

    // Ball control
    let turnover_advantage = home.dto() - away.to();
    let rebounding_advantage = away.or_rate() - home.dor_rate();

    // Tempo & pace control
    let tempo_mismatch = delta_tempo.abs();
    let pace_control = if tempo_mismatch > PACE_CONTROL_DEADBAND {
        if delta_tempo > 0.0 {
            PaceControl::AwayControls
        } else {
            PaceControl::HomeControls
        }
    } else {
        PaceControl::Neutral
    };

    // Style classification
    let home_3pt_reliance = home.fg3_share();
    let away_3pt_reliance = away.fg3_share();
    let style_clash = if (home_3pt_reliance - away_3pt_reliance).abs() > STYLE_CLASH_THRESHOLD {
        StyleClash::ThreePointVsInterior
    } else {
        StyleClash::Similar
    };

    let home_court = home_court_factor(Some(home.team.as_str()), hca);

    MatchupFeatures {
        delta_adj_em,
        delta_adj_oe,
        delta_adj_de,
        delta_tempo,
        shooting_advantage,
        shooting_defense_advantage,
        turnover_advantage,
        rebounding_advantage,
        tempo_mismatch,
        pace_control,
        home_3pt_reliance,
        away_3pt_reliance,
        style_clash,
        home_court_factor: home_court,
        rest_advantage: ctx.and_then(|c| c.rest_advantage()),
        travel_distance: ctx.and_then(|c| c.travel_distance()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hca::DEFAULT_HCA;
    use crate::models::{DEFAULT_EFG_PCT, DEFAULT_OR_PCT, DEFAULT_TO_PCT};

    fn away() -> TeamRating {
        let mut r = TeamRating::new("Oregon", 112.4, 96.1, 64.8, 10.5);
        r.efg_pct = Some(53.0);
        r.defg_pct = Some(48.5);
        r.to_pct = Some(17.2);
        r.dto_pct = Some(19.0);
        r.or_pct = Some(31.5);
        r.dor_pct = Some(27.0);
        r.off_fg3 = Some(35.0);
        r
    }

    fn home() -> TeamRating {
        let mut r = TeamRating::new("Gonzaga", 118.9, 94.3, 71.2, 11.2);
        r.efg_pct = Some(57.1);
        r.defg_pct = Some(47.8);
        r.to_pct = Some(16.0);
        r.dto_pct = Some(21.5);
        r.or_pct = Some(33.0);
        r.dor_pct = Some(25.5);
        r.off_fg3 = Some(24.0);
        r
    }

    #[test]
    fn test_deltas_are_away_minus_home() {
        let f = compute_features(&away(), &home(), None, None);
        assert!((f.delta_adj_em - (16.3 - 24.6)).abs() < 1e-9);
        assert!((f.delta_adj_oe - (112.4 - 118.9)).abs() < 1e-9);
        assert!((f.delta_adj_de - (96.1 - 94.3)).abs() < 1e-9);
        assert!((f.delta_tempo - (64.8 - 71.2)).abs() < 1e-9);
    }

    #[test]
    fn test_shooting_and_ball_control_signals() {
        let f = compute_features(&away(), &home(), None, None);
        // Away offense vs home defense
        assert!((f.shooting_advantage - (53.0 - 47.8)).abs() < 1e-9);
        // Home offense vs away defense
        assert!((f.shooting_defense_advantage - (57.1 - 48.5)).abs() < 1e-9);
        // Home forces (21.5) vs away commits (17.2)
        assert!((f.turnover_advantage - 4.3).abs() < 1e-9);
        // Away crashes (31.5) vs home allows (25.5)
        assert!((f.rebounding_advantage - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_pace_control_deadband() {
        let mut a = away();
        let mut h = home();

        // |delta| = 6.4 > 5.0, home faster -> home controls
        let f = compute_features(&a, &h, None, None);
        assert_eq!(f.pace_control, PaceControl::HomeControls);
        assert!((f.tempo_mismatch - 6.4).abs() < 1e-9);

        // Away faster by more than the deadband
        a.adj_tempo = Some(74.0);
        h.adj_tempo = Some(66.0);
        let f = compute_features(&a, &h, None, None);
        assert_eq!(f.pace_control, PaceControl::AwayControls);

        // Inside the deadband -> neutral
        a.adj_tempo = Some(68.0);
        h.adj_tempo = Some(64.0);
        let f = compute_features(&a, &h, None, None);
        assert_eq!(f.pace_control, PaceControl::Neutral);
    }

    #[test]
    fn test_style_clash_threshold() {
        // Gap 11.0 > 10.0 -> clash
        let f = compute_features(&away(), &home(), None, None);
        assert_eq!(f.style_clash, StyleClash::ThreePointVsInterior);

        let mut a = away();
        a.off_fg3 = Some(28.0); // gap 4.0
        let f = compute_features(&a, &home(), None, None);
        assert_eq!(f.style_clash, StyleClash::Similar);
    }

    #[test]
    fn test_missing_stats_use_defaults_not_errors() {
        let a = TeamRating::new("Mystery A", 105.0, 100.0, 68.0, 10.0);
        let h = TeamRating::new("Mystery H", 106.0, 99.0, 68.0, 10.0);
        let f = compute_features(&a, &h, None, None);
        assert_eq!(f.shooting_advantage, DEFAULT_EFG_PCT - DEFAULT_EFG_PCT);
        assert_eq!(f.turnover_advantage, DEFAULT_TO_PCT - DEFAULT_TO_PCT);
        assert_eq!(f.rebounding_advantage, DEFAULT_OR_PCT - DEFAULT_OR_PCT);
        assert_eq!(f.home_court_factor, DEFAULT_HCA);
    }

    #[test]
    fn test_team_specific_hca_flows_through() {
        let mut table = HcaTable::new(3.1);
        table.insert("Gonzaga", 4.1);
        let f = compute_features(&away(), &home(), Some(&table), None);
        assert_eq!(f.home_court_factor, 4.1);

        // Unknown home team falls back to the national average
        let mut h = home();
        h.team = "Nowhere Tech".to_string();
        let f = compute_features(&away(), &h, Some(&table), None);
        assert_eq!(f.home_court_factor, 3.1);
    }

    #[test]
    fn test_context_passthrough() {
        let ctx = GameContext {
            home_days_rest: Some(3),
            away_days_rest: Some(1),
            away_venue: Some("Matthew Knight Arena, Eugene, OR".to_string()),
            home_venue: Some("McCarthey Athletic Center, Spokane, WA".to_string()),
        };
        let f = compute_features(&away(), &home(), None, Some(&ctx));
        assert_eq!(f.rest_advantage, Some(2));
        assert_eq!(f.travel_distance, Some(500.0));

        let f = compute_features(&away(), &home(), None, None);
        assert_eq!(f.rest_advantage, None);
        assert_eq!(f.travel_distance, None);
    }

    #[test]
    fn test_classification_serde_strings() {
        let v = serde_json::to_value(StyleClash::ThreePointVsInterior).unwrap();
        assert_eq!(v, "3pt_vs_interior");
        let v = serde_json::to_value(PaceControl::HomeControls).unwrap();
        assert_eq!(v, "home_controls");
    }
}
