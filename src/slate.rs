//! Slate analysis: full-day batch prediction and edge reports.
//!
//! Ties the pipeline together for a list of games: resolve team names
//! against the ratings snapshot, derive matchup features, run the margin
//! model, project scores, and (when odds are attached) evaluate spread,
//! moneyline, and total edges. Games are independent, so the batch paths
//! fan out with rayon; a bad game yields its own `Err` without poisoning
//! the rest of the slate.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::edge::{evaluate_moneyline, evaluate_spread, evaluate_total};
use crate::edge::{MoneylineEdge, SpreadEdge, TotalEdge};
use crate::error::{ModelError, TeamSide};
use crate::hca::HcaTable;
use crate::matching::RatingsTable;
use crate::matchup::compute_features;
use crate::models::{GameContext, MarketOdds};
use crate::prediction::{predict_game, AdjustmentBreakdown, ModelCoefficients, SigmaComponents};
use crate::projection::{
    project_scores, project_scores_loglinear, ProjectionMethod, DEFAULT_K,
};

/// One game on the slate, as delivered by the schedule/odds feed. Team names
/// are book-side spellings and get resolved during analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlateGame {
    pub away_team: String,
    pub home_team: String,
    #[serde(default)]
    pub odds: Option<MarketOdds>,
    #[serde(default)]
    pub context: Option<GameContext>,
}

/// Flat per-game report row, ready for JSON export or tabulation.
///
/// Team names are the resolved ratings-side spellings. Edge sections are
/// absent when the game carried no odds (or the book skipped that market).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameReport {
    pub away_team: String,
    pub home_team: String,

    // Team inputs as seen by the model
    pub away_adj_em: f64,
    pub home_adj_em: f64,
    pub away_tempo: f64,
    pub home_tempo: f64,
    pub away_sigma: f64,
    pub home_sigma: f64,

    // Margin model (home perspective)
    pub margin_baseline: f64,
    pub margin_enhanced: f64,
    pub margin_adjustment: f64,
    pub adjustment_breakdown: AdjustmentBreakdown,
    pub sigma_baseline: f64,
    pub sigma_game: f64,
    pub sigma_components: SigmaComponents,
    pub win_prob_home: f64,
    pub win_prob_away: f64,

    // Matchup signals
    pub home_court_factor: f64,
    pub shooting_advantage: f64,
    pub shooting_defense_advantage: f64,
    pub turnover_advantage: f64,
    pub rebounding_advantage: f64,
    pub tempo_mismatch: f64,
    pub pace_control: crate::matchup::PaceControl,
    pub style_clash: crate::matchup::StyleClash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_advantage: Option<i32>,

    // Score projection (log-linear, luck-regressed)
    pub proj_score_home: f64,
    pub proj_score_away: f64,
    pub proj_total: f64,

    // Market edges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread_edge: Option<SpreadEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moneyline_edge: Option<MoneylineEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_edge: Option<TotalEdge>,
}

/// One row of the projection table built by `project_slate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub away_team: String,
    pub home_team: String,
    pub method: ProjectionMethod,
    pub score_home: f64,
    pub score_away: f64,
    pub total: f64,
    /// home - away.
    pub margin: f64,
    pub possessions: f64,
    pub win_prob_home: f64,
}

/// Analyze one game end to end.
///
/// Resolves both names through the matching ladder, predicts the margin with
/// the enhanced model, projects scores log-linearly with luck regression,
/// and evaluates whatever markets the odds record offers.
pub fn analyze_game(
    away_name: &str,
    home_name: &str,
    ratings: &RatingsTable,
    odds: Option<&MarketOdds>,
    context: Option<&GameContext>,
    hca: Option<&HcaTable>,
    coefficients: Option<&ModelCoefficients>,
) -> Result<GameReport, ModelError> {
    let away = ratings.resolve(away_name, TeamSide::Away)?;
    let home = ratings.resolve(home_name, TeamSide::Home)?;

    let features = compute_features(away, home, hca, context);
    let home_court_factor = features.home_court_factor;
    let shooting_advantage = features.shooting_advantage;
    let shooting_defense_advantage = features.shooting_defense_advantage;
    let turnover_advantage = features.turnover_advantage;
    let rebounding_advantage = features.rebounding_advantage;
    let tempo_mismatch = features.tempo_mismatch;
    let pace_control = features.pace_control;
    let style_clash = features.style_clash;
    let rest_advantage = features.rest_advantage;

    let prediction = predict_game(away, home, Some(features), coefficients)?;

    let projection =
        project_scores_loglinear(home, away, home_court_factor, DEFAULT_K, None, true);

    let (spread_edge, moneyline_edge, total_edge) = match odds {
        Some(odds) => (
            Some(evaluate_spread(
                prediction.margin_enhanced,
                prediction.sigma_game,
                odds,
            )),
            evaluate_moneyline(prediction.win_prob_enhanced_home, odds),
            evaluate_total(projection.total, odds),
        ),
        None => (None, None, None),
    };

    Ok(GameReport {
        away_team: away.team.clone(),
        home_team: home.team.clone(),
        away_adj_em: away.adj_em,
        home_adj_em: home.adj_em,
        away_tempo: away.tempo(),
        home_tempo: home.tempo(),
        away_sigma: away.sigma,
        home_sigma: home.sigma,
        margin_baseline: prediction.margin_baseline,
        margin_enhanced: prediction.margin_enhanced,
        margin_adjustment: prediction.margin_adjustment,
        adjustment_breakdown: prediction.adjustment_breakdown,
        sigma_baseline: prediction.sigma_baseline,
        sigma_game: prediction.sigma_game,
        sigma_components: prediction.sigma_components,
        win_prob_home: prediction.win_prob_enhanced_home,
        win_prob_away: prediction.win_prob_enhanced_away,
        home_court_factor,
        shooting_advantage,
        shooting_defense_advantage,
        turnover_advantage,
        rebounding_advantage,
        tempo_mismatch,
        pace_control,
        style_clash,
        rest_advantage,
        proj_score_home: projection.score_home,
        proj_score_away: projection.score_visitor,
        proj_total: projection.total,
        spread_edge,
        moneyline_edge,
        total_edge,
    })
}

/// Analyze a full slate in parallel. Output order matches input order; each
/// game resolves or fails on its own.
pub fn build_slate(
    games: &[SlateGame],
    ratings: &RatingsTable,
    hca: Option<&HcaTable>,
    coefficients: Option<&ModelCoefficients>,
) -> Vec<Result<GameReport, ModelError>> {
    games
        .par_iter()
        .map(|g| {
            analyze_game(
                &g.away_team,
                &g.home_team,
                ratings,
                g.odds.as_ref(),
                g.context.as_ref(),
                hca,
                coefficients,
            )
        })
        .collect()
}

/// Build a projection table for a slate with the chosen formulation.
///
/// `home_adv` is in points; `k` is the win-probability scale. Both variants
/// report home win probability from the same margin sign convention.
pub fn project_slate(
    games: &[SlateGame],
    ratings: &RatingsTable,
    method: ProjectionMethod,
    home_adv: f64,
    k: f64,
) -> Vec<Result<ProjectionRow, ModelError>> {
    games
        .par_iter()
        .map(|g| {
            let away = ratings.resolve(&g.away_team, TeamSide::Away)?;
            let home = ratings.resolve(&g.home_team, TeamSide::Home)?;

            let row = match method {
                ProjectionMethod::SimpleAverage => {
                    let p = project_scores(home, away, home_adv, k);
                    ProjectionRow {
                        away_team: away.team.clone(),
                        home_team: home.team.clone(),
                        method,
                        score_home: p.score_home,
                        score_away: p.score_visitor,
                        total: p.total,
                        margin: p.margin,
                        possessions: p.possessions,
                        win_prob_home: p.win_prob_home,
                    }
                }
                ProjectionMethod::LogLinear => {
                    let p = project_scores_loglinear(home, away, home_adv, k, None, true);
                    ProjectionRow {
                        away_team: away.team.clone(),
                        home_team: home.team.clone(),
                        method,
                        score_home: p.score_home,
                        score_away: p.score_visitor,
                        total: p.total,
                        margin: p.margin,
                        possessions: p.possessions,
                        win_prob_home: p.win_prob_home,
                    }
                }
            };
            Ok(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamRating;

    fn ratings() -> RatingsTable {
        let mut gonzaga = TeamRating::new("Gonzaga", 119.2, 94.6, 71.2, 11.2);
        gonzaga.efg_pct = Some(57.1);
        gonzaga.defg_pct = Some(47.8);
        gonzaga.off_fg3 = Some(24.0);
        gonzaga.luck = Some(0.02);

        let mut oregon = TeamRating::new("Oregon", 112.4, 96.1, 64.8, 10.5);
        oregon.efg_pct = Some(53.0);
        oregon.defg_pct = Some(48.5);
        oregon.off_fg3 = Some(35.0);

        RatingsTable::from_ratings([
            gonzaga,
            oregon,
            TeamRating::new("Kansas St.", 110.0, 98.0, 67.0, 10.4),
            TeamRating::new("Connecticut", 118.0, 93.5, 66.0, 10.9),
        ])
    }

    fn odds() -> MarketOdds {
        MarketOdds {
            home_team: "Gonzaga".to_string(),
            away_team: "Oregon".to_string(),
            home_spread: -7.5,
            home_spread_price: -110,
            home_ml: Some(-320),
            away_ml: Some(260),
            total: Some(151.5),
            over_price: -110,
            under_price: -110,
            game_time: None,
        }
    }

    #[test]
    fn test_analyze_game_without_odds() {
        let r = ratings();
        let report = analyze_game("Oregon", "Gonzaga", &r, None, None, None, None).unwrap();
        assert_eq!(report.home_team, "Gonzaga");
        assert_eq!(report.away_team, "Oregon");
        // Gonzaga is the stronger side at home
        assert!(report.margin_enhanced > 0.0);
        assert!(report.win_prob_home > 0.5);
        assert_eq!(report.win_prob_home + report.win_prob_away, 1.0);
        assert!(report.spread_edge.is_none());
        assert!(report.moneyline_edge.is_none());
        assert!(report.total_edge.is_none());
        // Sanity range for a college total
        assert!(report.proj_total > 110.0 && report.proj_total < 200.0);
    }

    #[test]
    fn test_analyze_game_with_odds_populates_edges() {
        let r = ratings();
        let o = odds();
        let report =
            analyze_game("Oregon", "Gonzaga", &r, Some(&o), None, None, None).unwrap();
        let spread = report.spread_edge.expect("spread edge");
        assert!((spread.market_spread + 7.5).abs() < 1e-12);
        assert!(
            (spread.edge_points - (report.margin_enhanced - 7.5)).abs() < 1e-9
        );
        assert!(report.moneyline_edge.is_some());
        let total = report.total_edge.expect("total edge");
        assert!((total.edge_points - (report.proj_total - 151.5)).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_game_resolves_book_names() {
        let r = ratings();
        let report =
            analyze_game("UConn", "Kansas St", &r, None, None, None, None).unwrap();
        assert_eq!(report.away_team, "Connecticut");
        assert_eq!(report.home_team, "Kansas St.");
    }

    #[test]
    fn test_analyze_game_unknown_team_errors() {
        let r = ratings();
        let err =
            analyze_game("Hogwarts", "Gonzaga", &r, None, None, None, None).unwrap_err();
        assert!(matches!(
            err,
            ModelError::TeamNotFound {
                side: TeamSide::Away,
                ..
            }
        ));
    }

    #[test]
    fn test_build_slate_isolates_failures_and_keeps_order() {
        let r = ratings();
        let games = vec![
            SlateGame {
                away_team: "Oregon".to_string(),
                home_team: "Gonzaga".to_string(),
                odds: Some(odds()),
                context: None,
            },
            SlateGame {
                away_team: "Hogwarts".to_string(),
                home_team: "Gonzaga".to_string(),
                odds: None,
                context: None,
            },
            SlateGame {
                away_team: "UConn".to_string(),
                home_team: "Kansas St.".to_string(),
                odds: None,
                context: None,
            },
        ];
        let reports = build_slate(&games, &r, None, None);
        assert_eq!(reports.len(), 3);
        assert!(reports[0].is_ok());
        assert!(reports[1].is_err());
        let third = reports[2].as_ref().unwrap();
        assert_eq!(third.away_team, "Connecticut");
    }

    #[test]
    fn test_slate_results_match_single_game_analysis() {
        let r = ratings();
        let games = vec![SlateGame {
            away_team: "Oregon".to_string(),
            home_team: "Gonzaga".to_string(),
            odds: Some(odds()),
            context: None,
        }];
        let batch = build_slate(&games, &r, None, None);
        let single =
            analyze_game("Oregon", "Gonzaga", &r, Some(odds()).as_ref(), None, None, None)
                .unwrap();
        let batched = batch[0].as_ref().unwrap();
        assert_eq!(batched.margin_enhanced.to_bits(), single.margin_enhanced.to_bits());
        assert_eq!(batched.win_prob_home.to_bits(), single.win_prob_home.to_bits());
    }

    #[test]
    fn test_project_slate_both_methods() {
        let r = ratings();
        let games = vec![SlateGame {
            away_team: "Oregon".to_string(),
            home_team: "Gonzaga".to_string(),
            odds: None,
            context: None,
        }];

        let simple = project_slate(&games, &r, ProjectionMethod::SimpleAverage, 3.0, DEFAULT_K);
        let row = simple[0].as_ref().unwrap();
        assert_eq!(row.method, ProjectionMethod::SimpleAverage);
        assert!((row.margin - (row.score_home - row.score_away)).abs() < 1e-12);

        let loglin = project_slate(&games, &r, ProjectionMethod::LogLinear, 3.0, DEFAULT_K);
        let row2 = loglin[0].as_ref().unwrap();
        assert_eq!(row2.method, ProjectionMethod::LogLinear);
        // The two formulations agree on the favorite
        assert_eq!(row.margin > 0.0, row2.margin > 0.0);
    }

    #[test]
    fn test_game_report_json_round_trip_is_exact() {
        let r = ratings();
        let report =
            analyze_game("Oregon", "Gonzaga", &r, Some(&odds()), None, None, None).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let back: GameReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.margin_enhanced.to_bits(), report.margin_enhanced.to_bits());
        assert_eq!(back.sigma_game.to_bits(), report.sigma_game.to_bits());
        assert_eq!(back.win_prob_home.to_bits(), report.win_prob_home.to_bits());
        assert_eq!(
            back.spread_edge.unwrap().edge_points.to_bits(),
            report.spread_edge.unwrap().edge_points.to_bits()
        );
    }
}
