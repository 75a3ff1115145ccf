//! Hoopedge Core - NCAA basketball margin prediction and market edge detection.
//!
//! This module provides:
//! - Matchup feature extraction from team efficiency ratings
//! - Baseline and enhanced margin prediction with game-specific variance
//! - Score projection via simple-average and log-linear efficiency crossover
//! - Edge detection comparing model output to market spreads and moneylines
//! - Expected value and Kelly stake calculation
//! - Batch slate processing with rayon
//!
//! The crate is a pure computation core: it consumes team rating and market
//! odds records produced by external collectors and performs no I/O of its
//! own beyond an optional memoized home-court-advantage snapshot.

pub mod edge;
pub mod error;
pub mod hca;
pub mod matching;
pub mod matchup;
pub mod math;
pub mod models;
pub mod prediction;
pub mod projection;
pub mod slate;

pub use edge::{
    cover_probability, decimal_odds, evaluate_moneyline, evaluate_spread, evaluate_total,
    expected_value, implied_probability, kelly_fraction, EdgeStrength, MoneylineEdge, SpreadEdge,
    TotalEdge,
};
pub use error::{ModelError, TeamSide};
pub use hca::{clear_hca_cache, home_court_factor, HcaTable, DEFAULT_HCA};
pub use matching::{normalize_team_name, RatingsTable};
pub use matchup::{compute_features, MatchupFeatures, PaceControl, StyleClash};
pub use models::{GameContext, MarketOdds, TeamRating};
pub use prediction::{
    predict_game, AdjustmentBreakdown, MarginPrediction, ModelCoefficients, SigmaComponents,
};
pub use projection::{
    project_scores, project_scores_loglinear, EnhancedScoreProjection, ProjectionMethod,
    ScoreProjection,
};
pub use slate::{analyze_game, build_slate, project_slate, GameReport, ProjectionRow, SlateGame};
