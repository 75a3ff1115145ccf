// Shared input records for the Hoopedge prediction core
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// League-average defaults (applied when an optional stat is missing)
// ============================================================================

/// Effective field goal %, either direction.
pub const DEFAULT_EFG_PCT: f64 = 50.0;
/// Turnover % committed or forced.
pub const DEFAULT_TO_PCT: f64 = 20.0;
/// Offensive rebound % grabbed or allowed.
pub const DEFAULT_OR_PCT: f64 = 30.0;
/// Share of points scored from 3-pointers.
pub const DEFAULT_FG3_SHARE: f64 = 30.0;
/// Possessions per 40 minutes.
pub const DEFAULT_TEMPO: f64 = 68.0;

// ============================================================================
// Team Rating (per team, per snapshot date)
// ============================================================================

/// Opponent-adjusted team rating snapshot.
///
/// Produced externally by the ratings collector and consumed read-only.
/// Efficiency fields (`adj_oe`, `adj_de`, `adj_em`) and `sigma` are always
/// present; Four Factors and point-distribution fields are optional and
/// resolve to league-average defaults through the accessor methods. Missing
/// optional fields are never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRating {
    pub team: String,
    /// Adjusted offensive efficiency (points per 100 possessions).
    pub adj_oe: f64,
    /// Adjusted defensive efficiency (points allowed per 100 possessions).
    pub adj_de: f64,
    /// Adjusted efficiency margin (approximately adj_oe - adj_de).
    pub adj_em: f64,
    /// Adjusted tempo, possessions per 40 minutes.
    #[serde(default)]
    pub adj_tempo: Option<f64>,
    /// Standard deviation of the team's scoring margin.
    pub sigma: f64,

    // Four Factors (offense / defense)
    #[serde(default)]
    pub efg_pct: Option<f64>,
    #[serde(default)]
    pub defg_pct: Option<f64>,
    #[serde(default)]
    pub to_pct: Option<f64>,
    #[serde(default)]
    pub dto_pct: Option<f64>,
    #[serde(default)]
    pub or_pct: Option<f64>,
    #[serde(default)]
    pub dor_pct: Option<f64>,
    #[serde(default)]
    pub ft_rate: Option<f64>,

    /// Share of points scored from 3-pointers (point distribution).
    #[serde(default)]
    pub off_fg3: Option<f64>,
    /// Actual wins minus expected wins, roughly in [-0.10, 0.10].
    #[serde(default)]
    pub luck: Option<f64>,
    #[serde(default)]
    pub data_through: Option<NaiveDate>,
}

impl TeamRating {
    /// Minimal rating with only the always-present fields populated.
    pub fn new(team: impl Into<String>, adj_oe: f64, adj_de: f64, adj_tempo: f64, sigma: f64) -> Self {
        Self {
            team: team.into(),
            adj_oe,
            adj_de,
            adj_em: adj_oe - adj_de,
            adj_tempo: Some(adj_tempo),
            sigma,
            efg_pct: None,
            defg_pct: None,
            to_pct: None,
            dto_pct: None,
            or_pct: None,
            dor_pct: None,
            ft_rate: None,
            off_fg3: None,
            luck: None,
            data_through: None,
        }
    }

    /// Tempo, falling back to the league average.
    #[inline]
    pub fn tempo(&self) -> f64 {
        self.adj_tempo.unwrap_or(DEFAULT_TEMPO)
    }

    /// Offensive effective FG%, falling back to the league average.
    #[inline]
    pub fn efg(&self) -> f64 {
        self.efg_pct.unwrap_or(DEFAULT_EFG_PCT)
    }

    /// Defensive effective FG% allowed, falling back to the league average.
    #[inline]
    pub fn defg(&self) -> f64 {
        self.defg_pct.unwrap_or(DEFAULT_EFG_PCT)
    }

    /// Turnover % committed, falling back to the league average.
    #[inline]
    pub fn to(&self) -> f64 {
        self.to_pct.unwrap_or(DEFAULT_TO_PCT)
    }

    /// Turnover % forced, falling back to the league average.
    #[inline]
    pub fn dto(&self) -> f64 {
        self.dto_pct.unwrap_or(DEFAULT_TO_PCT)
    }

    /// Offensive rebound %, falling back to the league average.
    #[inline]
    pub fn or_rate(&self) -> f64 {
        self.or_pct.unwrap_or(DEFAULT_OR_PCT)
    }

    /// Offensive rebound % allowed, falling back to the league average.
    #[inline]
    pub fn dor_rate(&self) -> f64 {
        self.dor_pct.unwrap_or(DEFAULT_OR_PCT)
    }

    /// Share of points from 3-pointers, falling back to the league average.
    #[inline]
    pub fn fg3_share(&self) -> f64 {
        self.off_fg3.unwrap_or(DEFAULT_FG3_SHARE)
    }
}

// ============================================================================
// Market Odds (per game)
// ============================================================================

/// Market odds record for one game.
///
/// Spread is from the home team perspective (negative = home favored).
/// American prices; a missing moneyline means the book did not offer one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOdds {
    pub home_team: String,
    pub away_team: String,
    /// Home spread (negative = home favored).
    pub home_spread: f64,
    /// American price on the home spread, typically -110.
    #[serde(default = "default_price")]
    pub home_spread_price: i32,
    #[serde(default)]
    pub home_ml: Option<i32>,
    #[serde(default)]
    pub away_ml: Option<i32>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default = "default_price")]
    pub over_price: i32,
    #[serde(default = "default_price")]
    pub under_price: i32,
    #[serde(default)]
    pub game_time: Option<String>,
}

fn default_price() -> i32 {
    -110
}

// ============================================================================
// Game Context (rest & travel metadata)
// ============================================================================

/// Optional game-specific context beyond team statistics.
///
/// When absent, the derived matchup features carry `None` for rest and
/// travel; the prediction engine does not yet consume them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameContext {
    #[serde(default)]
    pub away_days_rest: Option<i32>,
    #[serde(default)]
    pub home_days_rest: Option<i32>,
    /// Away team's home venue, e.g. "Matthew Knight Arena, Eugene, OR".
    #[serde(default)]
    pub away_venue: Option<String>,
    /// Host venue.
    #[serde(default)]
    pub home_venue: Option<String>,
}

impl GameContext {
    /// Days-rest differential (positive = home has more rest).
    pub fn rest_advantage(&self) -> Option<i32> {
        match (self.home_days_rest, self.away_days_rest) {
            (Some(h), Some(a)) => Some(h - a),
            _ => None,
        }
    }

    /// Rough travel distance in miles from the away team's venue to the host
    /// venue, estimated from trailing state codes. Same state reads as a
    /// short conference trip, different states as a generic road trip; a
    /// precise figure would need geocoding.
    pub fn travel_distance(&self) -> Option<f64> {
        let away_state = extract_state_code(self.away_venue.as_deref()?)?;
        let home_state = extract_state_code(self.home_venue.as_deref()?)?;
        if away_state == home_state {
            Some(100.0)
        } else {
            Some(500.0)
        }
    }
}

/// Extract a trailing two-letter state code from a venue string
/// (common pattern: "Arena, City, ST").
fn extract_state_code(venue: &str) -> Option<&str> {
    for part in venue.rsplit(',') {
        let token = part.trim();
        if token.len() == 2 && token.bytes().all(|b| b.is_ascii_uppercase()) {
            return Some(token);
        }
    }
    None
}
