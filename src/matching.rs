//! Team-name normalization and ratings lookup.
//!
//! Sportsbook feeds and ratings snapshots spell team names differently
//! ("NC State" vs "N.C. State", "Ohio St" vs "Ohio St."). This module maps
//! book-side names onto ratings-side names and resolves lookups through the
//! same ladder the HCA table uses: exact, normalized, substring, fuzzy.

use rustc_hash::FxHashMap;
use strsim::jaro_winkler;
use tracing::warn;

use crate::error::{ModelError, TeamSide};
use crate::models::TeamRating;

/// Minimum jaro-winkler similarity to accept a fuzzy ratings lookup.
const FUZZY_THRESHOLD: f64 = 0.93;

/// Map a book-side team name to the ratings-side spelling.
///
/// Known aliases are checked first; otherwise a trailing " State" becomes
/// " St." (the ratings feed's abbreviation convention). Unknown names pass
/// through unchanged.
pub fn normalize_team_name(name: &str) -> String {
    let name = name.trim();
    let alias = match name {
        "UConn" | "UCONN" => "Connecticut",
        "UNC" => "North Carolina",
        "USC" => "Southern California",
        "UCF" => "Central Florida",
        "UNLV" => "Nevada Las Vegas",
        "SMU" => "Southern Methodist",
        "TCU" => "Texas Christian",
        "VCU" => "Virginia Commonwealth",
        "BYU" => "Brigham Young",
        "LSU" => "Louisiana St.",
        "Ole Miss" => "Mississippi",
        "Pitt" => "Pittsburgh",
        "Miami (FL)" => "Miami FL",
        "Miami (OH)" => "Miami OH",
        "NC State" => "N.C. State",
        "Penn St" => "Penn St.",
        "Ohio St" => "Ohio St.",
        "Michigan St" => "Michigan St.",
        "Florida St" => "Florida St.",
        "Kansas St" => "Kansas St.",
        "Iowa St" => "Iowa St.",
        "Oklahoma St" => "Oklahoma St.",
        "Oregon St" => "Oregon St.",
        "Washington St" => "Washington St.",
        "Colorado St" => "Colorado St.",
        "San Diego St" => "San Diego St.",
        "Boise St" => "Boise St.",
        "Utah St" => "Utah St.",
        "Fresno St" => "Fresno St.",
        "Arizona St" => "Arizona St.",
        "App State" | "Appalachian State" => "Appalachian St.",
        "St. Johns" => "St. John's",
        _ => "",
    };
    if !alias.is_empty() {
        return alias.to_string();
    }
    if let Some(stem) = name.strip_suffix(" State") {
        return format!("{} St.", stem);
    }
    name.to_string()
}

/// Ratings snapshot keyed by team name. Read-only after construction;
/// lookups never mutate the table.
#[derive(Debug, Clone, Default)]
pub struct RatingsTable {
    /// lowercase team name -> rating record
    teams: FxHashMap<String, TeamRating>,
}

impl RatingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ratings(ratings: impl IntoIterator<Item = TeamRating>) -> Self {
        let mut table = Self::new();
        for r in ratings {
            table.insert(r);
        }
        table
    }

    pub fn insert(&mut self, rating: TeamRating) {
        self.teams.insert(rating.team.trim().to_lowercase(), rating);
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamRating> {
        self.teams.values()
    }

    /// Case-insensitive exact lookup only.
    pub fn get(&self, team: &str) -> Option<&TeamRating> {
        self.teams.get(&team.trim().to_lowercase())
    }

    /// Resolve a book-side team name to its rating record.
    ///
    /// Ladder: exact (case-insensitive), normalized alias, substring
    /// containment, fuzzy. Fuzzy matches are logged; an unresolvable name is
    /// a `TeamNotFound` error carrying which side of the game it was.
    pub fn resolve(&self, name: &str, side: TeamSide) -> Result<&TeamRating, ModelError> {
        let needle = name.trim().to_lowercase();
        if let Some(r) = self.teams.get(&needle) {
            return Ok(r);
        }

        let normalized = normalize_team_name(name).to_lowercase();
        if let Some(r) = self.teams.get(&normalized) {
            return Ok(r);
        }

        if !needle.is_empty() {
            for (key, r) in &self.teams {
                if key.contains(&needle) || needle.contains(key.as_str()) {
                    return Ok(r);
                }
            }

            let mut best: Option<(f64, &TeamRating)> = None;
            for (key, r) in &self.teams {
                let score = jaro_winkler(&normalized, key);
                if score >= FUZZY_THRESHOLD && best.map_or(true, |(s, _)| score > s) {
                    best = Some((score, r));
                }
            }
            if let Some((score, r)) = best {
                warn!(name, matched = %r.team, score, "fuzzy ratings match");
                return Ok(r);
            }
        }

        Err(ModelError::TeamNotFound {
            side,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RatingsTable {
        RatingsTable::from_ratings([
            TeamRating::new("Connecticut", 118.0, 94.0, 67.0, 11.0),
            TeamRating::new("Michigan St.", 114.0, 95.0, 68.0, 10.8),
            TeamRating::new("N.C. State", 110.0, 99.0, 69.0, 10.2),
            TeamRating::new("Gonzaga", 119.0, 96.0, 70.5, 11.3),
        ])
    }

    #[test]
    fn test_normalize_known_aliases() {
        assert_eq!(normalize_team_name("UConn"), "Connecticut");
        assert_eq!(normalize_team_name("NC State"), "N.C. State");
        assert_eq!(normalize_team_name("Michigan St"), "Michigan St.");
        assert_eq!(normalize_team_name("Ole Miss"), "Mississippi");
        assert_eq!(normalize_team_name("St. Johns"), "St. John's");
    }

    #[test]
    fn test_normalize_state_suffix_rule() {
        assert_eq!(normalize_team_name("Morgan State"), "Morgan St.");
        assert_eq!(normalize_team_name("Ohio State"), "Ohio St.");
        // Unknown names pass through
        assert_eq!(normalize_team_name("Gonzaga"), "Gonzaga");
    }

    #[test]
    fn test_resolve_exact_and_case_insensitive() {
        let t = table();
        assert_eq!(t.resolve("Gonzaga", TeamSide::Home).unwrap().team, "Gonzaga");
        assert_eq!(t.resolve("gonzaga", TeamSide::Home).unwrap().team, "Gonzaga");
    }

    #[test]
    fn test_resolve_via_normalization() {
        let t = table();
        assert_eq!(
            t.resolve("UConn", TeamSide::Away).unwrap().team,
            "Connecticut"
        );
        assert_eq!(
            t.resolve("Michigan St", TeamSide::Home).unwrap().team,
            "Michigan St."
        );
    }

    #[test]
    fn test_resolve_via_substring() {
        let t = table();
        assert_eq!(
            t.resolve("Gonzaga Bulldogs", TeamSide::Home).unwrap().team,
            "Gonzaga"
        );
    }

    #[test]
    fn test_resolve_miss_reports_side_and_name() {
        let t = table();
        let err = t.resolve("Hogwarts", TeamSide::Away).unwrap_err();
        match err {
            ModelError::TeamNotFound { side, name } => {
                assert_eq!(side, TeamSide::Away);
                assert_eq!(name, "Hogwarts");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_message_names_the_side() {
        let t = table();
        let err = t.resolve("Hogwarts", TeamSide::Home).unwrap_err();
        assert_eq!(
            err.to_string(),
            "home team 'Hogwarts' not found in ratings table"
        );
    }
}
