//! Home-court-advantage lookup table.
//!
//! This module provides:
//! - Team-specific HCA points keyed by team name
//! - Case-insensitive, substring, and fuzzy lookup (same ladder as the
//!   ratings-table matcher)
//! - A process-wide memoized snapshot with an explicit clear for tests
//!
//! The feature extractor takes the table as an explicit parameter; the global
//! cache is only a convenience so callers can load one snapshot per process.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use tracing::warn;

/// Default home court advantage in college basketball (points), used when no
/// team-specific table is available.
pub const DEFAULT_HCA: f64 = 3.5;

/// Minimum jaro-winkler similarity to accept a fuzzy HCA lookup.
const FUZZY_THRESHOLD: f64 = 0.93;

/// Home-court-advantage snapshot: team name -> points, plus a national
/// average fallback. Read-only after construction.
#[derive(Debug, Clone)]
pub struct HcaTable {
    /// lowercase team name -> (original name, HCA points)
    teams: FxHashMap<String, (String, f64)>,
    national_avg: f64,
    snapshot_date: Option<NaiveDate>,
}

/// Serialized snapshot layout, matching the collector's JSON export.
#[derive(Debug, Serialize, Deserialize)]
struct HcaSnapshotJson {
    national_avg_hca: f64,
    #[serde(default)]
    snapshot_date: Option<NaiveDate>,
    teams: FxHashMap<String, f64>,
}

impl HcaTable {
    pub fn new(national_avg: f64) -> Self {
        Self {
            teams: FxHashMap::default(),
            national_avg,
            snapshot_date: None,
        }
    }

    /// Parse a snapshot from its JSON export.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let raw: HcaSnapshotJson = serde_json::from_str(content)?;
        let mut table = Self::new(raw.national_avg_hca);
        table.snapshot_date = raw.snapshot_date;
        for (name, points) in raw.teams {
            table.insert(&name, points);
        }
        Ok(table)
    }

    pub fn insert(&mut self, team: &str, points: f64) {
        self.teams
            .insert(team.trim().to_lowercase(), (team.trim().to_string(), points));
    }

    pub fn national_avg(&self) -> f64 {
        self.national_avg
    }

    pub fn snapshot_date(&self) -> Option<NaiveDate> {
        self.snapshot_date
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Team-specific HCA lookup: exact (case-insensitive), then substring
    /// containment, then fuzzy. Returns `None` when nothing clears the
    /// fuzzy threshold.
    pub fn get(&self, team: &str) -> Option<f64> {
        let needle = team.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Some((_, points)) = self.teams.get(&needle) {
            return Some(*points);
        }

        // Substring containment either way ("Kansas" vs "Kansas Jayhawks").
        for (key, (_, points)) in &self.teams {
            if key.contains(&needle) || needle.contains(key.as_str()) {
                return Some(*points);
            }
        }

        // Fuzzy fallback for spelling variants.
        let mut best: Option<(f64, &str, f64)> = None;
        for (key, (original, points)) in &self.teams {
            let score = jaro_winkler(&needle, key);
            if score >= FUZZY_THRESHOLD && best.map_or(true, |(s, _, _)| score > s) {
                best = Some((score, original.as_str(), *points));
            }
        }
        if let Some((score, matched, points)) = best {
            warn!(team, matched, score, "fuzzy HCA match");
            return Some(points);
        }
        None
    }
}

// ============================================================================
// Process-wide snapshot cache
// ============================================================================

static HCA_CACHE: Mutex<Option<Arc<HcaTable>>> = Mutex::new(None);

/// The memoized snapshot, if one has been set.
pub fn cached_hca() -> Option<Arc<HcaTable>> {
    HCA_CACHE.lock().clone()
}

/// Memoize a snapshot for the process lifetime. The table is never mutated
/// after this point, so readers only need the clone of the `Arc`.
pub fn set_cached_hca(table: HcaTable) -> Arc<HcaTable> {
    let arc = Arc::new(table);
    *HCA_CACHE.lock() = Some(arc.clone());
    arc
}

/// Clear the memoized snapshot (test isolation).
pub fn clear_hca_cache() {
    *HCA_CACHE.lock() = None;
}

/// Resolve the home-court factor for a team: team-specific value from the
/// table, else the table's national average, else `DEFAULT_HCA`. A missing
/// team name silently falls back; this never errors.
pub fn home_court_factor(team: Option<&str>, table: Option<&HcaTable>) -> f64 {
    let Some(table) = table else {
        return DEFAULT_HCA;
    };
    if let Some(name) = team {
        if let Some(points) = table.get(name) {
            return points;
        }
    }
    table.national_avg()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> HcaTable {
        let mut t = HcaTable::new(3.2);
        t.insert("Kansas", 4.3);
        t.insert("Gonzaga", 3.9);
        t.insert("Oregon St.", 2.8);
        t
    }

    #[test]
    fn test_exact_and_case_insensitive_lookup() {
        let t = sample_table();
        assert_eq!(t.get("Kansas"), Some(4.3));
        assert_eq!(t.get("kansas"), Some(4.3));
        assert_eq!(t.get("  GONZAGA "), Some(3.9));
    }

    #[test]
    fn test_substring_lookup() {
        let t = sample_table();
        assert_eq!(t.get("Kansas Jayhawks"), Some(4.3));
        assert_eq!(t.get("Oregon"), Some(2.8)); // contained in "oregon st."
    }

    #[test]
    fn test_miss_falls_back_to_national_average() {
        let t = sample_table();
        assert_eq!(t.get("Duke"), None);
        assert_eq!(home_court_factor(Some("Duke"), Some(&t)), 3.2);
    }

    #[test]
    fn test_no_table_falls_back_to_default() {
        assert_eq!(home_court_factor(Some("Kansas"), None), DEFAULT_HCA);
        assert_eq!(home_court_factor(None, None), DEFAULT_HCA);
    }

    #[test]
    fn test_missing_name_uses_national_average() {
        let t = sample_table();
        assert_eq!(home_court_factor(None, Some(&t)), 3.2);
    }

    #[test]
    fn test_from_json_round_trip() {
        let json = r#"{
            "national_avg_hca": 3.4,
            "snapshot_date": "2025-12-21",
            "teams": {"Kansas": 4.3, "Duke": 4.0}
        }"#;
        let t = HcaTable::from_json(json).unwrap();
        assert_eq!(t.national_avg(), 3.4);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("duke"), Some(4.0));
        assert_eq!(
            t.snapshot_date(),
            NaiveDate::from_ymd_opt(2025, 12, 21)
        );
    }

    #[test]
    fn test_cache_set_get_clear() {
        clear_hca_cache();
        assert!(cached_hca().is_none());
        set_cached_hca(sample_table());
        let cached = cached_hca().expect("cache set");
        assert_eq!(cached.get("Kansas"), Some(4.3));
        clear_hca_cache();
        assert!(cached_hca().is_none());
    }
}
