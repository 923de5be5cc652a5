//! Wrapped API response models.
//!
//! Field names follow the backend's JSON. Every model keeps the fields this
//! crate does not interpret in `extra`, so a decoded payload re-serializes
//! without losing anything.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /league/{id}/info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub league_name: String,
    pub team_count: u32,
    pub current_week: u32,
    pub final_week: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /league/{id}/teams`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueTeams {
    pub teams: Vec<TeamRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRef {
    pub team_id: u32,
    pub team_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LeagueTeams {
    pub fn name_of(&self, team_id: u32) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.team_id == team_id)
            .map(|t| t.team_name.as_str())
    }
}

/// `GET /league/{id}/analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueAnalysis {
    pub league_id: String,
    pub year: u16,
    /// e.g. `"1-14"`
    pub weeks_analyzed: String,
    /// Per-team statistics keyed by team id (JSON object keys are strings).
    #[serde(default)]
    pub team_stats: BTreeMap<String, Value>,
    #[serde(default)]
    pub league_stats: Value,
    #[serde(default)]
    pub team_names: BTreeMap<String, String>,
    #[serde(default)]
    pub processing_errors: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Records {
    pub actual: WinLoss,
    pub optimal: WinLoss,
    pub optimal_vs_actual: WinLoss,
    pub win_difference: i32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_errors: u32,
    pub total_points_lost: f64,
    pub total_points: f64,
    pub total_optimal_points: f64,
    pub avg_points_per_week: f64,
    #[serde(default)]
    pub perfect_weeks: Vec<Value>,
    pub perfect_week_count: u32,
    pub error_rank: u32,
    pub error_percentile: f64,
    pub standing: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A player mention anywhere in a wrapped payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One week of a team's season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub week: u32,
    #[serde(default)]
    pub opponent_id: Option<u32>,
    pub my_score: f64,
    pub opp_score: f64,
    #[serde(default)]
    pub my_optimal: Option<f64>,
    pub won: bool,
    #[serde(default)]
    pub starters: Vec<PlayerRef>,
    #[serde(default)]
    pub is_perfect: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /league/{id}/team/{team}/wrapped`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamWrapped {
    pub team_id: u32,
    pub team_name: String,
    #[serde(default)]
    pub team_names: BTreeMap<String, String>,
    pub overview: Overview,
    pub records: Records,
    #[serde(default)]
    pub top_scorers: Vec<PlayerRef>,
    #[serde(default)]
    pub highest_scorer_week: Option<PlayerRef>,
    #[serde(default)]
    pub highest_bench_week: Option<PlayerRef>,
    #[serde(default)]
    pub most_slept_on: Option<PlayerRef>,
    #[serde(default)]
    pub most_overrated: Option<PlayerRef>,
    #[serde(default)]
    pub weekly_data: Vec<WeekSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TeamWrapped {
    /// Unique player names referenced by the payload, in first-seen order.
    ///
    /// Covers top scorers, the single-week highlights, and every weekly
    /// starter: the set a headshot preloader needs.
    pub fn player_names(&self) -> Vec<String> {
        let highlights = [
            &self.highest_scorer_week,
            &self.highest_bench_week,
            &self.most_slept_on,
            &self.most_overrated,
        ];

        let mentions = self
            .top_scorers
            .iter()
            .chain(highlights.into_iter().flatten())
            .chain(self.weekly_data.iter().flat_map(|w| w.starters.iter()));

        let mut seen = HashSet::new();
        mentions
            .filter(|p| !p.name.is_empty() && seen.insert(p.name.as_str()))
            .map(|p| p.name.clone())
            .collect()
    }

    /// Name of an opponent by id, from the league-wide name map.
    pub fn team_name_of(&self, team_id: u32) -> Option<&str> {
        self.team_names.get(&team_id.to_string()).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupSide {
    pub score: f64,
    #[serde(default)]
    pub won: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyMatchup {
    pub my_team: MatchupSide,
    pub opponent: MatchupSide,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /league/{id}/week/{week}/deep-dive`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekDeepDive {
    #[serde(default)]
    pub my_matchup: Option<MyMatchup>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Win/loss and score line for the selected team in one week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekResult {
    pub won: bool,
    pub my_score: f64,
    pub opp_score: f64,
}

impl WeekDeepDive {
    /// The selected team's result, when the payload carries its matchup.
    ///
    /// Falls back to comparing scores when the backend omits `won`.
    pub fn result(&self) -> Option<WeekResult> {
        let matchup = self.my_matchup.as_ref()?;
        let my_score = matchup.my_team.score;
        let opp_score = matchup.opponent.score;
        Some(WeekResult { won: matchup.my_team.won.unwrap_or(my_score > opp_score), my_score, opp_score })
    }
}
