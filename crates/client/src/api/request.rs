//! Wrapped API request parameters and validation.

use serde::{Deserialize, Serialize};

use ffwrapped_core::AppConfig;
pub use ffwrapped_core::config::MAX_WEEK;

use super::error::ApiError;

/// A season and the inclusive week window to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRange {
    pub year: u16,
    pub start_week: u8,
    pub end_week: u8,
}

impl SeasonRange {
    /// Validate and build a range.
    ///
    /// Returns an error unless `1 <= start_week <= end_week <= 18`.
    pub fn new(year: u16, start_week: u8, end_week: u8) -> Result<Self, ApiError> {
        let range = Self { year, start_week, end_week };
        range.validate()?;
        Ok(range)
    }

    /// The configured default season.
    pub fn from_config(config: &AppConfig) -> Self {
        Self { year: config.default_year, start_week: config.default_start_week, end_week: config.default_end_week }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.start_week == 0 || self.end_week > MAX_WEEK {
            return Err(ApiError::InvalidInput(format!("weeks must be within 1..={MAX_WEEK}")));
        }
        if self.start_week > self.end_week {
            return Err(ApiError::InvalidInput(format!(
                "start_week {} is after end_week {}",
                self.start_week, self.end_week
            )));
        }
        Ok(())
    }

    pub fn weeks(&self) -> std::ops::RangeInclusive<u8> {
        self.start_week..=self.end_week
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("year", self.year.to_string()),
            ("start_week", self.start_week.to_string()),
            ("end_week", self.end_week.to_string()),
        ]
    }
}

/// Parameters for a single week's deep dive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepDiveQuery {
    pub year: u16,
    pub week: u8,
    pub team_id: u32,

    /// Ask the backend for generated matchup summaries. Omitted when None.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_summaries: Option<bool>,
}

impl DeepDiveQuery {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(1..=MAX_WEEK).contains(&self.week) {
            return Err(ApiError::InvalidInput(format!("week must be within 1..={MAX_WEEK}")));
        }
        Ok(())
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("year", self.year.to_string()), ("team_id", self.team_id.to_string())];
        if let Some(include) = self.include_summaries {
            query.push(("include_summaries", include.to_string()));
        }
        query
    }
}

/// Reject league ids the backend cannot route.
pub(crate) fn validate_league_id(league_id: &str) -> Result<(), ApiError> {
    if league_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("league_id cannot be empty".to_string()));
    }
    if league_id.contains('/') {
        return Err(ApiError::InvalidInput(format!("league_id contains '/': {league_id}")));
    }
    Ok(())
}
