//! League-level tools: league_info, league_teams, league_analysis.

use ffwrapped_client::{SeasonRange, WrappedApi};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{respond, season_from};

/// Parameters for league_info and league_teams.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LeagueParams {
    /// ESPN league id.
    pub league_id: String,

    /// Season year. Defaults to the configured season.
    #[serde(default)]
    pub year: Option<u16>,
}

/// Parameters for league_analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LeagueAnalysisParams {
    /// ESPN league id.
    pub league_id: String,

    /// Season year. Defaults to the configured season.
    #[serde(default)]
    pub year: Option<u16>,

    /// First week to analyze (1-18).
    #[serde(default)]
    pub start_week: Option<u8>,

    /// Last week to analyze, inclusive (1-18).
    #[serde(default)]
    pub end_week: Option<u8>,
}

pub async fn info_impl(api: &WrappedApi, defaults: &SeasonRange, params: LeagueParams) -> Result<CallToolResult, McpError> {
    let year = params.year.unwrap_or(defaults.year);
    respond(api.league_info(&params.league_id, year).await)
}

pub async fn teams_impl(
    api: &WrappedApi, defaults: &SeasonRange, params: LeagueParams,
) -> Result<CallToolResult, McpError> {
    let year = params.year.unwrap_or(defaults.year);
    respond(api.league_teams(&params.league_id, year).await)
}

pub async fn analysis_impl(
    api: &WrappedApi, defaults: &SeasonRange, params: LeagueAnalysisParams,
) -> Result<CallToolResult, McpError> {
    let season = season_from(defaults, params.year, params.start_week, params.end_week);
    tracing::info!(league_id = %params.league_id, year = season.year, start = season.start_week, end = season.end_week, "league analysis requested");
    respond(api.league_analysis(&params.league_id, &season).await)
}
