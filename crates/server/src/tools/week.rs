//! week_deep_dive tool implementation.

use ffwrapped_client::{DeepDiveQuery, SeasonRange, WrappedApi};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::respond;

/// Parameters for the week_deep_dive tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WeekDeepDiveParams {
    /// ESPN league id.
    pub league_id: String,

    /// Week number (1-18).
    pub week: u8,

    /// Team whose matchup is highlighted.
    pub team_id: u32,

    /// Season year. Defaults to the configured season.
    #[serde(default)]
    pub year: Option<u16>,

    /// Ask the backend for generated matchup summaries.
    #[serde(default)]
    pub include_summaries: Option<bool>,
}

pub async fn week_deep_dive_impl(
    api: &WrappedApi, defaults: &SeasonRange, params: WeekDeepDiveParams,
) -> Result<CallToolResult, McpError> {
    let query = DeepDiveQuery {
        year: params.year.unwrap_or(defaults.year),
        week: params.week,
        team_id: params.team_id,
        include_summaries: params.include_summaries,
    };
    respond(api.week_deep_dive(&params.league_id, &query).await)
}
