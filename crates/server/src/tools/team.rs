//! team_wrapped tool implementation.
//!
//! Fetches a team's season recap. With `preload_weeks`, each week in the
//! recap also gets its deep dive warmed in the background, so follow-up
//! week_deep_dive calls are served from cache.

use ffwrapped_client::{DeepDiveQuery, SeasonRange, WrappedApi};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{respond, season_from};

/// Parameters for the team_wrapped tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TeamWrappedParams {
    /// ESPN league id.
    pub league_id: String,

    /// Team id within the league.
    pub team_id: u32,

    /// Season year. Defaults to the configured season.
    #[serde(default)]
    pub year: Option<u16>,

    #[serde(default)]
    pub start_week: Option<u8>,

    #[serde(default)]
    pub end_week: Option<u8>,

    /// Warm the deep dive for every week in the recap.
    #[serde(default)]
    pub preload_weeks: bool,
}

pub async fn team_wrapped_impl(
    api: &WrappedApi, defaults: &SeasonRange, params: TeamWrappedParams,
) -> Result<CallToolResult, McpError> {
    let season = season_from(defaults, params.year, params.start_week, params.end_week);
    let result = api.team_wrapped(&params.league_id, params.team_id, &season).await;

    if params.preload_weeks
        && let Ok(fetched) = &result
    {
        let mut spawned = 0usize;
        for week in &fetched.value.weekly_data {
            let Ok(week) = u8::try_from(week.week) else { continue };
            let query = DeepDiveQuery { year: season.year, week, team_id: params.team_id, include_summaries: None };
            if let Ok(Some(_)) = api.preload_week_deep_dive(&params.league_id, &query) {
                spawned += 1;
            }
        }
        tracing::debug!(league_id = %params.league_id, team_id = params.team_id, spawned, "week deep dives preloading");
    }

    respond(result)
}
