//! MCP tool implementations.
//!
//! Every data tool answers with the fetch envelope as JSON text:
//! `{"data", "error", "errorKind", "fromCache"}`. Backend failures come back
//! as tool results flagged `is_error`, with `data` null.

pub mod cache;
pub mod league;
pub mod team;
pub mod week;

pub use cache::cache_clear_impl;
pub use league::{LeagueAnalysisParams, LeagueParams, analysis_impl, info_impl, teams_impl};
pub use team::{TeamWrappedParams, team_wrapped_impl};
pub use week::{WeekDeepDiveParams, week_deep_dive_impl};

use ffwrapped_client::{ApiError, SeasonRange};
use ffwrapped_core::{Envelope, Fetched};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{ToolError, split_api_error};

/// Render an API outcome as a tool result.
pub(crate) fn respond<T: Serialize>(result: Result<Fetched<T>, ApiError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(fetched) => {
            let body = json!({
                "data": serde_json::to_value(&fetched.value).map_err(ToolError::from)?,
                "error": null,
                "errorKind": null,
                "fromCache": fetched.from_cache,
            });
            Ok(CallToolResult::success(vec![Content::text(pretty(&body)?)]))
        }
        Err(err) => {
            let fetch = split_api_error(err)?;
            tracing::debug!(url = fetch.url(), kind = ?fetch.kind(), "tool call hit a backend failure");
            let body = serde_json::to_value(Envelope::from(fetch)).map_err(ToolError::from)?;
            Ok(CallToolResult::error(vec![Content::text(pretty(&body)?)]))
        }
    }
}

pub(crate) fn pretty(value: &impl Serialize) -> Result<String, ToolError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Fill unset season fields from the server defaults.
pub(crate) fn season_from(
    defaults: &SeasonRange, year: Option<u16>, start_week: Option<u8>, end_week: Option<u8>,
) -> SeasonRange {
    SeasonRange {
        year: year.unwrap_or(defaults.year),
        start_week: start_week.unwrap_or(defaults.start_week),
        end_week: end_week.unwrap_or(defaults.end_week),
    }
}
