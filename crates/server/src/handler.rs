//! rmcp handler: tool registration and dispatch.
use crate::tools::{
    LeagueAnalysisParams, LeagueParams, TeamWrappedParams, WeekDeepDiveParams, analysis_impl, cache_clear_impl,
    info_impl, team_wrapped_impl, teams_impl, week_deep_dive_impl,
};

use ffwrapped_client::{SeasonRange, WrappedApi};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// Stdio MCP server over one shared [`WrappedApi`].
#[derive(Clone)]
pub struct WrappedServer {
    api: WrappedApi,
    defaults: SeasonRange,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WrappedServer {
    /// Create a server handler over `api`, filling omitted season
    /// parameters from `defaults`.
    pub fn new(api: WrappedApi, defaults: SeasonRange) -> Self {
        Self { api, defaults, tool_router: Self::tool_router() }
    }

    #[tool(description = "League name, team count, current week and final week for an ESPN league.")]
    async fn league_info(&self, params: Parameters<LeagueParams>) -> Result<CallToolResult, McpError> {
        info_impl(&self.api, &self.defaults, params.0).await
    }

    #[tool(description = "Team ids and names in an ESPN league.")]
    async fn league_teams(&self, params: Parameters<LeagueParams>) -> Result<CallToolResult, McpError> {
        teams_impl(&self.api, &self.defaults, params.0).await
    }

    /// Slow on a cold league; the backend replays every lineup in the window.
    #[tool(
        description = "League-wide lineup analysis over a week window: per-team errors, points lost, and optimal records."
    )]
    async fn league_analysis(&self, params: Parameters<LeagueAnalysisParams>) -> Result<CallToolResult, McpError> {
        analysis_impl(&self.api, &self.defaults, params.0).await
    }

    #[tool(
        description = "Season recap for one team: overview, actual vs optimal records, top scorers, highlight weeks, and weekly data. Set preload_weeks to warm each week's deep dive."
    )]
    async fn team_wrapped(&self, params: Parameters<TeamWrappedParams>) -> Result<CallToolResult, McpError> {
        team_wrapped_impl(&self.api, &self.defaults, params.0).await
    }

    #[tool(description = "Deep dive into one week: the team's matchup, lineup decisions, and league context.")]
    async fn week_deep_dive(&self, params: Parameters<WeekDeepDiveParams>) -> Result<CallToolResult, McpError> {
        week_deep_dive_impl(&self.api, &self.defaults, params.0).await
    }

    #[tool(description = "Clear every cached backend response, in memory and in the session store.")]
    async fn cache_clear(&self) -> Result<CallToolResult, McpError> {
        cache_clear_impl(&self.api).await
    }
}

impl ServerHandler for WrappedServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "ffwrapped".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Fantasy Football Wrapped: season recaps and lineup analysis for ESPN leagues. Responses are cached; call cache_clear to refetch."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
