//! Typed client for the Fantasy Football Wrapped backend.
//!
//! Every route goes through [`CachingFetchClient`], so repeated calls for the
//! same league, team and week window are answered from cache.
//!
//! ### Routes
//!
//! - `GET /league/{id}/info?year=`
//! - `GET /league/{id}/teams?year=`
//! - `GET /league/{id}/analyze?year=&start_week=&end_week=`
//! - `GET /league/{id}/team/{team}/wrapped?year=&start_week=&end_week=`
//! - `GET /league/{id}/week/{week}/deep-dive?year=&team_id=[&include_summaries=]`
//! - `GET /league/{id}/draft?year=`
//! - `GET /league/{id}/waivers?year=`

pub mod error;
pub mod request;
pub mod response;

pub use error::ApiError;
pub use request::{DeepDiveQuery, MAX_WEEK, SeasonRange};
pub use response::{
    LeagueAnalysis, LeagueInfo, LeagueTeams, MatchupSide, MyMatchup, Overview, PlayerRef, Records, TeamRef,
    TeamWrapped, WeekDeepDive, WeekResult, WeekSummary, WinLoss,
};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;

use ffwrapped_core::{AppConfig, Error, Fetched};

use crate::fetch::{CachingFetchClient, RequestDescriptor, parse_base};
use request::validate_league_id;

/// Wrapped backend client.
#[derive(Debug, Clone)]
pub struct WrappedApi {
    client: CachingFetchClient,
    base: url::Url,
}

impl WrappedApi {
    /// Wrap `client`, resolving routes against `base_url`.
    pub fn new(client: CachingFetchClient, base_url: &str) -> Result<Self, ApiError> {
        let base = parse_base(base_url).map_err(|e| ApiError::InvalidInput(format!("api base url: {e}")))?;
        Ok(Self { client, base })
    }

    /// Build the production client and point it at `config.api_base_url`.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let client = CachingFetchClient::from_config(config).await?;
        let base = parse_base(&config.api_base_url).map_err(|e| Error::InvalidInput(format!("api_base_url: {e}")))?;
        Ok(Self { client, base })
    }

    pub fn client(&self) -> &CachingFetchClient {
        &self.client
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base
    }

    fn league_route(&self, league_id: &str, tail: &[&str], query: &[(&str, String)]) -> RequestDescriptor {
        let mut segments = vec!["league", league_id];
        segments.extend_from_slice(tail);
        RequestDescriptor::from_parts(&self.base, &segments, query)
    }

    fn info_route(&self, league_id: &str, year: u16) -> RequestDescriptor {
        self.league_route(league_id, &["info"], &[("year", year.to_string())])
    }

    fn teams_route(&self, league_id: &str, year: u16) -> RequestDescriptor {
        self.league_route(league_id, &["teams"], &[("year", year.to_string())])
    }

    fn analysis_route(&self, league_id: &str, season: &SeasonRange) -> RequestDescriptor {
        self.league_route(league_id, &["analyze"], &season.query())
    }

    fn wrapped_route(&self, league_id: &str, team_id: u32, season: &SeasonRange) -> RequestDescriptor {
        let team = team_id.to_string();
        self.league_route(league_id, &["team", &team, "wrapped"], &season.query())
    }

    fn deep_dive_route(&self, league_id: &str, query: &DeepDiveQuery) -> RequestDescriptor {
        let week = query.week.to_string();
        self.league_route(league_id, &["week", &week, "deep-dive"], &query.query())
    }

    async fn get<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<Fetched<T>, ApiError> {
        Ok(self.client.fetch_as(&descriptor).await?)
    }

    /// League name, size and week bounds.
    pub async fn league_info(&self, league_id: &str, year: u16) -> Result<Fetched<LeagueInfo>, ApiError> {
        validate_league_id(league_id)?;
        self.get(self.info_route(league_id, year)).await
    }

    pub async fn league_teams(&self, league_id: &str, year: u16) -> Result<Fetched<LeagueTeams>, ApiError> {
        validate_league_id(league_id)?;
        self.get(self.teams_route(league_id, year)).await
    }

    /// League-wide lineup analysis over `season`.
    ///
    /// The backend computes this on demand and can take tens of seconds on
    /// a cold league; later calls are cached.
    pub async fn league_analysis(
        &self, league_id: &str, season: &SeasonRange,
    ) -> Result<Fetched<LeagueAnalysis>, ApiError> {
        validate_league_id(league_id)?;
        season.validate()?;
        self.get(self.analysis_route(league_id, season)).await
    }

    pub async fn team_wrapped(
        &self, league_id: &str, team_id: u32, season: &SeasonRange,
    ) -> Result<Fetched<TeamWrapped>, ApiError> {
        validate_league_id(league_id)?;
        season.validate()?;
        self.get(self.wrapped_route(league_id, team_id, season)).await
    }

    pub async fn week_deep_dive(
        &self, league_id: &str, query: &DeepDiveQuery,
    ) -> Result<Fetched<WeekDeepDive>, ApiError> {
        validate_league_id(league_id)?;
        query.validate()?;
        self.get(self.deep_dive_route(league_id, query)).await
    }

    /// Draft board, passed through as JSON.
    pub async fn draft(&self, league_id: &str, year: u16) -> Result<Fetched<Value>, ApiError> {
        validate_league_id(league_id)?;
        self.get(self.league_route(league_id, &["draft"], &[("year", year.to_string())])).await
    }

    /// Waiver activity, passed through as JSON.
    pub async fn waivers(&self, league_id: &str, year: u16) -> Result<Fetched<Value>, ApiError> {
        validate_league_id(league_id)?;
        self.get(self.league_route(league_id, &["waivers"], &[("year", year.to_string())])).await
    }

    /// Warm the cache for a team's wrapped payload.
    ///
    /// See [`CachingFetchClient::preload`]; `Ok(None)` means it was already cached.
    pub fn preload_team_wrapped(
        &self, league_id: &str, team_id: u32, season: &SeasonRange,
    ) -> Result<Option<JoinHandle<()>>, ApiError> {
        validate_league_id(league_id)?;
        season.validate()?;
        Ok(self.client.preload(self.wrapped_route(league_id, team_id, season)))
    }

    /// Warm the cache for one week's deep dive.
    pub fn preload_week_deep_dive(
        &self, league_id: &str, query: &DeepDiveQuery,
    ) -> Result<Option<JoinHandle<()>>, ApiError> {
        validate_league_id(league_id)?;
        query.validate()?;
        Ok(self.client.preload(self.deep_dive_route(league_id, query)))
    }

    /// Drop every cached response.
    pub async fn clear_cache(&self) {
        self.client.clear().await;
    }
}
