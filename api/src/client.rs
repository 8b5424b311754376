use crate::wire::{self, LeagueEntry, StandingsEntry, StandingsLeague};
use chrono::{DateTime, Datelike, Utc};
use log::{info, warn};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub type FetchOutcome<T> = Result<T, FetchFailure>;

pub const API_FOOTBALL_V3: &str = "https://v3.football.api-sports.io";
pub const DEFAULT_KEY_HEADER: &str = "x-apisports-key";

/// The season the pipeline asks for: the current UTC calendar year.
pub fn current_season(now: DateTime<Utc>) -> i32 {
    now.year()
}

// ---------------------------------------------------------------------------
// Errors and reporting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RateLimited,
    Timeout,
    NetworkError,
    UnexpectedFetchError,
    StorageError,
    CriticalPipelineError,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::RateLimited => "Rate Limit Error",
            ErrorKind::Timeout => "Timeout Error",
            ErrorKind::NetworkError => "Request Error",
            ErrorKind::UnexpectedFetchError => "Unexpected Error",
            ErrorKind::StorageError => "Storage Error",
            ErrorKind::CriticalPipelineError => "Critical Pipeline Error",
        }
    }
}

/// Sink for structured error reports. The fetch client reports every failed
/// attempt here instead of returning early.
pub trait ErrorReport: Send {
    fn report(&mut self, error_type: &str, message: &str, context: &str);
}

/// `"<type>: <message> | Context: <context>"`, context omitted when empty.
pub fn format_report(error_type: &str, message: &str, context: &str) -> String {
    if context.is_empty() {
        format!("{error_type}: {message}")
    } else {
        format!("{error_type}: {message} | Context: {context}")
    }
}

impl ErrorReport for Vec<String> {
    fn report(&mut self, error_type: &str, message: &str, context: &str) {
        self.push(format_report(error_type, message, context));
    }
}

/// Final failure of a fetch after the retry budget is spent.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub url: String,
    pub message: String,
    pub status: Option<u16>,
    pub attempts: u32,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for {} after {} attempt(s): {}",
            self.kind.label(),
            self.url,
            self.attempts,
            self.message
        )
    }
}

impl std::error::Error for FetchFailure {}

/// Outcome of a single HTTP attempt.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status_code: Option<u16>,
    pub body: Option<Value>,
    pub error_kind: Option<ErrorKind>,
    pub message: String,
}

impl FetchResult {
    fn success(body: Value) -> Self {
        Self { status_code: Some(200), body: Some(body), error_kind: None, message: String::new() }
    }

    fn failed(kind: ErrorKind, status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self { status_code, body: None, error_kind: Some(kind), message: message.into() }
    }

    pub fn ok(&self) -> bool {
        self.error_kind.is_none() && self.body.is_some()
    }
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(6),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Delay before the retry that follows the zero-based `attempt`, or
    /// `None` when that attempt was the last one.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_retries {
            return None;
        }
        Some(self.base_delay.saturating_mul(2u32.saturating_pow(attempt)))
    }

    /// Every delay a fully failing call waits through, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries).filter_map(|a| self.delay_after(a)).collect()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// One page of `/players/topscorers`. That endpoint may answer 200 with a
/// rate-limit notice in the body instead of data.
#[derive(Debug, Clone, Default)]
pub struct ScorersPage {
    pub rate_limit: Option<String>,
    pub scorers: Vec<Value>,
}

/// API-Football v3 client with bounded, exponentially backed-off retries.
#[derive(Debug, Clone)]
pub struct FootballApi {
    client: Client,
    base_url: String,
    api_key: String,
    key_header: String,
    policy: RetryPolicy,
}

impl FootballApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(API_FOOTBALL_V3, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("f12sync/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            key_header: DEFAULT_KEY_HEADER.into(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_key_header(mut self, key_header: impl Into<String>) -> Self {
        self.key_header = key_header.into();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Upcoming fixtures of a team, nearest first.
    pub async fn upcoming_fixtures(
        &self,
        team_id: i64,
        next: u32,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Vec<Value>> {
        let params = [("team", team_id.to_string()), ("next", next.to_string())];
        let body = self.fetch("fixtures", &params, self.policy, reporter).await?;
        Ok(wire::response_items(body))
    }

    /// The team's most recently played fixtures.
    pub async fn last_fixtures(
        &self,
        team_id: i64,
        last: u32,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Vec<Value>> {
        let params = [("team", team_id.to_string()), ("last", last.to_string())];
        let body = self.fetch("fixtures", &params, self.policy, reporter).await?;
        Ok(wire::response_items(body))
    }

    pub async fn prediction(
        &self,
        fixture_id: i64,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Option<Value>> {
        let params = [("fixture", fixture_id.to_string())];
        let body = self.fetch("predictions", &params, self.policy, reporter).await?;
        Ok(wire::response_items(body).into_iter().next())
    }

    /// Leagues the team competes in. Entries that do not decode are skipped.
    pub async fn team_leagues(
        &self,
        team_id: i64,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Vec<LeagueEntry>> {
        let params = [("team", team_id.to_string())];
        let body = self.fetch("leagues", &params, self.policy, reporter).await?;
        let leagues = wire::response_items(body)
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<LeagueEntry>(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping undecodable league entry: {e}");
                    None
                }
            })
            .collect();
        Ok(leagues)
    }

    /// Leagues of the team whose `season` coverage declares standings.
    pub async fn eligible_leagues(
        &self,
        team_id: i64,
        season: i32,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Vec<LeagueEntry>> {
        let leagues = self.team_leagues(team_id, reporter).await?;
        Ok(leagues
            .into_iter()
            .filter(|entry| entry.covers_standings(season))
            .collect())
    }

    /// Standings of one league, or `None` when the API has none for the season.
    pub async fn standings(
        &self,
        league_id: i64,
        season: i32,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Option<StandingsLeague>> {
        let params = [("league", league_id.to_string()), ("season", season.to_string())];
        let body = self.fetch("standings", &params, self.policy, reporter).await?;
        let Some(first) = wire::response_items(body).into_iter().next() else {
            return Ok(None);
        };
        serde_json::from_value::<StandingsEntry>(first)
            .map(|entry| Some(entry.league))
            .map_err(|e| FetchFailure {
                kind: ErrorKind::UnexpectedFetchError,
                url: format!("{}/standings", self.base_url),
                message: format!("unexpected standings shape: {e}"),
                status: Some(200),
                attempts: 1,
            })
    }

    pub async fn fixture_statistics(
        &self,
        fixture_id: i64,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Vec<Value>> {
        self.fixture_detail("fixtures/statistics", fixture_id, reporter).await
    }

    pub async fn fixture_events(
        &self,
        fixture_id: i64,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Vec<Value>> {
        self.fixture_detail("fixtures/events", fixture_id, reporter).await
    }

    pub async fn fixture_lineups(
        &self,
        fixture_id: i64,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Vec<Value>> {
        self.fixture_detail("fixtures/lineups", fixture_id, reporter).await
    }

    /// Top scorers of a league. Uses the client policy with `timeout`.
    pub async fn top_scorers(
        &self,
        league_id: i64,
        season: i32,
        timeout: Duration,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<ScorersPage> {
        let params = [("league", league_id.to_string()), ("season", season.to_string())];
        let policy = self.policy.with_timeout(timeout);
        let body = self.fetch("players/topscorers", &params, policy, reporter).await?;
        Ok(ScorersPage {
            rate_limit: wire::rate_limit_message(&body),
            scorers: wire::response_items(body),
        })
    }

    async fn fixture_detail(
        &self,
        endpoint: &str,
        fixture_id: i64,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Vec<Value>> {
        let params = [("fixture", fixture_id.to_string())];
        let body = self.fetch(endpoint, &params, self.policy, reporter).await?;
        Ok(wire::response_items(body))
    }

    /// GET `endpoint` with retries. Every failed attempt is reported; the
    /// caller only sees the final outcome.
    pub async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        policy: RetryPolicy,
        reporter: &mut dyn ErrorReport,
    ) -> FetchOutcome<Value> {
        let raw_url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        let url = match Url::parse_with_params(&raw_url, params) {
            Ok(url) => url,
            Err(e) => {
                let message = format!("invalid request URL: {e}");
                reporter.report(ErrorKind::UnexpectedFetchError.label(), &message, &raw_url);
                return Err(FetchFailure {
                    kind: ErrorKind::UnexpectedFetchError,
                    url: raw_url,
                    message,
                    status: None,
                    attempts: 0,
                });
            }
        };

        let max = policy.max_retries.max(1);
        let mut attempt = 0;
        loop {
            let result = self.attempt(&url, policy.timeout).await;
            attempt += 1;

            if result.ok()
                && let Some(body) = result.body
            {
                return Ok(body);
            }

            let kind = result.error_kind.unwrap_or(ErrorKind::UnexpectedFetchError);
            reporter.report(
                kind.label(),
                &result.message,
                &format!("URL: {url}, Attempt: {attempt}/{max}"),
            );

            let Some(delay) = policy.delay_after(attempt - 1) else {
                if kind == ErrorKind::RateLimited {
                    reporter.report(
                        "Max Retries Reached",
                        "Rate limit exceeded after all retry attempts",
                        &format!("URL: {url}"),
                    );
                }
                return Err(FetchFailure {
                    kind,
                    url: url.to_string(),
                    message: result.message,
                    status: result.status_code,
                    attempts: attempt,
                });
            };

            info!("waiting {}s before retrying {endpoint}", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, url: &Url, timeout: Duration) -> FetchResult {
        let response = match self
            .client
            .get(url.clone())
            .header(&self.key_header, &self.api_key)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return FetchResult::failed(
                    ErrorKind::Timeout,
                    None,
                    format!("request timed out after {}s: {e}", timeout.as_secs()),
                );
            }
            Err(e) => return FetchResult::failed(ErrorKind::NetworkError, None, e.to_string()),
        };

        let status = response.status();
        match status {
            StatusCode::OK => match response.json::<Value>().await {
                Ok(body) => FetchResult::success(body),
                Err(e) if e.is_timeout() => FetchResult::failed(
                    ErrorKind::Timeout,
                    Some(200),
                    format!("body read timed out after {}s: {e}", timeout.as_secs()),
                ),
                Err(e) => FetchResult::failed(
                    ErrorKind::UnexpectedFetchError,
                    Some(200),
                    format!("invalid JSON body: {e}"),
                ),
            },
            StatusCode::METHOD_NOT_ALLOWED => {
                let body = response.json::<Value>().await.ok();
                match body.as_ref().and_then(wire::rate_limit_message) {
                    Some(message) => FetchResult {
                        status_code: Some(405),
                        body,
                        error_kind: Some(ErrorKind::RateLimited),
                        message,
                    },
                    None => FetchResult::failed(
                        ErrorKind::UnexpectedFetchError,
                        Some(405),
                        format!("HTTP {status}"),
                    ),
                }
            }
            _ => FetchResult::failed(
                ErrorKind::UnexpectedFetchError,
                Some(status.as_u16()),
                format!("HTTP {status}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        }
    }

    fn api(server: &Server) -> FootballApi {
        FootballApi::with_base_url(server.url(), "secret").with_retry_policy(fast_policy())
    }

    #[test]
    fn current_season_is_the_calendar_year() {
        let dt = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(current_season(dt), 2026);
    }

    #[test]
    fn default_schedule_waits_six_then_twelve_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.schedule(), vec![Duration::from_secs(6), Duration::from_secs(12)]);
        assert_eq!(policy.delay_after(0), Some(Duration::from_secs(6)));
        assert_eq!(policy.delay_after(1), Some(Duration::from_secs(12)));
        assert_eq!(policy.delay_after(2), None, "the last attempt never waits");
    }

    #[test]
    fn single_attempt_policy_never_waits() {
        let policy = RetryPolicy { max_retries: 1, ..RetryPolicy::default() };
        assert!(policy.schedule().is_empty());
    }

    #[test]
    fn report_format_omits_empty_context() {
        assert_eq!(format_report("Rate Limit Error", "slow down", ""), "Rate Limit Error: slow down");
        assert_eq!(
            format_report("Timeout Error", "30s", "URL: x"),
            "Timeout Error: 30s | Context: URL: x"
        );
    }

    #[tokio::test]
    async fn successful_fetch_sends_key_and_params() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/fixtures")
            .match_header("x-apisports-key", "secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("team".into(), "451".into()),
                Matcher::UrlEncoded("next".into(), "8".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"response": [{"fixture": {"id": 1}}, {"fixture": {"id": 2}}]}).to_string())
            .expect(1)
            .create_async()
            .await;

        let mut errors = Vec::new();
        let fixtures = api(&server).upcoming_fixtures(451, 8, &mut errors).await.unwrap();

        mock.assert_async().await;
        assert_eq!(fixtures.len(), 2);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[tokio::test]
    async fn rate_limit_is_retried_then_returned_as_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/standings")
            .match_query(Matcher::Any)
            .with_status(405)
            .with_header("content-type", "application/json")
            .with_body(json!({"errors": {"rateLimit": "Too many requests"}}).to_string())
            .expect(3)
            .create_async()
            .await;

        let mut errors = Vec::new();
        let failure = api(&server).standings(128, 2026, &mut errors).await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure.kind, ErrorKind::RateLimited);
        assert_eq!(failure.attempts, 3);
        assert_eq!(failure.status, Some(405));
        let rate_limited = errors.iter().filter(|e| e.starts_with("Rate Limit Error")).count();
        assert_eq!(rate_limited, 3);
        assert!(errors.last().unwrap().starts_with("Max Retries Reached"));
        assert!(errors[0].contains("Attempt: 1/3"));
    }

    #[tokio::test]
    async fn other_http_errors_surface_as_unexpected() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/fixtures/lineups")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let mut errors = Vec::new();
        let failure = api(&server).fixture_lineups(7, &mut errors).await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure.kind, ErrorKind::UnexpectedFetchError);
        assert_eq!(failure.status, Some(500));
        assert_eq!(errors.len(), 3);
    }

    #[tokio::test]
    async fn method_not_allowed_without_rate_limit_is_not_a_rate_limit() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/predictions")
            .match_query(Matcher::Any)
            .with_status(405)
            .with_body("{}")
            .create_async()
            .await;

        let mut errors = Vec::new();
        let failure = api(&server).prediction(7, &mut errors).await.unwrap_err();
        assert_eq!(failure.kind, ErrorKind::UnexpectedFetchError);
        assert!(errors.iter().all(|e| !e.starts_with("Max Retries Reached")));
    }

    #[tokio::test]
    async fn connection_failures_are_network_errors() {
        let api = FootballApi::with_base_url("http://127.0.0.1:1", "secret")
            .with_retry_policy(fast_policy());
        let mut errors = Vec::new();
        let failure = api.last_fixtures(451, 1, &mut errors).await.unwrap_err();

        assert_eq!(failure.kind, ErrorKind::NetworkError);
        assert_eq!(failure.attempts, 3);
        assert!(errors.iter().all(|e| e.starts_with("Request Error")));
    }

    #[tokio::test]
    async fn eligible_leagues_filter_on_season_coverage() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/leagues")
            .match_query(Matcher::UrlEncoded("team".into(), "451".into()))
            .with_status(200)
            .with_body(
                json!({"response": [
                    {"league": {"id": 128, "name": "Liga Profesional Argentina"},
                     "seasons": [{"year": 2026, "coverage": {"standings": true}}]},
                    {"league": {"id": 130, "name": "Copa Argentina"},
                     "seasons": [{"year": 2026, "coverage": {"standings": false}}]},
                    {"league": {"id": 13, "name": "CONMEBOL Libertadores"},
                     "seasons": [{"year": 2025, "coverage": {"standings": true}}]},
                    {"unexpected": true}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let mut errors = Vec::new();
        let leagues = api(&server).eligible_leagues(451, 2026, &mut errors).await.unwrap();
        let ids: Vec<i64> = leagues.iter().map(|l| l.league.id).collect();
        assert_eq!(ids, vec![128]);
    }

    #[tokio::test]
    async fn standings_without_data_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/standings")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"response": []}).to_string())
            .create_async()
            .await;

        let mut errors = Vec::new();
        let standings = api(&server).standings(999, 2026, &mut errors).await.unwrap();
        assert!(standings.is_none());
    }

    #[tokio::test]
    async fn top_scorers_expose_in_body_rate_limits() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/players/topscorers")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("league".into(), "128".into()),
                Matcher::UrlEncoded("season".into(), "2026".into()),
            ]))
            .with_status(200)
            .with_body(json!({"errors": {"rateLimit": "daily quota"}, "response": []}).to_string())
            .create_async()
            .await;

        let mut errors = Vec::new();
        let page = api(&server)
            .top_scorers(128, 2026, Duration::from_secs(60), &mut errors)
            .await
            .unwrap();
        assert_eq!(page.rate_limit.as_deref(), Some("daily quota"));
        assert!(page.scorers.is_empty());
    }
}
