use crate::sync::game_alerts::write_alerts;
use crate::sync::merge::{describe, merge};
use crate::sync::report::RunReporter;
use crate::sync::settings::Settings;
use crate::sync::store::DocumentStore;
use chrono::Utc;
use football_api::client::{
    ErrorKind, ErrorReport, FetchOutcome, FootballApi, ScorersPage, current_season,
};
use football_api::fixtures::{
    EVENTS, LINEUPS, STATISTICS, attach_prediction, clean_events, ensure_last_game_shape,
    fixture_id, set_detail,
};
use football_api::standings::restructure;
use football_api::wire::LeagueEntry;
use football_api::{Collections, LeagueIdentity, TopScorerEntry};
use futures_util::FutureExt;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::panic::AssertUnwindSafe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataSummary {
    #[serde(rename = "leaguesStandings_count")]
    pub leagues_standings: usize,
    #[serde(rename = "fixture_count")]
    pub fixture: usize,
    #[serde(rename = "lastGame_count")]
    pub last_game: usize,
    #[serde(rename = "topScorers_count")]
    pub top_scorers: usize,
}

impl DataSummary {
    fn of(collections: &Collections) -> Self {
        Self {
            leagues_standings: collections.leagues_standings.len(),
            fixture: collections.fixture.len(),
            last_game: collections.last_game.len(),
            top_scorers: collections.top_scorers.len(),
        }
    }
}

/// Aggregate outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub status: RunStatus,
    pub message: String,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_summary: Option<DataSummary>,
}

impl RunResult {
    pub fn errors(&self) -> &[String] {
        self.errors.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    UpcomingFixtures,
    EligibleLeagues,
    Standings,
    LastGame,
    LastGameStatistics,
    LastGameEvents,
    LastGameLineups,
    TopScorers,
    Store,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::UpcomingFixtures => "upcoming fixtures",
            Stage::EligibleLeagues => "eligible leagues",
            Stage::Standings => "standings",
            Stage::LastGame => "last game",
            Stage::LastGameStatistics => "last game statistics",
            Stage::LastGameEvents => "last game events",
            Stage::LastGameLineups => "last game lineups",
            Stage::TopScorers => "top scorers",
            Stage::Store => "merge and store",
        };
        f.write_str(name)
    }
}

/// Everything one run accumulates. Created empty for every run.
struct RunState {
    season: i32,
    collections: Collections,
    seen: HashSet<LeagueIdentity>,
    eligible: Vec<LeagueEntry>,
    reporter: RunReporter,
}

impl RunState {
    fn new(season: i32) -> Self {
        Self {
            season,
            collections: Collections::default(),
            seen: HashSet::new(),
            eligible: Vec::new(),
            reporter: RunReporter::new(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

pub struct Pipeline<S> {
    api: FootballApi,
    store: S,
    settings: Settings,
}

impl<S: DocumentStore> Pipeline<S> {
    pub fn new(api: FootballApi, store: S, settings: Settings) -> Self {
        Self { api, store, settings }
    }

    pub fn from_settings(settings: Settings, store: S) -> Self {
        let api = FootballApi::with_base_url(settings.base_url.clone(), settings.api_key.clone())
            .with_key_header(settings.api_key_header.clone())
            .with_retry_policy(settings.retry);
        Self::new(api, store, settings)
    }

    /// One full run. Never fails: stage errors are collected, and anything
    /// escaping the stages is turned into an error result.
    pub async fn run(&self) -> RunResult {
        let mut state = RunState::new(current_season(Utc::now()));
        info!("pipeline run started (team {}, season {})", self.settings.team_id, state.season);

        let outcome = AssertUnwindSafe(self.execute(&mut state)).catch_unwind().await;

        match outcome {
            Ok(()) => {
                let summary = DataSummary::of(&state.collections);
                let errors = state.reporter.into_errors();
                info!("pipeline run finished with {} error(s): {summary:?}", errors.len());
                RunResult {
                    status: RunStatus::Success,
                    message: "Data fetched and stored successfully".into(),
                    errors: (!errors.is_empty()).then_some(errors),
                    data_summary: Some(summary),
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                state
                    .reporter
                    .report(ErrorKind::CriticalPipelineError.label(), &message, "");
                RunResult {
                    status: RunStatus::Error,
                    message: "Failed to fetch and store data".into(),
                    errors: Some(state.reporter.into_errors()),
                    data_summary: None,
                }
            }
        }
    }

    async fn execute(&self, state: &mut RunState) {
        self.upcoming_fixtures(state).await;
        self.eligible_leagues(state).await;
        self.standings(state).await;
        self.last_game(state).await;
        self.last_game_details(state).await;
        self.top_scorers(state).await;
        self.merge_and_store(state);
    }

    async fn upcoming_fixtures(&self, state: &mut RunState) {
        debug!("stage: {}", Stage::UpcomingFixtures);
        let team_id = self.settings.team_id;
        let mut fixtures = match self
            .api
            .upcoming_fixtures(team_id, self.settings.next_fixtures, &mut state.reporter)
            .await
        {
            Ok(fixtures) => fixtures,
            Err(e) => {
                warn!("{} failed: {e}", Stage::UpcomingFixtures);
                state.reporter.report(
                    "Fixture Data Error",
                    "Failed to fetch fixture data",
                    &format!("Team ID: {team_id}"),
                );
                return;
            }
        };

        if let Some(next_id) = fixtures.first().and_then(fixture_id) {
            // Prediction failures stay out of the run's error list.
            let mut ignored: Vec<String> = Vec::new();
            match self.api.prediction(next_id, &mut ignored).await {
                Ok(Some(prediction)) => attach_prediction(&mut fixtures, prediction),
                Ok(None) => debug!("no prediction for fixture {next_id}"),
                Err(e) => warn!("prediction for fixture {next_id} unavailable: {e}"),
            }
        }

        info!("fetched {} upcoming fixture(s)", fixtures.len());
        state.collections.fixture = fixtures;
    }

    async fn eligible_leagues(&self, state: &mut RunState) {
        debug!("stage: {}", Stage::EligibleLeagues);
        let team_id = self.settings.team_id;
        match self.api.eligible_leagues(team_id, state.season, &mut state.reporter).await {
            Ok(leagues) => {
                info!("{} league(s) with standings for season {}", leagues.len(), state.season);
                state.eligible = leagues;
            }
            Err(e) => {
                warn!("{} failed: {e}", Stage::EligibleLeagues);
                state.reporter.report(
                    "Leagues Data Error",
                    "Failed to fetch leagues data",
                    &format!("Team ID: {team_id}"),
                );
            }
        }
    }

    async fn standings(&self, state: &mut RunState) {
        debug!("stage: {}", Stage::Standings);
        let leagues = std::mem::take(&mut state.eligible);
        for entry in &leagues {
            let league_id = entry.league.id;
            match self.api.standings(league_id, state.season, &mut state.reporter).await {
                Ok(Some(raw)) => {
                    let tables = restructure(raw, &self.settings.grouped_league, &mut state.seen);
                    debug!("league {league_id}: {} table(s)", tables.len());
                    state.collections.leagues_standings.extend(tables);
                }
                Ok(None) => debug!("league {league_id}: no standings for season {}", state.season),
                Err(e) => {
                    warn!("{} failed for league {league_id}: {e}", Stage::Standings);
                    state.reporter.report(
                        "Standings Data Error",
                        &format!("Failed to fetch standings for {}", entry.league.name),
                        &format!("League ID: {league_id}, Season: {}", state.season),
                    );
                }
            }
        }
        state.eligible = leagues;
    }

    async fn last_game(&self, state: &mut RunState) {
        debug!("stage: {}", Stage::LastGame);
        let team_id = self.settings.team_id;
        match self.api.last_fixtures(team_id, 1, &mut state.reporter).await {
            Ok(games) => match games.into_iter().next() {
                Some(mut game) => {
                    ensure_last_game_shape(&mut game);
                    state.collections.last_game = vec![game];
                }
                None => info!("no completed game for team {team_id}"),
            },
            Err(e) => {
                warn!("{} failed: {e}", Stage::LastGame);
                state.reporter.report(
                    "Last Game Data Error",
                    "Failed to fetch last game data",
                    &format!("Team ID: {team_id}"),
                );
            }
        }
    }

    async fn last_game_details(&self, state: &mut RunState) {
        let Some(id) = state.collections.last_game.first().and_then(fixture_id) else {
            debug!("no last game, skipping statistics, events and lineups");
            return;
        };

        let statistics = self.api.fixture_statistics(id, &mut state.reporter).await;
        let statistics = detail_or_empty(Stage::LastGameStatistics, statistics);
        let events = self.api.fixture_events(id, &mut state.reporter).await;
        let events = clean_events(detail_or_empty(Stage::LastGameEvents, events));
        let lineups = self.api.fixture_lineups(id, &mut state.reporter).await;
        let lineups = detail_or_empty(Stage::LastGameLineups, lineups);

        if let Some(game) = state.collections.last_game.first_mut() {
            set_detail(game, STATISTICS, statistics);
            set_detail(game, EVENTS, events);
            set_detail(game, LINEUPS, lineups);
        }
    }

    async fn top_scorers(&self, state: &mut RunState) {
        debug!("stage: {}", Stage::TopScorers);
        let league_id = self.settings.top_scorers_league;
        let Some(league) = state.collections.find_league(league_id) else {
            warn!("league {league_id} is not among this run's standings, skipping top scorers");
            return;
        };
        let (country, logo, flag) = (league.country.clone(), league.logo.clone(), league.flag.clone());

        let page = self
            .api
            .top_scorers(league_id, state.season, self.settings.top_scorers_timeout, &mut state.reporter)
            .await;
        match page {
            Ok(ScorersPage { rate_limit: Some(message), .. }) => {
                warn!("top scorers rate limited, skipping: {message}");
            }
            Ok(ScorersPage { scorers, .. }) if scorers.is_empty() => {
                info!("no top scorers for league {league_id}");
            }
            Ok(ScorersPage { scorers, .. }) => {
                info!("fetched {} top scorer(s) for league {league_id}", scorers.len());
                state.collections.top_scorers.push(TopScorerEntry {
                    league_id,
                    league_name: self.settings.top_scorers_name.clone(),
                    country,
                    logo,
                    flag,
                    season: state.season,
                    scorers,
                });
            }
            Err(e) => {
                warn!("{} failed: {e}", Stage::TopScorers);
                state.reporter.report(
                    "Top Scorers Error",
                    "Failed to fetch top scorers",
                    &format!("League ID: {league_id}, Season: {}", state.season),
                );
            }
        }
    }

    fn merge_and_store(&self, state: &mut RunState) {
        debug!("stage: {}", Stage::Store);
        let collection = &self.settings.collection;
        let document_id = &self.settings.document_id;
        let context = format!("Collection: {collection}, Document: {document_id}");
        let storage = ErrorKind::StorageError.label();

        // Without a readable baseline nothing is written.
        let previous = match self.store.read(collection, document_id) {
            Ok(previous) => previous,
            Err(e) => {
                state
                    .reporter
                    .report(storage, &format!("Failed to read stored document: {e}"), &context);
                return;
            }
        };

        let document =
            match merge(previous.as_ref(), &state.collections, &self.settings.preserved_name) {
                Ok(document) => document,
                Err(e) => {
                    state
                        .reporter
                        .report(storage, &format!("Failed to build document: {e}"), &context);
                    return;
                }
            };

        info!("storing {collection}/{document_id}: {}", describe(&document));
        if let Err(e) = self.store.upsert(collection, document_id, document, true) {
            state
                .reporter
                .report(storage, &format!("Failed to store document: {e}"), &context);
            return;
        }

        if self.settings.game_alerts {
            write_alerts(
                &self.store,
                &state.collections.fixture,
                self.settings.team_id,
                &mut state.reporter,
            );
        }
    }
}

fn detail_or_empty(stage: Stage, outcome: FetchOutcome<Vec<Value>>) -> Vec<Value> {
    match outcome {
        Ok(items) => {
            debug!("{stage}: {} item(s)", items.len());
            items
        }
        Err(e) => {
            warn!("{stage} failed, defaulting to empty: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::game_alerts::GAME_ALERTS;
    use crate::sync::store::{MemoryStore, StoreError};
    use football_api::Document;
    use football_api::client::RetryPolicy;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    fn settings(server: &Server) -> Settings {
        let mut settings = Settings::for_team("test-key", 451);
        settings.base_url = server.url();
        settings.retry = RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        };
        settings.top_scorers_timeout = Duration::from_secs(5);
        settings
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    fn query(pairs: &[(&str, String)]) -> Matcher {
        Matcher::AllOf(
            pairs
                .iter()
                .map(|(k, v)| Matcher::UrlEncoded((*k).into(), v.clone()))
                .collect(),
        )
    }

    async fn respond(server: &mut ServerGuard, path: &str, params: &[(&str, String)], body: Value) {
        server
            .mock("GET", path)
            .match_header("x-apisports-key", "test-key")
            .match_query(query(params))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;
    }

    fn upcoming(count: i64) -> Value {
        let fixtures: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "fixture": {"id": 1000 + i, "date": "2026-10-18T20:00:00+00:00", "referee": null},
                    "league": {"id": 128, "name": "Liga Profesional Argentina"},
                    "teams": {
                        "home": {"id": 451, "name": "Boca Juniors", "winner": null},
                        "away": {"id": 10 + i, "name": format!("Rival {i}"), "winner": null}
                    }
                })
            })
            .collect();
        json!({"response": fixtures})
    }

    fn table_rows(group: Option<&str>, count: usize) -> Vec<Value> {
        (1..=count)
            .map(|rank| match group {
                Some(g) => json!({"rank": rank, "team": {"id": rank}, "points": 30 - rank, "group": g}),
                None => json!({"rank": rank, "team": {"id": rank}, "points": 30 - rank}),
            })
            .collect()
    }

    async fn mock_full_upstream(server: &mut ServerGuard, season: i32) {
        let year = season.to_string();
        respond(server, "/fixtures", &[("team", "451".into()), ("next", "8".into())], upcoming(8)).await;
        respond(
            server,
            "/predictions",
            &[("fixture", "1000".into())],
            json!({"response": [{"predictions": {"winner": {"name": "Boca Juniors"}}}]}),
        )
        .await;
        respond(
            server,
            "/leagues",
            &[("team", "451".into())],
            json!({"response": [
                {"league": {"id": 128, "name": "Liga Profesional Argentina"},
                 "seasons": [{"year": season, "coverage": {"standings": true}}]},
                {"league": {"id": 13, "name": "CONMEBOL Libertadores"},
                 "seasons": [{"year": season, "coverage": {"standings": true}}]},
                {"league": {"id": 1032, "name": "Copa de la Liga"},
                 "seasons": [{"year": season, "coverage": {"standings": false}}]}
            ]}),
        )
        .await;
        respond(
            server,
            "/standings",
            &[("league", "128".into()), ("season", year.clone())],
            json!({"response": [{"league": {
                "id": 128, "name": "Liga Profesional Argentina", "country": "Argentina",
                "logo": "128.png", "flag": "ar.svg", "season": season,
                "standings": [table_rows(Some("Group A"), 15)]
            }}]}),
        )
        .await;
        respond(
            server,
            "/standings",
            &[("league", "13".into()), ("season", year.clone())],
            json!({"response": [{"league": {
                "id": 13, "name": "CONMEBOL Libertadores", "country": "World",
                "logo": "13.png", "flag": null, "season": season,
                "standings": [table_rows(None, 4)]
            }}]}),
        )
        .await;
        respond(
            server,
            "/fixtures",
            &[("team", "451".into()), ("last", "1".into())],
            json!({"response": [{
                "fixture": {"id": 999, "date": "2026-10-11T20:00:00+00:00"},
                "goals": {"home": 2, "away": 0},
                "teams": {"home": {"id": 451}, "away": {"id": 435}}
            }]}),
        )
        .await;
        respond(server, "/fixtures/statistics", &[("fixture", "999".into())], json!({"response": []})).await;
        respond(
            server,
            "/fixtures/events",
            &[("fixture", "999".into())],
            json!({"response": [
                {"time": {"elapsed": 10, "extra": null}, "type": "Goal", "player": {"name": "A"}},
                {"time": {"elapsed": "90", "extra": "3"}, "type": "Goal", "player": {"name": "B"}}
            ]}),
        )
        .await;
        respond(server, "/fixtures/lineups", &[("fixture", "999".into())], json!({"response": []})).await;
        respond(
            server,
            "/players/topscorers",
            &[("league", "128".into()), ("season", year)],
            json!({"response": []}),
        )
        .await;
    }

    #[tokio::test]
    async fn full_run_stores_every_collection() {
        let mut server = Server::new_async().await;
        let season = current_season(Utc::now());
        mock_full_upstream(&mut server, season).await;

        let pipeline = Pipeline::from_settings(settings(&server), MemoryStore::new());
        let result = pipeline.run().await;

        assert_eq!(result.status, RunStatus::Success, "{:?}", result.errors);
        assert!(result.errors.is_none(), "{:?}", result.errors);
        assert_eq!(
            result.data_summary,
            Some(DataSummary { leagues_standings: 2, fixture: 8, last_game: 1, top_scorers: 0 })
        );

        let stored = pipeline.store.get("football", "football").unwrap();
        let leagues = stored["leaguesStandings"].as_array().unwrap();
        assert_eq!(leagues.len(), 2);
        assert_eq!(leagues[0]["name"], json!("Group A"));
        assert_eq!(leagues[0]["standings"].as_array().map(Vec::len), Some(15));
        assert_eq!(leagues[0]["enabled"], json!(true));
        assert_eq!(leagues[1]["id"], json!("13"));

        assert_eq!(stored["fixture"].as_array().map(Vec::len), Some(8));
        assert_eq!(
            stored["fixture"][0]["predictions"]["predictions"]["winner"]["name"],
            json!("Boca Juniors")
        );

        let events = stored["lastGame"][0]["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["time"], json!({"elapsed": "10"}));
        assert_eq!(events[1]["time"], json!({"elapsed": "90", "extra": "3"}));
        assert_eq!(stored["lastGame"][0]["statistics"], json!([]));
        assert_eq!(stored["topScorers"], json!([]));
        assert!(pipeline.store.get(GAME_ALERTS, "1000").is_none());
    }

    #[tokio::test]
    async fn curated_state_and_alerts_survive_a_second_run() {
        let mut server = Server::new_async().await;
        let season = current_season(Utc::now());
        mock_full_upstream(&mut server, season).await;

        let store = MemoryStore::new().with_document(
            "football",
            "football",
            doc(json!({"leaguesStandings": [
                {"id": "13", "name": "CONMEBOL Libertadores", "enabled": false, "order": 4},
                {"name": "Tabla Anual", "standings": [], "enabled": true, "order": 1}
            ]})),
        );
        let mut settings = settings(&server);
        settings.game_alerts = true;
        let pipeline = Pipeline::from_settings(settings, store);

        for _ in 0..2 {
            let result = pipeline.run().await;
            assert!(result.errors.is_none(), "{:?}", result.errors);
        }

        let stored = pipeline.store.get("football", "football").unwrap();
        let leagues = stored["leaguesStandings"].as_array().unwrap();
        assert_eq!(leagues.len(), 3);
        assert_eq!(leagues[1]["enabled"], json!(false));
        assert_eq!(leagues[1]["order"], json!(4));
        assert_eq!(leagues.iter().filter(|l| l["name"] == json!("Tabla Anual")).count(), 1);

        let alert = pipeline.store.get(GAME_ALERTS, "1003").unwrap();
        assert_eq!(alert["opponentName"], json!("Rival 3"));
    }

    #[tokio::test]
    async fn failing_upstream_keeps_the_previous_document() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let previous = doc(json!({
            "leaguesStandings": [{"id": "128", "name": "Group A", "enabled": false, "order": 2}],
            "fixture": [{"fixture": {"id": "1"}}],
            "lastGame": [],
            "topScorers": []
        }));
        let store = MemoryStore::new().with_document("football", "football", previous.clone());
        let pipeline = Pipeline::from_settings(settings(&server), store);
        let result = pipeline.run().await;

        assert_eq!(result.status, RunStatus::Success);
        let errors = result.errors();
        for stage in ["Fixture Data Error", "Leagues Data Error", "Last Game Data Error"] {
            assert!(errors.iter().any(|e| e.starts_with(stage)), "{stage} missing from {errors:?}");
        }
        assert!(errors.iter().any(|e| e.starts_with("Unexpected Error: HTTP 500")));
        assert_eq!(
            result.data_summary,
            Some(DataSummary { leagues_standings: 0, fixture: 0, last_game: 0, top_scorers: 0 })
        );
        assert_eq!(pipeline.store.get("football", "football"), Some(previous));
    }

    #[tokio::test]
    async fn storage_failure_is_reported_and_leaves_the_stored_document() {
        let mut server = Server::new_async().await;
        let season = current_season(Utc::now());
        mock_full_upstream(&mut server, season).await;

        let previous = doc(json!({"fixture": [{"fixture": {"id": "1"}}]}));
        let store = MemoryStore::new().with_document("football", "football", previous.clone());
        store.set_fail_writes(true);
        let pipeline = Pipeline::from_settings(settings(&server), store);
        let result = pipeline.run().await;

        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.errors().len(), 1, "{:?}", result.errors);
        assert!(result.errors()[0].starts_with("Storage Error: Failed to store document"));
        assert_eq!(pipeline.store.get("football", "football"), Some(previous));
    }

    struct PanickingStore;

    impl DocumentStore for PanickingStore {
        fn read(&self, _: &str, _: &str) -> Result<Option<Document>, StoreError> {
            panic!("store exploded");
        }

        fn upsert(&self, _: &str, _: &str, _: Document, _: bool) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn escaping_failures_become_an_error_result() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"response": []}"#)
            .create_async()
            .await;

        let pipeline = Pipeline::from_settings(settings(&server), PanickingStore);
        let result = pipeline.run().await;

        assert_eq!(result.status, RunStatus::Error);
        assert_eq!(result.message, "Failed to fetch and store data");
        assert!(result.data_summary.is_none());
        assert_eq!(
            result.errors(),
            &["Critical Pipeline Error: store exploded".to_string()]
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], json!("error"));
        assert!(json.get("data_summary").is_none());
    }

    #[test]
    fn run_result_serializes_with_summary_counts() {
        let result = RunResult {
            status: RunStatus::Success,
            message: "Data fetched and stored successfully".into(),
            errors: None,
            data_summary: Some(DataSummary { leagues_standings: 2, fixture: 8, last_game: 1, top_scorers: 0 }),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "status": "success",
                "message": "Data fetched and stored successfully",
                "errors": null,
                "data_summary": {
                    "leaguesStandings_count": 2,
                    "fixture_count": 8,
                    "lastGame_count": 1,
                    "topScorers_count": 0
                }
            })
        );
    }
}
