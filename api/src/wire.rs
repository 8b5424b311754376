//! API-Football raw wire types: serde shapes for the few responses we read structurally.
//! Everything else (fixtures, events, lineups, scorers) is carried as opaque JSON.
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Response envelope (every endpoint)
// ---------------------------------------------------------------------------

/// Pull the `response` array out of an API-Football envelope.
/// A missing or non-array `response` reads as empty.
pub fn response_items(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("response") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// The rate-limit message carried at `errors.rateLimit`, if any.
pub fn rate_limit_message(body: &Value) -> Option<String> {
    let limit = body.get("errors")?.get("rateLimit")?;
    Some(match limit {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// /leagues?team=
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LeagueEntry {
    pub league: LeagueInfo,
    #[serde(default)]
    pub seasons: Vec<LeagueSeason>,
}

impl LeagueEntry {
    /// True when the given season exists and its coverage declares standings.
    pub fn covers_standings(&self, year: i32) -> bool {
        self.seasons
            .iter()
            .any(|s| s.year == year && s.coverage.standings)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LeagueInfo {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LeagueSeason {
    pub year: i32,
    #[serde(default)]
    pub coverage: Coverage,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Coverage {
    #[serde(default)]
    pub standings: bool,
}

// ---------------------------------------------------------------------------
// /standings?league=&season=
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StandingsEntry {
    pub league: StandingsLeague,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StandingsLeague {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub flag: Option<String>,
    #[serde(default)]
    pub season: i64,
    /// One array per group; some competitions nest further.
    #[serde(default)]
    pub standings: Vec<Value>,
}
