pub mod client;
pub mod fixtures;
pub mod normalize;
pub mod standings;
pub mod wire;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A stored JSON object (one document in the document store).
pub type Document = serde_json::Map<String, Value>;

// Top-level keys of the persisted sync document. The client app reads these
// names verbatim.
pub const LEAGUES_STANDINGS: &str = "leaguesStandings";
pub const FIXTURE: &str = "fixture";
pub const LAST_GAME: &str = "lastGame";
pub const TOP_SCORERS: &str = "topScorers";

pub const COLLECTION_KEYS: [&str; 4] = [LEAGUES_STANDINGS, FIXTURE, LAST_GAME, TOP_SCORERS];

// ---------------------------------------------------------------------------
// Domain types, independent of the API-Football wire format
// ---------------------------------------------------------------------------

/// Deduplication key of a league: the league id, plus the group name for the
/// one league that is split per group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeagueIdentity {
    pub league_id: String,
    pub group: Option<String>,
}

impl LeagueIdentity {
    pub fn league(league_id: impl fmt::Display) -> Self {
        Self { league_id: league_id.to_string(), group: None }
    }

    pub fn grouped(league_id: impl fmt::Display, group: impl Into<String>) -> Self {
        Self { league_id: league_id.to_string(), group: Some(group.into()) }
    }

    /// Read the identity of a stored (already normalized) league record.
    /// Records without an `id` have no identity.
    pub fn of_value(league: &Value) -> Option<Self> {
        let league_id = match league.get("id")? {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_owned(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let group = league
            .get("group")
            .and_then(Value::as_str)
            .map(|g| g.trim().to_owned());
        Some(Self { league_id, group })
    }
}

impl fmt::Display for LeagueIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{}_{group}", self.league_id),
            None => write!(f, "{}", self.league_id),
        }
    }
}

/// One standings table as the client app consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: i64,
    /// The league name, or the group name for a split league.
    pub name: String,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub flag: Option<String>,
    pub season: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub standings: Vec<Value>,
    /// Curated by the client app after storage; fetch only ever sets defaults.
    pub enabled: bool,
    pub order: i64,
}

impl League {
    pub fn identity(&self) -> LeagueIdentity {
        match &self.group {
            Some(group) => LeagueIdentity::grouped(self.id, group.clone()),
            None => LeagueIdentity::league(self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopScorerEntry {
    pub league_id: i64,
    pub league_name: String,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub flag: Option<String>,
    pub season: i32,
    pub scorers: Vec<Value>,
}

/// Everything one pipeline run fetched, before normalization.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub leagues_standings: Vec<League>,
    pub fixture: Vec<Value>,
    pub last_game: Vec<Value>,
    pub top_scorers: Vec<TopScorerEntry>,
}

impl Collections {
    /// True when no stage produced anything at all.
    pub fn is_empty(&self) -> bool {
        self.leagues_standings.is_empty()
            && self.fixture.is_empty()
            && self.last_game.is_empty()
            && self.top_scorers.is_empty()
    }

    /// First occurrence of a league id among this run's standings.
    pub fn find_league(&self, league_id: i64) -> Option<&League> {
        self.leagues_standings.iter().find(|l| l.id == league_id)
    }
}

/// The persisted aggregate, already normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncDocument {
    #[serde(rename = "leaguesStandings", default)]
    pub leagues_standings: Vec<Value>,
    #[serde(default)]
    pub fixture: Vec<Value>,
    #[serde(rename = "lastGame", default)]
    pub last_game: Vec<Value>,
    #[serde(rename = "topScorers", default)]
    pub top_scorers: Vec<Value>,
}

impl SyncDocument {
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert(LEAGUES_STANDINGS.into(), Value::Array(self.leagues_standings));
        doc.insert(FIXTURE.into(), Value::Array(self.fixture));
        doc.insert(LAST_GAME.into(), Value::Array(self.last_game));
        doc.insert(TOP_SCORERS.into(), Value::Array(self.top_scorers));
        doc
    }
}
