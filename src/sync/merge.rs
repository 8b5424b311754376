//! Reconciles one run's fresh collections with the stored document.
//!
//! Curated `enabled`/`order` values and hand-added preserved tables always
//! come from the stored side; everything else comes from the fetch.

use football_api::normalize::normalize;
use football_api::{
    COLLECTION_KEYS, Collections, Document, FIXTURE, LAST_GAME, LEAGUES_STANDINGS, LeagueIdentity,
    SyncDocument, TOP_SCORERS,
};
use log::{debug, info};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
struct Curated {
    enabled: Value,
    order: Value,
}

impl Curated {
    fn from_stored(league: &Value) -> Self {
        Self {
            enabled: league.get("enabled").cloned().unwrap_or(Value::Bool(true)),
            order: league.get("order").cloned().unwrap_or(Value::from(0)),
        }
    }

    fn fresh() -> Self {
        Self { enabled: Value::Bool(true), order: Value::from(0) }
    }
}

/// What the stored document contributes to the next write.
#[derive(Debug, Default)]
struct Baseline {
    preserved: Vec<Value>,
    curated: HashMap<LeagueIdentity, Curated>,
}

fn stored_leagues(previous: Option<&Document>) -> &[Value] {
    previous
        .and_then(|doc| doc.get(LEAGUES_STANDINGS))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn is_preserved(league: &Value, preserved_name: &str) -> bool {
    league
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| name.trim() == preserved_name)
}

fn baseline(previous: Option<&Document>, preserved_name: &str) -> Baseline {
    let mut out = Baseline::default();
    for league in stored_leagues(previous) {
        if is_preserved(league, preserved_name) {
            out.preserved.push(league.clone());
            continue;
        }
        if let Some(identity) = LeagueIdentity::of_value(league) {
            out.curated.entry(identity).or_insert_with(|| Curated::from_stored(league));
        }
    }
    out
}

fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Build the document to store for this run.
///
/// When the fetch produced nothing at all, the previous document is carried
/// forward as-is (with any missing collection keys filled in as `[]`).
pub fn merge(
    previous: Option<&Document>,
    fresh: &Collections,
    preserved_name: &str,
) -> Result<Document, serde_json::Error> {
    let Baseline { preserved, curated } = baseline(previous, preserved_name);

    if fresh.is_empty() {
        info!("fetch produced no data, keeping the stored document");
        return Ok(carry_forward(previous));
    }

    let leagues = normalize(&serde_json::to_value(&fresh.leagues_standings)?, LEAGUES_STANDINGS);
    let mut leagues = into_list(leagues);
    let mut fresh_ids = HashSet::new();
    for league in &mut leagues {
        let Some(identity) = LeagueIdentity::of_value(league) else {
            continue;
        };
        let values = curated.get(&identity).cloned().unwrap_or_else(Curated::fresh);
        if let Value::Object(map) = league {
            map.insert("enabled".into(), values.enabled);
            map.insert("order".into(), values.order);
        }
        fresh_ids.insert(identity);
    }

    let mut appended = HashSet::new();
    for entry in preserved {
        match LeagueIdentity::of_value(&entry) {
            Some(identity) if fresh_ids.contains(&identity) => {
                debug!("fresh league {identity} replaces preserved entry");
            }
            Some(identity) => {
                if appended.insert(identity) {
                    leagues.push(entry);
                }
            }
            None => {
                if !leagues.contains(&entry) {
                    leagues.push(entry);
                }
            }
        }
    }

    let document = SyncDocument {
        leagues_standings: leagues,
        fixture: into_list(normalize(&Value::Array(fresh.fixture.clone()), FIXTURE)),
        last_game: into_list(normalize(&Value::Array(fresh.last_game.clone()), LAST_GAME)),
        top_scorers: into_list(normalize(&serde_json::to_value(&fresh.top_scorers)?, TOP_SCORERS)),
    };
    Ok(document.into_document())
}

fn carry_forward(previous: Option<&Document>) -> Document {
    let Some(previous) = previous else {
        return SyncDocument::default().into_document();
    };
    let mut doc = previous.clone();
    for key in COLLECTION_KEYS {
        let keep = match doc.get(key) {
            Some(Value::Array(_)) => true,
            Some(Value::Object(_)) => key == LAST_GAME,
            _ => false,
        };
        if !keep {
            doc.insert(key.into(), Value::Array(Vec::new()));
        }
    }
    doc
}

/// One log-friendly line describing a document's collections.
pub fn describe(doc: &Document) -> String {
    COLLECTION_KEYS
        .iter()
        .map(|key| match doc.get(*key) {
            Some(Value::Array(items)) => format!("{key}: {} items", items.len()),
            Some(Value::Object(_)) => format!("{key}: object"),
            Some(_) => format!("{key}: scalar"),
            None => format!("{key}: missing"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
