use crate::sync::store::DocumentStore;
use football_api::Document;
use football_api::client::{ErrorKind, ErrorReport};
use football_api::fixtures::fixture_id;
use log::{debug, info};
use serde_json::Value;

pub const GAME_ALERTS: &str = "game_alerts";

fn text(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn team_id_at(fixture: &Value, side: &str) -> Option<i64> {
    match fixture.pointer(&format!("/teams/{side}/id"))? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The notification document for one upcoming fixture, keyed by fixture id.
/// Fixtures without an id, or not involving `team_id`, produce nothing.
pub fn build_alert(fixture: &Value, team_id: i64) -> Option<(String, Document)> {
    let id = fixture_id(fixture)?;
    let opponent_side = if team_id_at(fixture, "home") == Some(team_id) {
        "away"
    } else if team_id_at(fixture, "away") == Some(team_id) {
        "home"
    } else {
        return None;
    };
    let own_side = if opponent_side == "away" { "home" } else { "away" };

    let opponent = text(fixture, &format!("/teams/{opponent_side}/name")).unwrap_or_default();
    let own = text(fixture, &format!("/teams/{own_side}/name")).unwrap_or_default();
    let league = text(fixture, "/league/name").unwrap_or_default();
    let game_date = text(fixture, "/fixture/date").unwrap_or_default();
    let venue = if own_side == "home" { "vs" } else { "at" };

    let mut doc = Document::new();
    doc.insert("fixtureId".into(), Value::String(id.to_string()));
    doc.insert("title".into(), Value::String(format!("{own} {venue} {opponent}")));
    doc.insert(
        "body".into(),
        Value::String(if league.is_empty() {
            format!("Next match against {opponent}")
        } else {
            format!("{league}: next match against {opponent}")
        }),
    );
    doc.insert("gameDate".into(), Value::String(game_date));
    doc.insert("opponentName".into(), Value::String(opponent));
    doc.insert("league".into(), Value::String(league));
    Some((id.to_string(), doc))
}

/// Merge-upsert one alert per upcoming fixture. Returns how many were written.
pub fn write_alerts(
    store: &dyn DocumentStore,
    fixtures: &[Value],
    team_id: i64,
    reporter: &mut dyn ErrorReport,
) -> usize {
    let mut written = 0;
    for fixture in fixtures {
        let Some((id, doc)) = build_alert(fixture, team_id) else {
            debug!("no game alert for fixture without id or tracked team");
            continue;
        };
        match store.upsert(GAME_ALERTS, &id, doc, true) {
            Ok(()) => written += 1,
            Err(e) => reporter.report(
                ErrorKind::StorageError.label(),
                &format!("Failed to write game alert: {e}"),
                &format!("Fixture ID: {id}"),
            ),
        }
    }
    info!("wrote {written} game alert(s)");
    written
}
