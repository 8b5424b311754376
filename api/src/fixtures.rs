//! Shaping helpers for fixture and last-game records.

use log::warn;
use serde_json::{Map, Value, json};

pub const STATISTICS: &str = "statistics";
pub const EVENTS: &str = "events";
pub const LINEUPS: &str = "lineups";
pub const PREDICTIONS: &str = "predictions";

/// The upstream fixture id at `fixture.id`.
pub fn fixture_id(record: &Value) -> Option<i64> {
    let id = record.get("fixture")?.get("id")?;
    id.as_i64()
        .or_else(|| id.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Attach a prediction to the nearest upcoming fixture.
pub fn attach_prediction(fixtures: &mut [Value], prediction: Value) {
    if let Some(Value::Object(next)) = fixtures.first_mut() {
        next.insert(PREDICTIONS.into(), prediction);
    }
}

/// Set one of the last-game detail lists. Non-object records are left alone.
pub fn set_detail(game: &mut Value, key: &str, items: Vec<Value>) {
    if let Value::Object(map) = game {
        map.insert(key.into(), Value::Array(items));
    }
}

/// Make sure the detail lists exist, so an absent stage reads as `[]`.
pub fn ensure_last_game_shape(game: &mut Value) {
    if let Value::Object(map) = game {
        for key in [STATISTICS, EVENTS, LINEUPS] {
            let entry = map.entry(key).or_insert_with(|| Value::Array(Vec::new()));
            if !entry.is_array() {
                *entry = Value::Array(Vec::new());
            }
        }
    }
}

/// Rebuild every event's `time` as `{elapsed: int, extra: int|null}`.
/// Non-object events are dropped.
pub fn clean_events(events: Vec<Value>) -> Vec<Value> {
    events.into_iter().filter_map(clean_event).collect()
}

fn clean_event(event: Value) -> Option<Value> {
    let Value::Object(mut event) = event else {
        warn!("dropping malformed fixture event: {event}");
        return None;
    };

    let time = match event.remove("time") {
        Some(Value::Object(time)) => clean_time(&time),
        _ => json!({"elapsed": 0, "extra": null}),
    };
    event.insert("time".into(), time);
    Some(Value::Object(event))
}

fn clean_time(time: &Map<String, Value>) -> Value {
    let elapsed = match time.get("elapsed") {
        None | Some(Value::Null) => 0,
        Some(raw) => parse_minute(raw).unwrap_or_else(|| {
            warn!("failed to convert elapsed time: {raw}");
            0
        }),
    };
    let extra = match time.get("extra") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let parsed = parse_minute(raw);
            if parsed.is_none() {
                warn!("failed to convert extra time: {raw}");
            }
            parsed
        }
    };
    json!({"elapsed": elapsed, "extra": extra})
}

/// Minutes arrive as integers, floats, or numeric strings; truncate toward zero.
fn parse_minute(raw: &Value) -> Option<i64> {
    let minutes = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    minutes.is_finite().then(|| minutes.trunc() as i64)
}
