//! Reshape `/standings` payloads into flat per-league tables.

use crate::wire::StandingsLeague;
use crate::{League, LeagueIdentity};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;

/// Restructure one league's standings.
///
/// The league named `grouped_league` is split into one [`League`] per group,
/// each named after its group and identified by `(league id, group)`. Every
/// other league becomes a single entry whose nested standings arrays are
/// flattened in order. Identities already in `seen` are skipped; new ones are
/// recorded there.
pub fn restructure(
    raw: StandingsLeague,
    grouped_league: &str,
    seen: &mut HashSet<LeagueIdentity>,
) -> Vec<League> {
    if raw.name == grouped_league {
        split_groups(raw, seen)
    } else {
        flatten_league(raw, seen).into_iter().collect()
    }
}

fn split_groups(raw: StandingsLeague, seen: &mut HashSet<LeagueIdentity>) -> Vec<League> {
    let mut leagues = Vec::new();

    for group in &raw.standings {
        let mut rows = Vec::new();
        flatten_into(group, &mut rows);

        let Some(group_name) = rows.first().and_then(group_of) else {
            warn!("league {}: standings group without a group name, skipping", raw.id);
            continue;
        };

        let identity = LeagueIdentity::grouped(raw.id, group_name.clone());
        if !seen.insert(identity.clone()) {
            debug!("league {identity} already processed in this run");
            continue;
        }

        leagues.push(League {
            id: raw.id,
            name: group_name.clone(),
            country: raw.country.clone(),
            logo: raw.logo.clone(),
            flag: raw.flag.clone(),
            season: raw.season,
            group: Some(group_name),
            standings: rows,
            enabled: true,
            order: 0,
        });
    }

    leagues
}

fn flatten_league(raw: StandingsLeague, seen: &mut HashSet<LeagueIdentity>) -> Option<League> {
    let identity = LeagueIdentity::league(raw.id);
    if !seen.insert(identity) {
        debug!("league {} already processed in this run", raw.id);
        return None;
    }

    let mut rows = Vec::new();
    for group in &raw.standings {
        flatten_into(group, &mut rows);
    }

    Some(League {
        id: raw.id,
        name: raw.name,
        country: raw.country,
        logo: raw.logo,
        flag: raw.flag,
        season: raw.season,
        group: None,
        standings: rows,
        enabled: true,
        order: 0,
    })
}

/// Depth-first flatten of arbitrarily nested arrays; `null`s are dropped.
fn flatten_into(value: &Value, rows: &mut Vec<Value>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| flatten_into(item, rows)),
        Value::Null => {}
        row => rows.push(row.clone()),
    }
}

fn group_of(row: &Value) -> Option<String> {
    row.get("group")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_owned)
}
