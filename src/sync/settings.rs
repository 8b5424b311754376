use anyhow::{Context, bail};
use football_api::client::{API_FOOTBALL_V3, DEFAULT_KEY_HEADER, RetryPolicy};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_key_header: String,
    pub base_url: String,
    pub team_id: i64,
    pub store_dir: PathBuf,
    pub collection: String,
    pub document_id: String,
    pub interval: Duration,
    pub next_fixtures: u32,
    /// The one league whose standings are split into a table per group.
    pub grouped_league: String,
    /// Name of hand-curated league tables that fetch never produces.
    pub preserved_name: String,
    pub top_scorers_league: i64,
    pub top_scorers_name: String,
    pub top_scorers_timeout: Duration,
    pub retry: RetryPolicy,
    pub game_alerts: bool,
    pub alert_webhook: Option<String>,
    pub alert_threshold: u32,
}

impl Settings {
    /// Defaults for everything except the credentials and tracked team.
    pub fn for_team(api_key: impl Into<String>, team_id: i64) -> Self {
        Self {
            api_key: api_key.into(),
            api_key_header: DEFAULT_KEY_HEADER.into(),
            base_url: API_FOOTBALL_V3.into(),
            team_id,
            store_dir: PathBuf::from("./data"),
            collection: "football".into(),
            document_id: "football".into(),
            interval: Duration::from_secs(60),
            next_fixtures: 8,
            grouped_league: "Liga Profesional Argentina".into(),
            preserved_name: "Tabla Anual".into(),
            top_scorers_league: 128,
            top_scorers_name: "Primera LPF".into(),
            top_scorers_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            game_alerts: false,
            alert_webhook: None,
            alert_threshold: 3,
        }
    }

    /// Read settings from `F12_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let Some(api_key) = get("F12_API_KEY") else {
            bail!("F12_API_KEY is not set");
        };
        let Some(team_id) = get("F12_TEAM_ID") else {
            bail!("F12_TEAM_ID is not set");
        };
        let team_id = team_id
            .parse::<i64>()
            .with_context(|| format!("F12_TEAM_ID must be an integer, got {team_id:?}"))?;

        let mut settings = Self::for_team(api_key, team_id);

        if let Some(header) = get("F12_API_KEY_HEADER") {
            settings.api_key_header = header;
        }
        if let Some(url) = get("F12_BASE_URL") {
            settings.base_url = url;
        }
        if let Some(dir) = get("F12_STORE_DIR") {
            settings.store_dir = PathBuf::from(dir);
        }
        if let Some(collection) = get("F12_COLLECTION") {
            settings.document_id = collection.clone();
            settings.collection = collection;
        }
        if let Some(document) = get("F12_DOCUMENT") {
            settings.document_id = document;
        }
        if let Some(name) = get("F12_GROUPED_LEAGUE") {
            settings.grouped_league = name;
        }
        if let Some(name) = get("F12_PRESERVED_NAME") {
            settings.preserved_name = name;
        }
        if let Some(name) = get("F12_TOP_SCORERS_NAME") {
            settings.top_scorers_name = name;
        }
        settings.alert_webhook = get("F12_ALERT_WEBHOOK");

        settings.interval =
            Duration::from_secs(parsed(&get, "F12_INTERVAL_SECS", settings.interval.as_secs())?);
        settings.next_fixtures = parsed(&get, "F12_NEXT_FIXTURES", settings.next_fixtures)?;
        settings.top_scorers_league =
            parsed(&get, "F12_TOP_SCORERS_LEAGUE", settings.top_scorers_league)?;
        settings.alert_threshold = parsed(&get, "F12_ALERT_THRESHOLD", settings.alert_threshold)?;
        settings.game_alerts = match get("F12_GAME_ALERTS") {
            Some(flag) => parse_flag(&flag)
                .with_context(|| format!("F12_GAME_ALERTS must be true or false, got {flag:?}"))?,
            None => settings.game_alerts,
        };

        Ok(settings)
    }
}

fn parsed<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
