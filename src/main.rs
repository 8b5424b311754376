mod sync;

use crate::sync::pipeline::{Pipeline, RunStatus};
use crate::sync::report::{AlertSink, Escalation};
use crate::sync::scheduler::{PeriodicRunner, log_result};
use crate::sync::settings::Settings;
use crate::sync::store::JsonFileStore;
use anyhow::Context;
use log::info;
use tracing_subscriber::EnvFilter;

enum Mode {
    Once,
    Scheduled,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(mode) = handle_cli_args() else {
        return Ok(());
    };

    better_panic::install();
    init_logging();

    let settings = Settings::load().context("failed to load settings")?;
    let store = JsonFileStore::new(settings.store_dir.clone());
    info!(
        "syncing team {} into {}/{}/{}",
        settings.team_id,
        settings.store_dir.display(),
        settings.collection,
        settings.document_id
    );

    match mode {
        Mode::Once => {
            let pipeline = Pipeline::from_settings(settings, store);
            let result = pipeline.run().await;
            log_result(&result);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.status == RunStatus::Error {
                std::process::exit(1);
            }
        }
        Mode::Scheduled => {
            let every = settings.interval;
            let alerts = AlertSink::from_settings(&settings);
            let escalation = Escalation::new(settings.alert_threshold);
            let runner = PeriodicRunner::new(
                Pipeline::from_settings(settings, store),
                every,
                escalation,
                alerts,
            );
            info!("running every {}s, ctrl-c to stop", every.as_secs());
            tokio::select! {
                _ = runner.run() => {}
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for ctrl-c")?;
                    info!("shutting down");
                }
            }
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_cli_args() -> Option<Mode> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Some(Mode::Scheduled);
    };

    match arg.as_str() {
        "--once" => Some(Mode::Once),
        "-h" | "--help" => {
            println!("{}", usage_text());
            None
        }
        "-V" | "--version" => {
            println!("f12sync {}", env!("CARGO_PKG_VERSION"));
            None
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "f12sync - keep a club's football data in sync with a document store

Usage:
  f12sync            run now, then every F12_INTERVAL_SECS
  f12sync --once     run once and print the result as JSON
  f12sync --help
  f12sync --version

Environment:
  F12_API_KEY            API-Football key (required)
  F12_TEAM_ID            Tracked team id (required)
  F12_API_KEY_HEADER     Header carrying the key (default x-apisports-key)
  F12_BASE_URL           API base URL (default https://v3.football.api-sports.io)
  F12_STORE_DIR          Document store directory (default ./data)
  F12_COLLECTION         Collection name (default football)
  F12_DOCUMENT           Document id (defaults to the collection name)
  F12_INTERVAL_SECS      Seconds between runs (default 60)
  F12_NEXT_FIXTURES      Upcoming fixtures to fetch (default 8)
  F12_GROUPED_LEAGUE     League split per group (default Liga Profesional Argentina)
  F12_PRESERVED_NAME     Hand-curated table name (default Tabla Anual)
  F12_TOP_SCORERS_LEAGUE League for top scorers (default 128)
  F12_TOP_SCORERS_NAME   Name stored with top scorers (default Primera LPF)
  F12_GAME_ALERTS        Write per-fixture alerts (default false)
  F12_ALERT_WEBHOOK      URL receiving escalated alerts
  F12_ALERT_THRESHOLD    Failing runs before alerting (default 3)
  RUST_LOG               Log filter (default info)"
}
