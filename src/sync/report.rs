use crate::sync::pipeline::{RunResult, RunStatus};
use crate::sync::settings::Settings;
use chrono::Utc;
use football_api::client::{ErrorReport, format_report};
use log::{error, info, warn};
use serde::Serialize;
use std::time::Duration;

/// Collects one run's error messages and logs each as it arrives.
#[derive(Debug, Default)]
pub struct RunReporter {
    errors: Vec<String>,
}

impl RunReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

impl ErrorReport for RunReporter {
    fn report(&mut self, error_type: &str, message: &str, context: &str) {
        let full = format_report(error_type, message, context);
        error!("{full}");
        self.errors.push(full);
    }
}

// ---------------------------------------------------------------------------
// Escalation across runs
// ---------------------------------------------------------------------------

/// Counts consecutive failing runs (error status, or any recorded error).
#[derive(Debug, Clone)]
pub struct Escalation {
    threshold: u32,
    consecutive: u32,
}

impl Escalation {
    pub fn new(threshold: u32) -> Self {
        Self { threshold: threshold.max(1), consecutive: 0 }
    }

    /// Feed one run's result. Returns the failure streak length when it
    /// reaches the threshold; the streak then starts over.
    pub fn observe(&mut self, result: &RunResult) -> Option<u32> {
        let failing = result.status == RunStatus::Error || !result.errors().is_empty();
        if !failing {
            self.consecutive = 0;
            return None;
        }
        self.consecutive += 1;
        if self.consecutive < self.threshold {
            return None;
        }
        let streak = self.consecutive;
        self.consecutive = 0;
        Some(streak)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub consecutive_failures: u32,
    pub status: RunStatus,
    pub errors: Vec<String>,
    pub raised_at: String,
}

impl Alert {
    pub fn new(consecutive_failures: u32, result: &RunResult) -> Self {
        Self {
            consecutive_failures,
            status: result.status,
            errors: result.errors().to_vec(),
            raised_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Where escalated alerts go.
#[derive(Debug, Clone)]
pub enum AlertSink {
    Log,
    Webhook { client: reqwest::Client, url: String },
}

impl AlertSink {
    pub fn from_settings(settings: &Settings) -> Self {
        match &settings.alert_webhook {
            Some(url) => AlertSink::Webhook {
                client: reqwest::Client::builder()
                    .timeout(Duration::from_secs(10))
                    .build()
                    .unwrap_or_default(),
                url: url.clone(),
            },
            None => AlertSink::Log,
        }
    }

    pub async fn send(&self, alert: &Alert) {
        match self {
            AlertSink::Log => error!(
                "{} consecutive failing runs; last errors: {}",
                alert.consecutive_failures,
                alert.errors.join(" || ")
            ),
            AlertSink::Webhook { client, url } => {
                match client.post(url).json(alert).send().await {
                    Ok(res) if res.status().is_success() => {
                        info!("alert delivered to webhook ({} failing runs)", alert.consecutive_failures)
                    }
                    Ok(res) => warn!("alert webhook answered {}", res.status()),
                    Err(e) => warn!("alert webhook unreachable: {e}"),
                }
            }
        }
    }
}
