use crate::sync::pipeline::{Pipeline, RunResult, RunStatus};
use crate::sync::report::{Alert, AlertSink, Escalation};
use crate::sync::store::DocumentStore;
use log::{error, info, warn};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

/// Runs the pipeline immediately and then once per interval. Runs never
/// overlap: a slow run delays the next tick instead of stacking up.
pub struct PeriodicRunner<S> {
    pipeline: Pipeline<S>,
    every: Duration,
    escalation: Escalation,
    alerts: AlertSink,
}

impl<S: DocumentStore> PeriodicRunner<S> {
    pub fn new(pipeline: Pipeline<S>, every: Duration, escalation: Escalation, alerts: AlertSink) -> Self {
        Self { pipeline, every, escalation, alerts }
    }

    pub async fn run(mut self) {
        let mut ticks = interval(self.every.max(Duration::from_secs(1)));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick completes immediately.
            ticks.tick().await;
            let result = self.pipeline.run().await;
            log_result(&result);
            self.escalate(&result).await;
        }
    }

    async fn escalate(&mut self, result: &RunResult) {
        if let Some(streak) = self.escalation.observe(result) {
            self.alerts.send(&Alert::new(streak, result)).await;
        }
    }
}

pub fn log_result(result: &RunResult) {
    match (result.status, result.errors().len()) {
        (RunStatus::Success, 0) => info!("run succeeded: {:?}", result.data_summary),
        (RunStatus::Success, n) => warn!("run succeeded with {n} error(s): {:?}", result.data_summary),
        (RunStatus::Error, _) => error!("run failed: {}", result.message),
    }
}
