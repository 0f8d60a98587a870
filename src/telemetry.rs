// ABOUTME: Best-effort usage telemetry: scenario, result, error message and processing time.
// ABOUTME: Sending failures become diagnostics warnings and never change the run's outcome.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::diagnostics::{Diagnostics, Warning};
use crate::platform::exec::CommandError;

/// Which way the deployed image came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    UsedBuilder,
    UsedDockerfile,
    UsedImage,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::UsedBuilder => "used-builder",
            ScenarioKind::UsedDockerfile => "used-dockerfile",
            ScenarioKind::UsedImage => "used-image",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunResult {
    Succeeded,
    Failed,
}

impl RunResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunResult::Succeeded => "succeeded",
            RunResult::Failed => "failed",
        }
    }
}

/// A snapshot ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryEvent {
    pub scenario: Option<ScenarioKind>,
    pub result: Option<RunResult>,
    pub error_message: Option<String>,
    pub processing_time_ms: i64,
}

/// Destination for telemetry events.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn emit(&self, event: &TelemetryEvent) -> Result<(), CommandError>;
}

/// Records what happened during a run.
#[derive(Debug)]
pub struct Telemetry {
    disabled: bool,
    started: DateTime<Utc>,
    scenario: Option<ScenarioKind>,
    result: Option<RunResult>,
    error_message: Option<String>,
}

impl Telemetry {
    pub fn new(disabled: bool) -> Self {
        Self::started_at(disabled, Utc::now())
    }

    pub fn started_at(disabled: bool, started: DateTime<Utc>) -> Self {
        Self {
            disabled,
            started,
            scenario: None,
            result: None,
            error_message: None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_scenario(&mut self, scenario: ScenarioKind) {
        self.scenario = Some(scenario);
    }

    pub fn scenario(&self) -> Option<ScenarioKind> {
        self.scenario
    }

    pub fn succeeded(&mut self) {
        self.result = Some(RunResult::Succeeded);
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        self.result = Some(RunResult::Failed);
        self.error_message = Some(message.into());
    }

    pub fn event_at(&self, now: DateTime<Utc>) -> TelemetryEvent {
        TelemetryEvent {
            scenario: self.scenario,
            result: self.result,
            error_message: self.error_message.clone(),
            processing_time_ms: (now - self.started).num_milliseconds().max(0),
        }
    }

    /// Send the event unless telemetry is disabled.
    pub async fn send(&self, sink: &dyn TelemetrySink, diagnostics: &mut Diagnostics) {
        if self.disabled {
            return;
        }

        tracing::debug!("telemetry enabled; logging run result, length and scenario");
        let event = self.event_at(Utc::now());
        match sink.emit(&event).await {
            Ok(()) => {}
            Err(CommandError::Spawn { program, .. }) => {
                diagnostics.warn(Warning::tool_setup(format!(
                    "Skipping telemetry logging: `{program}` is not available"
                )));
            }
            Err(e) => diagnostics.warn(Warning::telemetry(format!(
                "Skipping telemetry logging due to the following exception: {e}"
            ))),
        }
    }
}
