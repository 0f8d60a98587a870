// ABOUTME: Docker CLI implementation of registry login, push, Dockerfile builds and telemetry.
// ABOUTME: Passwords and tokens are always fed through stdin, never the command line.

use std::path::Path;

use super::exec::{CommandError, CommandRunner, args};
use crate::telemetry::TelemetryEvent;
use crate::types::ImageRef;

const DOCKER: &str = "docker";

/// Oryx CLI image used for runtime detection and telemetry.
pub const ORYX_CLI_IMAGE: &str = "mcr.microsoft.com/oryx/cli:debian-buster-20230207.2";

/// Username that pairs with an ACR access token.
pub const TOKEN_USERNAME: &str = "00000000-0000-0000-0000-000000000000";

const TELEMETRY_EVENT_NAME: &str = "ContainerAppsPipelinesTaskRCV1";

#[derive(Debug, Clone, Default)]
pub struct DockerCli {
    runner: CommandRunner,
}

impl DockerCli {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    pub async fn login(
        &self,
        server: &str,
        username: &str,
        secret: &str,
    ) -> Result<(), CommandError> {
        self.runner
            .run_with_stdin(
                DOCKER,
                &args(["login", "--username", username, "--password-stdin", server]),
                Some(secret),
            )
            .await
            .map(drop)
    }

    pub async fn push(&self, image: &ImageRef) -> Result<(), CommandError> {
        self.runner
            .run(DOCKER, &args(["push", &image.to_string()]))
            .await
            .map(drop)
    }

    pub async fn build(
        &self,
        image: &ImageRef,
        source: &Path,
        dockerfile: &Path,
    ) -> Result<(), CommandError> {
        self.runner
            .run(DOCKER, &build_args(image, source, dockerfile))
            .await
            .map(drop)
    }

    /// Send a telemetry event through the Oryx CLI image.
    pub async fn send_telemetry(&self, event: &TelemetryEvent) -> Result<(), CommandError> {
        self.runner
            .run(
                DOCKER,
                &args([
                    "run",
                    "--rm",
                    ORYX_CLI_IMAGE,
                    "/bin/bash",
                    "-c",
                    &telemetry_script(event),
                ]),
            )
            .await
            .map(drop)
    }
}

pub(crate) fn build_args(image: &ImageRef, source: &Path, dockerfile: &Path) -> Vec<String> {
    args([
        "build",
        "--file",
        &dockerfile.display().to_string(),
        &source.display().to_string(),
        "--tag",
        &image.to_string(),
    ])
}

/// The `oryx telemetry` invocation run inside the CLI image.
pub(crate) fn telemetry_script(event: &TelemetryEvent) -> String {
    let mut script = format!(
        "oryx telemetry --event-name '{TELEMETRY_EVENT_NAME}' --processing-time '{}'",
        event.processing_time_ms
    );
    if let Some(result) = event.result {
        script.push_str(&format!(" --property 'result={}'", result.as_str()));
    }
    if let Some(scenario) = event.scenario {
        script.push_str(&format!(" --property 'scenario={scenario}'"));
    }
    if let Some(message) = event.error_message.as_deref().filter(|m| !m.is_empty()) {
        // Single quotes would end the quoted property early
        let message = message.replace('\'', "");
        script.push_str(&format!(" --property 'errorMessage={message}'"));
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{RunResult, ScenarioKind};

    #[test]
    fn build_uses_file_and_tag() {
        let image: ImageRef = "myacr.azurecr.io/app:1.2".parse().unwrap();
        let argv = build_args(&image, Path::new("/src"), Path::new("/src/Dockerfile"));
        assert_eq!(
            argv.join(" "),
            "build --file /src/Dockerfile /src --tag myacr.azurecr.io/app:1.2"
        );
    }

    #[test]
    fn telemetry_script_includes_set_properties_only() {
        let event = TelemetryEvent {
            scenario: Some(ScenarioKind::UsedBuilder),
            result: Some(RunResult::Succeeded),
            error_message: None,
            processing_time_ms: 42,
        };
        assert_eq!(
            telemetry_script(&event),
            "oryx telemetry --event-name 'ContainerAppsPipelinesTaskRCV1' \
             --processing-time '42' --property 'result=succeeded' \
             --property 'scenario=used-builder'"
        );
    }

    #[test]
    fn telemetry_script_strips_quotes_from_errors() {
        let event = TelemetryEvent {
            scenario: None,
            result: Some(RunResult::Failed),
            error_message: Some("can't find 'app'".into()),
            processing_time_ms: 7,
        };
        let script = telemetry_script(&event);
        assert!(script.ends_with("--property 'errorMessage=cant find app'"));
    }
}
