// ABOUTME: Builds images from source with the pack CLI and the Oryx builder.
// ABOUTME: Runtime stack detection runs the Oryx CLI image against the mounted source tree.

use std::path::Path;

use super::docker::ORYX_CLI_IMAGE;
use super::exec::{CommandError, CommandRunner, args};
use crate::types::{ImageRef, RuntimeStack};

const PACK: &str = "pack";

pub const ORYX_BUILDER_IMAGE: &str = "mcr.microsoft.com/oryx/builder:20230208.1";

const PACK_VERSION: &str = "v0.27.0";

const CALLER_ID: &str = "CALLER_ID=github-actions-v1";

#[derive(Debug, Clone, Default)]
pub struct PackCli {
    runner: CommandRunner,
}

impl PackCli {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    /// Whether `pack` is already on the PATH.
    pub async fn is_installed(&self) -> Result<bool, CommandError> {
        match self.runner.succeeds(PACK, &args(["--version"])).await {
            Ok(ok) => Ok(ok),
            Err(CommandError::Spawn { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Download the pack release into `/usr/local/bin` unless it is present.
    pub async fn install(&self) -> Result<(), CommandError> {
        if self.is_installed().await? {
            tracing::debug!("pack CLI already installed");
            return Ok(());
        }

        tracing::info!("Installing pack CLI {PACK_VERSION}");
        self.runner
            .run("sh", &args(["-c", &install_script()]))
            .await
            .map(drop)
    }

    pub async fn set_default_builder(&self) -> Result<(), CommandError> {
        self.runner
            .run(
                PACK,
                &args(["config", "default-builder", ORYX_BUILDER_IMAGE]),
            )
            .await
            .map(drop)
    }

    pub async fn build(
        &self,
        image: &ImageRef,
        source: &Path,
        stack: &RuntimeStack,
    ) -> Result<(), CommandError> {
        self.runner
            .run(PACK, &build_args(image, source, stack))
            .await
            .map(drop)
    }

    pub async fn detect_runtime_stack(&self, source: &Path) -> Result<RuntimeStack, CommandError> {
        let source = std::path::absolute(source)?;
        let volume = format!("{}:/app", source.display());
        let argv = args([
            "run",
            "--rm",
            "-v",
            &volume,
            ORYX_CLI_IMAGE,
            "/bin/bash",
            "-c",
            "oryx dockerfile /app | head -n 1 | sed 's/ARG RUNTIME=//'",
        ]);

        let output = self.runner.run("docker", &argv).await?;
        parse_detected_stack(&output)
    }
}

fn install_script() -> String {
    format!(
        "curl -sSL https://github.com/buildpacks/pack/releases/download/{v}/pack-{v}-linux.tgz \
         | tar -C /usr/local/bin/ --no-same-owner -xzv pack",
        v = PACK_VERSION
    )
}

pub(crate) fn build_args(image: &ImageRef, source: &Path, stack: &RuntimeStack) -> Vec<String> {
    args([
        "build",
        &image.to_string(),
        "--path",
        &source.display().to_string(),
        "--builder",
        ORYX_BUILDER_IMAGE,
        "--run-image",
        &format!("mcr.microsoft.com/oryx/{stack}"),
        "--env",
        CALLER_ID,
    ])
}

/// The first non-empty line of the detection output is the stack, e.g. `python:3.9`.
pub(crate) fn parse_detected_stack(output: &str) -> Result<RuntimeStack, CommandError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| CommandError::InvalidOutput {
            command: "oryx dockerfile".to_string(),
            reason: "no runtime stack detected".to_string(),
        })?;

    RuntimeStack::new(line).map_err(|e| CommandError::InvalidOutput {
        command: "oryx dockerfile".to_string(),
        reason: e.to_string(),
    })
}
