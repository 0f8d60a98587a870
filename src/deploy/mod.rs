// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Runs validate, resolve, image, plan and execute in order and reports a summary.

mod deployment;
mod error;
mod state;
mod strategy;
mod transitions;

pub use deployment::Deployment;
pub use error::DeployError;
pub use state::{Completed, ImageReady, Planned, Resolved, Validated};
pub use strategy::{AppState, DeployStrategy};

use serde::Serialize;

use crate::image::ImagePlan;
use crate::output::Output;
use crate::platform::Platform;
use crate::resources::ResourceIdentity;
use crate::telemetry::Telemetry;

/// What a finished run did.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentSummary {
    #[serde(flatten)]
    pub identity: ResourceIdentity,
    pub strategy: DeployStrategy,
    #[serde(flatten)]
    pub image: ImagePlan,
    pub ingress_disabled: bool,
}

impl Deployment<Completed> {
    pub fn summary(&self) -> DeploymentSummary {
        DeploymentSummary {
            identity: self.state.identity.clone(),
            strategy: self.state.strategy,
            image: self.state.image.clone(),
            ingress_disabled: self.state.ingress_disabled,
        }
    }
}

/// Run every remaining stage of a validated deployment.
///
/// Stages run strictly one after another and the first failure stops the
/// run; resources created before it are left for the next run to reuse.
pub async fn run<P>(
    deployment: Deployment<Validated>,
    platform: &P,
    telemetry: &mut Telemetry,
    output: &Output,
) -> crate::Result<DeploymentSummary>
where
    P: Platform + ?Sized,
{
    let scenario = deployment.scenario();
    if let Some(source) = &scenario.source {
        output.progress(&format!(
            "  → Source {} will be built and pushed to {}",
            source.path.display(),
            source.registry.login_server()
        ));
    }

    let resolved = deployment.resolve_resources(platform).await?;
    let identity = resolved.identity();
    output.progress(&format!(
        "  → Container App {} in resource group {} ({})",
        identity.app_name,
        identity.resource_group,
        if identity.app_exists { "exists" } else { "new" }
    ));

    let ready = resolved.prepare_image(platform, telemetry).await?;
    if let Some(image) = &ready.image().image_to_deploy {
        output.progress(&format!("  → Image {image} ready"));
    }

    let planned = ready.plan()?;
    match planned.args() {
        Some(args) if !args.args.is_empty() => output.progress(&format!(
            "  → Running {} with {}",
            planned.strategy(),
            args.args
        )),
        _ => output.progress(&format!("  → Running {}", planned.strategy())),
    }

    let completed = planned.execute(platform).await?;
    if completed.state.ingress_disabled {
        output.progress(&format!(
            "  → Ingress disabled on {}",
            completed.identity().app_name
        ));
    }

    Ok(completed.summary())
}
