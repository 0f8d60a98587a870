// ABOUTME: Deployment state types for the type state pattern.
// ABOUTME: Each state carries the data produced by the stages before it.

use crate::args::DeploymentArgs;
use crate::image::ImagePlan;
use crate::resources::ResourceIdentity;
use crate::scenario::Scenario;

use super::strategy::DeployStrategy;

/// Inputs validated and pre-flight checks passed.
/// Available actions: `resolve_resources()`
#[derive(Debug, Clone)]
pub struct Validated {
    pub(crate) scenario: Scenario,
}

/// Resource group, environment and app existence known.
/// Available actions: `prepare_image()`
#[derive(Debug, Clone)]
pub struct Resolved {
    pub(crate) scenario: Scenario,
    pub(crate) identity: ResourceIdentity,
}

/// Registry authenticated and image built and pushed when a source was given.
/// Available actions: `plan()`
#[derive(Debug, Clone)]
pub struct ImageReady {
    pub(crate) scenario: Scenario,
    pub(crate) identity: ResourceIdentity,
    pub(crate) image: ImagePlan,
}

/// Strategy chosen and arguments assembled. YAML strategies carry no arguments.
/// Available actions: `execute()`
#[derive(Debug, Clone)]
pub struct Planned {
    pub(crate) identity: ResourceIdentity,
    pub(crate) image: ImagePlan,
    pub(crate) strategy: DeployStrategy,
    pub(crate) args: Option<DeploymentArgs>,
}

/// The Container App call succeeded.
/// Available actions: `summary()`
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) identity: ResourceIdentity,
    pub(crate) image: ImagePlan,
    pub(crate) strategy: DeployStrategy,
    pub(crate) ingress_disabled: bool,
}
