// ABOUTME: Generic deployment struct parameterized by state.
// ABOUTME: State types carry their own data so later stages can't run without it.

use crate::args::DeploymentArgs;
use crate::config::Inputs;
use crate::image::ImagePlan;
use crate::resources::ResourceIdentity;
use crate::scenario::Scenario;

use super::state::{Completed, ImageReady, Planned, Resolved, Validated};
use super::strategy::DeployStrategy;

/// A deployment run, parameterized by its current stage.
///
/// The state type parameter `S` carries what earlier stages produced, so for
/// example a `Deployment<Planned>` always has a resolved identity and image plan.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) inputs: Inputs,
    pub(crate) state: S,
}

impl Deployment<Validated> {
    pub fn scenario(&self) -> &Scenario {
        &self.state.scenario
    }
}

impl Deployment<Resolved> {
    pub fn identity(&self) -> &ResourceIdentity {
        &self.state.identity
    }
}

impl Deployment<ImageReady> {
    pub fn image(&self) -> &ImagePlan {
        &self.state.image
    }
}

impl Deployment<Planned> {
    pub fn strategy(&self) -> DeployStrategy {
        self.state.strategy
    }

    /// Assembled arguments; `None` for YAML strategies.
    pub fn args(&self) -> Option<&DeploymentArgs> {
        self.state.args.as_ref()
    }
}

impl Deployment<Completed> {
    pub fn identity(&self) -> &ResourceIdentity {
        &self.state.identity
    }
}
