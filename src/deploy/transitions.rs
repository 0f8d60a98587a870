// ABOUTME: State transition methods for the deployment pipeline.
// ABOUTME: Each method consumes self and returns the next stage on success.

use tracing::info;

use crate::args::{ArgsRequest, build_deployment_args, should_use_update_command};
use crate::config::{ConfigurationError, Inputs};
use crate::image::{self, BuildError, ImagePlan};
use crate::platform::{AppOps, BuildOps, EnvironmentOps, RegistryOps, ResourceGroupOps};
use crate::resources::{self, ResolutionError};
use crate::scenario;
use crate::telemetry::Telemetry;

use super::Deployment;
use super::error::DeployError;
use super::state::{Completed, ImageReady, Planned, Resolved, Validated};
use super::strategy::{AppState, DeployStrategy};

// =============================================================================
// Inputs -> Validated
// =============================================================================

impl Deployment<Validated> {
    /// Validate the input combination and run local pre-flight checks.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for impossible input combinations, a
    /// missing source tree, or an unusable YAML configuration file.
    pub fn new(inputs: Inputs) -> Result<Self, ConfigurationError> {
        let scenario = scenario::validate(&inputs.scenario)?;
        scenario::preflight(&scenario)?;
        Ok(Deployment {
            inputs,
            state: Validated { scenario },
        })
    }

    /// Resolve the app name, location, resource group and environment.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError` if any lookup or creation call fails.
    #[must_use = "deployment state must be used"]
    pub async fn resolve_resources<P>(
        self,
        platform: &P,
    ) -> Result<Deployment<Resolved>, ResolutionError>
    where
        P: ResourceGroupOps + EnvironmentOps + AppOps + ?Sized,
    {
        let identity = resources::resolve(&self.inputs, platform).await?;
        info!(
            app = %identity.app_name,
            resource_group = %identity.resource_group,
            exists = identity.app_exists,
            "resources resolved"
        );

        Ok(Deployment {
            inputs: self.inputs,
            state: Resolved {
                scenario: self.state.scenario,
                identity,
            },
        })
    }
}

// =============================================================================
// Resolved -> ImageReady
// =============================================================================

impl Deployment<Resolved> {
    /// Log in to the registry when one is named, then build and push the
    /// image when a source path is given.
    ///
    /// # Errors
    ///
    /// Returns `BuildError` if login, build or push fails.
    #[must_use = "deployment state must be used"]
    pub async fn prepare_image<P>(
        self,
        platform: &P,
        telemetry: &mut Telemetry,
    ) -> Result<Deployment<ImageReady>, BuildError>
    where
        P: RegistryOps + BuildOps + ?Sized,
    {
        let scenario = self.state.scenario;

        if let Some(registry) = &scenario.registry {
            image::authenticate_registry(
                platform,
                registry,
                self.inputs.registry_credentials.as_ref(),
            )
            .await?;
        }

        if let Some(kind) = scenario.initial_telemetry() {
            telemetry.set_scenario(kind);
        }

        let image = match &scenario.source {
            Some(source) => {
                let (plan, path) = image::build_and_push(platform, source, &self.inputs).await?;
                telemetry.set_scenario(path.telemetry_scenario());
                plan
            }
            None => ImagePlan::prebuilt(
                scenario.image_to_deploy.clone(),
                self.inputs.runtime_stack.clone(),
            ),
        };

        Ok(Deployment {
            inputs: self.inputs,
            state: ImageReady {
                scenario,
                identity: self.state.identity,
                image,
            },
        })
    }
}

// =============================================================================
// ImageReady -> Planned
// =============================================================================

impl Deployment<ImageReady> {
    /// Choose the strategy and assemble its arguments. Makes no remote calls.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::MissingImage` when an argument-driven strategy
    /// has no image, and `DeployError::MissingEnvironment` when a new app has
    /// no environment.
    pub fn plan(self) -> Result<Deployment<Planned>, DeployError> {
        let ImageReady {
            scenario,
            identity,
            image,
        } = self.state;
        let inputs = &self.inputs;

        let update =
            should_use_update_command(identity.app_exists, inputs.ingress, inputs.target_port);
        let strategy = DeployStrategy::select(
            AppState::new(identity.app_exists, update),
            scenario.uses_yaml(),
        );

        if !strategy.uses_yaml() && image.image_to_deploy.is_none() {
            return Err(DeployError::MissingImage(identity.app_name));
        }
        if strategy == DeployStrategy::Create && identity.environment.is_none() {
            return Err(DeployError::MissingEnvironment(identity.app_name));
        }

        let args = (!strategy.uses_yaml()).then(|| {
            build_deployment_args(&ArgsRequest {
                app_exists: identity.app_exists,
                registry: scenario.registry.as_ref(),
                credentials: inputs.registry_credentials.as_ref(),
                ingress: inputs.ingress,
                target_port: inputs.target_port,
                runtime_stack: image.runtime_stack.as_ref(),
                environment_variables: inputs.environment_variables.as_ref(),
            })
        });

        if let Some(args) = &args {
            info!(strategy = %strategy, args = %args.args, "deployment planned");
        } else {
            info!(strategy = %strategy, "deployment planned");
        }

        Ok(Deployment {
            inputs: self.inputs,
            state: Planned {
                identity,
                image,
                strategy,
                args,
            },
        })
    }
}

// =============================================================================
// Planned -> Completed
// =============================================================================

impl Deployment<Planned> {
    /// Issue the Container App call, then disable ingress on an existing app
    /// when asked to.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Remote` if any call fails. Nothing is undone.
    #[must_use = "deployment state must be used"]
    pub async fn execute<P>(self, platform: &P) -> Result<Deployment<Completed>, DeployError>
    where
        P: AppOps + ?Sized,
    {
        let Planned {
            identity,
            image,
            strategy,
            args,
        } = self.state;
        let inputs = &self.inputs;
        let target = identity.target();
        let app = &identity.app_name;

        let missing_image = || DeployError::MissingImage(app.clone());

        match strategy {
            DeployStrategy::CreateFromYaml | DeployStrategy::UpdateFromYaml => {
                let yaml = inputs
                    .scenario
                    .yaml_config_path
                    .as_deref()
                    .ok_or_else(|| DeployError::MissingYamlConfig(app.clone()))?;
                info!("Deploying Container App {app} from YAML configuration {}", yaml.display());
                if strategy == DeployStrategy::CreateFromYaml {
                    platform
                        .create_app_from_yaml(&target, yaml)
                        .await
                        .map_err(DeployError::remote("create", app))?;
                } else {
                    platform
                        .update_app_from_yaml(&target, yaml)
                        .await
                        .map_err(DeployError::remote("update", app))?;
                }
            }
            DeployStrategy::Create => {
                let image_ref = image.image_to_deploy.as_ref().ok_or_else(missing_image)?;
                let environment = identity
                    .environment
                    .as_ref()
                    .ok_or_else(|| DeployError::MissingEnvironment(app.clone()))?;
                let flags = args.as_ref().map(|a| &a.args).cloned().unwrap_or_default();
                info!("Creating Container App {app} in environment {environment}");
                platform
                    .create_app(&target, environment, image_ref, &flags)
                    .await
                    .map_err(DeployError::remote("create", app))?;
            }
            DeployStrategy::Update => {
                let image_ref = image.image_to_deploy.as_ref().ok_or_else(missing_image)?;
                if let (Some(registry), Some(credentials)) = (
                    &inputs.scenario.registry,
                    &inputs.registry_credentials,
                ) {
                    info!("Updating registry credentials on Container App {app}");
                    platform
                        .update_registry(&target, registry, credentials)
                        .await
                        .map_err(DeployError::remote("set registry on", app))?;
                }
                let flags = args.as_ref().map(|a| &a.args).cloned().unwrap_or_default();
                info!("Updating Container App {app}");
                platform
                    .update_app(&target, image_ref, &flags)
                    .await
                    .map_err(DeployError::remote("update", app))?;
            }
            DeployStrategy::Up => {
                let image_ref = image.image_to_deploy.as_ref().ok_or_else(missing_image)?;
                let (flags, ingress, port) = match &args {
                    Some(a) => (a.args.clone(), a.ingress.mode.up_ingress(), a.ingress.target_port),
                    None => Default::default(),
                };
                info!("Updating Container App {app} with up");
                platform
                    .up_app(&target, image_ref, &flags, ingress, port)
                    .await
                    .map_err(DeployError::remote("update", app))?;
            }
        }

        let ingress_disabled = strategy.may_disable_ingress()
            && args.as_ref().is_some_and(|a| a.ingress.mode.is_disabled());
        if ingress_disabled {
            info!("Disabling ingress on Container App {app}");
            platform
                .disable_ingress(&target)
                .await
                .map_err(DeployError::remote("disable ingress on", app))?;
        }

        Ok(Deployment {
            inputs: self.inputs,
            state: Completed {
                identity,
                image,
                strategy,
                ingress_disabled,
            },
        })
    }
}
