// ABOUTME: Pipeline inputs for a deployment run.
// ABOUTME: Normalizes raw action inputs (empty means unset) into typed, validated values.

mod env_value;
mod error;
mod yaml;

pub use env_value::parse_env_vars;
pub use error::ConfigurationError;
pub use yaml::check_yaml_config;

use nonempty::NonEmpty;
use std::fmt;
use std::path::PathBuf;

use crate::types::{
    AppName, EnvVar, EnvironmentName, ImageRef, Ingress, Location, RegistryName,
    ResourceGroupName, RuntimeStack,
};

/// Raw inputs as the pipeline hands them over.
///
/// GitHub Actions exposes every `with:` input as `INPUT_<NAME>` and sets
/// unspecified inputs to the empty string, so every field is an optional
/// string and emptiness is resolved in [`Inputs::from_raw`].
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RawInputs {
    /// Path to the application source to build into an image
    #[arg(long, env = "INPUT_APPSOURCEPATH")]
    pub app_source_path: Option<String>,

    /// Name of the Azure Container Registry to push built images to
    #[arg(long, env = "INPUT_ACRNAME")]
    pub acr_name: Option<String>,

    /// Previously built image to deploy
    #[arg(long, env = "INPUT_IMAGETODEPLOY")]
    pub image_to_deploy: Option<String>,

    /// Container App YAML configuration file to deploy
    #[arg(long, env = "INPUT_YAMLCONFIGPATH")]
    pub yaml_config_path: Option<String>,

    /// Name of the Container App to create or update
    #[arg(long, env = "INPUT_CONTAINERAPPNAME")]
    pub container_app_name: Option<String>,

    /// Azure region to create resources in
    #[arg(long, env = "INPUT_LOCATION")]
    pub location: Option<String>,

    /// Resource group holding the Container App
    #[arg(long, env = "INPUT_RESOURCEGROUP")]
    pub resource_group: Option<String>,

    /// Container App environment for a new Container App
    #[arg(long, env = "INPUT_CONTAINERAPPENVIRONMENT")]
    pub container_app_environment: Option<String>,

    /// Username for the Azure Container Registry
    #[arg(long, env = "INPUT_ACRUSERNAME")]
    pub acr_username: Option<String>,

    /// Password for the Azure Container Registry
    #[arg(long, env = "INPUT_ACRPASSWORD", hide_env_values = true)]
    pub acr_password: Option<String>,

    /// Name of the image to build from source
    #[arg(long, env = "INPUT_IMAGETOBUILD")]
    pub image_to_build: Option<String>,

    /// Dockerfile to build, relative to the application source
    #[arg(long, env = "INPUT_DOCKERFILEPATH")]
    pub dockerfile_path: Option<String>,

    /// Runtime stack for builder-based images, e.g. python:3.9
    #[arg(long, env = "INPUT_RUNTIMESTACK")]
    pub runtime_stack: Option<String>,

    /// Ingress: external, internal or disabled
    #[arg(long, env = "INPUT_INGRESS")]
    pub ingress: Option<String>,

    /// Port the application listens on
    #[arg(long, env = "INPUT_TARGETPORT")]
    pub target_port: Option<String>,

    /// Space-separated NAME=value pairs to set on the Container App
    #[arg(long, env = "INPUT_ENVIRONMENTVARIABLES")]
    pub environment_variables: Option<String>,

    /// Set to true to skip sending telemetry
    #[arg(long, env = "INPUT_DISABLETELEMETRY")]
    pub disable_telemetry: Option<String>,

    /// Unique id of the pipeline run
    #[arg(long, env = "GITHUB_RUN_ID")]
    pub run_id: Option<String>,

    /// Number of the pipeline run
    #[arg(long, env = "GITHUB_RUN_NUMBER")]
    pub run_number: Option<String>,
}

impl RawInputs {
    /// Whether telemetry is disabled. Only a case-insensitive `true` disables it.
    ///
    /// Read separately from [`Inputs::from_raw`] so that telemetry can record
    /// failures of input validation itself.
    pub fn telemetry_disabled(&self) -> bool {
        non_empty(self.disable_telemetry.as_deref())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }
}

/// The four inputs that decide which deployment scenario applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioInputs {
    pub app_source_path: Option<PathBuf>,
    pub registry: Option<RegistryName>,
    pub image_to_deploy: Option<ImageRef>,
    pub yaml_config_path: Option<PathBuf>,
}

/// Username/password pair for the container registry.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Run identifiers from the CI platform. Opaque strings used only for default names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVariables {
    pub run_id: String,
    pub run_number: String,
}

/// Fully normalized inputs for one deployment run.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub scenario: ScenarioInputs,
    pub app_name: Option<AppName>,
    pub location: Option<Location>,
    pub resource_group: Option<ResourceGroupName>,
    pub environment: Option<EnvironmentName>,
    pub registry_credentials: Option<RegistryCredentials>,
    pub image_to_build: Option<ImageRef>,
    pub dockerfile_path: Option<PathBuf>,
    pub runtime_stack: Option<RuntimeStack>,
    pub ingress: Option<Ingress>,
    pub target_port: Option<u16>,
    pub environment_variables: Option<NonEmpty<EnvVar>>,
    pub disable_telemetry: bool,
    pub build: Option<BuildVariables>,
}

impl Inputs {
    /// Normalize raw inputs. Empty strings count as unset.
    ///
    /// This only checks individual values; input combinations are checked by
    /// [`crate::scenario::validate`].
    pub fn from_raw(raw: RawInputs) -> Result<Self, ConfigurationError> {
        let disable_telemetry = raw.telemetry_disabled();

        let scenario = ScenarioInputs {
            app_source_path: non_empty(raw.app_source_path.as_deref()).map(PathBuf::from),
            registry: non_empty(raw.acr_name.as_deref())
                .map(RegistryName::new)
                .transpose()
                .map_err(|e| ConfigurationError::invalid("acrName", e))?,
            image_to_deploy: non_empty(raw.image_to_deploy.as_deref())
                .map(ImageRef::parse)
                .transpose()
                .map_err(|e| ConfigurationError::invalid("imageToDeploy", e))?,
            yaml_config_path: non_empty(raw.yaml_config_path.as_deref()).map(PathBuf::from),
        };

        let app_name = non_empty(raw.container_app_name.as_deref())
            .map(AppName::new)
            .transpose()
            .map_err(|e| ConfigurationError::invalid("containerAppName", e))?;

        // A lone username or password is ignored; login falls back to an access token
        let registry_credentials = match (
            non_empty(raw.acr_username.as_deref()),
            non_empty(raw.acr_password.as_deref()),
        ) {
            (Some(username), Some(password)) => Some(RegistryCredentials {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        };

        let image_to_build = non_empty(raw.image_to_build.as_deref())
            .map(ImageRef::parse)
            .transpose()
            .map_err(|e| ConfigurationError::invalid("imageToBuild", e))?;

        let runtime_stack = non_empty(raw.runtime_stack.as_deref())
            .map(RuntimeStack::new)
            .transpose()
            .map_err(|e| ConfigurationError::invalid("runtimeStack", e))?;

        let ingress = non_empty(raw.ingress.as_deref())
            .map(str::parse::<Ingress>)
            .transpose()
            .map_err(|e| ConfigurationError::invalid("ingress", e))?;

        let target_port = non_empty(raw.target_port.as_deref())
            .map(|port| port.parse::<u16>())
            .transpose()
            .map_err(|e| ConfigurationError::invalid("targetPort", e))?;

        let environment_variables = match non_empty(raw.environment_variables.as_deref()) {
            Some(value) => parse_env_vars(value)
                .map_err(|e| ConfigurationError::invalid("environmentVariables", e))?,
            None => None,
        };

        let build = match (
            non_empty(raw.run_id.as_deref()),
            non_empty(raw.run_number.as_deref()),
        ) {
            (Some(run_id), Some(run_number)) => Some(BuildVariables {
                run_id: run_id.to_string(),
                run_number: run_number.to_string(),
            }),
            _ => None,
        };

        Ok(Inputs {
            scenario,
            app_name,
            location: non_empty(raw.location.as_deref()).map(Location::new),
            resource_group: non_empty(raw.resource_group.as_deref()).map(ResourceGroupName::new),
            environment: non_empty(raw.container_app_environment.as_deref())
                .map(EnvironmentName::new),
            registry_credentials,
            image_to_build,
            dockerfile_path: non_empty(raw.dockerfile_path.as_deref()).map(PathBuf::from),
            runtime_stack,
            ingress,
            target_port,
            environment_variables,
            disable_telemetry,
            build,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
