// ABOUTME: Decides which deployment scenario the inputs describe and rejects impossible ones.
// ABOUTME: Also runs the file-system pre-flight for the source tree and YAML configuration.

use std::path::PathBuf;

use crate::config::{ConfigurationError, ScenarioInputs, check_yaml_config};
use crate::telemetry::ScenarioKind;
use crate::types::{ImageRef, RegistryName};

/// Application source to build, with the registry the image is pushed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuild {
    pub path: PathBuf,
    pub registry: RegistryName,
}

/// A validated input combination.
///
/// Several parts may be present at once. A source build always runs when
/// given; a YAML configuration takes over the Container App call itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub source: Option<SourceBuild>,
    pub registry: Option<RegistryName>,
    pub image_to_deploy: Option<ImageRef>,
    pub yaml_config_path: Option<PathBuf>,
}

impl Scenario {
    pub fn builds_from_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn uses_yaml(&self) -> bool {
        self.yaml_config_path.is_some()
    }

    /// Telemetry scenario known before any build runs.
    ///
    /// Every run without a source build, YAML-only runs included, counts as
    /// deploying an existing image. Source builds are classified later, once
    /// the build path is chosen.
    pub fn initial_telemetry(&self) -> Option<ScenarioKind> {
        match self.source {
            None => Some(ScenarioKind::UsedImage),
            Some(_) => None,
        }
    }
}

/// Check the input combination.
///
/// Fails when a source path is given without a registry, or when none of
/// source path, image and YAML configuration is given.
pub fn validate(inputs: &ScenarioInputs) -> Result<Scenario, ConfigurationError> {
    let source = match (&inputs.app_source_path, &inputs.registry) {
        (Some(_), None) => return Err(ConfigurationError::MissingRegistry),
        (Some(path), Some(registry)) => Some(SourceBuild {
            path: path.clone(),
            registry: registry.clone(),
        }),
        (None, _) => None,
    };

    if source.is_none() && inputs.image_to_deploy.is_none() && inputs.yaml_config_path.is_none() {
        return Err(ConfigurationError::NothingToDeploy);
    }

    Ok(Scenario {
        source,
        registry: inputs.registry.clone(),
        image_to_deploy: inputs.image_to_deploy.clone(),
        yaml_config_path: inputs.yaml_config_path.clone(),
    })
}

/// Local checks that need no remote call: the source tree exists and the YAML
/// configuration parses.
pub fn preflight(scenario: &Scenario) -> Result<(), ConfigurationError> {
    if let Some(source) = &scenario.source
        && !source.path.is_dir()
    {
        return Err(ConfigurationError::AppSourceNotFound(source.path.clone()));
    }

    if let Some(yaml) = &scenario.yaml_config_path {
        check_yaml_config(yaml)?;
    }

    Ok(())
}
