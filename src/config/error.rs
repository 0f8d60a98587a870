// ABOUTME: Configuration errors raised before any remote call is made.
// ABOUTME: Covers invalid input combinations, malformed values and unreadable YAML files.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("the 'acrName' argument must be provided when the 'appSourcePath' argument is provided")]
    MissingRegistry,

    #[error(
        "one of the following arguments must be provided: 'appSourcePath', 'imageToDeploy', or 'yamlConfigPath'"
    )]
    NothingToDeploy,

    #[error("invalid value for '{input}': {reason}")]
    InvalidInput { input: &'static str, reason: String },

    #[error("application source path does not exist: {0}")]
    AppSourceNotFound(PathBuf),

    #[error("YAML configuration file not found: {0}")]
    YamlConfigNotFound(PathBuf),

    #[error("failed to read YAML configuration file {path}: {source}")]
    YamlConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML configuration file {path} is not valid YAML: {source}")]
    YamlConfigInvalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("YAML configuration file {0} must contain a mapping at the top level")]
    YamlConfigNotMapping(PathBuf),
}

impl ConfigurationError {
    pub(crate) fn invalid(input: &'static str, reason: impl ToString) -> Self {
        ConfigurationError::InvalidInput {
            input,
            reason: reason.to_string(),
        }
    }
}
