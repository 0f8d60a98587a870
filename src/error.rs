// ABOUTME: Top-level error type with SNAFU pattern.
// ABOUTME: Unifies the per-stage errors so the binary has one failure path.

use snafu::Snafu;

use crate::config::ConfigurationError;
use crate::deploy::DeployError;
use crate::image::BuildError;
use crate::resources::ResolutionError;

/// Any fatal error from a deployment run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: ConfigurationError },

    #[snafu(display("{source}"))]
    ResourceResolution { source: ResolutionError },

    #[snafu(display("{source}"))]
    Build { source: BuildError },

    #[snafu(display("{source}"))]
    Deployment { source: DeployError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input or input combination; nothing remote was touched.
    Configuration,
    /// Looking up or creating the resource group, environment or app failed.
    ResourceResolution,
    /// Registry login, image build or push failed.
    Build,
    /// The create, update, up or disable-ingress call failed.
    Deployment,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::ResourceResolution { .. } => ErrorKind::ResourceResolution,
            Error::Build { .. } => ErrorKind::Build,
            Error::Deployment { .. } => ErrorKind::Deployment,
        }
    }
}

impl From<ConfigurationError> for Error {
    fn from(source: ConfigurationError) -> Self {
        Error::Configuration { source }
    }
}

impl From<ResolutionError> for Error {
    fn from(source: ResolutionError) -> Self {
        Error::ResourceResolution { source }
    }
}

impl From<BuildError> for Error {
    fn from(source: BuildError) -> Self {
        Error::Build { source }
    }
}

impl From<DeployError> for Error {
    fn from(source: DeployError) -> Self {
        Error::Deployment { source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_stage() {
        let err: Error = ConfigurationError::NothingToDeploy.into();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err: Error = BuildError::MissingBuildVariables.into();
        assert_eq!(err.kind(), ErrorKind::Build);
    }

    #[test]
    fn display_is_the_stage_message() {
        let err: Error = ConfigurationError::MissingRegistry.into();
        assert!(err.to_string().contains("'acrName'"));
    }
}
