// ABOUTME: Error types for the Container App create, update and up calls.
// ABOUTME: Also covers plans that can't be executed because a resolved value is missing.

use crate::platform::CommandError;
use crate::types::AppName;

/// Errors from planning or executing the terminal Container App calls.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// No image to deploy and no YAML configuration naming one.
    #[error("no image to deploy for Container App '{0}'")]
    MissingImage(AppName),

    /// A YAML strategy was planned without a configuration file.
    #[error("no YAML configuration for Container App '{0}'")]
    MissingYamlConfig(AppName),

    /// A new app needs an environment.
    #[error("no Container App environment resolved for new Container App '{0}'")]
    MissingEnvironment(AppName),

    /// A remote call failed.
    #[error("failed to {operation} Container App '{app}': {source}")]
    Remote {
        operation: &'static str,
        app: AppName,
        #[source]
        source: CommandError,
    },
}

impl DeployError {
    pub(crate) fn remote(
        operation: &'static str,
        app: &AppName,
    ) -> impl FnOnce(CommandError) -> Self {
        let app = app.clone();
        move |source| DeployError::Remote {
            operation,
            app,
            source,
        }
    }
}
