// ABOUTME: Resolves the app name, location, resource group and environment for a run.
// ABOUTME: Explicit input wins, then whatever already exists, then a generated default that gets created.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{BuildVariables, Inputs};
use crate::platform::{AppOps, AppTarget, CommandError, EnvironmentOps, ResourceGroupOps};
use crate::types::{AppName, EnvironmentName, Location, ResourceGroupName};

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("failed to prepare the Azure CLI: {0}")]
    Setup(#[source] CommandError),

    #[error("run id and run number are required to generate a default {0}")]
    MissingBuildVariables(&'static str),

    #[error("failed to {operation} '{name}': {source}")]
    Remote {
        operation: &'static str,
        name: String,
        #[source]
        source: CommandError,
    },
}

impl ResolutionError {
    fn remote(operation: &'static str, name: impl ToString) -> impl FnOnce(CommandError) -> Self {
        let name = name.to_string();
        move |source| ResolutionError::Remote {
            operation,
            name,
            source,
        }
    }
}

/// Where the Container App lives and whether it is already there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceIdentity {
    pub app_name: AppName,
    pub resource_group: ResourceGroupName,
    pub location: Location,
    /// Only resolved for apps that don't exist yet.
    pub environment: Option<EnvironmentName>,
    pub app_exists: bool,
}

impl ResourceIdentity {
    pub fn target(&self) -> AppTarget {
        AppTarget {
            name: self.app_name.clone(),
            resource_group: self.resource_group.clone(),
        }
    }
}

/// Resolve every resource the deployment needs, creating defaults as required.
///
/// Resources are only created when missing, so a repeated run with the same
/// inputs creates nothing.
pub async fn resolve<P>(inputs: &Inputs, platform: &P) -> Result<ResourceIdentity, ResolutionError>
where
    P: ResourceGroupOps + EnvironmentOps + AppOps + ?Sized,
{
    let app_name = resolve_app_name(inputs.app_name.as_ref(), inputs.build.as_ref())?;
    let location = resolve_location(inputs.location.as_ref(), platform).await?;
    let resource_group =
        resolve_resource_group(inputs.resource_group.as_ref(), &app_name, &location, platform)
            .await?;

    let target = AppTarget {
        name: app_name.clone(),
        resource_group: resource_group.clone(),
    };
    let app_exists = platform
        .app_exists(&target)
        .await
        .map_err(ResolutionError::remote("check Container App", &app_name))?;

    let environment = if app_exists {
        None
    } else {
        Some(
            resolve_environment(
                inputs.environment.as_ref(),
                &app_name,
                &resource_group,
                &location,
                platform,
            )
            .await?,
        )
    };

    Ok(ResourceIdentity {
        app_name,
        resource_group,
        location,
        environment,
        app_exists,
    })
}

pub fn resolve_app_name(
    explicit: Option<&AppName>,
    build: Option<&BuildVariables>,
) -> Result<AppName, ResolutionError> {
    if let Some(name) = explicit {
        return Ok(name.clone());
    }

    let build = build.ok_or(ResolutionError::MissingBuildVariables("Container App name"))?;
    let name = AppName::generated(&build.run_id, &build.run_number);
    info!("Default Container App name: {name}");
    Ok(name)
}

async fn resolve_location<P>(
    explicit: Option<&Location>,
    platform: &P,
) -> Result<Location, ResolutionError>
where
    P: ResourceGroupOps + ?Sized,
{
    if let Some(location) = explicit {
        return Ok(location.clone());
    }

    let location = platform
        .default_location()
        .await
        .map_err(ResolutionError::remote("look up default location for", "Microsoft.App"))?;
    info!("Default location: {location}");
    Ok(location)
}

/// An explicit group is trusted as-is. The default `<app>-rg` is created when absent.
async fn resolve_resource_group<P>(
    explicit: Option<&ResourceGroupName>,
    app_name: &AppName,
    location: &Location,
    platform: &P,
) -> Result<ResourceGroupName, ResolutionError>
where
    P: ResourceGroupOps + ?Sized,
{
    if let Some(group) = explicit {
        return Ok(group.clone());
    }

    let group = ResourceGroupName::new(format!("{app_name}-rg"));
    info!("Default resource group name: {group}");

    let exists = platform
        .group_exists(&group)
        .await
        .map_err(ResolutionError::remote("check resource group", &group))?;

    if !exists {
        info!("Creating resource group {group} in {location}");
        platform
            .create_group(&group, location)
            .await
            .map_err(ResolutionError::remote("create resource group", &group))?;
    }

    Ok(group)
}

/// Explicit, else the first environment in the group, else `<app>-env`.
///
/// The chosen environment is created when it doesn't exist, including an
/// explicit one.
async fn resolve_environment<P>(
    explicit: Option<&EnvironmentName>,
    app_name: &AppName,
    group: &ResourceGroupName,
    location: &Location,
    platform: &P,
) -> Result<EnvironmentName, ResolutionError>
where
    P: EnvironmentOps + ?Sized,
{
    let environment = match explicit {
        Some(environment) => environment.clone(),
        None => {
            let discovered = platform
                .discover_environment(group)
                .await
                .map_err(ResolutionError::remote("list environments in", group))?;

            match discovered {
                Some(existing) => {
                    info!("Existing Container App environment found: {existing}");
                    return Ok(existing);
                }
                None => {
                    let generated = EnvironmentName::new(format!("{app_name}-env"));
                    info!("Default Container App environment name: {generated}");
                    generated
                }
            }
        }
    };

    let exists = platform
        .environment_exists(&environment, group)
        .await
        .map_err(ResolutionError::remote("check environment", &environment))?;

    if !exists {
        info!("Creating Container App environment {environment}");
        platform
            .create_environment(&environment, group, location)
            .await
            .map_err(ResolutionError::remote("create environment", &environment))?;
    }

    Ok(environment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_name_wins() {
        let explicit = AppName::new("web").unwrap();
        let build = BuildVariables {
            run_id: "1".into(),
            run_number: "2".into(),
        };
        assert_eq!(
            resolve_app_name(Some(&explicit), Some(&build)).unwrap(),
            explicit
        );
    }

    #[test]
    fn generated_name_replaces_dots() {
        let build = BuildVariables {
            run_id: "run.123".into(),
            run_number: "45".into(),
        };
        let name = resolve_app_name(None, Some(&build)).unwrap();
        assert_eq!(name.as_str(), "ado-task-app-run-123-45");
    }

    #[test]
    fn generated_name_needs_build_variables() {
        assert!(matches!(
            resolve_app_name(None, None),
            Err(ResolutionError::MissingBuildVariables(_))
        ));
    }
}
