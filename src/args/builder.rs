// ABOUTME: Decides between update and up for existing apps and assembles typed flags.
// ABOUTME: Holds the ingress sub-state-machine and the new-app port defaults.

use nonempty::NonEmpty;
use serde::Serialize;
use tracing::info;

use super::flags::{CommandArgs, Flag};
use crate::config::RegistryCredentials;
use crate::types::{EnvVar, Ingress, RegistryName, RuntimeStack};

/// Target port for new apps on Python stacks when none is given.
pub const PYTHON_DEFAULT_PORT: u16 = 80;

/// Target port for new apps on every other stack when none is given.
pub const DEFAULT_PORT: u16 = 8080;

/// Ingress state after defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "ingress")]
pub enum IngressMode {
    /// Ingress is on with the given visibility (external or internal).
    Enabled(Ingress),
    /// Ingress is turned off.
    Disabled,
    /// No ingress input for an existing app; left as it is.
    Unset,
}

impl IngressMode {
    fn from_input(ingress: Option<Ingress>) -> Self {
        match ingress {
            None => IngressMode::Unset,
            Some(Ingress::Disabled) => IngressMode::Disabled,
            Some(other) => IngressMode::Enabled(other),
        }
    }

    /// The value to pass to `up`. `disabled` is never passed; a separate call applies it.
    pub fn up_ingress(&self) -> Option<Ingress> {
        match self {
            IngressMode::Enabled(ingress) => Some(*ingress),
            IngressMode::Disabled | IngressMode::Unset => None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, IngressMode::Disabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngressPlan {
    pub mode: IngressMode,
    pub target_port: Option<u16>,
    /// True when new-app defaults were applied and left ingress enabled.
    pub ingress_enabled_default: bool,
}

/// Everything the argument builder looks at.
#[derive(Debug, Clone, Copy)]
pub struct ArgsRequest<'a> {
    pub app_exists: bool,
    pub registry: Option<&'a RegistryName>,
    pub credentials: Option<&'a RegistryCredentials>,
    pub ingress: Option<Ingress>,
    pub target_port: Option<u16>,
    pub runtime_stack: Option<&'a RuntimeStack>,
    pub environment_variables: Option<&'a NonEmpty<EnvVar>>,
}

/// Output of the argument builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentArgs {
    pub should_use_update_command: bool,
    pub ingress: IngressPlan,
    pub args: CommandArgs,
}

/// Existing apps without ingress-affecting inputs take the lighter `update` call.
///
/// A target port, or any ingress value other than `disabled`, needs `up`.
pub fn should_use_update_command(
    app_exists: bool,
    ingress: Option<Ingress>,
    target_port: Option<u16>,
) -> bool {
    app_exists && target_port.is_none() && ingress.is_none_or(|i| i.is_disabled())
}

/// Whether registry flags go into the argument set.
///
/// Only the `app_exists && !should_use_update_command` combination (the up
/// path) leaves them out. The update path still receives them in its flags, and
/// the executor also sets them with a dedicated registry call first.
pub fn should_append_registry_flags(app_exists: bool, should_use_update_command: bool) -> bool {
    !(app_exists && !should_use_update_command)
}

pub fn build_deployment_args(request: &ArgsRequest<'_>) -> DeploymentArgs {
    let should_use_update_command =
        should_use_update_command(request.app_exists, request.ingress, request.target_port);

    let mut args = CommandArgs::new();

    if let (Some(registry), Some(credentials)) = (request.registry, request.credentials)
        && should_append_registry_flags(request.app_exists, should_use_update_command)
    {
        args.push(Flag::RegistryServer(registry.login_server()));
        args.push(Flag::RegistryUsername(credentials.username.clone()));
        args.push(Flag::RegistryPassword(credentials.password.clone()));
    }

    let ingress = if request.app_exists {
        IngressPlan {
            mode: IngressMode::from_input(request.ingress),
            target_port: request.target_port,
            ingress_enabled_default: false,
        }
    } else {
        new_app_ingress(request, &mut args)
    };

    if let Some(vars) = request.environment_variables {
        if should_use_update_command {
            args.push(Flag::ReplaceEnvVars(vars.clone()));
        } else {
            args.push(Flag::EnvVars(vars.clone()));
        }
    }

    DeploymentArgs {
        should_use_update_command,
        ingress,
        args,
    }
}

fn new_app_ingress(request: &ArgsRequest<'_>, args: &mut CommandArgs) -> IngressPlan {
    let ingress = request.ingress.unwrap_or_else(|| {
        info!("Default ingress value: {}", Ingress::External);
        Ingress::External
    });

    if ingress.is_disabled() {
        info!("Ingress is disabled for this Container App");
        return IngressPlan {
            mode: IngressMode::Disabled,
            target_port: request.target_port,
            ingress_enabled_default: false,
        };
    }

    let target_port = request.target_port.unwrap_or_else(|| {
        let port = default_target_port(request.runtime_stack);
        info!("Default target port: {port}");
        port
    });

    args.push(Flag::Ingress(ingress));
    args.push(Flag::TargetPort(target_port));

    IngressPlan {
        mode: IngressMode::Enabled(ingress),
        target_port: Some(target_port),
        ingress_enabled_default: true,
    }
}

/// Port 80 for `python:*` stacks, 8080 otherwise.
pub fn default_target_port(stack: Option<&RuntimeStack>) -> u16 {
    match stack {
        Some(stack) if stack.is_python() => PYTHON_DEFAULT_PORT,
        _ => DEFAULT_PORT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ArgsRequest<'static> {
        ArgsRequest {
            app_exists: false,
            registry: None,
            credentials: None,
            ingress: None,
            target_port: None,
            runtime_stack: None,
            environment_variables: None,
        }
    }

    #[test]
    fn update_command_only_for_existing_apps() {
        assert!(should_use_update_command(true, None, None));
        assert!(should_use_update_command(true, Some(Ingress::Disabled), None));
        assert!(!should_use_update_command(false, None, None));
        assert!(!should_use_update_command(true, Some(Ingress::Internal), None));
        assert!(!should_use_update_command(true, None, Some(3000)));
    }

    #[test]
    fn new_app_defaults_to_external_ingress() {
        let built = build_deployment_args(&request());
        assert_eq!(built.ingress.mode, IngressMode::Enabled(Ingress::External));
        assert!(built.ingress.ingress_enabled_default);
        assert_eq!(built.args.names(), vec!["--ingress", "--target-port"]);
    }

    #[test]
    fn new_app_with_disabled_ingress_emits_no_ingress_flags() {
        let built = build_deployment_args(&ArgsRequest {
            ingress: Some(Ingress::Disabled),
            target_port: Some(9000),
            ..request()
        });
        assert_eq!(built.ingress.mode, IngressMode::Disabled);
        assert!(!built.ingress.ingress_enabled_default);
        assert!(built.args.is_empty());
    }

    #[test]
    fn explicit_port_is_kept_for_new_apps() {
        let built = build_deployment_args(&ArgsRequest {
            target_port: Some(5000),
            ..request()
        });
        assert_eq!(built.args.target_port(), Some(5000));
    }

    #[test]
    fn existing_app_gets_no_ingress_defaults() {
        let built = build_deployment_args(&ArgsRequest {
            app_exists: true,
            ..request()
        });
        assert!(built.should_use_update_command);
        assert_eq!(built.ingress.mode, IngressMode::Unset);
        assert!(built.args.is_empty());
    }

    #[test]
    fn up_never_receives_disabled() {
        assert_eq!(IngressMode::Disabled.up_ingress(), None);
        assert_eq!(
            IngressMode::Enabled(Ingress::Internal).up_ingress(),
            Some(Ingress::Internal)
        );
    }
}
