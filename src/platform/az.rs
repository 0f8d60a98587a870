// ABOUTME: Azure CLI implementation of resource group, environment and Container App operations.
// ABOUTME: Argument vectors are built by pure functions so tests can check them without az.

use std::path::Path;

use super::exec::{CommandError, CommandRunner, args};
use super::traits::AppTarget;
use crate::args::CommandArgs;
use crate::config::RegistryCredentials;
use crate::types::{
    EnvironmentName, ImageRef, Ingress, Location, RegistryName, ResourceGroupName,
};

const AZ: &str = "az";

/// Region used when the provider query returns nothing.
pub const FALLBACK_LOCATION: &str = "eastus2";

const LOCATION_QUERY: &str = "resourceTypes[?resourceType=='containerApps'].locations[] | [0]";

/// `az` wrapper for the Container Apps service.
#[derive(Debug, Clone, Default)]
pub struct AzCli {
    runner: CommandRunner,
}

impl AzCli {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    /// Let az install the containerapp extension on first use without prompting.
    pub async fn prepare(&self) -> Result<(), CommandError> {
        self.runner
            .run(
                AZ,
                &args([
                    "config",
                    "set",
                    "extension.use_dynamic_install=yes_without_prompt",
                ]),
            )
            .await
            .map(drop)
    }

    pub async fn default_location(&self) -> Result<Location, CommandError> {
        let raw = self
            .runner
            .run(
                AZ,
                &args(["provider", "show", "-n", "Microsoft.App", "--query", LOCATION_QUERY]),
            )
            .await?;
        Ok(normalize_location(&raw))
    }

    pub async fn group_exists(&self, group: &ResourceGroupName) -> Result<bool, CommandError> {
        self.runner
            .succeeds(AZ, &args(["group", "show", "-n", group.as_str(), "-o", "none"]))
            .await
    }

    pub async fn create_group(
        &self,
        group: &ResourceGroupName,
        location: &Location,
    ) -> Result<(), CommandError> {
        self.runner
            .run(
                AZ,
                &args([
                    "group",
                    "create",
                    "-n",
                    group.as_str(),
                    "-l",
                    location.as_str(),
                ]),
            )
            .await
            .map(drop)
    }

    pub async fn environment_exists(
        &self,
        environment: &EnvironmentName,
        group: &ResourceGroupName,
    ) -> Result<bool, CommandError> {
        self.runner
            .succeeds(
                AZ,
                &args([
                    "containerapp",
                    "env",
                    "show",
                    "-n",
                    environment.as_str(),
                    "-g",
                    group.as_str(),
                    "-o",
                    "none",
                ]),
            )
            .await
    }

    pub async fn discover_environment(
        &self,
        group: &ResourceGroupName,
    ) -> Result<Option<EnvironmentName>, CommandError> {
        let output = self
            .runner
            .run(
                AZ,
                &args([
                    "containerapp",
                    "env",
                    "list",
                    "-g",
                    group.as_str(),
                    "--query",
                    "[0].name",
                    "-o",
                    "tsv",
                ]),
            )
            .await?;
        Ok(first_line(&output).map(EnvironmentName::new))
    }

    pub async fn create_environment(
        &self,
        environment: &EnvironmentName,
        group: &ResourceGroupName,
        location: &Location,
    ) -> Result<(), CommandError> {
        self.runner
            .run(
                AZ,
                &args([
                    "containerapp",
                    "env",
                    "create",
                    "-n",
                    environment.as_str(),
                    "-g",
                    group.as_str(),
                    "-l",
                    location.as_str(),
                ]),
            )
            .await
            .map(drop)
    }

    pub async fn app_exists(&self, target: &AppTarget) -> Result<bool, CommandError> {
        let mut argv = args(["containerapp", "show"]);
        argv.extend(target_args(target));
        argv.extend(args(["-o", "none"]));
        self.runner.succeeds(AZ, &argv).await
    }

    pub async fn create_app(
        &self,
        target: &AppTarget,
        environment: &EnvironmentName,
        image: &ImageRef,
        flags: &CommandArgs,
    ) -> Result<(), CommandError> {
        self.run(create_args(target, environment, image, flags)).await
    }

    pub async fn create_app_from_yaml(
        &self,
        target: &AppTarget,
        yaml: &Path,
    ) -> Result<(), CommandError> {
        self.run(yaml_args("create", target, yaml)).await
    }

    pub async fn update_app(
        &self,
        target: &AppTarget,
        image: &ImageRef,
        flags: &CommandArgs,
    ) -> Result<(), CommandError> {
        self.run(update_args(target, image, flags)).await
    }

    pub async fn update_app_from_yaml(
        &self,
        target: &AppTarget,
        yaml: &Path,
    ) -> Result<(), CommandError> {
        self.run(yaml_args("update", target, yaml)).await
    }

    pub async fn up_app(
        &self,
        target: &AppTarget,
        image: &ImageRef,
        flags: &CommandArgs,
        ingress: Option<Ingress>,
        target_port: Option<u16>,
    ) -> Result<(), CommandError> {
        self.run(up_args(target, image, flags, ingress, target_port))
            .await
    }

    pub async fn update_registry(
        &self,
        target: &AppTarget,
        registry: &RegistryName,
        credentials: &RegistryCredentials,
    ) -> Result<(), CommandError> {
        self.run(registry_set_args(target, registry, credentials))
            .await
    }

    pub async fn disable_ingress(&self, target: &AppTarget) -> Result<(), CommandError> {
        let mut argv = args(["containerapp", "ingress", "disable"]);
        argv.extend(target_args(target));
        self.run(argv).await
    }

    /// Fetch a registry access token for the signed-in identity.
    pub async fn acr_access_token(&self, registry: &RegistryName) -> Result<String, CommandError> {
        let argv = args([
            "acr",
            "login",
            "--name",
            registry.as_str(),
            "--expose-token",
            "--output",
            "tsv",
            "--query",
            "accessToken",
        ]);
        let token = self.runner.run(AZ, &argv).await?;
        if token.is_empty() {
            return Err(CommandError::InvalidOutput {
                command: "az acr login --expose-token".to_string(),
                reason: "empty access token".to_string(),
            });
        }
        Ok(token)
    }

    async fn run(&self, argv: Vec<String>) -> Result<(), CommandError> {
        self.runner.run(AZ, &argv).await.map(drop)
    }
}

fn target_args(target: &AppTarget) -> Vec<String> {
    args([
        "-n",
        target.name.as_str(),
        "-g",
        target.resource_group.as_str(),
    ])
}

pub(crate) fn create_args(
    target: &AppTarget,
    environment: &EnvironmentName,
    image: &ImageRef,
    flags: &CommandArgs,
) -> Vec<String> {
    let mut argv = args(["containerapp", "create"]);
    argv.extend(target_args(target));
    argv.extend(args([
        "-i",
        &image.to_string(),
        "--environment",
        environment.as_str(),
        "--output",
        "none",
    ]));
    argv.extend(flags.to_tokens());
    argv
}

pub(crate) fn update_args(target: &AppTarget, image: &ImageRef, flags: &CommandArgs) -> Vec<String> {
    let mut argv = args(["containerapp", "update"]);
    argv.extend(target_args(target));
    argv.extend(args(["-i", &image.to_string(), "--output", "none"]));
    argv.extend(flags.to_tokens());
    argv
}

pub(crate) fn up_args(
    target: &AppTarget,
    image: &ImageRef,
    flags: &CommandArgs,
    ingress: Option<Ingress>,
    target_port: Option<u16>,
) -> Vec<String> {
    let mut argv = args(["containerapp", "up"]);
    argv.extend(target_args(target));
    argv.extend(args(["-i", &image.to_string()]));
    argv.extend(flags.to_tokens());
    if let Some(ingress) = ingress
        && flags.ingress().is_none()
    {
        argv.extend(args(["--ingress", ingress.as_str()]));
    }
    if let Some(port) = target_port
        && flags.target_port().is_none()
    {
        argv.extend(args(["--target-port", &port.to_string()]));
    }
    argv
}

pub(crate) fn yaml_args(verb: &str, target: &AppTarget, yaml: &Path) -> Vec<String> {
    let mut argv = args(["containerapp", verb]);
    argv.extend(target_args(target));
    argv.extend(args([
        "--yaml",
        &yaml.display().to_string(),
        "--output",
        "none",
    ]));
    argv
}

pub(crate) fn registry_set_args(
    target: &AppTarget,
    registry: &RegistryName,
    credentials: &RegistryCredentials,
) -> Vec<String> {
    let mut argv = args(["containerapp", "registry", "set"]);
    argv.extend(target_args(target));
    argv.extend(args([
        "--server",
        &registry.login_server(),
        "--username",
        &credentials.username,
        "--password",
        &credentials.password,
        "--output",
        "none",
    ]));
    argv
}

/// Turn `"East US 2"` into `eastus2`.
pub(crate) fn normalize_location(raw: &str) -> Location {
    let normalized: String = raw
        .chars()
        .filter(|c| !matches!(c, '"' | '(' | ')') && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    if normalized.is_empty() || normalized == "null" {
        Location::new(FALLBACK_LOCATION)
    } else {
        Location::new(normalized)
    }
}

fn first_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|line| !line.is_empty())
}
