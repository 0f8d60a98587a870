// ABOUTME: Hosting platform, registry and builder collaborators.
// ABOUTME: Traits the deployment core depends on plus the az, docker and pack implementations.

mod az;
mod docker;
pub mod exec;
mod pack;
mod traits;

pub use az::{AzCli, FALLBACK_LOCATION};
pub use docker::{DockerCli, ORYX_CLI_IMAGE, TOKEN_USERNAME};
pub use exec::{CommandError, CommandOutput, CommandRunner};
pub use pack::{ORYX_BUILDER_IMAGE, PackCli};
pub use traits::{AppOps, AppTarget, BuildOps, EnvironmentOps, Platform, RegistryOps, ResourceGroupOps};

use async_trait::async_trait;
use std::path::Path;

use crate::args::CommandArgs;
use crate::config::RegistryCredentials;
use crate::telemetry::{TelemetryEvent, TelemetrySink};
use crate::types::{
    EnvironmentName, ImageRef, Ingress, Location, RegistryName, ResourceGroupName, RuntimeStack,
};

/// The az, docker and pack tools bundled as one [`Platform`].
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    az: AzCli,
    docker: DockerCli,
    pack: PackCli,
}

impl Toolchain {
    pub fn new(runner: CommandRunner) -> Self {
        Self {
            az: AzCli::new(runner.clone()),
            docker: DockerCli::new(runner.clone()),
            pack: PackCli::new(runner),
        }
    }

    /// One-time az setup before the first remote call.
    pub async fn prepare(&self) -> Result<(), CommandError> {
        self.az.prepare().await
    }
}

#[async_trait]
impl ResourceGroupOps for Toolchain {
    async fn default_location(&self) -> Result<Location, CommandError> {
        self.az.default_location().await
    }

    async fn group_exists(&self, group: &ResourceGroupName) -> Result<bool, CommandError> {
        self.az.group_exists(group).await
    }

    async fn create_group(
        &self,
        group: &ResourceGroupName,
        location: &Location,
    ) -> Result<(), CommandError> {
        self.az.create_group(group, location).await
    }
}

#[async_trait]
impl EnvironmentOps for Toolchain {
    async fn environment_exists(
        &self,
        environment: &EnvironmentName,
        group: &ResourceGroupName,
    ) -> Result<bool, CommandError> {
        self.az.environment_exists(environment, group).await
    }

    async fn discover_environment(
        &self,
        group: &ResourceGroupName,
    ) -> Result<Option<EnvironmentName>, CommandError> {
        self.az.discover_environment(group).await
    }

    async fn create_environment(
        &self,
        environment: &EnvironmentName,
        group: &ResourceGroupName,
        location: &Location,
    ) -> Result<(), CommandError> {
        self.az
            .create_environment(environment, group, location)
            .await
    }
}

#[async_trait]
impl AppOps for Toolchain {
    async fn app_exists(&self, target: &AppTarget) -> Result<bool, CommandError> {
        self.az.app_exists(target).await
    }

    async fn create_app(
        &self,
        target: &AppTarget,
        environment: &EnvironmentName,
        image: &ImageRef,
        args: &CommandArgs,
    ) -> Result<(), CommandError> {
        self.az.create_app(target, environment, image, args).await
    }

    async fn create_app_from_yaml(
        &self,
        target: &AppTarget,
        yaml: &Path,
    ) -> Result<(), CommandError> {
        self.az.create_app_from_yaml(target, yaml).await
    }

    async fn update_app(
        &self,
        target: &AppTarget,
        image: &ImageRef,
        args: &CommandArgs,
    ) -> Result<(), CommandError> {
        self.az.update_app(target, image, args).await
    }

    async fn update_app_from_yaml(
        &self,
        target: &AppTarget,
        yaml: &Path,
    ) -> Result<(), CommandError> {
        self.az.update_app_from_yaml(target, yaml).await
    }

    async fn up_app(
        &self,
        target: &AppTarget,
        image: &ImageRef,
        args: &CommandArgs,
        ingress: Option<Ingress>,
        target_port: Option<u16>,
    ) -> Result<(), CommandError> {
        self.az
            .up_app(target, image, args, ingress, target_port)
            .await
    }

    async fn update_registry(
        &self,
        target: &AppTarget,
        registry: &RegistryName,
        credentials: &RegistryCredentials,
    ) -> Result<(), CommandError> {
        self.az.update_registry(target, registry, credentials).await
    }

    async fn disable_ingress(&self, target: &AppTarget) -> Result<(), CommandError> {
        self.az.disable_ingress(target).await
    }
}

#[async_trait]
impl RegistryOps for Toolchain {
    async fn login_with_password(
        &self,
        registry: &RegistryName,
        credentials: &RegistryCredentials,
    ) -> Result<(), CommandError> {
        self.docker
            .login(
                &registry.login_server(),
                &credentials.username,
                &credentials.password,
            )
            .await
    }

    async fn login_with_access_token(&self, registry: &RegistryName) -> Result<(), CommandError> {
        let token = self.az.acr_access_token(registry).await?;
        self.docker
            .login(&registry.login_server(), TOKEN_USERNAME, &token)
            .await
    }

    async fn push_image(&self, image: &ImageRef) -> Result<(), CommandError> {
        self.docker.push(image).await
    }
}

#[async_trait]
impl BuildOps for Toolchain {
    async fn detect_runtime_stack(&self, source: &Path) -> Result<RuntimeStack, CommandError> {
        self.pack.detect_runtime_stack(source).await
    }

    async fn install_builder(&self) -> Result<(), CommandError> {
        self.pack.install().await
    }

    async fn set_default_builder(&self) -> Result<(), CommandError> {
        self.pack.set_default_builder().await
    }

    async fn build_from_dockerfile(
        &self,
        image: &ImageRef,
        source: &Path,
        dockerfile: &Path,
    ) -> Result<(), CommandError> {
        self.docker.build(image, source, dockerfile).await
    }

    async fn build_from_source(
        &self,
        image: &ImageRef,
        source: &Path,
        stack: &RuntimeStack,
    ) -> Result<(), CommandError> {
        self.pack.build(image, source, stack).await
    }
}

#[async_trait]
impl TelemetrySink for Toolchain {
    async fn emit(&self, event: &TelemetryEvent) -> Result<(), CommandError> {
        self.docker.send_telemetry(event).await
    }
}
