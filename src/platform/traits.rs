// ABOUTME: Capability traits for the hosting platform, registry and image builder.
// ABOUTME: The deployment core depends only on these; concrete tools implement them.

use async_trait::async_trait;
use std::path::Path;

use super::exec::CommandError;
use crate::args::CommandArgs;
use crate::config::RegistryCredentials;
use crate::types::{
    AppName, EnvironmentName, ImageRef, Ingress, Location, RegistryName, ResourceGroupName,
    RuntimeStack,
};

/// A Container App addressed by name within its resource group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTarget {
    pub name: AppName,
    pub resource_group: ResourceGroupName,
}

/// Resource group and region operations.
#[async_trait]
pub trait ResourceGroupOps: Send + Sync {
    /// Default region for the Container Apps service.
    async fn default_location(&self) -> Result<Location, CommandError>;

    /// Check whether a resource group exists.
    async fn group_exists(&self, group: &ResourceGroupName) -> Result<bool, CommandError>;

    /// Create a resource group in the given region.
    async fn create_group(
        &self,
        group: &ResourceGroupName,
        location: &Location,
    ) -> Result<(), CommandError>;
}

/// Container App environment operations.
#[async_trait]
pub trait EnvironmentOps: Send + Sync {
    /// Check whether an environment exists in the resource group.
    async fn environment_exists(
        &self,
        environment: &EnvironmentName,
        group: &ResourceGroupName,
    ) -> Result<bool, CommandError>;

    /// Find the first existing environment in the resource group, if any.
    async fn discover_environment(
        &self,
        group: &ResourceGroupName,
    ) -> Result<Option<EnvironmentName>, CommandError>;

    /// Create an environment.
    async fn create_environment(
        &self,
        environment: &EnvironmentName,
        group: &ResourceGroupName,
        location: &Location,
    ) -> Result<(), CommandError>;
}

/// Container App operations.
#[async_trait]
pub trait AppOps: Send + Sync {
    /// Check whether the Container App exists.
    async fn app_exists(&self, target: &AppTarget) -> Result<bool, CommandError>;

    /// Create a Container App from an image.
    async fn create_app(
        &self,
        target: &AppTarget,
        environment: &EnvironmentName,
        image: &ImageRef,
        args: &CommandArgs,
    ) -> Result<(), CommandError>;

    /// Create a Container App from a YAML configuration file.
    async fn create_app_from_yaml(&self, target: &AppTarget, yaml: &Path)
    -> Result<(), CommandError>;

    /// Update an existing Container App with the lighter `update` operation.
    async fn update_app(
        &self,
        target: &AppTarget,
        image: &ImageRef,
        args: &CommandArgs,
    ) -> Result<(), CommandError>;

    /// Update an existing Container App from a YAML configuration file.
    async fn update_app_from_yaml(&self, target: &AppTarget, yaml: &Path)
    -> Result<(), CommandError>;

    /// Update an existing Container App with the merge-style `up` operation.
    async fn up_app(
        &self,
        target: &AppTarget,
        image: &ImageRef,
        args: &CommandArgs,
        ingress: Option<Ingress>,
        target_port: Option<u16>,
    ) -> Result<(), CommandError>;

    /// Set registry credentials on an existing Container App.
    async fn update_registry(
        &self,
        target: &AppTarget,
        registry: &RegistryName,
        credentials: &RegistryCredentials,
    ) -> Result<(), CommandError>;

    /// Disable ingress on an existing Container App.
    async fn disable_ingress(&self, target: &AppTarget) -> Result<(), CommandError>;
}

/// Container registry operations.
#[async_trait]
pub trait RegistryOps: Send + Sync {
    /// Log in with a username and password.
    async fn login_with_password(
        &self,
        registry: &RegistryName,
        credentials: &RegistryCredentials,
    ) -> Result<(), CommandError>;

    /// Log in with an access token for the signed-in identity.
    async fn login_with_access_token(&self, registry: &RegistryName) -> Result<(), CommandError>;

    /// Push a locally built image.
    async fn push_image(&self, image: &ImageRef) -> Result<(), CommandError>;
}

/// Image build operations.
#[async_trait]
pub trait BuildOps: Send + Sync {
    /// Inspect the source tree and detect its runtime stack.
    async fn detect_runtime_stack(&self, source: &Path) -> Result<RuntimeStack, CommandError>;

    /// Make the builder tooling available.
    async fn install_builder(&self) -> Result<(), CommandError>;

    /// Select the builder used by `build_from_source`.
    async fn set_default_builder(&self) -> Result<(), CommandError>;

    /// Build an image from a Dockerfile.
    async fn build_from_dockerfile(
        &self,
        image: &ImageRef,
        source: &Path,
        dockerfile: &Path,
    ) -> Result<(), CommandError>;

    /// Build an image directly from source without a Dockerfile.
    async fn build_from_source(
        &self,
        image: &ImageRef,
        source: &Path,
        stack: &RuntimeStack,
    ) -> Result<(), CommandError>;
}

/// Every capability a full deployment run needs.
pub trait Platform: ResourceGroupOps + EnvironmentOps + AppOps + RegistryOps + BuildOps {}

impl<T> Platform for T where T: ResourceGroupOps + EnvironmentOps + AppOps + RegistryOps + BuildOps {}
