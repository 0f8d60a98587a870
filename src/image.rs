// ABOUTME: Chooses between a Dockerfile build and a builder build, runs it and pushes the image.
// ABOUTME: A Dockerfile, supplied or found at the source root, always wins over the builder.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::{BuildVariables, Inputs, RegistryCredentials};
use crate::platform::{BuildOps, CommandError, RegistryOps};
use crate::scenario::SourceBuild;
use crate::telemetry::ScenarioKind;
use crate::types::{ImageRef, ParseImageRefError, RegistryName, RuntimeStack};

const DEFAULT_REPOSITORY: &str = "ado-task/container-app";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("run id and run number are required to generate a default image name")]
    MissingBuildVariables,

    #[error("generated image name is invalid: {0}")]
    InvalidImage(#[from] ParseImageRefError),

    #[error("failed to log in to registry {registry}: {source}")]
    Login {
        registry: RegistryName,
        #[source]
        source: CommandError,
    },

    #[error("failed to detect the runtime stack of {path}: {source}")]
    Detect {
        path: PathBuf,
        #[source]
        source: CommandError,
    },

    #[error("failed to set up the builder: {0}")]
    BuilderSetup(#[source] CommandError),

    #[error("failed to build image {image}: {source}")]
    Build {
        image: ImageRef,
        #[source]
        source: CommandError,
    },

    #[error("failed to push image {image}: {source}")]
    Push {
        image: ImageRef,
        #[source]
        source: CommandError,
    },
}

/// How a source tree becomes an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPath {
    /// Build with this Dockerfile; the stack is never detected.
    Dockerfile(PathBuf),
    /// Build from source with the Oryx builder.
    Builder,
}

impl BuildPath {
    pub fn telemetry_scenario(&self) -> ScenarioKind {
        match self {
            BuildPath::Dockerfile(_) => ScenarioKind::UsedDockerfile,
            BuildPath::Builder => ScenarioKind::UsedBuilder,
        }
    }
}

/// Which image gets deployed and how it was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImagePlan {
    /// Set only when the image was built from source in this run.
    pub image_to_build: Option<ImageRef>,
    /// Unset only for YAML-only deployments, where the file names the image.
    pub image_to_deploy: Option<ImageRef>,
    pub dockerfile_path: Option<PathBuf>,
    pub runtime_stack: Option<RuntimeStack>,
}

impl ImagePlan {
    /// Plan for deploying an image built elsewhere.
    pub fn prebuilt(image_to_deploy: Option<ImageRef>, runtime_stack: Option<RuntimeStack>) -> Self {
        Self {
            image_to_build: None,
            image_to_deploy,
            dockerfile_path: None,
            runtime_stack,
        }
    }
}

/// `<registry>.azurecr.io/ado-task/container-app:<runId>.<runNumber>`
pub fn default_image_to_build(
    registry: &RegistryName,
    build: Option<&BuildVariables>,
) -> Result<ImageRef, BuildError> {
    let build = build.ok_or(BuildError::MissingBuildVariables)?;
    let image = ImageRef::parse(&format!(
        "{}/{DEFAULT_REPOSITORY}:{}.{}",
        registry.login_server(),
        build.run_id,
        build.run_number
    ))?;
    info!("Default image to build: {image}");
    Ok(image)
}

/// An explicit Dockerfile is always nested under the source path, even when
/// written as an absolute path. Without one, a `Dockerfile` at the source root
/// is used if present.
pub fn select_build_path(source: &Path, dockerfile: Option<&Path>) -> BuildPath {
    if let Some(dockerfile) = dockerfile {
        let relative: PathBuf = dockerfile
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        return BuildPath::Dockerfile(source.join(relative));
    }

    let root_dockerfile = source.join("Dockerfile");
    if root_dockerfile.is_file() {
        info!("Dockerfile found at root of application source");
        BuildPath::Dockerfile(root_dockerfile)
    } else {
        info!("No Dockerfile found; building the image from source");
        BuildPath::Builder
    }
}

/// Log in to the registry: with username and password when both are given,
/// else with an access token for the signed-in identity.
pub async fn authenticate_registry<P>(
    platform: &P,
    registry: &RegistryName,
    credentials: Option<&RegistryCredentials>,
) -> Result<(), BuildError>
where
    P: RegistryOps + ?Sized,
{
    let result = match credentials {
        Some(credentials) => {
            info!("Logging in to {} with username and password", registry.login_server());
            platform.login_with_password(registry, credentials).await
        }
        None => {
            info!("Logging in to {} with an access token", registry.login_server());
            platform.login_with_access_token(registry).await
        }
    };

    result.map_err(|source| BuildError::Login {
        registry: registry.clone(),
        source,
    })
}

/// Build the application image and push it.
pub async fn build_and_push<P>(
    platform: &P,
    source: &SourceBuild,
    inputs: &Inputs,
) -> Result<(ImagePlan, BuildPath), BuildError>
where
    P: BuildOps + RegistryOps + ?Sized,
{
    let image_to_build = match &inputs.image_to_build {
        Some(image) => image.clone(),
        None => default_image_to_build(&source.registry, inputs.build.as_ref())?,
    };

    let image_to_deploy = inputs
        .scenario
        .image_to_deploy
        .clone()
        .unwrap_or_else(|| image_to_build.clone());

    let path = select_build_path(&source.path, inputs.dockerfile_path.as_deref());

    let mut runtime_stack = inputs.runtime_stack.clone();
    let dockerfile_path = match &path {
        BuildPath::Dockerfile(dockerfile) => {
            info!("Building image {image_to_build} using the provided Dockerfile");
            platform
                .build_from_dockerfile(&image_to_build, &source.path, dockerfile)
                .await
                .map_err(|source| BuildError::Build {
                    image: image_to_build.clone(),
                    source,
                })?;
            Some(dockerfile.clone())
        }
        BuildPath::Builder => {
            let stack = build_from_source(
                platform,
                &source.path,
                &image_to_build,
                runtime_stack.take(),
            )
            .await?;
            runtime_stack = Some(stack);
            None
        }
    };

    info!("Pushing image {image_to_build}");
    platform
        .push_image(&image_to_build)
        .await
        .map_err(|source| BuildError::Push {
            image: image_to_build.clone(),
            source,
        })?;

    let plan = ImagePlan {
        image_to_build: Some(image_to_build),
        image_to_deploy: Some(image_to_deploy),
        dockerfile_path,
        runtime_stack,
    };
    Ok((plan, path))
}

/// Install and select the builder, detect the stack when needed, then build.
async fn build_from_source<P>(
    platform: &P,
    source: &Path,
    image: &ImageRef,
    stack: Option<RuntimeStack>,
) -> Result<RuntimeStack, BuildError>
where
    P: BuildOps + ?Sized,
{
    platform
        .install_builder()
        .await
        .map_err(BuildError::BuilderSetup)?;

    let stack = match stack {
        Some(stack) => stack,
        None => {
            let detected = platform.detect_runtime_stack(source).await.map_err(|e| {
                BuildError::Detect {
                    path: source.to_path_buf(),
                    source: e,
                }
            })?;
            info!("Runtime stack detected to be {detected}");
            detected
        }
    };

    platform
        .set_default_builder()
        .await
        .map_err(BuildError::BuilderSetup)?;

    info!("Building image {image} from source with runtime stack {stack}");
    platform
        .build_from_source(image, source, &stack)
        .await
        .map_err(|source| BuildError::Build {
            image: image.clone(),
            source,
        })?;

    Ok(stack)
}
