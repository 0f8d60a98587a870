// ABOUTME: In-memory platform that records every call and tracks created resources.
// ABOUTME: Lets tests assert on call order and idempotency without az, docker or pack.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use acadeploy::args::CommandArgs;
use acadeploy::config::{Inputs, RawInputs, RegistryCredentials};
use acadeploy::platform::{
    AppOps, AppTarget, BuildOps, CommandError, EnvironmentOps, RegistryOps, ResourceGroupOps,
};
use acadeploy::telemetry::{TelemetryEvent, TelemetrySink};
use acadeploy::types::{
    EnvironmentName, ImageRef, Ingress, Location, RegistryName, ResourceGroupName, RuntimeStack,
};

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DefaultLocation,
    GroupExists(String),
    CreateGroup { group: String, location: String },
    EnvironmentExists(String),
    DiscoverEnvironment(String),
    CreateEnvironment { name: String, group: String },
    AppExists(String),
    CreateApp {
        app: String,
        environment: String,
        image: String,
        args: CommandArgs,
    },
    CreateAppFromYaml { app: String, yaml: PathBuf },
    UpdateApp {
        app: String,
        image: String,
        args: CommandArgs,
    },
    UpdateAppFromYaml { app: String, yaml: PathBuf },
    UpApp {
        app: String,
        image: String,
        args: CommandArgs,
        ingress: Option<Ingress>,
        target_port: Option<u16>,
    },
    UpdateRegistry { app: String, server: String },
    DisableIngress(String),
    LoginWithPassword(String),
    LoginWithAccessToken(String),
    PushImage(String),
    DetectRuntimeStack(PathBuf),
    InstallBuilder,
    SetDefaultBuilder,
    BuildFromDockerfile { image: String, dockerfile: PathBuf },
    BuildFromSource { image: String, stack: String },
    Telemetry(TelemetryEvent),
}

impl Call {
    pub fn creates_resources(&self) -> bool {
        matches!(
            self,
            Call::CreateGroup { .. } | Call::CreateEnvironment { .. }
        )
    }

    /// Short name used for failure injection.
    pub fn name(&self) -> &'static str {
        match self {
            Call::DefaultLocation => "default_location",
            Call::GroupExists(_) => "group_exists",
            Call::CreateGroup { .. } => "create_group",
            Call::EnvironmentExists(_) => "environment_exists",
            Call::DiscoverEnvironment(_) => "discover_environment",
            Call::CreateEnvironment { .. } => "create_environment",
            Call::AppExists(_) => "app_exists",
            Call::CreateApp { .. } => "create_app",
            Call::CreateAppFromYaml { .. } => "create_app_from_yaml",
            Call::UpdateApp { .. } => "update_app",
            Call::UpdateAppFromYaml { .. } => "update_app_from_yaml",
            Call::UpApp { .. } => "up_app",
            Call::UpdateRegistry { .. } => "update_registry",
            Call::DisableIngress(_) => "disable_ingress",
            Call::LoginWithPassword(_) => "login_with_password",
            Call::LoginWithAccessToken(_) => "login_with_access_token",
            Call::PushImage(_) => "push_image",
            Call::DetectRuntimeStack(_) => "detect_runtime_stack",
            Call::InstallBuilder => "install_builder",
            Call::SetDefaultBuilder => "set_default_builder",
            Call::BuildFromDockerfile { .. } => "build_from_dockerfile",
            Call::BuildFromSource { .. } => "build_from_source",
            Call::Telemetry(_) => "telemetry",
        }
    }
}

struct State {
    location: String,
    groups: HashSet<String>,
    environments: HashMap<String, Vec<String>>,
    apps: HashSet<(String, String)>,
    detected_stack: String,
    fail_on: Option<&'static str>,
    calls: Vec<Call>,
}

/// Fake az/docker/pack toolchain.
pub struct FakePlatform {
    state: Mutex<State>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                location: "eastus2".to_string(),
                groups: HashSet::new(),
                environments: HashMap::new(),
                apps: HashSet::new(),
                detected_stack: "node:18".to_string(),
                fail_on: None,
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_group(self, group: &str) -> Self {
        self.state.lock().groups.insert(group.to_string());
        self
    }

    pub fn with_environment(self, group: &str, environment: &str) -> Self {
        {
            let mut state = self.state.lock();
            state.groups.insert(group.to_string());
            state
                .environments
                .entry(group.to_string())
                .or_default()
                .push(environment.to_string());
        }
        self
    }

    pub fn with_app(self, group: &str, app: &str) -> Self {
        {
            let mut state = self.state.lock();
            state.groups.insert(group.to_string());
            state.apps.insert((group.to_string(), app.to_string()));
        }
        self
    }

    pub fn with_detected_stack(self, stack: &str) -> Self {
        self.state.lock().detected_stack = stack.to_string();
        self
    }

    /// Make the named operation fail, see [`Call::name`].
    pub fn failing_on(self, operation: &'static str) -> Self {
        self.state.lock().fail_on = Some(operation);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.state.lock().calls.iter().map(Call::name).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn creation_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::creates_resources)
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), CommandError> {
        let mut state = self.state.lock();
        let name = call.name();
        state.calls.push(call);
        if state.fail_on == Some(name) {
            return Err(CommandError::InvalidOutput {
                command: name.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceGroupOps for FakePlatform {
    async fn default_location(&self) -> Result<Location, CommandError> {
        self.record(Call::DefaultLocation)?;
        Ok(Location::new(self.state.lock().location.clone()))
    }

    async fn group_exists(&self, group: &ResourceGroupName) -> Result<bool, CommandError> {
        self.record(Call::GroupExists(group.to_string()))?;
        Ok(self.state.lock().groups.contains(group.as_str()))
    }

    async fn create_group(
        &self,
        group: &ResourceGroupName,
        location: &Location,
    ) -> Result<(), CommandError> {
        self.record(Call::CreateGroup {
            group: group.to_string(),
            location: location.to_string(),
        })?;
        self.state.lock().groups.insert(group.to_string());
        Ok(())
    }
}

#[async_trait]
impl EnvironmentOps for FakePlatform {
    async fn environment_exists(
        &self,
        environment: &EnvironmentName,
        group: &ResourceGroupName,
    ) -> Result<bool, CommandError> {
        self.record(Call::EnvironmentExists(environment.to_string()))?;
        Ok(self
            .state
            .lock()
            .environments
            .get(group.as_str())
            .is_some_and(|envs| envs.iter().any(|e| e == environment.as_str())))
    }

    async fn discover_environment(
        &self,
        group: &ResourceGroupName,
    ) -> Result<Option<EnvironmentName>, CommandError> {
        self.record(Call::DiscoverEnvironment(group.to_string()))?;
        Ok(self
            .state
            .lock()
            .environments
            .get(group.as_str())
            .and_then(|envs| envs.first())
            .map(EnvironmentName::new))
    }

    async fn create_environment(
        &self,
        environment: &EnvironmentName,
        group: &ResourceGroupName,
        _location: &Location,
    ) -> Result<(), CommandError> {
        self.record(Call::CreateEnvironment {
            name: environment.to_string(),
            group: group.to_string(),
        })?;
        self.state
            .lock()
            .environments
            .entry(group.to_string())
            .or_default()
            .push(environment.to_string());
        Ok(())
    }
}

#[async_trait]
impl AppOps for FakePlatform {
    async fn app_exists(&self, target: &AppTarget) -> Result<bool, CommandError> {
        self.record(Call::AppExists(target.name.to_string()))?;
        Ok(self.state.lock().apps.contains(&(
            target.resource_group.to_string(),
            target.name.to_string(),
        )))
    }

    async fn create_app(
        &self,
        target: &AppTarget,
        environment: &EnvironmentName,
        image: &ImageRef,
        args: &CommandArgs,
    ) -> Result<(), CommandError> {
        self.record(Call::CreateApp {
            app: target.name.to_string(),
            environment: environment.to_string(),
            image: image.to_string(),
            args: args.clone(),
        })?;
        self.state.lock().apps.insert((
            target.resource_group.to_string(),
            target.name.to_string(),
        ));
        Ok(())
    }

    async fn create_app_from_yaml(
        &self,
        target: &AppTarget,
        yaml: &Path,
    ) -> Result<(), CommandError> {
        self.record(Call::CreateAppFromYaml {
            app: target.name.to_string(),
            yaml: yaml.to_path_buf(),
        })
    }

    async fn update_app(
        &self,
        target: &AppTarget,
        image: &ImageRef,
        args: &CommandArgs,
    ) -> Result<(), CommandError> {
        self.record(Call::UpdateApp {
            app: target.name.to_string(),
            image: image.to_string(),
            args: args.clone(),
        })
    }

    async fn update_app_from_yaml(
        &self,
        target: &AppTarget,
        yaml: &Path,
    ) -> Result<(), CommandError> {
        self.record(Call::UpdateAppFromYaml {
            app: target.name.to_string(),
            yaml: yaml.to_path_buf(),
        })
    }

    async fn up_app(
        &self,
        target: &AppTarget,
        image: &ImageRef,
        args: &CommandArgs,
        ingress: Option<Ingress>,
        target_port: Option<u16>,
    ) -> Result<(), CommandError> {
        self.record(Call::UpApp {
            app: target.name.to_string(),
            image: image.to_string(),
            args: args.clone(),
            ingress,
            target_port,
        })
    }

    async fn update_registry(
        &self,
        target: &AppTarget,
        registry: &RegistryName,
        _credentials: &RegistryCredentials,
    ) -> Result<(), CommandError> {
        self.record(Call::UpdateRegistry {
            app: target.name.to_string(),
            server: registry.login_server(),
        })
    }

    async fn disable_ingress(&self, target: &AppTarget) -> Result<(), CommandError> {
        self.record(Call::DisableIngress(target.name.to_string()))
    }
}

#[async_trait]
impl RegistryOps for FakePlatform {
    async fn login_with_password(
        &self,
        registry: &RegistryName,
        _credentials: &RegistryCredentials,
    ) -> Result<(), CommandError> {
        self.record(Call::LoginWithPassword(registry.login_server()))
    }

    async fn login_with_access_token(&self, registry: &RegistryName) -> Result<(), CommandError> {
        self.record(Call::LoginWithAccessToken(registry.login_server()))
    }

    async fn push_image(&self, image: &ImageRef) -> Result<(), CommandError> {
        self.record(Call::PushImage(image.to_string()))
    }
}

#[async_trait]
impl BuildOps for FakePlatform {
    async fn detect_runtime_stack(&self, source: &Path) -> Result<RuntimeStack, CommandError> {
        self.record(Call::DetectRuntimeStack(source.to_path_buf()))?;
        let stack = self.state.lock().detected_stack.clone();
        RuntimeStack::new(&stack).map_err(|e| CommandError::InvalidOutput {
            command: "detect".to_string(),
            reason: e.to_string(),
        })
    }

    async fn install_builder(&self) -> Result<(), CommandError> {
        self.record(Call::InstallBuilder)
    }

    async fn set_default_builder(&self) -> Result<(), CommandError> {
        self.record(Call::SetDefaultBuilder)
    }

    async fn build_from_dockerfile(
        &self,
        image: &ImageRef,
        _source: &Path,
        dockerfile: &Path,
    ) -> Result<(), CommandError> {
        self.record(Call::BuildFromDockerfile {
            image: image.to_string(),
            dockerfile: dockerfile.to_path_buf(),
        })
    }

    async fn build_from_source(
        &self,
        image: &ImageRef,
        _source: &Path,
        stack: &RuntimeStack,
    ) -> Result<(), CommandError> {
        self.record(Call::BuildFromSource {
            image: image.to_string(),
            stack: stack.to_string(),
        })
    }
}

#[async_trait]
impl TelemetrySink for FakePlatform {
    async fn emit(&self, event: &TelemetryEvent) -> Result<(), CommandError> {
        self.record(Call::Telemetry(event.clone()))
    }
}

/// Raw inputs with run variables set, as a pipeline would provide them.
pub fn raw_inputs() -> RawInputs {
    RawInputs {
        run_id: Some("4815".to_string()),
        run_number: Some("16".to_string()),
        ..Default::default()
    }
}

pub fn inputs(raw: RawInputs) -> Inputs {
    Inputs::from_raw(raw).expect("valid inputs")
}
