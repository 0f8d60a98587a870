// ABOUTME: Deployment strategy selection from app existence and ingress inputs.
// ABOUTME: Decides between create, update and up, with or without a YAML configuration.

use serde::Serialize;
use std::fmt;

/// Where the app stands, computed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    NotExists,
    ExistsUpdatePath,
    ExistsUpPath,
}

impl AppState {
    pub fn new(app_exists: bool, should_use_update_command: bool) -> Self {
        match (app_exists, should_use_update_command) {
            (false, _) => AppState::NotExists,
            (true, true) => AppState::ExistsUpdatePath,
            (true, false) => AppState::ExistsUpPath,
        }
    }
}

/// The Container App call a run ends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployStrategy {
    /// `az containerapp create` with image and arguments.
    Create,
    /// `az containerapp create --yaml`.
    CreateFromYaml,
    /// `az containerapp update`, after setting registry credentials if given.
    Update,
    /// `az containerapp update --yaml`.
    UpdateFromYaml,
    /// `az containerapp up`, which can change ingress as well.
    Up,
}

impl DeployStrategy {
    /// A YAML configuration replaces the argument-driven calls entirely.
    pub fn select(state: AppState, uses_yaml: bool) -> Self {
        match (state, uses_yaml) {
            (AppState::NotExists, true) => DeployStrategy::CreateFromYaml,
            (AppState::NotExists, false) => DeployStrategy::Create,
            (_, true) => DeployStrategy::UpdateFromYaml,
            (AppState::ExistsUpdatePath, false) => DeployStrategy::Update,
            (AppState::ExistsUpPath, false) => DeployStrategy::Up,
        }
    }

    pub fn uses_yaml(&self) -> bool {
        matches!(
            self,
            DeployStrategy::CreateFromYaml | DeployStrategy::UpdateFromYaml
        )
    }

    /// Only argument-driven calls on an existing app follow up with a disable-ingress call.
    pub fn may_disable_ingress(&self) -> bool {
        matches!(self, DeployStrategy::Update | DeployStrategy::Up)
    }
}

impl fmt::Display for DeployStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStrategy::Create => "create",
            DeployStrategy::CreateFromYaml => "create from YAML",
            DeployStrategy::Update => "update",
            DeployStrategy::UpdateFromYaml => "update from YAML",
            DeployStrategy::Up => "up",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_apps_are_created() {
        let state = AppState::new(false, false);
        assert_eq!(state, AppState::NotExists);
        assert_eq!(DeployStrategy::select(state, false), DeployStrategy::Create);
        assert_eq!(
            DeployStrategy::select(state, true),
            DeployStrategy::CreateFromYaml
        );
    }

    #[test]
    fn existing_apps_take_update_or_up() {
        assert_eq!(
            DeployStrategy::select(AppState::new(true, true), false),
            DeployStrategy::Update
        );
        assert_eq!(
            DeployStrategy::select(AppState::new(true, false), false),
            DeployStrategy::Up
        );
    }

    #[test]
    fn yaml_overrides_up_for_existing_apps() {
        assert_eq!(
            DeployStrategy::select(AppState::ExistsUpPath, true),
            DeployStrategy::UpdateFromYaml
        );
        assert!(DeployStrategy::UpdateFromYaml.uses_yaml());
        assert!(!DeployStrategy::UpdateFromYaml.may_disable_ingress());
    }

    #[test]
    fn create_never_disables_ingress() {
        assert!(!DeployStrategy::Create.may_disable_ingress());
        assert!(DeployStrategy::Up.may_disable_ingress());
    }
}
