// ABOUTME: Container App name, either supplied explicitly or generated from build variables.
// ABOUTME: Generated names replace every '.' with '-' because the platform rejects dots.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppNameError {
    #[error("container app name cannot be empty")]
    Empty,

    #[error("invalid character in container app name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AppName(String);

impl AppName {
    pub fn new(value: &str) -> Result<Self, AppNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppNameError::Empty);
        }

        if let Some(c) = value.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(AppNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    /// Default name for runs that don't supply one: `ado-task-app-<runId>-<runNumber>`.
    pub fn generated(run_id: &str, run_number: &str) -> Self {
        Self(replace_dots(&format!("ado-task-app-{run_id}-{run_number}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn replace_dots(value: &str) -> String {
    value.replace('.', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dots_become_hyphens() {
        assert_eq!(replace_dots("run.123.45"), "run-123-45");
    }

    #[test]
    fn generated_name_has_no_dots() {
        let name = AppName::generated("run.123", "45.1");
        assert_eq!(name.as_str(), "ado-task-app-run-123-45-1");
    }

    #[test]
    fn explicit_names_keep_their_dots() {
        let name = AppName::new("my.app").unwrap();
        assert_eq!(name.as_str(), "my.app");
    }

    #[test]
    fn whitespace_is_rejected() {
        assert!(matches!(
            AppName::new("my app"),
            Err(AppNameError::InvalidChar(' '))
        ));
        assert!(matches!(AppName::new("  "), Err(AppNameError::Empty)));
    }
}
