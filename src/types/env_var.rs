// ABOUTME: A single `NAME=value` environment variable for a Container App.
// ABOUTME: Values may be secret references such as `secretref:my-secret`.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvVarError {
    #[error("environment variable '{0}' must have the form NAME=value")]
    MissingSeparator(String),

    #[error("environment variable name cannot be empty in '{0}'")]
    EmptyName(String),

    #[error("environment variable name cannot start with '-' in '{0}'")]
    LeadingDash(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnvVar {
    name: String,
    value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for EnvVar {
    type Err = EnvVarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| EnvVarError::MissingSeparator(s.to_string()))?;

        if name.is_empty() {
            return Err(EnvVarError::EmptyName(s.to_string()));
        }

        // az would read the pair as an option
        if name.starts_with('-') {
            return Err(EnvVarError::LeadingDash(s.to_string()));
        }

        Ok(Self::new(name, value))
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        let var: EnvVar = "CONN=a=b".parse().unwrap();
        assert_eq!(var.name(), "CONN");
        assert_eq!(var.value(), "a=b");
    }

    #[test]
    fn empty_value_is_allowed() {
        let var: EnvVar = "EMPTY=".parse().unwrap();
        assert_eq!(var.value(), "");
    }

    #[test]
    fn missing_separator_is_rejected() {
        assert_eq!(
            "NOPE".parse::<EnvVar>(),
            Err(EnvVarError::MissingSeparator("NOPE".to_string()))
        );
        assert_eq!(
            "=value".parse::<EnvVar>(),
            Err(EnvVarError::EmptyName("=value".to_string()))
        );
    }

    #[test]
    fn names_starting_with_dash_are_rejected() {
        assert_eq!(
            "--FOO=1".parse::<EnvVar>(),
            Err(EnvVarError::LeadingDash("--FOO=1".to_string()))
        );
        assert!("-X=1".parse::<EnvVar>().is_err());
        assert_eq!("X-Y=--1".parse::<EnvVar>().unwrap().value(), "--1");
    }
}
