// ABOUTME: Azure Container Registry name and its derived login server.
// ABOUTME: The login server is always `<name>.azurecr.io`.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

const LOGIN_SERVER_SUFFIX: &str = "azurecr.io";

#[derive(Debug, Error)]
pub enum RegistryNameError {
    #[error("registry name cannot be empty")]
    Empty,

    #[error("invalid character in registry name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RegistryName(String);

impl RegistryName {
    pub fn new(value: &str) -> Result<Self, RegistryNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RegistryNameError::Empty);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' {
                return Err(RegistryNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn login_server(&self) -> String {
        format!("{}.{}", self.0, LOGIN_SERVER_SUFFIX)
    }
}

impl fmt::Display for RegistryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_server_appends_suffix() {
        let registry = RegistryName::new("myacr").unwrap();
        assert_eq!(registry.login_server(), "myacr.azurecr.io");
    }

    #[test]
    fn login_server_hostnames_are_rejected() {
        assert!(matches!(
            RegistryName::new("myacr.azurecr.io"),
            Err(RegistryNameError::InvalidChar('.'))
        ));
    }
}
