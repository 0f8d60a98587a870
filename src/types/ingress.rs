// ABOUTME: Ingress setting for a Container App.
// ABOUTME: `disabled` is an input value only; the platform disables ingress through a separate call.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid ingress '{0}' (expected external, internal or disabled)")]
pub struct ParseIngressError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ingress {
    External,
    Internal,
    Disabled,
}

impl Ingress {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ingress::External => "external",
            Ingress::Internal => "internal",
            Ingress::Disabled => "disabled",
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Ingress::Disabled)
    }
}

impl FromStr for Ingress {
    type Err = ParseIngressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "external" => Ok(Ingress::External),
            "internal" => Ok(Ingress::Internal),
            "disabled" => Ok(Ingress::Disabled),
            _ => Err(ParseIngressError(s.to_string())),
        }
    }
}

impl fmt::Display for Ingress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("External".parse::<Ingress>().unwrap(), Ingress::External);
        assert_eq!("disabled".parse::<Ingress>().unwrap(), Ingress::Disabled);
    }

    #[test]
    fn rejects_unknown_values() {
        let err = "public".parse::<Ingress>().unwrap_err();
        assert!(err.to_string().contains("public"));
    }
}
