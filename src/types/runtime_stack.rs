// ABOUTME: Runtime stack identifier used by the Oryx builder, e.g. `python:3.9`.
// ABOUTME: Drives the builder run image and the default target port.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeStackError {
    #[error("runtime stack cannot be empty")]
    Empty,

    #[error("invalid character in runtime stack: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RuntimeStack(String);

impl RuntimeStack {
    pub fn new(value: &str) -> Result<Self, RuntimeStackError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RuntimeStackError::Empty);
        }

        if let Some(c) = value.chars().find(|c| c.is_whitespace() || *c == '/') {
            return Err(RuntimeStackError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Python stacks serve on port 80 under the Oryx run images.
    pub fn is_python(&self) -> bool {
        self.0.starts_with("python:")
    }
}

impl fmt::Display for RuntimeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_family_detection() {
        assert!(RuntimeStack::new("python:3.9").unwrap().is_python());
        assert!(!RuntimeStack::new("node:18").unwrap().is_python());
        assert!(!RuntimeStack::new("pythonish").unwrap().is_python());
    }

    #[test]
    fn trims_detector_output() {
        let stack = RuntimeStack::new("dotnetcore:7.0\n").unwrap();
        assert_eq!(stack.as_str(), "dotnetcore:7.0");
    }
}
