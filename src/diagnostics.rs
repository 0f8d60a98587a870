// ABOUTME: Diagnostics accumulator for non-fatal warnings during a deployment run.
// ABOUTME: Collects problems that must not fail the run but should still reach the pipeline log.

/// Collects non-fatal warnings during a deployment run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Telemetry could not be sent.
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Telemetry,
            message: message.into(),
        }
    }

    /// An optional tool was missing or could not be configured.
    pub fn tool_setup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ToolSetup,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Sending the telemetry event failed.
    Telemetry,
    /// A helper tool was unavailable; the run continued without it.
    ToolSetup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::telemetry("docker run exited with 125"));
        diag.warn(Warning::tool_setup("pack not found"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(Warning::telemetry("x").kind, WarningKind::Telemetry);
        assert_eq!(Warning::tool_setup("x").kind, WarningKind::ToolSetup);
    }
}
