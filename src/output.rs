// ABOUTME: Output formatting for pipeline feedback.
// ABOUTME: Supports plain, GitHub workflow command, and JSON output modes.

use serde::Serialize;
use std::time::Instant;

/// Output mode for pipeline feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    /// Plain progress messages
    #[default]
    Normal,
    /// GitHub Actions workflow commands (annotations, masking)
    #[value(name = "github")]
    GitHub,
    /// JSON lines for scripting
    Json,
}

/// Handles output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing the run.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Ask the runner to hide a secret from its logs (GitHub mode only).
    pub fn mask(&self, secret: &str) {
        if self.mode == OutputMode::GitHub && !secret.is_empty() {
            println!("{}", github_command("add-mask", secret));
        }
    }

    /// Print a progress message (suppressed in JSON mode).
    pub fn progress(&self, message: &str) {
        if self.mode != OutputMode::Json {
            println!("{message}");
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::GitHub => println!("{}", github_command("warning", message)),
            OutputMode::Json => self.json("warning", message, None),
        }
    }

    /// Print a success message, with the summary in JSON mode.
    pub fn success<T: Serialize>(&self, message: &str, details: &T) {
        match self.mode {
            OutputMode::Normal | OutputMode::GitHub => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Json => {
                self.json("success", message, serde_json::to_value(details).ok());
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Error: {message}"),
            OutputMode::GitHub => println!("{}", github_command("error", message)),
            OutputMode::Json => self.json("error", message, None),
        }
    }

    fn json(&self, event: &str, message: &str, details: Option<serde_json::Value>) {
        let event = JsonEvent {
            event,
            message,
            duration_secs: self.start_time.map(|_| self.elapsed_secs()),
            details,
        };
        if let Ok(json) = serde_json::to_string(&event) {
            if event.event == "error" {
                eprintln!("{json}");
            } else {
                println!("{json}");
            }
        }
    }
}

/// Render a workflow command, escaping the message the way the runner expects.
pub fn github_command(command: &str, message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::{command}::{escaped}")
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_commands_escape_newlines() {
        assert_eq!(
            github_command("error", "line one\nline two 100%"),
            "::error::line one%0Aline two 100%25"
        );
    }

    #[test]
    fn json_event_skips_empty_fields() {
        let event = JsonEvent {
            event: "error",
            message: "boom",
            duration_secs: None,
            details: None,
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"error","message":"boom"}"#
        );
    }
}
