// ABOUTME: Process execution for the az, docker and pack command-line tools.
// ABOUTME: Captures output, fails on non-zero exit and redacts secrets from logged commands.

use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Arguments whose following value must never be logged.
const SECRET_FLAGS: &[&str] = &["--password", "--registry-password"];

/// Errors from running an external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("unexpected output from `{command}`: {reason}")]
    InvalidOutput { command: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Runs external programs with `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run a command and capture its output without checking the exit status.
    pub async fn output(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<CommandOutput, CommandError> {
        tracing::debug!(command = %display_command(program, args), "running command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if let Some(input) = stdin
            && let Some(mut handle) = child.stdin.take()
        {
            handle.write_all(input.as_bytes()).await?;
            // Dropping the handle closes stdin so the child sees EOF
            drop(handle);
        }

        let output = child.wait_with_output().await?;

        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run a command that must succeed and return its trimmed stdout.
    pub async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        self.run_with_stdin(program, args, None).await
    }

    /// Run a command that must succeed, feeding `stdin` to it.
    pub async fn run_with_stdin(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<String, CommandError> {
        let output = self.output(program, args, stdin).await?;
        if !output.success() {
            return Err(CommandError::Failed {
                command: display_command(program, args),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }

    /// Run a command and report whether it exited successfully.
    ///
    /// Used for existence probes such as `az group show`, where a non-zero exit
    /// means "not found". Only a failure to start the program is an error.
    pub async fn succeeds(&self, program: &str, args: &[String]) -> Result<bool, CommandError> {
        let output = self.output(program, args, None).await?;
        if !output.success() {
            tracing::debug!(
                command = %display_command(program, args),
                stderr = %output.stderr.trim(),
                "command reported failure"
            );
        }
        Ok(output.success())
    }
}

/// Render a command line for logs and error messages, hiding secret values.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut rendered = vec![program.to_string()];
    let mut redact_next = false;
    for arg in args {
        if redact_next {
            rendered.push("***".to_string());
            redact_next = false;
            continue;
        }
        redact_next = SECRET_FLAGS.contains(&arg.as_str());
        rendered.push(arg.clone());
    }
    rendered.join(" ")
}

/// Build an owned argument vector from string slices.
pub(crate) fn args<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_redacts_passwords() {
        let rendered = display_command(
            "az",
            &args([
                "containerapp",
                "registry",
                "set",
                "--username",
                "user",
                "--password",
                "hunter2",
            ]),
        );
        assert_eq!(
            rendered,
            "az containerapp registry set --username user --password ***"
        );
    }

    #[test]
    fn display_redacts_registry_password_flag() {
        let rendered = display_command("az", &args(["--registry-password", "hunter2", "-o", "none"]));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.ends_with("-o none"));
    }

    #[tokio::test]
    async fn run_returns_trimmed_stdout() {
        let out = CommandRunner::new()
            .run("sh", &args(["-c", "echo '  hello  '"]))
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn run_fails_on_non_zero_exit() {
        let err = CommandRunner::new()
            .run("sh", &args(["-c", "echo boom >&2; exit 3"]))
            .await
            .unwrap_err();
        match err {
            CommandError::Failed { stderr, status, .. } => {
                assert_eq!(stderr, "boom");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn stdin_is_forwarded() {
        let out = CommandRunner::new()
            .run_with_stdin("cat", &[], Some("token"))
            .await
            .unwrap();
        assert_eq!(out, "token");
    }

    #[tokio::test]
    async fn succeeds_maps_exit_status() {
        let runner = CommandRunner::new();
        assert!(runner.succeeds("sh", &args(["-c", "exit 0"])).await.unwrap());
        assert!(!runner.succeeds("sh", &args(["-c", "exit 1"])).await.unwrap());
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = CommandRunner::new()
            .run("definitely-not-a-real-program-acadeploy", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
