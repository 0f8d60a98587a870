// ABOUTME: Entry point for the acadeploy CLI application.
// ABOUTME: Parses pipeline inputs, runs the deployment and reports the outcome.

mod cli;

use acadeploy::config::{Inputs, RawInputs};
use acadeploy::deploy::{self, Deployment, DeploymentSummary};
use acadeploy::diagnostics::Diagnostics;
use acadeploy::output::Output;
use acadeploy::platform::{CommandRunner, Toolchain};
use acadeploy::resources::ResolutionError;
use acadeploy::telemetry::Telemetry;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag
    let default_filter = if cli.verbose {
        "acadeploy=debug"
    } else {
        "acadeploy=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output);
    output.start_timer();

    if let Some(password) = cli.inputs.acr_password.as_deref() {
        output.mask(password);
    }

    let toolchain = Toolchain::new(CommandRunner::new());
    let mut telemetry = Telemetry::new(cli.inputs.telemetry_disabled());
    let mut diagnostics = Diagnostics::default();

    let result = run(cli.inputs, &toolchain, &mut telemetry, &output).await;

    match &result {
        Ok(_) => telemetry.succeeded(),
        Err(e) => telemetry.failed(e.to_string()),
    }
    telemetry.send(&toolchain, &mut diagnostics).await;

    for warning in diagnostics.warnings() {
        output.warning(&warning.message);
    }

    match result {
        Ok(summary) => output.success(
            &format!(
                "Container App {} deployed ({})",
                summary.identity.app_name, summary.strategy
            ),
            &summary,
        ),
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

async fn run(
    raw: RawInputs,
    toolchain: &Toolchain,
    telemetry: &mut Telemetry,
    output: &Output,
) -> acadeploy::Result<DeploymentSummary> {
    let inputs = Inputs::from_raw(raw)?;
    let deployment = Deployment::new(inputs)?;

    toolchain.prepare().await.map_err(ResolutionError::Setup)?;

    deploy::run(deployment, toolchain, telemetry, output).await
}
