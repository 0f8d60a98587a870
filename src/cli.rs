// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Every pipeline input is also read from its INPUT_* environment variable.

use acadeploy::config::RawInputs;
use acadeploy::output::OutputMode;
use clap::Parser;

#[derive(Parser)]
#[command(name = "acadeploy")]
#[command(about = "Build and deploy an Azure Container App from a pipeline step")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub inputs: RawInputs,

    /// Log every command that is run
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputMode::Normal, env = "ACADEPLOY_OUTPUT")]
    pub output: OutputMode,
}
