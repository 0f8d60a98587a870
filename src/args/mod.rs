// ABOUTME: Deployment argument assembly for Container App create, update and up calls.
// ABOUTME: Flags stay typed until a platform implementation turns them into az tokens.

mod builder;
mod flags;

pub use builder::{
    ArgsRequest, DEFAULT_PORT, DeploymentArgs, IngressMode, IngressPlan, PYTHON_DEFAULT_PORT,
    build_deployment_args, default_target_port, should_append_registry_flags,
    should_use_update_command,
};
pub use flags::{CommandArgs, Flag, ParseArgsError};
