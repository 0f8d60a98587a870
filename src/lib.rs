// ABOUTME: Library root for acadeploy - exposes the deployment pipeline for the binary and tests.
// ABOUTME: The main binary is in main.rs.

pub mod args;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod output;
pub mod platform;
pub mod resources;
pub mod scenario;
pub mod telemetry;
pub mod types;

pub use error::{Error, ErrorKind, Result};
