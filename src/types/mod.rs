// ABOUTME: Validated domain types for deployment inputs.
// ABOUTME: Uses phantom types to keep resource names from being swapped.

mod app_name;
mod env_var;
mod image_ref;
mod ingress;
mod name;
mod registry_name;
mod runtime_stack;

pub use app_name::{AppName, AppNameError};
pub use env_var::{EnvVar, EnvVarError};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use ingress::{Ingress, ParseIngressError};
pub use name::{EnvironmentName, Location, Name, ResourceGroupName};
pub use registry_name::{RegistryName, RegistryNameError};
pub use runtime_stack::{RuntimeStack, RuntimeStackError};
