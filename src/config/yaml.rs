// ABOUTME: Pre-flight check of the Container App YAML configuration file.
// ABOUTME: The file is handed to az verbatim; this only rejects files az could never accept.

use std::path::Path;

use super::ConfigurationError;

/// Ensure the YAML configuration file exists and holds a top-level mapping.
pub fn check_yaml_config(path: &Path) -> Result<(), ConfigurationError> {
    if !path.is_file() {
        return Err(ConfigurationError::YamlConfigNotFound(path.to_path_buf()));
    }

    let content =
        std::fs::read_to_string(path).map_err(|source| ConfigurationError::YamlConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|source| ConfigurationError::YamlConfigInvalid {
            path: path.to_path_buf(),
            source,
        })?;

    if !value.is_mapping() {
        return Err(ConfigurationError::YamlConfigNotMapping(path.to_path_buf()));
    }

    Ok(())
}
