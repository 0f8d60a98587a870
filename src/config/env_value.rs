// ABOUTME: Parsing of the space-separated `environmentVariables` input.
// ABOUTME: Produces a non-empty list so "no variables" is represented by None.

use nonempty::NonEmpty;

use crate::types::{EnvVar, EnvVarError};

/// Parse `NAME=value NAME2=value2` into individual variables.
///
/// Returns `Ok(None)` when the input holds no variables at all.
pub fn parse_env_vars(input: &str) -> Result<Option<NonEmpty<EnvVar>>, EnvVarError> {
    let vars = input
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<EnvVar>, _>>()?;

    Ok(NonEmpty::from_vec(vars))
}
