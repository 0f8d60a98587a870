// ABOUTME: Typed command-line flags passed to Container App create, update and up calls.
// ABOUTME: Serialized to az tokens only at the tool boundary and parsed back for inspection.

use nonempty::NonEmpty;
use std::fmt;
use thiserror::Error;

use crate::types::{EnvVar, Ingress};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseArgsError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("flag {0} requires a value")]
    MissingValue(&'static str),

    #[error("invalid value for {flag}: {reason}")]
    InvalidValue { flag: &'static str, reason: String },
}

/// One flag and its value(s).
#[derive(Clone, PartialEq, Eq)]
pub enum Flag {
    RegistryServer(String),
    RegistryUsername(String),
    RegistryPassword(String),
    Ingress(Ingress),
    TargetPort(u16),
    /// Additive environment variables (create and up).
    EnvVars(NonEmpty<EnvVar>),
    /// Replace all environment variables (update).
    ReplaceEnvVars(NonEmpty<EnvVar>),
}

impl Flag {
    pub fn name(&self) -> &'static str {
        match self {
            Flag::RegistryServer(_) => "--registry-server",
            Flag::RegistryUsername(_) => "--registry-username",
            Flag::RegistryPassword(_) => "--registry-password",
            Flag::Ingress(_) => "--ingress",
            Flag::TargetPort(_) => "--target-port",
            Flag::EnvVars(_) => "--env-vars",
            Flag::ReplaceEnvVars(_) => "--replace-env-vars",
        }
    }

    fn values(&self) -> Vec<String> {
        match self {
            Flag::RegistryServer(v) | Flag::RegistryUsername(v) | Flag::RegistryPassword(v) => {
                vec![v.clone()]
            }
            Flag::Ingress(ingress) => vec![ingress.to_string()],
            Flag::TargetPort(port) => vec![port.to_string()],
            Flag::EnvVars(vars) | Flag::ReplaceEnvVars(vars) => {
                vars.iter().map(ToString::to_string).collect()
            }
        }
    }

    fn is_secret(&self) -> bool {
        matches!(self, Flag::RegistryPassword(_))
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_secret() {
            write!(f, "{} ***", self.name())
        } else {
            write!(f, "{} {}", self.name(), self.values().join(" "))
        }
    }
}

/// Ordered flags for a single Container App call. Order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    flags: Vec<Flag>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, flag: Flag) {
        self.flags.push(flag);
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Flag names in order, e.g. `["--registry-server", "--ingress"]`.
    pub fn names(&self) -> Vec<&'static str> {
        self.flags.iter().map(Flag::name).collect()
    }

    pub fn registry_server(&self) -> Option<&str> {
        self.flags.iter().find_map(|flag| match flag {
            Flag::RegistryServer(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn registry_username(&self) -> Option<&str> {
        self.flags.iter().find_map(|flag| match flag {
            Flag::RegistryUsername(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn registry_password(&self) -> Option<&str> {
        self.flags.iter().find_map(|flag| match flag {
            Flag::RegistryPassword(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn ingress(&self) -> Option<Ingress> {
        self.flags.iter().find_map(|flag| match flag {
            Flag::Ingress(ingress) => Some(*ingress),
            _ => None,
        })
    }

    pub fn target_port(&self) -> Option<u16> {
        self.flags.iter().find_map(|flag| match flag {
            Flag::TargetPort(port) => Some(*port),
            _ => None,
        })
    }

    /// Environment variables from either env-var flag.
    pub fn env_vars(&self) -> Option<&NonEmpty<EnvVar>> {
        self.flags.iter().find_map(|flag| match flag {
            Flag::EnvVars(vars) | Flag::ReplaceEnvVars(vars) => Some(vars),
            _ => None,
        })
    }

    /// Serialize to az command-line tokens.
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        for flag in &self.flags {
            tokens.push(flag.name().to_string());
            tokens.extend(flag.values());
        }
        tokens
    }

    /// Parse az command-line tokens produced by [`CommandArgs::to_tokens`].
    ///
    /// Single-valued flags take exactly the next token, so values that look
    /// like flags (a password starting with `--`) survive. Env-var flags take
    /// every token up to the next `--` token.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ParseArgsError> {
        let mut args = CommandArgs::new();
        let mut i = 0;

        while i < tokens.len() {
            let name = tokens[i].as_ref();
            i += 1;

            let flag = match name {
                "--registry-server" => {
                    Flag::RegistryServer(take_value(tokens, &mut i, "--registry-server")?)
                }
                "--registry-username" => {
                    Flag::RegistryUsername(take_value(tokens, &mut i, "--registry-username")?)
                }
                "--registry-password" => {
                    Flag::RegistryPassword(take_value(tokens, &mut i, "--registry-password")?)
                }
                "--ingress" => {
                    let value = take_value(tokens, &mut i, "--ingress")?;
                    Flag::Ingress(value.parse().map_err(|e: crate::types::ParseIngressError| {
                        ParseArgsError::InvalidValue {
                            flag: "--ingress",
                            reason: e.to_string(),
                        }
                    })?)
                }
                "--target-port" => {
                    let value = take_value(tokens, &mut i, "--target-port")?;
                    Flag::TargetPort(value.parse().map_err(|e: std::num::ParseIntError| {
                        ParseArgsError::InvalidValue {
                            flag: "--target-port",
                            reason: e.to_string(),
                        }
                    })?)
                }
                "--env-vars" => Flag::EnvVars(parse_env_values(tokens, &mut i, "--env-vars")?),
                "--replace-env-vars" => Flag::ReplaceEnvVars(parse_env_values(
                    tokens,
                    &mut i,
                    "--replace-env-vars",
                )?),
                other => return Err(ParseArgsError::UnknownFlag(other.to_string())),
            };

            args.push(flag);
        }

        Ok(args)
    }
}

fn take_value<S: AsRef<str>>(
    tokens: &[S],
    i: &mut usize,
    flag: &'static str,
) -> Result<String, ParseArgsError> {
    let value = tokens
        .get(*i)
        .map(|t| t.as_ref().to_string())
        .ok_or(ParseArgsError::MissingValue(flag))?;
    *i += 1;
    Ok(value)
}

fn parse_env_values<S: AsRef<str>>(
    tokens: &[S],
    i: &mut usize,
    flag: &'static str,
) -> Result<NonEmpty<EnvVar>, ParseArgsError> {
    let mut vars = Vec::new();
    while let Some(token) = tokens.get(*i).map(|t| t.as_ref()) {
        if token.starts_with("--") {
            break;
        }
        let var = token
            .parse::<EnvVar>()
            .map_err(|e| ParseArgsError::InvalidValue {
                flag,
                reason: e.to_string(),
            })?;
        vars.push(var);
        *i += 1;
    }
    NonEmpty::from_vec(vars).ok_or(ParseArgsError::MissingValue(flag))
}

impl fmt::Display for CommandArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.flags.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonempty::nonempty;

    #[test]
    fn tokens_keep_insertion_order() {
        let mut args = CommandArgs::new();
        args.push(Flag::RegistryServer("myacr.azurecr.io".into()));
        args.push(Flag::Ingress(Ingress::External));
        args.push(Flag::TargetPort(8080));
        args.push(Flag::EnvVars(nonempty![
            EnvVar::new("A", "1"),
            EnvVar::new("B", "2")
        ]));

        assert_eq!(
            args.to_tokens(),
            vec![
                "--registry-server",
                "myacr.azurecr.io",
                "--ingress",
                "external",
                "--target-port",
                "8080",
                "--env-vars",
                "A=1",
                "B=2",
            ]
        );
    }

    #[test]
    fn display_hides_password() {
        let mut args = CommandArgs::new();
        args.push(Flag::RegistryUsername("user".into()));
        args.push(Flag::RegistryPassword("hunter2".into()));

        let rendered = args.to_string();
        assert_eq!(rendered, "--registry-username user --registry-password ***");
        assert!(!format!("{args:?}").contains("hunter2"));
    }

    #[test]
    fn password_that_looks_like_a_flag_survives_parsing() {
        let tokens = ["--registry-password", "--not-a-flag", "--target-port", "80"];
        let args = CommandArgs::parse(&tokens).unwrap();
        assert_eq!(args.registry_password(), Some("--not-a-flag"));
        assert_eq!(args.target_port(), Some(80));
    }

    #[test]
    fn parse_rejects_unknown_flags() {
        let err = CommandArgs::parse(&["--cpu", "1"]).unwrap_err();
        assert_eq!(err, ParseArgsError::UnknownFlag("--cpu".to_string()));
    }

    #[test]
    fn parse_rejects_empty_env_vars() {
        let err = CommandArgs::parse(&["--env-vars", "--ingress", "external"]).unwrap_err();
        assert_eq!(err, ParseArgsError::MissingValue("--env-vars"));
    }

    #[test]
    fn parse_rejects_missing_value() {
        let err = CommandArgs::parse(&["--target-port"]).unwrap_err();
        assert_eq!(err, ParseArgsError::MissingValue("--target-port"));
    }
}
