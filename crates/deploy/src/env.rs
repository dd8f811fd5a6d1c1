//! Environment bindings captured once at startup.
//!
//! Nothing below the binary reads the process environment directly: the
//! [`Environment`] snapshot is built once and passed by reference to every
//! component that needs a binding.

use std::{collections::BTreeMap, fmt};

use crate::CourierError;

/// Name of the binding holding the operator's signing key.
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

/// Immutable snapshot of environment bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Snapshot the current process environment.
    ///
    /// Bindings whose name or value is not valid unicode are skipped.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Build an environment from explicit pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a binding. A bound-but-empty value is returned as `Some("")`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// The operator's signing credential.
    pub fn credential(&self) -> Result<Credential, CourierError> {
        match self.get(PRIVATE_KEY_VAR).map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Credential(key.to_string())),
            _ => Err(CourierError::Credential(format!(
                "{PRIVATE_KEY_VAR} is not set; export it or add it to your .env file"
            ))),
        }
    }
}

/// Hex-encoded private key shared by every per-network signer of a run.
///
/// Never exposed through `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_missing() {
        let env = Environment::from_pairs([("OTHER", "1")]);
        assert!(matches!(env.credential(), Err(CourierError::Credential(_))));
    }

    #[test]
    fn test_credential_empty_is_missing() {
        let env = Environment::from_pairs([(PRIVATE_KEY_VAR, "  ")]);
        assert!(matches!(env.credential(), Err(CourierError::Credential(_))));
    }

    #[test]
    fn test_credential_is_redacted() {
        let env = Environment::from_pairs([(PRIVATE_KEY_VAR, "0xdeadbeef")]);
        let credential = env.credential().expect("credential should be present");

        assert_eq!(credential.expose(), "0xdeadbeef");
        assert!(!format!("{credential:?}").contains("dead"));
        assert_eq!(credential.to_string(), "<redacted>");
    }

    #[test]
    fn test_empty_binding_is_visible() {
        let env = Environment::from_pairs([("EMPTY", "")]);
        assert_eq!(env.get("EMPTY"), Some(""));
        assert_eq!(env.get("MISSING"), None);
    }
}
