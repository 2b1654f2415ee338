//! Target environment definitions and lookup.
//!
//! A target environment is a named remote deployment destination. The
//! configured list is searched by case-insensitive name; a missing entry is
//! a first-class failure condition surfaced as
//! [`Error::EnvironmentNotFound`](crate::error::Error::EnvironmentNotFound).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Protocol used for the admin URL when neither the task nor the
/// environment overrides it.
pub const DEFAULT_PROTOCOL: &str = "http";

/// A named remote deployment destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEnvironment {
    /// Environment name, matched case-insensitively.
    pub name: String,

    /// Admin server host.
    pub host: String,

    /// Admin server port.
    pub port: u16,

    /// Default protocol for the admin URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Admin credentials, included in deployer commands when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Admin password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Dedicated file-transfer host; falls back to `host` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_host: Option<String>,

    /// File-transfer user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_user: Option<String>,

    /// File-transfer password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_password: Option<String>,

    /// Remote directory library artifacts are shipped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_dir: Option<String>,
}

impl TargetEnvironment {
    /// Host used for file transfers, defaulting to the admin host.
    pub fn transfer_host(&self) -> &str {
        match self.transfer_host.as_deref() {
            Some(host) if !host.trim().is_empty() => host,
            _ => &self.host,
        }
    }

    /// Admin URL for this environment, `protocol://host:port`.
    ///
    /// `protocol_override` (from the task) wins over the environment's own
    /// protocol.
    pub fn admin_url(&self, protocol_override: Option<&str>) -> String {
        let protocol = protocol_override
            .or(self.protocol.as_deref())
            .unwrap_or(DEFAULT_PROTOCOL);
        format!("{}://{}:{}", protocol, self.host, self.port)
    }
}

/// The configured, ordered list of target environments.
#[derive(Debug, Clone, Default)]
pub struct TargetStore {
    environments: Vec<TargetEnvironment>,
}

impl TargetStore {
    /// Create a store over a configured environment list.
    pub fn new(environments: Vec<TargetEnvironment>) -> Self {
        Self { environments }
    }

    /// All configured environments, in configuration order.
    pub fn all(&self) -> &[TargetEnvironment] {
        &self.environments
    }

    /// Looks up an environment by case-insensitive name.
    pub fn find(&self, name: &str) -> Option<&TargetEnvironment> {
        self.environments
            .iter()
            .find(|env| env.name.eq_ignore_ascii_case(name))
    }

    /// Like [`find`](Self::find), but failing with
    /// [`Error::EnvironmentNotFound`] when the name is not configured.
    pub fn resolve(&self, name: &str) -> Result<&TargetEnvironment> {
        self.find(name)
            .ok_or_else(|| Error::EnvironmentNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(name: &str) -> TargetEnvironment {
        TargetEnvironment {
            name: name.to_string(),
            host: "app-01.example.net".to_string(),
            port: 7001,
            protocol: None,
            user: None,
            password: None,
            transfer_host: None,
            transfer_user: None,
            transfer_password: None,
            remote_dir: None,
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let store = TargetStore::new(vec![environment("prod")]);
        assert!(store.find("PROD").is_some());
        assert!(store.find("Prod").is_some());
    }

    #[test]
    fn test_missing_environment_is_an_error() {
        let store = TargetStore::new(vec![environment("prod")]);
        let err = store.resolve("STAGE").unwrap_err();
        assert!(matches!(err, Error::EnvironmentNotFound(name) if name == "STAGE"));
    }

    #[test]
    fn test_transfer_host_falls_back_to_admin_host() {
        let mut env = environment("prod");
        assert_eq!(env.transfer_host(), "app-01.example.net");
        env.transfer_host = Some("  ".to_string());
        assert_eq!(env.transfer_host(), "app-01.example.net");
        env.transfer_host = Some("ftp.example.net".to_string());
        assert_eq!(env.transfer_host(), "ftp.example.net");
    }

    #[test]
    fn test_admin_url_protocol_precedence() {
        let mut env = environment("prod");
        assert_eq!(env.admin_url(None), "http://app-01.example.net:7001");
        env.protocol = Some("t3".to_string());
        assert_eq!(env.admin_url(None), "t3://app-01.example.net:7001");
        assert_eq!(env.admin_url(Some("t3s")), "t3s://app-01.example.net:7001");
    }
}
