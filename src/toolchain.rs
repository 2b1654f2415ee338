//! Toolchain resolution on the execution node.
//!
//! The deployer tool runs on a JVM; a [`Toolchain`] names one installed
//! runtime. [`ToolchainService`] abstracts how toolchains are located and
//! validated so orchestration can run against a registered list, a probed
//! system runtime, or a test double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::context::BuildContext;
use crate::error::{Error, Result};

/// Name under which the system runtime is looked up on `PATH`.
pub const SYSTEM_TOOLCHAIN: &str = "system";

/// A named, versioned runtime installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    /// Registered name.
    pub name: String,
    /// Installation root.
    pub home: PathBuf,
}

impl Toolchain {
    /// Create a toolchain record.
    pub fn new(name: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            home: home.into(),
        }
    }

    /// Path to the runtime launcher, `<home>/bin/java`.
    pub fn launcher(&self) -> PathBuf {
        self.home.join("bin").join("java")
    }
}

/// Locates and validates toolchains on an execution node.
#[async_trait]
pub trait ToolchainService: Send + Sync {
    /// Looks up a toolchain by name, `None` when not registered.
    async fn find_by_name(&self, ctx: &BuildContext, name: &str) -> Result<Option<Toolchain>>;

    /// Whether the toolchain's launcher exists and is usable.
    async fn is_valid(&self, ctx: &BuildContext, toolchain: &Toolchain) -> Result<bool>;

    /// Probes the toolchain version, returning the reported version line.
    async fn check_version(&self, ctx: &BuildContext, toolchain: &Toolchain) -> Result<String>;
}

/// Service over the configured toolchain list, probing the `PATH` runtime
/// for the [`SYSTEM_TOOLCHAIN`] name.
#[derive(Debug, Default)]
pub struct LocalToolchainService {
    registered: Vec<Toolchain>,
}

impl LocalToolchainService {
    /// Create a service over the configured toolchains.
    pub fn new(registered: Vec<Toolchain>) -> Self {
        Self { registered }
    }
}

#[async_trait]
impl ToolchainService for LocalToolchainService {
    async fn find_by_name(&self, _ctx: &BuildContext, name: &str) -> Result<Option<Toolchain>> {
        if let Some(found) = self.registered.iter().find(|t| t.name == name) {
            return Ok(Some(found.clone()));
        }
        if name == SYSTEM_TOOLCHAIN {
            // bin/java two levels under the home, so strip both components.
            if let Ok(launcher) = which::which("java") {
                if let Some(home) = launcher.parent().and_then(|bin| bin.parent()) {
                    debug!(home = %home.display(), "Resolved system runtime from PATH");
                    return Ok(Some(Toolchain::new(SYSTEM_TOOLCHAIN, home)));
                }
            }
        }
        Ok(None)
    }

    async fn is_valid(&self, _ctx: &BuildContext, toolchain: &Toolchain) -> Result<bool> {
        Ok(toolchain.launcher().is_file())
    }

    async fn check_version(&self, _ctx: &BuildContext, toolchain: &Toolchain) -> Result<String> {
        let launcher = toolchain.launcher();
        let output = Command::new(&launcher)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::toolchain_version(&toolchain.name, e.to_string()))?;

        if !output.status.success() {
            return Err(Error::toolchain_version(
                &toolchain.name,
                format!("launcher exited with {}", output.status),
            ));
        }

        // Runtimes report their version on stderr.
        let report = if output.stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).to_string()
        } else {
            String::from_utf8_lossy(&output.stderr).to_string()
        };
        Ok(report.lines().next().unwrap_or_default().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> BuildContext {
        BuildContext::local("build-1", "/tmp/ws")
    }

    #[tokio::test]
    async fn test_find_registered_toolchain() {
        let service = LocalToolchainService::new(vec![Toolchain::new("jdk17", "/opt/jdk17")]);
        let found = service.find_by_name(&ctx(), "jdk17").await.unwrap();
        assert_eq!(found.unwrap().home, PathBuf::from("/opt/jdk17"));
    }

    #[tokio::test]
    async fn test_unknown_toolchain_is_none() {
        let service = LocalToolchainService::new(vec![Toolchain::new("jdk17", "/opt/jdk17")]);
        assert!(service.find_by_name(&ctx(), "jdk21").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_launcher_is_invalid() {
        let service = LocalToolchainService::default();
        let toolchain = Toolchain::new("jdk17", "/nonexistent/jdk17");
        assert!(!service.is_valid(&ctx(), &toolchain).await.unwrap());
    }

    #[tokio::test]
    async fn test_version_check_fails_for_missing_launcher() {
        let service = LocalToolchainService::default();
        let toolchain = Toolchain::new("jdk17", "/nonexistent/jdk17");
        let err = service.check_version(&ctx(), &toolchain).await.unwrap_err();
        assert!(matches!(err, Error::ToolchainVersion { .. }));
    }

    #[test]
    fn test_launcher_path_layout() {
        let toolchain = Toolchain::new("jdk17", "/opt/jdk17");
        assert_eq!(toolchain.launcher(), PathBuf::from("/opt/jdk17/bin/java"));
    }
}
