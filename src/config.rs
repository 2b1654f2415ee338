//! Configuration for Rollout.
//!
//! All previously-global deployment settings live in one explicit
//! [`OrchestratorConfig`] value handed to the orchestrator at construction:
//! deployer tool settings, the artifact exclusion pattern, registered
//! toolchains and the target environment list. Loadable from YAML or TOML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::target::TargetEnvironment;
use crate::task::Task;
use crate::toolchain::Toolchain;

/// Settings of the external deployer tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeployerSettings {
    /// Fully qualified main class of the deployer.
    pub class: String,

    /// Extra JVM options, free-form (e.g. `-Xmx512m`).
    pub java_opts: Option<String>,

    /// Extra classpath entries; the deployer jar itself goes here.
    pub extra_classpath: Vec<PathBuf>,
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Deployer tool settings.
    pub deployer: DeployerSettings,

    /// Full-match pattern excluding artifacts from deployment.
    pub excluded_artifact_pattern: Option<String>,

    /// Registered toolchains.
    pub toolchains: Vec<Toolchain>,

    /// Configured target environments, in lookup order.
    pub environments: Vec<TargetEnvironment>,

    /// Directory deployment logs are written to.
    pub log_dir: Option<PathBuf>,
}

impl OrchestratorConfig {
    /// Loads configuration from a YAML or TOML file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config '{}'", path.display()))?,
            _ => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config '{}'", path.display()))?,
        };
        Ok(config)
    }
}

/// Loads a persisted task file (YAML).
pub fn load_task(path: &Path) -> Result<Task> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task file '{}'", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse task file '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = OrchestratorConfig::default();
        assert!(config.deployer.class.is_empty());
        assert!(config.deployer.extra_classpath.is_empty());
        assert!(config.excluded_artifact_pattern.is_none());
        assert!(config.environments.is_empty());
        assert!(config.toolchains.is_empty());
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
deployer:
  class: com.example.Deployer
  java_opts: "-Xmx512m"
  extra_classpath:
    - /opt/deployer/deployer.jar
excluded_artifact_pattern: ".*-SNAPSHOT"
toolchains:
  - name: jdk17
    home: /opt/jdk17
environments:
  - name: prod
    host: app-01.example.net
    port: 7001
    user: admin
    password: secret
    remote_dir: /opt/lib
"#;
        let config: OrchestratorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.deployer.class, "com.example.Deployer");
        assert_eq!(config.deployer.java_opts.as_deref(), Some("-Xmx512m"));
        assert_eq!(config.environments.len(), 1);
        assert_eq!(config.environments[0].port, 7001);
        assert_eq!(config.toolchains[0].name, "jdk17");
        assert_eq!(
            config.excluded_artifact_pattern.as_deref(),
            Some(".*-SNAPSHOT")
        );
    }

    #[test]
    fn test_load_task_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.yml");
        std::fs::write(
            &path,
            r#"
id: "1"
name: frontend
artifact_pattern: ".*\\.war"
artifact_dir: target
environment: prod
deployment_name: frontend
targets: cluster-a
"#,
        )
        .unwrap();
        let task = load_task(&path).unwrap();
        assert_eq!(task.name, "frontend");
        assert!(!task.library);
        assert!(task.custom_commands().is_none());
    }
}
