//! Invocation parameter bundle for the deployer tool.
//!
//! One [`InvocationParameters`] value captures everything the command
//! builder needs for a single operation. The bundle is built per operation
//! (deploy, undeploy, or each custom command) and never mutated afterwards;
//! variants derive from a base bundle by struct update.

use std::fmt;
use std::path::PathBuf;

use crate::target::{TargetEnvironment, DEFAULT_PROTOCOL};
use crate::task::{StageMode, Task};
use crate::toolchain::Toolchain;

/// Operation the deployer tool is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Deploy the artifact.
    Deploy,
    /// Remove the deployment.
    Undeploy,
}

impl Operation {
    /// Command-line flag selecting this operation.
    pub fn flag(&self) -> &'static str {
        match self {
            Operation::Deploy => "-deploy",
            Operation::Undeploy => "-undeploy",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Deploy => write!(f, "deploy"),
            Operation::Undeploy => write!(f, "undeploy"),
        }
    }
}

/// Value bundle for one deployer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationParameters {
    /// Runtime the deployer runs on.
    pub toolchain: Toolchain,
    /// Fully qualified main class of the deployer tool.
    pub deployer_class: String,
    /// Name the deployment is registered under.
    pub deployment_name: String,
    /// Whether the artifact is a shared library.
    pub library: bool,
    /// Comma-separated target list, variables already resolved.
    pub targets: String,
    /// Target environment the command runs against.
    pub environment: TargetEnvironment,
    /// Logical artifact name.
    pub artifact_name: String,
    /// Source path the deployer reads the artifact from; remote for
    /// libraries, local otherwise. `None` for operations without a source.
    pub source_path: Option<String>,
    /// Operation kind; `None` for raw custom command lines.
    pub operation: Option<Operation>,
    /// Tell the deployer not to wait for exit acknowledgment.
    pub no_exit_wait: bool,
    /// Extra JVM options, free-form.
    pub java_opts: Option<String>,
    /// Extra classpath entries for the deployer JVM.
    pub extra_classpath: Vec<PathBuf>,
    /// Staging behavior.
    pub stage_mode: StageMode,
    /// Optional deployment plan descriptor.
    pub deployment_plan: Option<PathBuf>,
    /// Protocol override for the admin URL.
    pub protocol: Option<String>,
}

impl InvocationParameters {
    /// Base bundle for a task: no operation, no source, exit wait disabled.
    ///
    /// Per-operation bundles derive from this by struct update.
    pub fn base(
        task: &Task,
        environment: &TargetEnvironment,
        toolchain: &Toolchain,
        deployer_class: impl Into<String>,
        java_opts: Option<String>,
        extra_classpath: Vec<PathBuf>,
        artifact_name: impl Into<String>,
    ) -> Self {
        Self {
            toolchain: toolchain.clone(),
            deployer_class: deployer_class.into(),
            deployment_name: task.deployment_name.clone(),
            library: task.library,
            targets: task.targets.clone(),
            environment: environment.clone(),
            artifact_name: artifact_name.into(),
            source_path: None,
            operation: None,
            no_exit_wait: true,
            java_opts,
            extra_classpath,
            stage_mode: task.stage_mode,
            deployment_plan: task.deployment_plan.clone(),
            protocol: task.protocol.clone(),
        }
    }

    /// Protocol the admin URL uses, task override first.
    pub fn protocol(&self) -> &str {
        self.protocol
            .as_deref()
            .or(self.environment.protocol.as_deref())
            .unwrap_or(DEFAULT_PROTOCOL)
    }

    /// Admin URL of the target, `protocol://host:port`.
    pub fn admin_url(&self) -> String {
        self.environment.admin_url(self.protocol.as_deref())
    }
}
