//! Deployment task definition and outcome records.
//!
//! A [`DeploymentTask`] is an immutable description of one unit of work,
//! typically loaded from a persisted job file. Variable substitution never
//! mutates a task: [`DeploymentTask::resolved`] returns a new copy that
//! serves as the history record attached to the run's [`TaskResult`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::vars::{expand, BuildVars};

/// Staging behavior requested from the deployer tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StageMode {
    /// Files are copied to the targets before activation.
    Stage,
    /// Targets use the source path directly.
    NoStage,
    /// No flag is emitted, the deployer applies its own default.
    #[default]
    ByDefault,
}

impl fmt::Display for StageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageMode::Stage => write!(f, "stage"),
            StageMode::NoStage => write!(f, "nostage"),
            StageMode::ByDefault => write!(f, "bydefault"),
        }
    }
}

/// One deployment unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier, used in log file names.
    pub id: String,

    /// Human-readable task name, used to derive the skip flag.
    pub name: String,

    /// Regular expression selecting the built artifact by file name.
    pub artifact_pattern: String,

    /// Directory the artifact is selected from, relative to the workspace.
    #[serde(default)]
    pub artifact_dir: PathBuf,

    /// Name of the target environment to deploy to.
    pub environment: String,

    /// Name the deployment is registered under on the server.
    pub deployment_name: String,

    /// Whether the artifact is a shared library rather than an application.
    #[serde(default)]
    pub library: bool,

    /// Comma-separated list of server/cluster targets.
    pub targets: String,

    /// Staging behavior for the deploy operation.
    #[serde(default)]
    pub stage_mode: StageMode,

    /// Optional deployment plan descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_plan: Option<PathBuf>,

    /// Protocol override for the admin URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Custom command-line template. A non-blank template switches the run
    /// into custom mode instead of the standard undeploy/deploy sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_line: Option<String>,
}

impl Task {
    /// Name of the environment flag that disables this task,
    /// `DEPLOY_<TASK_NAME_UPPERCASED>_SKIP`.
    pub fn skip_flag(&self) -> String {
        format!("DEPLOY_{}_SKIP", self.name).to_uppercase()
    }

    /// The custom command-line template, if present and non-blank.
    pub fn custom_commands(&self) -> Option<&str> {
        self.command_line
            .as_deref()
            .filter(|line| !line.trim().is_empty())
    }

    /// Returns a copy of this task with build variables substituted.
    ///
    /// Only the target list carries variable references; the original task
    /// is left untouched so it can be compared against the resolved history
    /// record.
    pub fn resolved(&self, vars: Option<&BuildVars>) -> Task {
        let mut resolved = self.clone();
        if let Some(vars) = vars {
            resolved.targets = expand(&self.targets, vars);
        }
        resolved
    }
}

/// Coarse prerequisite gate result, reported independently of the
/// deployment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrerequisiteStatus {
    /// All prerequisites passed.
    #[default]
    Ok,
}

impl fmt::Display for PrerequisiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrerequisiteStatus::Ok => write!(f, "ok"),
        }
    }
}

/// Terminal classification of one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    /// Operator disabled the task through its skip flag.
    Disabled,
    /// A prerequisite or lookup failed before anything deployed.
    Aborted,
    /// Something broke mid-deploy.
    Failed,
    /// Every step completed with exit code zero.
    Succeeded,
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Disabled => write!(f, "disabled"),
            DeploymentStatus::Aborted => write!(f, "aborted"),
            DeploymentStatus::Failed => write!(f, "failed"),
            DeploymentStatus::Succeeded => write!(f, "succeeded"),
        }
    }
}

/// Immutable outcome record of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Prerequisite gate result.
    pub prerequisite: PrerequisiteStatus,
    /// Terminal deployment status.
    pub status: DeploymentStatus,
    /// The task with build variables resolved, as executed.
    pub task: Task,
    /// Full file name of the selected artifact, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
}

impl TaskResult {
    /// Result for a task disabled by its skip flag.
    pub fn disabled(task: Task) -> Self {
        Self::new(DeploymentStatus::Disabled, task, None)
    }

    /// Result for a run aborted before any deploy command ran.
    pub fn aborted(task: Task, artifact: Option<String>) -> Self {
        Self::new(DeploymentStatus::Aborted, task, artifact)
    }

    /// Result for a run that broke mid-deploy.
    pub fn failed(task: Task, artifact: Option<String>) -> Self {
        Self::new(DeploymentStatus::Failed, task, artifact)
    }

    /// Result for a fully successful run.
    pub fn succeeded(task: Task, artifact: Option<String>) -> Self {
        Self::new(DeploymentStatus::Succeeded, task, artifact)
    }

    fn new(status: DeploymentStatus, task: Task, artifact: Option<String>) -> Self {
        Self {
            prerequisite: PrerequisiteStatus::Ok,
            status,
            task,
            artifact,
        }
    }

    /// True when the run deployed successfully.
    pub fn is_success(&self) -> bool {
        self.status == DeploymentStatus::Succeeded
    }
}
