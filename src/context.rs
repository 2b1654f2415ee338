//! Build context and environment resolution.
//!
//! A [`BuildContext`] identifies the surrounding build: its tag, the node it
//! runs on, its workspace and the directory deployment logs are written to.
//! The [`EnvironmentProvider`] trait abstracts how build variables are
//! resolved so orchestration stays test-injectable.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::vars::BuildVars;

/// Identity of the build a task runs inside.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Unique tag of the build (used in log file names).
    pub build_tag: String,
    /// Name of the worker node, `None` when running on the controller.
    pub node: Option<String>,
    /// Workspace directory of the build.
    pub workspace: PathBuf,
    /// Directory deployment logs are written to.
    pub log_dir: PathBuf,
}

impl BuildContext {
    /// Create a context for a controller-side build.
    pub fn local(build_tag: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        Self {
            build_tag: build_tag.into(),
            node: None,
            log_dir: workspace.join("logs"),
            workspace,
        }
    }

    /// Name of the node the build executes on, for diagnostics.
    pub fn node_name(&self) -> &str {
        self.node.as_deref().unwrap_or("controller")
    }

    /// True when the build executes on a worker node rather than the
    /// controller.
    pub fn is_remote(&self) -> bool {
        self.node.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// Resolves build variables from the surrounding build context.
#[async_trait]
pub trait EnvironmentProvider: Send + Sync {
    /// Returns the build's variables, or `None` when the build exposes none.
    async fn build_vars(&self, ctx: &BuildContext) -> Result<Option<BuildVars>>;
}

/// Provider backed by the current process environment.
#[derive(Debug, Default)]
pub struct ProcessEnvironment;

#[async_trait]
impl EnvironmentProvider for ProcessEnvironment {
    async fn build_vars(&self, _ctx: &BuildContext) -> Result<Option<BuildVars>> {
        Ok(Some(std::env::vars().collect()))
    }
}
