//! # Rollout - Deployment Task Orchestration
//!
//! Rollout drives the deployment of a build artifact to a remote
//! application-server environment through an external command-line deployer
//! tool. One orchestration run handles exactly one task against one target:
//! prerequisites are checked, library artifacts are shipped ahead of time,
//! deployer invocations are constructed from structured parameters, external
//! processes run with their output captured into a per-run log file, and the
//! whole outcome folds into a single immutable result record.
//!
//! ## Core Concepts
//!
//! - **Tasks**: immutable descriptions of one deployment unit of work
//! - **Target environments**: named remote destinations (host, port,
//!   protocol, credentials, remote library directory)
//! - **Toolchains**: named runtime installations the deployer runs on
//! - **Invocation parameters**: the per-operation value bundle commands are
//!   built from
//! - **Execution modes**: standard undeploy-then-deploy, custom command
//!   sequences, or operator-skipped
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Task Orchestrator                     │
//! │   (skip check → toolchain → log sink → artifact →        │
//! │    exclusion → target → staging → dispatch → result)     │
//! └─────────────────────────────────────────────────────────┘
//!        │                │                     │
//!        ▼                ▼                     ▼
//! ┌─────────────┐  ┌──────────────┐  ┌────────────────────┐
//! │ Transfer    │  │ Command      │  │ Token Resolver     │
//! │ Step        │  │ Builder      │  │ ({deploy.*} keys)  │
//! └─────────────┘  └──────────────┘  └────────────────────┘
//!        │                │
//!        ▼                ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Process Runner                       │
//! │        (spawn, stream output to log sink, exit code)     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use rollout::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = OrchestratorConfig::load("rollout.yml".as_ref())?;
//!     let task = rollout::config::load_task("task.yml".as_ref())?;
//!     let ctx = BuildContext::local("build-42", std::env::current_dir()?);
//!
//!     let orchestrator = TaskOrchestrator::new(config)?;
//!     match orchestrator.perform(&task, "jdk17", &ctx).await {
//!         Ok(result) => println!("{}", result.status),
//!         Err(failure) => eprintln!("{}", failure.into_result().status),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of the most commonly needed types.

    pub use crate::artifact::{ArtifactRef, ArtifactSelector, WorkspaceArtifactSelector};
    pub use crate::config::OrchestratorConfig;
    pub use crate::context::{BuildContext, EnvironmentProvider, ProcessEnvironment};
    pub use crate::deployer::{InvocationParameters, Operation};
    pub use crate::error::{Error, Result};
    pub use crate::orchestrator::{OrchestrationError, TaskOrchestrator};
    pub use crate::process::{Invocation, LocalProcessRunner, ProcessHandle, ProcessRunner};
    pub use crate::runlog::{FileLogFactory, LogFactory, LogSink};
    pub use crate::stager::{RemoteFileStager, WorkspaceFileStager};
    pub use crate::target::{TargetEnvironment, TargetStore};
    pub use crate::task::{DeploymentStatus, PrerequisiteStatus, StageMode, Task, TaskResult};
    pub use crate::toolchain::{LocalToolchainService, Toolchain, ToolchainService};
    pub use crate::transfer::{FileTransferClient, LocalFileTransfer, TransferConfig};
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result aliases for Rollout operations.
pub mod error;

/// Build variable expansion and flag-value semantics.
pub mod vars;

/// Build context and environment resolution.
pub mod context;

/// Deployment task definitions and outcome records.
pub mod task;

/// Target environment definitions and case-insensitive lookup.
pub mod target;

// ============================================================================
// Collaborators
// ============================================================================

/// Toolchain resolution on the execution node.
pub mod toolchain;

/// Artifact selection from the build workspace.
pub mod artifact;

/// Per-run deployment log sink with banner lines and exactly-once release.
pub mod runlog;

/// External process execution with output capture.
pub mod process;

/// Library artifact transfer to the target's remote directory.
pub mod transfer;

/// Classpath staging into node workspaces, skip-if-exists.
pub mod stager;

// ============================================================================
// Deployer Invocations
// ============================================================================

/// Deployer tool invocation layer: parameters, command builder, tokens.
pub mod deployer;

// ============================================================================
// Orchestration
// ============================================================================

/// The deployment task orchestrator.
pub mod orchestrator;

/// Configuration management for Rollout behavior.
pub mod config;

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of Rollout.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
