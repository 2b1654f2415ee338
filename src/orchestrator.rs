//! Deployment task orchestration.
//!
//! [`TaskOrchestrator::perform`] runs exactly one task against one target:
//! prerequisite checks, artifact selection, exclusion filtering, target
//! lookup, optional library transfer, command construction and process
//! execution, folded into a single immutable [`TaskResult`]. Runs that
//! abort or fail return an [`OrchestrationError`] wrapping that result, so
//! the caller always gets the full outcome record either way.

use regex::Regex;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::artifact::{ArtifactRef, ArtifactSelector, WorkspaceArtifactSelector};
use crate::config::OrchestratorConfig;
use crate::context::{BuildContext, EnvironmentProvider, ProcessEnvironment};
use crate::deployer::{
    self, custom_command_line, operation_command_line, substitute, InvocationParameters, Operation,
};
use crate::error::{Error, Result};
use crate::process::{Invocation, LocalProcessRunner, ProcessRunner};
use crate::runlog::{
    self, FileLogFactory, LogFactory, LogSink, DEPLOYMENT_BANNER, EXECUTION_BANNER,
    UNDEPLOYMENT_BANNER,
};
use crate::stager::{RemoteFileStager, WorkspaceFileStager};
use crate::target::{TargetEnvironment, TargetStore};
use crate::task::{Task, TaskResult};
use crate::toolchain::{LocalToolchainService, Toolchain, ToolchainService};
use crate::transfer::{ship_library, FileTransferClient, LocalFileTransfer};
use crate::vars::{truthy, BuildVars};

/// Typed failure of an orchestration run, wrapping the synthesized result.
#[derive(Debug, thiserror::Error)]
#[error("deployment task '{}' ended with status {}", .result.task.name, .result.status)]
pub struct OrchestrationError {
    /// Outcome record of the run.
    pub result: TaskResult,
}

impl OrchestrationError {
    fn new(result: TaskResult) -> Self {
        Self { result }
    }

    /// Consumes the error, yielding the outcome record.
    pub fn into_result(self) -> TaskResult {
        self.result
    }
}

/// Top-level controller for deployment task runs.
///
/// Collaborators default to the local implementations and can be swapped
/// through the `with_*` builder methods, which keeps every dependency
/// test-injectable.
pub struct TaskOrchestrator {
    config: OrchestratorConfig,
    excluded: Option<Regex>,
    targets: TargetStore,
    environment: Arc<dyn EnvironmentProvider>,
    toolchains: Arc<dyn ToolchainService>,
    selector: Arc<dyn ArtifactSelector>,
    runner: Arc<dyn ProcessRunner>,
    transfer: Arc<dyn FileTransferClient>,
    stager: Arc<dyn RemoteFileStager>,
    logs: Arc<dyn LogFactory>,
}

impl TaskOrchestrator {
    /// Builds an orchestrator over the given configuration.
    ///
    /// Fails when the configured exclusion pattern does not compile.
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        let excluded = match config
            .excluded_artifact_pattern
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        {
            // Full-match semantics, so the pattern is anchored here.
            Some(pattern) => {
                Some(
                    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| Error::InvalidPattern {
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    })?,
                )
            }
            None => None,
        };
        let targets = TargetStore::new(config.environments.clone());
        let toolchains = Arc::new(LocalToolchainService::new(config.toolchains.clone()));
        Ok(Self {
            excluded,
            targets,
            toolchains,
            environment: Arc::new(ProcessEnvironment),
            selector: Arc::new(WorkspaceArtifactSelector),
            runner: Arc::new(LocalProcessRunner),
            transfer: Arc::new(LocalFileTransfer),
            stager: Arc::new(WorkspaceFileStager),
            logs: Arc::new(FileLogFactory),
            config,
        })
    }

    /// Replaces the environment provider.
    pub fn with_environment(mut self, provider: Arc<dyn EnvironmentProvider>) -> Self {
        self.environment = provider;
        self
    }

    /// Replaces the toolchain service.
    pub fn with_toolchains(mut self, service: Arc<dyn ToolchainService>) -> Self {
        self.toolchains = service;
        self
    }

    /// Replaces the artifact selector.
    pub fn with_selector(mut self, selector: Arc<dyn ArtifactSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Replaces the process runner.
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replaces the file transfer client.
    pub fn with_transfer(mut self, transfer: Arc<dyn FileTransferClient>) -> Self {
        self.transfer = transfer;
        self
    }

    /// Replaces the remote file stager.
    pub fn with_stager(mut self, stager: Arc<dyn RemoteFileStager>) -> Self {
        self.stager = stager;
        self
    }

    /// Replaces the log sink factory.
    pub fn with_log_factory(mut self, logs: Arc<dyn LogFactory>) -> Self {
        self.logs = logs;
        self
    }

    /// Performs one deployment task run.
    ///
    /// Always yields a [`TaskResult`]: directly for DISABLED and SUCCEEDED
    /// outcomes, wrapped in an [`OrchestrationError`] for ABORTED and
    /// FAILED ones.
    pub async fn perform(
        &self,
        task: &Task,
        toolchain_name: &str,
        ctx: &BuildContext,
    ) -> std::result::Result<TaskResult, OrchestrationError> {
        let build_vars = match self.environment.build_vars(ctx).await {
            Ok(vars) => vars,
            Err(e) => {
                warn!(error = %e, "Failed to resolve build variables");
                None
            }
        };
        let resolved = task.resolved(build_vars.as_ref());

        // Operator override, checked before any resource is acquired.
        let flag = task.skip_flag();
        let skipped = build_vars
            .as_ref()
            .and_then(|vars| vars.get(&flag))
            .is_some_and(|value| truthy(value));
        if skipped {
            info!(flag = %flag, task = %task.name, "Skip flag is set, task disabled");
            return Ok(TaskResult::disabled(resolved));
        }

        let toolchain = match self.resolve_toolchain(ctx, toolchain_name).await {
            Ok(toolchain) => toolchain,
            Err(e) => {
                error!(toolchain = %toolchain_name, error = %e, "Toolchain unavailable, task aborted");
                return Err(OrchestrationError::new(TaskResult::aborted(resolved, None)));
            }
        };

        let log_path = runlog::log_file_path(ctx, &task.id);
        let log = match self.logs.open(&log_path) {
            Ok(log) => log,
            Err(e) => {
                error!(path = %log_path.display(), error = %e, "Failed to open deployment log, task aborted");
                return Err(OrchestrationError::new(TaskResult::aborted(resolved, None)));
            }
        };

        let artifact = match self
            .selector
            .select(ctx, &task.artifact_pattern, &task.artifact_dir)
            .await
        {
            Ok(artifact) => artifact,
            Err(e) => {
                error!(pattern = %task.artifact_pattern, error = %e, "Failed to select artifact, task aborted");
                self.release(&log);
                return Err(OrchestrationError::new(TaskResult::aborted(resolved, None)));
            }
        };
        let artifact_name = artifact.logical_name();
        let full_name = artifact.file_name();

        if let Some(excluded) = &self.excluded {
            if excluded.is_match(&artifact_name) {
                error!(artifact = %artifact_name, "Artifact is excluded from deployment, task aborted");
                self.release(&log);
                return Err(OrchestrationError::new(TaskResult::aborted(
                    resolved,
                    Some(full_name),
                )));
            }
        }

        let environment = match self.targets.resolve(&resolved.environment) {
            Ok(environment) => environment.clone(),
            Err(e) => {
                error!(error = %e, "Check the configured environment list, task aborted");
                self.release(&log);
                return Err(OrchestrationError::new(TaskResult::aborted(
                    resolved,
                    Some(full_name),
                )));
            }
        };

        let outcome = self
            .dispatch(
                &resolved,
                ctx,
                &toolchain,
                &environment,
                &artifact,
                &artifact_name,
                build_vars.as_ref(),
                &log,
            )
            .await;
        self.release(&log);

        match outcome {
            Ok(()) => {
                info!(task = %resolved.name, artifact = %full_name, "Deployment task succeeded");
                Ok(TaskResult::succeeded(resolved, Some(full_name)))
            }
            Err(e) => {
                error!(task = %resolved.name, error = %e, "Deployment task failed");
                Err(OrchestrationError::new(TaskResult::failed(
                    resolved,
                    Some(full_name),
                )))
            }
        }
    }

    /// Resolves and validates the requested toolchain on the node.
    async fn resolve_toolchain(&self, ctx: &BuildContext, name: &str) -> Result<Toolchain> {
        info!(toolchain = %name, node = %ctx.node_name(), "Loading toolchain");
        let toolchain = self
            .toolchains
            .find_by_name(ctx, name)
            .await?
            .ok_or_else(|| Error::toolchain_not_found(name, ctx.node_name()))?;

        if !self.toolchains.is_valid(ctx, &toolchain).await? {
            return Err(Error::ToolchainInvalid {
                name: toolchain.name.clone(),
                path: toolchain.launcher(),
            });
        }

        let version = self.toolchains.check_version(ctx, &toolchain).await?;
        info!(toolchain = %toolchain.name, version = %version, "Toolchain resolved");
        Ok(toolchain)
    }

    /// Closes the run's log sink; close failures are logged, never fatal.
    fn release(&self, log: &LogSink) {
        if let Err(e) = log.close() {
            warn!(error = %e, "Failed to release deployment log");
        }
    }

    /// Stages classpath entries, then runs the task in its selected mode.
    #[allow(clippy::too_many_arguments)]
    async fn dispatch(
        &self,
        task: &Task,
        ctx: &BuildContext,
        toolchain: &Toolchain,
        environment: &TargetEnvironment,
        artifact: &ArtifactRef,
        artifact_name: &str,
        build_vars: Option<&BuildVars>,
        log: &LogSink,
    ) -> Result<()> {
        if ctx.is_remote() {
            for entry in &self.config.deployer.extra_classpath {
                self.stager.stage(ctx, entry).await?;
            }
        }

        info!(
            environment = %task.environment,
            host = %environment.host,
            port = environment.port,
            "Deploying the artifact on the target"
        );

        let base = InvocationParameters::base(
            task,
            environment,
            toolchain,
            self.config.deployer.class.clone(),
            self.config.deployer.java_opts.clone(),
            self.config.deployer.extra_classpath.clone(),
            artifact_name,
        );
        let env = build_vars.cloned().unwrap_or_default();

        match task.custom_commands() {
            Some(template) => {
                self.run_custom(template, artifact, environment, base, env, log)
                    .await
            }
            None => {
                self.undeploy(&base, &env, log).await?;
                self.deploy(artifact, environment, base, env, log).await
            }
        }
    }

    /// Source path handed to the deployer: remote for libraries (after the
    /// transfer step), the local archived path otherwise.
    async fn source_path(
        &self,
        base: &InvocationParameters,
        artifact: &ArtifactRef,
        environment: &TargetEnvironment,
        log: &LogSink,
    ) -> Result<String> {
        if base.library {
            ship_library(self.transfer.as_ref(), environment, artifact, log).await
        } else {
            Ok(artifact.path.to_string_lossy().to_string())
        }
    }

    /// Runs the deploy operation.
    async fn deploy(
        &self,
        artifact: &ArtifactRef,
        environment: &TargetEnvironment,
        base: InvocationParameters,
        env: BuildVars,
        log: &LogSink,
    ) -> Result<()> {
        let source = self.source_path(&base, artifact, environment, log).await?;
        let params = InvocationParameters {
            operation: Some(Operation::Deploy),
            source_path: Some(source),
            no_exit_wait: false,
            ..base
        };
        let argv = operation_command_line(&params)?;

        info!("Deploying artifact");
        log.banner(DEPLOYMENT_BANNER)?;
        let exit = self
            .runner
            .run(&Invocation::new(argv).with_env(env), log)
            .await?;
        if exit != 0 {
            return Err(Error::CommandFailed { exit_code: exit });
        }
        info!("Artifact deployed successfully");
        Ok(())
    }

    /// Runs the undeploy operation that precedes every standard deploy.
    async fn undeploy(&self, base: &InvocationParameters, env: &BuildVars, log: &LogSink) -> Result<()> {
        let params = InvocationParameters {
            operation: Some(Operation::Undeploy),
            deployment_plan: None,
            ..base.clone()
        };
        let argv = operation_command_line(&params)?;

        info!("Undeploying artifact");
        log.banner(UNDEPLOYMENT_BANNER)?;
        // Started and joined rather than run, as a future cancellation hook.
        let handle = self
            .runner
            .start(&Invocation::new(argv).with_env(env.clone()), log)
            .await?;
        let exit = handle.join().await?;
        if exit != 0 {
            return Err(Error::CommandFailed { exit_code: exit });
        }
        info!("Artifact undeployed successfully");
        Ok(())
    }

    /// Runs a custom command sequence, stopping at the first failure.
    async fn run_custom(
        &self,
        template: &str,
        artifact: &ArtifactRef,
        environment: &TargetEnvironment,
        base: InvocationParameters,
        env: BuildVars,
        log: &LogSink,
    ) -> Result<()> {
        let source = self.source_path(&base, artifact, environment, log).await?;
        let params = InvocationParameters {
            source_path: Some(source),
            ..base
        };

        for fragment in template.split(deployer::COMMAND_SEPARATOR) {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            let command = substitute(fragment, &params);
            let argv = custom_command_line(&params, &command)?;

            info!(command = %command, "Executing task command");
            log.banner(EXECUTION_BANNER)?;
            let exit = self
                .runner
                .run(&Invocation::new(argv).with_env(env.clone()), log)
                .await?;
            if exit != 0 {
                return Err(Error::CommandFailed { exit_code: exit });
            }
        }
        info!("Task command sequence completed");
        Ok(())
    }
}
