//! Rollout - deployment task orchestration CLI.
//!
//! Loads the orchestrator configuration and one persisted task file, runs
//! the task against its target environment and maps the outcome to an exit
//! code.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rollout::config::{load_task, OrchestratorConfig};
use rollout::context::BuildContext;
use rollout::orchestrator::TaskOrchestrator;
use rollout::task::{DeploymentStatus, TaskResult};
use rollout::toolchain::SYSTEM_TOOLCHAIN;

/// Deployment task orchestrator for application-server targets.
#[derive(Debug, Parser)]
#[command(name = "rollout", version, about, long_about = None)]
struct Cli {
    /// Configuration file (YAML or TOML).
    #[arg(short, long, default_value = "rollout.yml")]
    config: PathBuf,

    /// Task file to perform.
    #[arg(short, long)]
    task: PathBuf,

    /// Toolchain name to run the deployer with.
    #[arg(long, default_value = SYSTEM_TOOLCHAIN)]
    toolchain: String,

    /// Workspace directory; defaults to the current directory.
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Build tag used in log file names.
    #[arg(long)]
    build_tag: Option<String>,

    /// Print the result record as JSON.
    #[arg(long)]
    json: bool,

    /// Increase output verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = OrchestratorConfig::load(&cli.config)
        .with_context(|| format!("Cannot load configuration '{}'", cli.config.display()))?;
    let task = load_task(&cli.task)?;

    let workspace = match cli.workspace {
        Some(workspace) => workspace,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    let build_tag = cli
        .build_tag
        .unwrap_or_else(|| format!("rollout-{}", chrono::Utc::now().format("%Y%m%d-%H%M%S")));

    let mut ctx = BuildContext::local(build_tag, workspace);
    if let Some(log_dir) = &config.log_dir {
        ctx.log_dir = log_dir.clone();
    }

    let orchestrator = TaskOrchestrator::new(config)?;
    let (result, exit_code) = match orchestrator.perform(&task, &cli.toolchain, &ctx).await {
        Ok(result) => (result, 0),
        Err(failure) => {
            let result = failure.into_result();
            let code = match result.status {
                DeploymentStatus::Aborted => 3,
                _ => 2,
            };
            (result, code)
        }
    };

    report(&result, cli.json)?;
    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level.
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}

/// Prints the outcome record to stdout.
fn report(result: &TaskResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!(
            "task '{}': {} (prerequisites {}, artifact {})",
            result.task.name,
            result.status,
            result.prerequisite,
            result.artifact.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
