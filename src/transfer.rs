//! Library artifact transfer.
//!
//! Library artifacts must reach the target's remote library directory before
//! any deploy command references them. The wire protocol lives behind
//! [`FileTransferClient`]; [`ship_library`] is the transfer step itself:
//! it computes the remote path, applies the transfer-host fallback, and
//! returns the remote path subsequent commands must use.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::artifact::ArtifactRef;
use crate::error::{Error, Result};
use crate::runlog::LogSink;
use crate::target::TargetEnvironment;

/// Everything a transfer needs: endpoint, credentials and both paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Transfer host.
    pub host: String,
    /// Transfer user.
    pub user: String,
    /// Transfer password.
    pub password: String,
    /// Local file to ship.
    pub local_path: PathBuf,
    /// Destination path on the remote host.
    pub remote_path: String,
}

/// Ships a file to a remote host.
#[async_trait]
pub trait FileTransferClient: Send + Sync {
    /// Transfers `local_path` to `remote_path` on the configured host.
    async fn transfer(&self, config: &TransferConfig, log: &LogSink) -> Result<()>;
}

/// Client that copies onto a locally reachable path, for controller-side
/// targets and tests.
#[derive(Debug, Default)]
pub struct LocalFileTransfer;

#[async_trait]
impl FileTransferClient for LocalFileTransfer {
    async fn transfer(&self, config: &TransferConfig, _log: &LogSink) -> Result<()> {
        let destination = Path::new(&config.remote_path);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::transfer(&config.host, e.to_string()))?;
        }
        tokio::fs::copy(&config.local_path, destination)
            .await
            .map_err(|e| Error::transfer(&config.host, e.to_string()))?;
        Ok(())
    }
}

/// Ships a library artifact to the target's remote directory and returns
/// the remote path deploy commands must reference.
pub async fn ship_library(
    client: &dyn FileTransferClient,
    environment: &TargetEnvironment,
    artifact: &ArtifactRef,
    log: &LogSink,
) -> Result<String> {
    let remote_dir = environment.remote_dir.as_deref().ok_or_else(|| {
        Error::transfer(
            environment.transfer_host(),
            format!("no remote directory configured for '{}'", environment.name),
        )
    })?;
    let remote_path = format!("{}/{}", remote_dir, artifact.file_name());
    let host = environment.transfer_host().to_string();
    let user = environment.transfer_user.clone().unwrap_or_default();

    info!(
        local = %artifact.file_name(),
        remote = %remote_path,
        host = %host,
        user = %user,
        "Transferring library"
    );
    client
        .transfer(
            &TransferConfig {
                host,
                user,
                password: environment.transfer_password.clone().unwrap_or_default(),
                local_path: artifact.path.clone(),
                remote_path: remote_path.clone(),
            },
            log,
        )
        .await?;
    info!("Library transferred successfully");
    Ok(remote_path)
}
