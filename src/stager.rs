//! Classpath staging into the node workspace.
//!
//! When a build executes on a worker node, the deployer's extra classpath
//! entries must exist in that node's workspace. Staging is idempotent: an
//! entry whose file name is already present is skipped.

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::context::BuildContext;
use crate::error::{Error, Result};

/// Copies classpath entries into a node workspace, skip-if-exists.
#[async_trait]
pub trait RemoteFileStager: Send + Sync {
    /// Ensures `source` is present in the workspace of `ctx`.
    async fn stage(&self, ctx: &BuildContext, source: &Path) -> Result<()>;
}

/// Stager copying into the workspace directory on the local filesystem.
#[derive(Debug, Default)]
pub struct WorkspaceFileStager;

#[async_trait]
impl RemoteFileStager for WorkspaceFileStager {
    async fn stage(&self, ctx: &BuildContext, source: &Path) -> Result<()> {
        let file_name = source.file_name().ok_or_else(|| Error::Staging {
            path: source.to_path_buf(),
            message: "entry has no file name".to_string(),
        })?;
        let destination = ctx.workspace.join(file_name);

        if destination.exists() {
            info!(
                file = %file_name.to_string_lossy(),
                node = %ctx.node_name(),
                "File already present in workspace"
            );
            return Ok(());
        }

        info!(
            file = %file_name.to_string_lossy(),
            node = %ctx.node_name(),
            "Copying file into workspace"
        );
        tokio::fs::copy(source, &destination)
            .await
            .map_err(|e| Error::Staging {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_copies_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("ws");
        std::fs::create_dir_all(&workspace).unwrap();
        let source = dir.path().join("deployer.jar");
        std::fs::write(&source, b"jar bytes").unwrap();

        let ctx = BuildContext::local("build-1", &workspace);
        WorkspaceFileStager.stage(&ctx, &source).await.unwrap();
        assert_eq!(
            std::fs::read(workspace.join("deployer.jar")).unwrap(),
            b"jar bytes"
        );
    }

    #[tokio::test]
    async fn test_stage_skips_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("ws");
        std::fs::create_dir_all(&workspace).unwrap();
        std::fs::write(workspace.join("deployer.jar"), b"already here").unwrap();
        let source = dir.path().join("deployer.jar");
        std::fs::write(&source, b"newer bytes").unwrap();

        let ctx = BuildContext::local("build-1", &workspace);
        WorkspaceFileStager.stage(&ctx, &source).await.unwrap();
        // Existing file is left untouched.
        assert_eq!(
            std::fs::read(workspace.join("deployer.jar")).unwrap(),
            b"already here"
        );
    }

    #[tokio::test]
    async fn test_stage_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = BuildContext::local("build-1", dir.path());
        let err = WorkspaceFileStager
            .stage(&ctx, Path::new("/nonexistent/deployer.jar"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Staging { .. }));
    }
}
