//! Artifact selection from the build workspace.
//!
//! The orchestrator delegates artifact selection to an [`ArtifactSelector`]
//! collaborator. [`WorkspaceArtifactSelector`] is the built-in
//! implementation: it walks the task's base directory and picks the first
//! file whose name matches the task's selection pattern.

use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::context::BuildContext;
use crate::error::{Error, Result};

/// A selected build artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    /// Full path of the artifact file.
    pub path: PathBuf,
}

impl ArtifactRef {
    /// Create a reference to an artifact file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Full file name, extension included.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Logical artifact name: the file name with its final extension
    /// stripped.
    pub fn logical_name(&self) -> String {
        let name = self.file_name();
        match name.rfind('.') {
            Some(dot) if dot > 0 => name[..dot].to_string(),
            _ => name,
        }
    }
}

/// Selects the built artifact matching a task's pattern.
#[async_trait]
pub trait ArtifactSelector: Send + Sync {
    /// Picks the artifact matching `pattern` under `base_dir`.
    ///
    /// `base_dir` is resolved against the build workspace when relative.
    /// Fails when nothing matches or the directory cannot be read.
    async fn select(
        &self,
        ctx: &BuildContext,
        pattern: &str,
        base_dir: &Path,
    ) -> Result<ArtifactRef>;
}

/// Selector walking the workspace on the controller.
#[derive(Debug, Default)]
pub struct WorkspaceArtifactSelector;

#[async_trait]
impl ArtifactSelector for WorkspaceArtifactSelector {
    async fn select(
        &self,
        ctx: &BuildContext,
        pattern: &str,
        base_dir: &Path,
    ) -> Result<ArtifactRef> {
        let root = if base_dir.is_absolute() {
            base_dir.to_path_buf()
        } else {
            ctx.workspace.join(base_dir)
        };
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        // Sorted walk keeps selection deterministic across filesystems.
        let mut matches: Vec<PathBuf> = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| regex.is_match(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.into_path())
            .collect();
        matches.sort();

        match matches.into_iter().next() {
            Some(path) => {
                debug!(artifact = %path.display(), "Selected artifact");
                Ok(ArtifactRef::new(path))
            }
            None => Err(Error::artifact_selection(
                pattern,
                root,
                "no matching file".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn ctx(workspace: &Path) -> BuildContext {
        BuildContext::local("build-1", workspace)
    }

    #[test]
    fn test_logical_name_strips_final_extension() {
        assert_eq!(ArtifactRef::new("/a/frontend.war").logical_name(), "frontend");
        assert_eq!(
            ArtifactRef::new("/a/frontend-1.2.war").logical_name(),
            "frontend-1.2"
        );
        assert_eq!(ArtifactRef::new("/a/noext").logical_name(), "noext");
    }

    #[test]
    fn test_file_name_keeps_extension() {
        assert_eq!(ArtifactRef::new("/a/frontend.war").file_name(), "frontend.war");
    }

    #[tokio::test]
    async fn test_select_matching_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/frontend.war"), b"artifact").unwrap();
        fs::write(dir.path().join("target/readme.txt"), b"not it").unwrap();

        let selector = WorkspaceArtifactSelector;
        let artifact = selector
            .select(&ctx(dir.path()), r".*\.war", Path::new("target"))
            .await
            .unwrap();
        assert_eq!(artifact.file_name(), "frontend.war");
    }

    #[tokio::test]
    async fn test_select_is_deterministic_with_multiple_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.war"), b"b").unwrap();
        fs::write(dir.path().join("a.war"), b"a").unwrap();

        let selector = WorkspaceArtifactSelector;
        let artifact = selector
            .select(&ctx(dir.path()), r".*\.war", Path::new(""))
            .await
            .unwrap();
        assert_eq!(artifact.file_name(), "a.war");
    }

    #[tokio::test]
    async fn test_select_without_match_fails() {
        let dir = tempfile::tempdir().unwrap();
        let selector = WorkspaceArtifactSelector;
        let err = selector
            .select(&ctx(dir.path()), r".*\.ear", Path::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ArtifactSelection { .. }));
    }

    #[tokio::test]
    async fn test_invalid_pattern_fails() {
        let dir = tempfile::tempdir().unwrap();
        let selector = WorkspaceArtifactSelector;
        let err = selector
            .select(&ctx(dir.path()), r"[", Path::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
