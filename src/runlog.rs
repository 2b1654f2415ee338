//! Per-run deployment log sink.
//!
//! Each orchestration run writes one log file: a literal banner line per
//! phase followed by the raw output of the spawned process. The sink is the
//! one resource needing disciplined release, so [`LogSink::close`] seals it;
//! once closed, no further writes are possible, on any exit path.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::context::BuildContext;
use crate::error::{Error, Result};

/// Banner preceding deploy command output.
pub const DEPLOYMENT_BANNER: &str = "------ ARTIFACT DEPLOYMENT ------";
/// Banner preceding undeploy command output.
pub const UNDEPLOYMENT_BANNER: &str = "------ ARTIFACT UNDEPLOYMENT ------";
/// Banner preceding each custom command's output.
pub const EXECUTION_BANNER: &str = "------ TASK EXECUTION ------";

/// Path of the log file for one task run.
pub fn log_file_path(ctx: &BuildContext, task_id: &str) -> PathBuf {
    ctx.log_dir
        .join(format!("{}-task-{}.log", ctx.build_tag, task_id))
}

/// Shareable handle on the run's log sink.
///
/// Handles clone cheaply so a spawned process can stream into the sink while
/// the orchestrator keeps its own handle for banners and the final close.
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<Mutex<Option<Box<dyn Write + Send>>>>,
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink").finish_non_exhaustive()
    }
}

impl LogSink {
    /// Opens the sink over a freshly created log file.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::LogOpen {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        let file = std::fs::File::create(path).map_err(|e| Error::LogOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::from_writer(Box::new(file)))
    }

    /// Wraps an arbitrary writer, used by tests and embedders.
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(writer))),
        }
    }

    /// Writes one banner line.
    pub fn banner(&self, banner: &str) -> Result<()> {
        self.write_all(format!("{banner}\n").as_bytes())
    }

    /// Writes raw bytes, typically a spawned process's output.
    pub fn write_all(&self, bytes: &[u8]) -> Result<()> {
        let mut guard = self.inner.lock().expect("log sink lock");
        match guard.as_mut() {
            Some(writer) => {
                writer.write_all(bytes)?;
                Ok(())
            }
            None => Err(Error::LogClosed),
        }
    }

    /// Flushes and releases the underlying writer.
    ///
    /// The first close wins; closing an already-closed sink is a no-op, so
    /// every exit path can call it unconditionally.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.inner.lock().expect("log sink lock");
        if let Some(mut writer) = guard.take() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Whether the sink has been released.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().expect("log sink lock").is_none()
    }
}

/// Opens the per-run log sink, injectable for tests.
pub trait LogFactory: Send + Sync {
    /// Opens the sink at the given path.
    fn open(&self, path: &Path) -> Result<LogSink>;
}

/// Factory creating real log files.
#[derive(Debug, Default)]
pub struct FileLogFactory;

impl LogFactory for FileLogFactory {
    fn open(&self, path: &Path) -> Result<LogSink> {
        LogSink::create(path)
    }
}
