//! External process execution.
//!
//! The orchestrator never spawns processes directly; it hands an
//! [`Invocation`] to a [`ProcessRunner`]. The runner streams the process's
//! output into the run's [`LogSink`] and reports the exit code. Two shapes
//! are offered: run-to-completion and start/join, the latter kept separate
//! as a future cancellation hook.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::runlog::LogSink;
use crate::vars::BuildVars;

/// One external command to execute: argument vector plus environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program and arguments; the first element is the program.
    pub argv: Vec<String>,
    /// Environment variables passed to the process.
    pub env: BuildVars,
}

impl Invocation {
    /// Create an invocation with an empty environment.
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            env: BuildVars::new(),
        }
    }

    /// Attach environment variables.
    pub fn with_env(mut self, env: BuildVars) -> Self {
        self.env = env;
        self
    }

    /// The program being invoked.
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }
}

/// Handle on a started process; joining waits for completion.
pub struct ProcessHandle {
    join: tokio::task::JoinHandle<Result<i32>>,
}

impl ProcessHandle {
    /// Wraps an already-spawned completion task, for custom runners.
    pub fn from_task(join: tokio::task::JoinHandle<Result<i32>>) -> Self {
        Self { join }
    }

    /// Waits for the process and returns its exit code.
    pub async fn join(self) -> Result<i32> {
        self.join
            .await
            .map_err(|e| Error::spawn("<joined process>", e.to_string()))?
    }
}

/// Spawns external commands with output capture.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs a command to completion, streaming output into `log`.
    async fn run(&self, invocation: &Invocation, log: &LogSink) -> Result<i32>;

    /// Starts a command, returning a handle to join on.
    async fn start(&self, invocation: &Invocation, log: &LogSink) -> Result<ProcessHandle>;
}

/// Runner executing commands on the local node via `tokio::process`.
#[derive(Debug, Default)]
pub struct LocalProcessRunner;

impl LocalProcessRunner {
    fn spawn(
        &self,
        invocation: &Invocation,
    ) -> Result<(tokio::process::Child, String)> {
        let program = invocation.program().to_string();
        if program.is_empty() {
            return Err(Error::InvalidCommandLine("empty argument vector".to_string()));
        }
        debug!(program = %program, args = ?&invocation.argv[1..], "Spawning process");

        let mut cmd = Command::new(&program);
        cmd.args(&invocation.argv[1..])
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .map_err(|e| Error::spawn(&program, e.to_string()))?;
        Ok((child, program))
    }
}

/// Streams one output pipe into the sink until it closes.
async fn pump_stream<R>(mut stream: R, program: &str, log: &LogSink) -> Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = [0u8; 8192];
    loop {
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| Error::spawn(program, e.to_string()))?;
        if n == 0 {
            return Ok(());
        }
        log.write_all(&buf[..n])?;
    }
}

/// Streams the child's stdout and stderr into the sink, then waits.
///
/// Both pipes drain concurrently so a chatty process cannot fill one while
/// the other is being read.
async fn pump_and_wait(
    mut child: tokio::process::Child,
    program: String,
    log: LogSink,
) -> Result<i32> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let drain_stdout = async {
        match stdout {
            Some(stream) => pump_stream(stream, &program, &log).await,
            None => Ok(()),
        }
    };
    let drain_stderr = async {
        match stderr {
            Some(stream) => pump_stream(stream, &program, &log).await,
            None => Ok(()),
        }
    };
    tokio::try_join!(drain_stdout, drain_stderr)?;

    let status = child
        .wait()
        .await
        .map_err(|e| Error::spawn(&program, e.to_string()))?;
    let code = status.code().unwrap_or(-1);
    trace!(program = %program, exit_code = code, "Process completed");
    Ok(code)
}

#[async_trait]
impl ProcessRunner for LocalProcessRunner {
    async fn run(&self, invocation: &Invocation, log: &LogSink) -> Result<i32> {
        let (child, program) = self.spawn(invocation)?;
        pump_and_wait(child, program, log.clone()).await
    }

    async fn start(&self, invocation: &Invocation, log: &LogSink) -> Result<ProcessHandle> {
        let (child, program) = self.spawn(invocation)?;
        let sink = log.clone();
        let join = tokio::spawn(pump_and_wait(child, program, sink));
        Ok(ProcessHandle { join })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn buffered_sink() -> (LogSink, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = LogSink::from_writer(Box::new(SharedBuffer(buffer.clone())));
        (sink, buffer)
    }

    fn sh(script: &str) -> Invocation {
        Invocation::new(vec![
            "sh".to_string(),
            "-c".to_string(),
            script.to_string(),
        ])
    }

    #[tokio::test]
    async fn test_run_captures_output() {
        let (sink, buffer) = buffered_sink();
        let code = LocalProcessRunner
            .run(&sh("echo captured"), &sink)
            .await
            .unwrap();
        assert_eq!(code, 0);
        let content = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(content.contains("captured"));
    }

    #[tokio::test]
    async fn test_run_reports_exit_code() {
        let (sink, _) = buffered_sink();
        let code = LocalProcessRunner.run(&sh("exit 7"), &sink).await.unwrap();
        assert_eq!(code, 7);
    }

    #[tokio::test]
    async fn test_run_passes_environment() {
        let (sink, buffer) = buffered_sink();
        let invocation = sh("echo value=$ROLLOUT_TEST_VAR").with_env(
            [("ROLLOUT_TEST_VAR".to_string(), "42".to_string())]
                .into_iter()
                .collect(),
        );
        LocalProcessRunner.run(&invocation, &sink).await.unwrap();
        let content = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(content.contains("value=42"));
    }

    #[tokio::test]
    async fn test_start_then_join() {
        let (sink, buffer) = buffered_sink();
        let handle = LocalProcessRunner
            .start(&sh("echo started; exit 3"), &sink)
            .await
            .unwrap();
        let code = handle.join().await.unwrap();
        assert_eq!(code, 3);
        let content = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(content.contains("started"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_error() {
        let (sink, _) = buffered_sink();
        let invocation = Invocation::new(vec!["/nonexistent/deployer".to_string()]);
        let err = LocalProcessRunner.run(&invocation, &sink).await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_empty_argv_is_rejected() {
        let (sink, _) = buffered_sink();
        let err = LocalProcessRunner
            .run(&Invocation::new(Vec::new()), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCommandLine(_)));
    }

    #[tokio::test]
    async fn test_stderr_is_captured_too() {
        let (sink, buffer) = buffered_sink();
        LocalProcessRunner
            .run(&sh("echo oops >&2"), &sink)
            .await
            .unwrap();
        let content = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(content.contains("oops"));
    }
}
