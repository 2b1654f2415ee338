//! Error types for Rollout.
//!
//! This module defines the error types used throughout Rollout, providing
//! rich error information for operator diagnosis and CLI exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Rollout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Rollout.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Toolchain Errors
    // ========================================================================
    /// Requested toolchain is not registered on the node.
    #[error("Toolchain '{name}' not found on node '{node}'")]
    ToolchainNotFound {
        /// Requested toolchain name
        name: String,
        /// Node the lookup ran on
        node: String,
    },

    /// Toolchain is registered but its launcher is missing or not a file.
    #[error("Toolchain '{name}' has no usable launcher at '{path}'")]
    ToolchainInvalid {
        /// Toolchain name
        name: String,
        /// Expected launcher path
        path: PathBuf,
    },

    /// Toolchain version probe failed.
    #[error("Version check failed for toolchain '{name}': {message}")]
    ToolchainVersion {
        /// Toolchain name
        name: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Log Sink Errors
    // ========================================================================
    /// The per-run log file could not be opened.
    #[error("Failed to open deployment log '{path}': {message}")]
    LogOpen {
        /// Log file path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// A write was attempted after the log sink was released.
    #[error("Deployment log sink is closed")]
    LogClosed,

    // ========================================================================
    // Artifact Errors
    // ========================================================================
    /// No artifact matched the task's selection pattern.
    #[error("No artifact matching '{pattern}' under '{base_dir}': {message}")]
    ArtifactSelection {
        /// Selection pattern
        pattern: String,
        /// Base directory searched
        base_dir: PathBuf,
        /// Error message
        message: String,
    },

    /// Artifact name is excluded by the configured exclusion pattern.
    #[error("Artifact '{name}' is excluded from deployment (pattern '{pattern}')")]
    ArtifactExcluded {
        /// Logical artifact name
        name: String,
        /// Exclusion pattern it matched
        pattern: String,
    },

    // ========================================================================
    // Target Environment Errors
    // ========================================================================
    /// Named target environment is not in the configured list.
    #[error("Target environment '{0}' not found in the configured list")]
    EnvironmentNotFound(String),

    // ========================================================================
    // Transfer / Staging Errors
    // ========================================================================
    /// Library transfer to the remote host failed.
    #[error("Transfer to '{host}' failed: {message}")]
    Transfer {
        /// Transfer host
        host: String,
        /// Error message
        message: String,
    },

    /// Copying a classpath entry into the node workspace failed.
    #[error("Failed to stage '{path}' into the workspace: {message}")]
    Staging {
        /// Source path being staged
        path: PathBuf,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Process Errors
    // ========================================================================
    /// External process could not be spawned.
    #[error("Failed to spawn '{program}': {message}")]
    Spawn {
        /// Program name
        program: String,
        /// Error message
        message: String,
    },

    /// External process exited with a non-zero code.
    #[error("task completed abnormally (exit code = {exit_code})")]
    CommandFailed {
        /// Process exit code
        exit_code: i32,
    },

    /// A command line could not be assembled.
    #[error("Invalid command line: {0}")]
    InvalidCommandLine(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configured regular expression does not compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new toolchain-not-found error.
    pub fn toolchain_not_found(name: impl Into<String>, node: impl Into<String>) -> Self {
        Self::ToolchainNotFound {
            name: name.into(),
            node: node.into(),
        }
    }

    /// Creates a new version-check error.
    pub fn toolchain_version(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolchainVersion {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a new artifact selection error.
    pub fn artifact_selection(
        pattern: impl Into<String>,
        base_dir: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::ArtifactSelection {
            pattern: pattern.into(),
            base_dir: base_dir.into(),
            message: message.into(),
        }
    }

    /// Creates a new transfer error.
    pub fn transfer(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transfer {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Creates a new spawn error.
    pub fn spawn(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Spawn {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandFailed { .. } | Error::Spawn { .. } => 2,
            Error::ToolchainNotFound { .. }
            | Error::ToolchainInvalid { .. }
            | Error::ToolchainVersion { .. } => 3,
            Error::EnvironmentNotFound(_) | Error::Config(_) | Error::InvalidPattern { .. } => 4,
            Error::ArtifactSelection { .. } | Error::ArtifactExcluded { .. } => 5,
            _ => 1,
        }
    }
}
