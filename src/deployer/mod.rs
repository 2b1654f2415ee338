//! Deployer tool invocation layer.
//!
//! Everything needed to talk to the external deployer binary: the immutable
//! parameter bundle ([`params::InvocationParameters`]), the pure command
//! builder ([`command`]) and the token resolver for custom command templates
//! ([`tokens`]). Shared constants live here so the builder and the resolver
//! cannot drift apart.

pub mod command;
pub mod params;
pub mod tokens;

pub use command::{custom_command_line, operation_command_line};
pub use params::{InvocationParameters, Operation};
pub use tokens::substitute;

/// Separator between fragments of a custom command-line template.
pub const COMMAND_SEPARATOR: char = ';';
