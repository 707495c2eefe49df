//! Attest CLI library.
//!
//! Configuration loading, engine composition, command execution and output
//! formatting for the `attest` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use engine::Engine;
pub use error::{CliError, Result};
pub use output::Formatter;
