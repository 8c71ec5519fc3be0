//! Dealscan CLI library.
//!
//! Configuration, environment resolution, the extraction pipeline, command
//! execution and output formatting for the `dealscan` binary.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompt;

#[cfg(test)]
pub(crate) mod testing;

pub use cli::{Cli, Command};
pub use config::Config;
pub use env::{Environment, Resolved};
pub use error::{CliError, Result};
pub use output::Formatter;
