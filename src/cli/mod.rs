//! CLI module for aerorel
//!
//! Provides command-line interface for:
//! - explain: Plan one search request and print the pipeline
//! - check: Load schemas and report dangling relations

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, explain, plan_explain, run, run_command, CheckReport, DanglingEntry};
pub use errors::{CliError, CliResult};
pub use io::{parse_request, read_request, write_json};
