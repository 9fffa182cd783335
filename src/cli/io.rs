//! JSON I/O handling for CLI
//!
//! - Input: one search request object from a file or stdin
//! - Output: one pretty-printed JSON document on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};

use serde::Serialize;

use super::errors::{CliError, CliResult};
use crate::planner::SearchRequest;

/// Read a search request from `source` ("-" reads stdin)
pub fn read_request(source: &str) -> CliResult<SearchRequest> {
    let content = if source == "-" {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(source)
            .map_err(|e| CliError::Io(format!("Failed to read {}: {}", source, e)))?
    };

    parse_request(&content)
}

/// Parse a search request from JSON text
pub fn parse_request(content: &str) -> CliResult<SearchRequest> {
    if content.trim().is_empty() {
        return Err(CliError::InvalidRequest("Empty input".into()));
    }
    serde_json::from_str(content).map_err(|e| CliError::InvalidRequest(e.to_string()))
}

/// Write a value as pretty JSON to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)
        .map_err(|e| CliError::Io(format!("JSON error: {}", e)))?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write plain text to stdout
pub fn write_text(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", text)?;
    stdout.flush()?;

    Ok(())
}
