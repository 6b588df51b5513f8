//! Shared `.env` file parsing and formatting.
//!
//! Used by `import` to read files and by `export` to write them.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::errors::{EnvSealError, Result};

/// Parse a single `.env` line into a (key, value) pair.
///
/// Returns `None` for blank lines, comments, and lines without `=`.
/// Handles: `export` prefix, values with `=`, single quotes (literal),
/// double quotes (with `\n`, `\"` and `\\` escapes), and trailing
/// ` # comments` after unquoted values.
pub fn parse_env_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();

    // Skip empty lines and comments.
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    // Strip optional `export ` prefix.
    let trimmed = trimmed
        .strip_prefix("export ")
        .map(str::trim_start)
        .unwrap_or(trimmed);

    // Split on the first '=' to get KEY and VALUE.
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key.to_string(), parse_value(value.trim())))
}

fn parse_value(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix('\'') {
        if let Some(end) = rest.find('\'') {
            return rest[..end].to_string();
        }
    } else if let Some(rest) = raw.strip_prefix('"') {
        if let Some(value) = unescape_double_quoted(rest) {
            return value;
        }
    }

    // Unquoted (or unterminated quote): cut a trailing ` #` comment.
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Read a double-quoted value up to its closing quote.  Returns `None`
/// when the quote is never closed.
fn unescape_double_quoted(rest: &str) -> Option<String> {
    let mut out = String::with_capacity(rest.len());
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(out),
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    None
}

/// Parse `.env` content into (key, value) pairs in file order.
pub fn parse_env_str(content: &str) -> Vec<(String, String)> {
    content.lines().filter_map(parse_env_line).collect()
}

/// Parse a `.env` file into (key, value) pairs in file order.
pub fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>> {
    let content = fs::read_to_string(path)
        .map_err(|e| EnvSealError::CommandFailed(format!("failed to read file: {e}")))?;

    Ok(parse_env_str(&content))
}

/// Format secrets as `.env` file content, one `KEY=value` per line.
pub fn format_env(secrets: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in secrets {
        if needs_quotes(value) {
            let escaped = value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n");
            let _ = writeln!(out, "{key}=\"{escaped}\"");
        } else {
            let _ = writeln!(out, "{key}={value}");
        }
    }
    out
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.trim() != value
        || value
            .chars()
            .any(|c| matches!(c, ' ' | '#' | '"' | '\'' | '\n' | '\r' | '$' | '\\'))
}
