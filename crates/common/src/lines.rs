//! Line-oriented text sources
//!
//! API keys and prompts are both loaded from plain text files, one entry per
//! line. Lines are trimmed; blank lines are skipped. A source that yields no
//! entries is a configuration error, not an empty-but-valid input — every
//! consumer of these files needs at least one entry to do anything.

use std::path::Path;

use crate::error::{Error, Result};

/// Load the non-blank, trimmed lines of a text file, in file order.
///
/// Fails if the file cannot be read or contains no entries.
pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let lines: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();

    if lines.is_empty() {
        return Err(Error::Config(format!(
            "{} contains no entries",
            path.display()
        )));
    }

    Ok(lines)
}
