//! Seed identifier collection
//!
//! Seeds come from the command line, a newline-delimited file, or both.

use crate::ConfigError;
use std::path::Path;

/// Reads seed identifiers from a file
///
/// Lines are trimmed; blank lines and lines starting with `#` are ignored.
pub fn read_seed_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_seed_lines(&content))
}

fn parse_seed_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Collects seeds from an inline list and an optional seed file
///
/// Inline seeds come first, followed by the file's seeds in file order.
///
/// # Returns
///
/// * `Ok(Vec<String>)` - At least one seed
/// * `Err(ConfigError::NoSeeds)` - Neither source produced a seed
pub fn collect_seeds(inline: &[String], file: Option<&Path>) -> Result<Vec<String>, ConfigError> {
    let mut seeds: Vec<String> = inline.to_vec();

    if let Some(path) = file {
        seeds.extend(read_seed_file(path)?);
    }

    if seeds.is_empty() {
        return Err(ConfigError::NoSeeds);
    }

    Ok(seeds)
}
