//! Migration file naming rules.
//!
//! Every file in a migrations directory must be named
//! `<base>.up.sql` or `<base>.down.sql`. Freshly created migrations use
//! `<project>-<version>-<release>-<sequence>` as their base.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Suffix of an "apply" script
pub const UP_SUFFIX: &str = ".up.sql";

/// Suffix of a "revert" script
pub const DOWN_SUFFIX: &str = ".down.sql";

/// Which half of a migration pair a file is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// File name suffix, including the `.sql` extension
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Up => UP_SUFFIX,
            Direction::Down => DOWN_SUFFIX,
        }
    }

    /// The other half of the pair
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Build `<base>.<direction>.sql`
    pub fn file_name(self, base: &str) -> String {
        format!("{}{}", base, self.suffix())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a file name into its base name and direction.
///
/// Returns `None` for names without a recognized suffix.
pub fn split_migration_name(name: &str) -> Option<(&str, Direction)> {
    if let Some(base) = name.strip_suffix(UP_SUFFIX) {
        Some((base, Direction::Up))
    } else {
        name.strip_suffix(DOWN_SUFFIX)
            .map(|base| (base, Direction::Down))
    }
}

/// Result of validating the file names of one directory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameCheck {
    /// Human-readable diagnostics, one per problem
    pub errors: Vec<String>,
    /// Number of misnamed files
    pub violations: usize,
}

/// Validate that every file in `dir` carries a migration suffix.
///
/// A missing directory is treated as empty. Subdirectories are ignored; they
/// hold include files. A directory that exists but cannot be read yields one
/// error and no violations.
pub fn validate_names(dir: &Path) -> NameCheck {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return NameCheck::default(),
        Err(e) => {
            return NameCheck {
                errors: vec![format!(
                    "ERROR: failed to read dir {}: {}",
                    dir.display(),
                    e
                )],
                violations: 0,
            }
        }
    };

    let mut misnamed: Vec<String> = Vec::new();
    for entry in entries.flatten() {
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if split_migration_name(&name).is_none() {
            misnamed.push(name);
        }
    }
    misnamed.sort();

    NameCheck {
        violations: misnamed.len(),
        errors: misnamed
            .into_iter()
            .map(|name| {
                format!(
                    "ERROR: {} wrong file name suffix expect {} or {}",
                    name, UP_SUFFIX, DOWN_SUFFIX
                )
            })
            .collect(),
    }
}

/// Next free sequence number for migrations named `<prefix>-<N>.{up,down}.sql`.
///
/// Returns 1 when `dir` does not exist or holds no matching file.
pub fn next_sequence(dir: &Path, prefix: &str) -> CoreResult<u32> {
    let pattern = Regex::new(&format!(
        r"^{}-(\d+)\.(up|down)\.sql$",
        regex::escape(prefix)
    ))
    .map_err(|e| CoreError::ConfigInvalid {
        message: format!("cannot build sequence pattern for '{}': {}", prefix, e),
    })?;

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(1),
        Err(e) => return Err(CoreError::io(dir, e)),
    };

    let mut highest = 0u32;
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io(dir, e))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(caps) = pattern.captures(&name) else {
            continue;
        };
        if let Ok(n) = caps[1].parse::<u32>() {
            highest = highest.max(n);
        }
    }
    highest
        .checked_add(1)
        .ok_or_else(|| CoreError::SequenceExhausted {
            prefix: prefix.to_string(),
            last: highest,
        })
}

#[cfg(test)]
#[path = "naming_test.rs"]
mod tests;
