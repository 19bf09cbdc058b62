//! Loading team renames from a CSV file.
//!
//! The file needs a header row with `old_team_name` and `new_team_name`
//! columns, in any order. Other columns are ignored.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

const OLD_COLUMN: &str = "old_team_name";
const NEW_COLUMN: &str = "new_team_name";

#[derive(Debug, Deserialize)]
struct RenameRow {
    old_team_name: String,
    new_team_name: String,
}

/// Errors in the content of a rename file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The header row lacks a required column.
    #[error("header has no '{0}' column")]
    MissingColumn(&'static str),

    /// The content is not valid CSV, or a row lacks a value.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Errors that can occur when loading a rename file.
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The rename file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The file content is invalid.
    #[error("invalid team rename file {}: {source}", .path.display())]
    Parse {
        /// The rename file.
        path: PathBuf,
        /// What is wrong with it.
        source: ParseError,
    },
}

/// Loads a mapping from old to new team names.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid rename file.
pub fn load_team_rename(path: &Path) -> Result<BTreeMap<String, String>, RenameError> {
    let content = std::fs::read_to_string(path).map_err(|source| RenameError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mapping = parse_team_rename(&content).map_err(|source| RenameError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Loaded {} team renames from {}", mapping.len(), path.display());
    Ok(mapping)
}

/// Parses the content of a rename file.
///
/// Blank lines are skipped. If an old name is listed more than once, the last
/// entry wins.
///
/// # Errors
///
/// Returns an error if the header lacks a required column or any row is
/// invalid.
pub fn parse_team_rename(content: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    for column in [OLD_COLUMN, NEW_COLUMN] {
        if !headers.iter().any(|field| field == column) {
            return Err(ParseError::MissingColumn(column));
        }
    }

    let mut mapping = BTreeMap::new();
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        let row: RenameRow = record.deserialize(Some(&headers))?;
        if mapping
            .insert(row.old_team_name.clone(), row.new_team_name)
            .is_some()
        {
            let line = record.position().map_or(0, csv::Position::line);
            tracing::debug!(
                "Team '{}' renamed more than once, using line {line}",
                row.old_team_name
            );
        }
    }

    Ok(mapping)
}
