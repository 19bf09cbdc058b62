//! Loading the upstream JSON exports.
//!
//! Both files may hold either a bare JSON array or an API page of the form
//! `{"items": [...]}`.

use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use serde::{Deserialize, de::DeserializeOwned};

use crate::domain::{Question, User};

/// Errors that can occur when loading an input file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The file being loaded.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The file is not valid JSON of the expected shape.
    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        /// The file being loaded.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Items(Vec<T>),
    Page { items: Vec<T> },
}

impl<T> From<Listing<T>> for Vec<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::Items(items) | Listing::Page { items } => items,
        }
    }
}

fn read_listing<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let listing: Listing<T> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(listing.into())
}

/// Loads the user list.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_users(path: &Path) -> Result<Vec<User>, LoadError> {
    let users: Vec<User> = read_listing(path)?;
    tracing::info!("Loaded {} users from {}", users.len(), path.display());
    Ok(users)
}

/// Loads the question list, including nested answers and comments.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_questions(path: &Path) -> Result<Vec<Question>, LoadError> {
    let questions: Vec<Question> = read_listing(path)?;
    tracing::info!(
        "Loaded {} questions from {}",
        questions.len(),
        path.display()
    );
    Ok(questions)
}
