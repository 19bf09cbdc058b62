use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::domain::InteractionMatrix;

/// Errors that can occur when writing an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The file or directory could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        /// The path being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The matrix could not be written as CSV.
    #[error("failed to write {}: {source}", .path.display())]
    Csv {
        /// The path being written.
        path: PathBuf,
        /// The underlying error.
        source: csv::Error,
    },

    /// The data could not be serialized.
    #[error("failed to serialize {}: {source}", .path.display())]
    Json {
        /// The path being written.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
}

/// Writes the outputs of a run into a directory.
#[derive(Debug, Clone)]
pub struct Export {
    dir: PathBuf,
}

impl Export {
    /// File name of the matrix export.
    pub const MATRIX_FILE: &'static str = "interaction_matrix.csv";

    /// File name of the chord diagram input.
    pub const CHORD_FILE: &'static str = "chord_data.json";

    /// File name of the interaction records.
    pub const RECORDS_FILE: &'static str = "interaction_data.json";

    /// File name of the normalized user list.
    pub const USERS_FILE: &'static str = "users.json";

    /// Opens an export directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| ExportError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The export directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn create(&self, file_name: &str) -> Result<(PathBuf, BufWriter<File>), ExportError> {
        let path = self.dir.join(file_name);
        let file = File::create(&path).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok((path, BufWriter::new(file)))
    }

    /// Writes `data` as pretty-printed JSON to the named file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        data: &T,
    ) -> Result<PathBuf, ExportError> {
        let (path, mut writer) = self.create(file_name)?;
        serde_json::to_writer_pretty(&mut writer, data).map_err(|source| ExportError::Json {
            path: path.clone(),
            source,
        })?;
        finish(path, writer)
    }

    /// Writes the matrix as CSV.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_matrix_csv(&self, matrix: &InteractionMatrix) -> Result<PathBuf, ExportError> {
        let (path, mut writer) = self.create(Self::MATRIX_FILE)?;
        matrix
            .write_csv(&mut writer)
            .map_err(|source| ExportError::Csv {
                path: path.clone(),
                source,
            })?;
        finish(path, writer)
    }

    /// Writes every cell of the matrix as `source`, `target`, `weight`
    /// objects, the input expected by chord diagram renderers.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_chord_data(&self, matrix: &InteractionMatrix) -> Result<PathBuf, ExportError> {
        let cells: Vec<_> = matrix.cells().collect();
        self.write_json(Self::CHORD_FILE, &cells)
    }
}

fn finish(path: PathBuf, mut writer: BufWriter<File>) -> Result<PathBuf, ExportError> {
    writer
        .flush()
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
    tracing::debug!("Wrote {}", path.display());
    Ok(path)
}
