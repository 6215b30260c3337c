//! Whole-file persistence of records, one encoded line per record.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::codec::{self, CodecError, Record};
use crate::model::Entity;

/// Errors that can occur when reading or writing a data file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("{path} line {line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        source: CodecError,
    },

    #[error("{path}: cannot encode record: {source}")]
    Encode { path: PathBuf, source: CodecError },
}

/// A data file holding one kind of record.
#[derive(Debug, Clone)]
pub struct FlatFile {
    path: PathBuf,
}

impl FlatFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in file order. A missing file holds no records.
    pub fn load_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "data file missing, nothing to load");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = codec::decode(&line).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                line: idx + 1, // 1-indexed
                source,
            })?;
            records.push(record);
        }

        debug!(path = %self.path.display(), count = records.len(), "loaded {}", R::KIND);
        Ok(records)
    }

    /// Overwrite the file with every entity not flagged as deleted.
    ///
    /// Returns the number of rows written. Every line is encoded before the
    /// file is truncated, so an unencodable entity leaves the file untouched.
    pub fn save_all<E: Entity>(&self, entities: &[E]) -> Result<usize, StoreError> {
        let lines = entities
            .iter()
            .filter(|entity| !entity.is_deleted())
            .map(|entity| self.encode(entity))
            .collect::<Result<Vec<_>, _>>()?;

        let file = File::create(&self.path).map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);
        for line in &lines {
            writeln!(writer, "{line}").map_err(|e| self.io_error(e))?;
        }
        writer.flush().map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), count = lines.len(), "saved {}", E::KIND);
        Ok(lines.len())
    }

    /// Add one record at the end of the file, creating the file if needed.
    pub fn append<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let line = self.encode(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{line}").map_err(|e| self.io_error(e))
    }

    /// Drop every record by truncating the file.
    pub fn clear(&self) -> Result<(), StoreError> {
        fs::write(&self.path, "").map_err(|e| self.io_error(e))
    }

    fn encode<R: Record>(&self, record: &R) -> Result<String, StoreError> {
        codec::encode(record).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
