use std::fs;
use std::path::{Path, PathBuf};

use harvest_core::Batch;
use serde::{Deserialize, Serialize};

use crate::{batch_filename, AtomicFileWriter, PersistError};

/// Persists one full batch as a self-contained artifact.
pub trait BatchWriter: Send + Sync {
    fn write_batch(&self, batch_index: usize, batch: &Batch) -> Result<PathBuf, PersistError>;
}

#[derive(Serialize)]
struct BatchFileRef<'a> {
    batch_index: usize,
    records: usize,
    id: &'a [String],
    title: &'a [String],
    summary: &'a [String],
    time: &'a [String],
    comment: &'a [String],
    category: &'a [String],
    authors: &'a [String],
}

/// On-disk layout: the batch index plus seven parallel columns.
#[derive(Debug, Deserialize)]
struct BatchFile {
    batch_index: usize,
    records: usize,
    id: Vec<String>,
    title: Vec<String>,
    summary: Vec<String>,
    time: Vec<String>,
    comment: Vec<String>,
    category: Vec<String>,
    authors: Vec<String>,
}

/// Writes each batch as JSON to `{dir}/{prefix}_batch_{index}.json`, atomically.
#[derive(Debug, Clone)]
pub struct JsonBatchWriter {
    writer: AtomicFileWriter,
    prefix: String,
}

impl JsonBatchWriter {
    pub fn new(writer: AtomicFileWriter, prefix: impl Into<String>) -> Self {
        Self {
            writer,
            prefix: prefix.into(),
        }
    }

    /// Prepares `dir` for batch files; fails before any request is made.
    pub fn open(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self, PersistError> {
        Ok(Self::new(AtomicFileWriter::open(dir)?, prefix))
    }

    pub fn path_for(&self, batch_index: usize) -> PathBuf {
        self.writer
            .dir()
            .join(batch_filename(&self.prefix, batch_index))
    }
}

impl BatchWriter for JsonBatchWriter {
    fn write_batch(&self, batch_index: usize, batch: &Batch) -> Result<PathBuf, PersistError> {
        let file = BatchFileRef {
            batch_index,
            records: batch.len(),
            id: &batch.id,
            title: &batch.title,
            summary: &batch.summary,
            time: &batch.time,
            comment: &batch.comment,
            category: &batch.category,
            authors: &batch.authors,
        };
        let content =
            serde_json::to_vec(&file).map_err(|err| PersistError::Encode(err.to_string()))?;
        self.writer
            .write(&batch_filename(&self.prefix, batch_index), &content)
    }
}

/// Load a batch artifact written by [`JsonBatchWriter`].
pub fn load_batch(path: &Path) -> Result<(usize, Batch), PersistError> {
    let content = fs::read(path)?;
    let file: BatchFile =
        serde_json::from_slice(&content).map_err(|err| PersistError::Encode(err.to_string()))?;
    let batch = Batch {
        id: file.id,
        title: file.title,
        summary: file.summary,
        time: file.time,
        comment: file.comment,
        category: file.category,
        authors: file.authors,
    };
    if !batch.is_aligned() || batch.len() != file.records {
        return Err(PersistError::Encode(format!(
            "columns of {} are not aligned to {} records",
            path.display(),
            file.records
        )));
    }
    Ok((file.batch_index, batch))
}
