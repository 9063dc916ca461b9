//! Output handler traits and types
//!
//! This module defines the trait interface for record sinks and the errors
//! they can report.

use crate::normalize::ProductRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Output already finished")]
    Finished,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A sink for normalized product records
///
/// The coordinator calls [`write_record`](OutputHandler::write_record) once
/// per record as records arrive, then [`finish`](OutputHandler::finish) once
/// the pipeline has drained.
pub trait OutputHandler: Send {
    /// Accepts one record
    fn write_record(&mut self, record: &ProductRecord) -> OutputResult<()>;

    /// Flushes and closes the sink
    fn finish(&mut self) -> OutputResult<()>;

    /// Number of records accepted so far
    fn records_written(&self) -> u64;
}

/// Keeps records in memory; used by tests and library callers
#[derive(Debug, Default)]
pub struct MemoryOutput {
    pub records: Vec<ProductRecord>,
    pub finished: bool,
}

impl OutputHandler for MemoryOutput {
    fn write_record(&mut self, record: &ProductRecord) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished);
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.finished = true;
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.records.len() as u64
    }
}
