//! JSON feed export
//!
//! Writes records as one UTF-8 JSON array, four-space indented, with every
//! field present. Records are streamed to disk as they arrive; the array is
//! closed by [`OutputHandler::finish`].

use crate::normalize::ProductRecord;
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const INDENT: &[u8] = b"    ";

/// Streams records into a JSON array file
pub struct JsonFeedWriter {
    path: PathBuf,
    store_empty: bool,
    writer: Option<BufWriter<File>>,
    written: u64,
    finished: bool,
}

impl JsonFeedWriter {
    /// Creates a feed writer for `path`
    ///
    /// The file is created lazily on the first record. With `store_empty`
    /// set, a run without records still produces `[]`; otherwise no file is
    /// written.
    pub fn new(path: impl AsRef<Path>, store_empty: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            store_empty,
            writer: None,
            written: 0,
            finished: false,
        }
    }

    fn open(&mut self) -> OutputResult<&mut BufWriter<File>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let mut writer = BufWriter::new(File::create(&self.path)?);
            writer.write_all(b"[")?;
            self.writer = Some(writer);
        }
        self.writer.as_mut().ok_or(OutputError::Finished)
    }
}

impl OutputHandler for JsonFeedWriter {
    fn write_record(&mut self, record: &ProductRecord) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished);
        }
        let separator: &[u8] = if self.written == 0 { b"\n" } else { b",\n" };
        let writer = self.open()?;
        writer.write_all(separator)?;

        let mut serializer =
            serde_json::Serializer::with_formatter(&mut *writer, PrettyFormatter::with_indent(INDENT));
        record.serialize(&mut serializer)?;

        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        if self.writer.is_none() {
            if !self.store_empty {
                tracing::info!("No records produced, feed {} not written", self.path.display());
                return Ok(());
            }
            self.open()?;
        }

        if let Some(mut writer) = self.writer.take() {
            writer.write_all(b"\n]\n")?;
            writer.flush()?;
        }
        tracing::info!("Wrote {} records to {}", self.written, self.path.display());
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }
}
