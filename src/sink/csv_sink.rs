//! CSV record sink.
//!
//! The header row is written once when the sink is created; every append
//! serializes one record and flushes it straight to disk, so records
//! written before a crash or fatal error remain readable.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use tracing::{debug, instrument};

use super::error::SinkError;
use super::RecordSink;
use crate::scrape::TweetRecord;

/// Fixed column order of the output file. Matches the serde renames on
/// [`TweetRecord`].
pub const CSV_HEADER: [&str; 6] = [
    "Tweet_count",
    "Username",
    "Text",
    "Created At",
    "Retweets",
    "Likes",
];

/// CSV file sink with one flushed row per appended record.
#[derive(Debug)]
pub struct CsvSink {
    writer: Writer<File>,
    path: PathBuf,
}

impl CsvSink {
    /// Creates (or truncates) the output file and writes the header row.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the file cannot be created or the header
    /// cannot be written.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| SinkError::io(&path, e))?;

        // Header comes from CSV_HEADER rather than serde so it is written
        // exactly once, at creation, even if no record ever follows.
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(CSV_HEADER)
            .map_err(|e| SinkError::csv(&path, e))?;
        writer.flush().map_err(|e| SinkError::io(&path, e))?;

        debug!("created CSV sink");
        Ok(Self { writer, path })
    }

    /// Returns the output file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &TweetRecord) -> Result<(), SinkError> {
        self.writer
            .serialize(record)
            .map_err(|e| SinkError::csv(&self.path, e))?;
        // Flush per record: partial progress must survive a later fatal
        // error further into the run.
        self.writer.flush().map_err(|e| SinkError::io(&self.path, e))
    }
}
