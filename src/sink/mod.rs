//! Append-only record sinks.
//!
//! The engine writes each normalized record through the [`RecordSink`]
//! trait as soon as it is produced. The production sink is [`CsvSink`];
//! [`MemorySink`] is an in-memory reference implementation used by tests.

mod csv_sink;
mod error;
mod memory;

pub use csv_sink::{CSV_HEADER, CsvSink};
pub use error::SinkError;
pub use memory::MemorySink;

use crate::scrape::TweetRecord;

/// An append-capable writer with a fixed column schema.
///
/// Opened once before the retrieval loop begins and appended to many
/// times within one process lifetime. Implementations must make each
/// appended record durable promptly - partial progress has to survive a
/// later fatal error - and never roll records back.
pub trait RecordSink {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the record could not be written; the
    /// engine treats this as fatal.
    fn append(&mut self, record: &TweetRecord) -> Result<(), SinkError>;
}
