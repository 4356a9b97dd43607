//! In-memory record sink, the reference implementation of [`RecordSink`].
//!
//! Used by unit and integration tests that need to observe exactly what
//! the engine wrote; `fail_after` simulates a sink that breaks mid-run.

use super::RecordSink;
use super::error::SinkError;
use crate::scrape::TweetRecord;

/// Record sink that keeps everything in a `Vec`.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<TweetRecord>,
    fail_after: Option<usize>,
}

impl MemorySink {
    /// Creates an empty sink that accepts every append.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that accepts `n` appends and fails on the next one.
    #[must_use]
    pub fn fail_after(n: usize) -> Self {
        Self {
            records: Vec::new(),
            fail_after: Some(n),
        }
    }

    /// Returns the records appended so far, in order.
    #[must_use]
    pub fn records(&self) -> &[TweetRecord] {
        &self.records
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: &TweetRecord) -> Result<(), SinkError> {
        if let Some(limit) = self.fail_after {
            if self.records.len() >= limit {
                return Err(SinkError::io(
                    "<memory>",
                    std::io::Error::new(std::io::ErrorKind::WriteZero, "simulated sink failure"),
                ));
            }
        }
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(seq: u64) -> TweetRecord {
        TweetRecord {
            sequence_number: seq,
            author: "a".to_string(),
            text: "t".to_string(),
            created_at: Utc::now(),
            reshare_count: 0,
            favorite_count: 0,
        }
    }

    #[test]
    fn test_memory_sink_appends_in_order() {
        let mut sink = MemorySink::new();
        sink.append(&record(1)).unwrap();
        sink.append(&record(2)).unwrap();
        assert_eq!(sink.records().len(), 2);
        assert_eq!(sink.records()[1].sequence_number, 2);
    }

    #[test]
    fn test_memory_sink_fail_after_limit() {
        let mut sink = MemorySink::fail_after(1);
        sink.append(&record(1)).unwrap();
        assert!(sink.append(&record(2)).is_err());
        assert_eq!(sink.records().len(), 1);
    }
}
