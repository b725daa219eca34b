//! The `EventWriter` trait implemented by the CSV, SQLite, and Parquet
//! backends. Each writes the same `(kind, frame, id, fields)` shape as
//! [`crate::event::EventRecord`] — one row per record, fields joined into a
//! single column since the field set varies by kind.

use crate::event::EventRecord;
use crate::OutputResult;

pub trait EventWriter {
    /// Append a batch of event records.
    fn write_events(&mut self, records: &[EventRecord]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
