//! CSV output backend.
//!
//! Creates a single `events.csv` in the configured output directory, one row
//! per [`EventRecord`] emitted by the kernel.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::event::EventRecord;
use crate::writer::EventWriter;
use crate::OutputResult;

/// Writes simulation output to `events.csv`.
pub struct CsvWriter {
    events:   Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) `events.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut events = Writer::from_path(dir.join("events.csv"))?;
        events.write_record(["kind", "frame", "id", "fields"])?;
        Ok(Self { events, finished: false })
    }
}

impl EventWriter for CsvWriter {
    fn write_events(&mut self, records: &[EventRecord]) -> OutputResult<()> {
        for record in records {
            self.events.write_record(&[
                record.kind.to_string(),
                record.frame.to_string(),
                record.id.to_string(),
                record.fields_joined(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        Ok(())
    }
}
