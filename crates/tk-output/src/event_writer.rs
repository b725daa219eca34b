//! `TextEventWriter` — writes [`crate::event::EventRecord`] lines to a plain
//! file, one record per line, per spec.md §6's "simple textual record"
//! contract. Deliberately has no schema beyond `Display` — unlike the CSV/
//! SQLite/Parquet backends in [`crate::csv`]/[`crate::sqlite`]/
//! [`crate::parquet`], which serialize the legacy columnar row types.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::event::{EventRecord, ROADNETWORK_DONE};
use crate::OutputResult;

/// Append-only writer for the spec.md §6 event-record stream.
pub struct TextEventWriter {
    out: BufWriter<File>,
    network_closed: bool,
}

impl TextEventWriter {
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Ok(Self { out: BufWriter::new(file), network_closed: false })
    }

    /// Write one record, followed by a newline.
    pub fn write_record(&mut self, record: &EventRecord) -> OutputResult<()> {
        writeln!(self.out, "{record}")?;
        Ok(())
    }

    pub fn write_records(&mut self, records: &[EventRecord]) -> OutputResult<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Close the static network section with `ROADNETWORK_DONE`. Idempotent:
    /// a second call is a no-op, since the marker means "this section will
    /// not receive any more rows."
    pub fn close_network_section(&mut self) -> OutputResult<()> {
        if self.network_closed {
            return Ok(());
        }
        writeln!(self.out, "{ROADNETWORK_DONE}")?;
        self.network_closed = true;
        Ok(())
    }

    pub fn flush(&mut self) -> OutputResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{simulation_record, EventKind};
    use std::io::Read;

    #[test]
    fn writes_lines_and_closes_network_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.txt");
        let mut w = TextEventWriter::create(&path).unwrap();
        w.write_record(&simulation_record(100)).unwrap();
        w.write_record(&EventRecord::new(EventKind::Node, 0, 0)).unwrap();
        w.close_network_section().unwrap();
        w.close_network_section().unwrap(); // idempotent
        w.flush().unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["simulation,0,0,frame-time-ms:100", "node,0,0", "ROADNETWORK_DONE"]);
    }
}
