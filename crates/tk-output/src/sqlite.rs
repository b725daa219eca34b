//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! one table, `events`, holding every emitted record.

use std::path::Path;

use rusqlite::Connection;

use crate::event::EventRecord;
use crate::writer::EventWriter;
use crate::OutputResult;

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS events (
                 kind   TEXT    NOT NULL,
                 frame  INTEGER NOT NULL,
                 id     INTEGER NOT NULL,
                 fields TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl EventWriter for SqliteWriter {
    fn write_events(&mut self, records: &[EventRecord]) -> OutputResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO events (kind, frame, id, fields) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for record in records {
                stmt.execute(rusqlite::params![
                    record.kind.to_string(),
                    record.frame,
                    record.id,
                    record.fields_joined(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
