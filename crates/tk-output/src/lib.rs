//! `tk-output` — simulation output writers for the traffic kernel framework.
//!
//! Every backend writes the same spec-level record stream: one line/row per
//! [`EventRecord`] (`kind, frame, id, {key: value, …}`) — the static network
//! section once at startup, then per-tick per-agent rows.
//!
//! | Feature   | Backend | Files created    |
//! |-----------|---------|-------------------|
//! | *(none)*  | Text    | any path ([`TextEventWriter`]) |
//! | *(none)*  | CSV     | `events.csv` ([`CsvWriter`])   |
//! | `sqlite`  | SQLite  | `output.db` ([`SqliteWriter`]) |
//! | `parquet` | Parquet | `events.parquet` ([`ParquetWriter`]) |
//!
//! # Usage
//!
//! ```rust,ignore
//! use tk_output::{network_records, simulation_record, CsvWriter, EventWriter};
//!
//! let mut writer = CsvWriter::new(Path::new("./output")).unwrap();
//! writer.write_events(&[simulation_record(100)]).unwrap();
//! writer.write_events(&network_records(&topology, node_count)).unwrap();
//! // … per tick: writer.write_events(&agent_records(tick, &snapshot))?;
//! writer.finish().unwrap();
//! ```

pub mod csv;
pub mod error;
pub mod event;
pub mod event_writer;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use event::{agent_records, network_records, simulation_record, EventKind, EventRecord, ROADNETWORK_DONE};
pub use event_writer::TextEventWriter;
pub use writer::EventWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
