//! Integration tests for tk-output's CSV backend. The SQLite and Parquet
//! backends mirror this shape and are covered by the feature matrix in CI
//! configuration rather than here, since neither feature is on by default.

use tempfile::TempDir;

use crate::csv::CsvWriter;
use crate::event::{simulation_record, EventKind, EventRecord};
use crate::writer::EventWriter;

fn tmp() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

#[test]
fn csv_file_created_with_header() {
    let dir = tmp();
    let mut w = CsvWriter::new(dir.path()).unwrap();
    w.finish().unwrap();
    let contents = std::fs::read_to_string(dir.path().join("events.csv")).unwrap();
    assert_eq!(contents.lines().next().unwrap(), "kind,frame,id,fields");
}

#[test]
fn csv_round_trips_event_records() {
    let dir = tmp();
    let mut w = CsvWriter::new(dir.path()).unwrap();
    w.write_events(&[simulation_record(100)]).unwrap();
    w.write_events(&[EventRecord::new(EventKind::Agent, 1, 7).with("role", "driver")])
        .unwrap();
    w.finish().unwrap();

    let contents = std::fs::read_to_string(dir.path().join("events.csv")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3); // header + 2 rows
    assert!(lines[1].starts_with("simulation,0,0,"));
    assert!(lines[2].starts_with("agent,1,7,role:driver"));
}

#[test]
fn finish_is_idempotent() {
    let dir = tmp();
    let mut w = CsvWriter::new(dir.path()).unwrap();
    w.finish().unwrap();
    w.finish().unwrap();
}
