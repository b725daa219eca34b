//! Parquet output backend (feature `parquet`).
//!
//! Creates a single `events.parquet` file in the configured output
//! directory, one row per [`EventRecord`].

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{StringBuilder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::event::EventRecord;
use crate::writer::EventWriter;
use crate::OutputResult;

fn events_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("kind", DataType::Utf8, false),
        Field::new("frame", DataType::UInt64, false),
        Field::new("id", DataType::UInt64, false),
        Field::new("fields", DataType::Utf8, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes simulation output to `events.parquet`.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    events: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create `events.parquet` in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let schema = events_schema();
        let file = File::create(dir.join("events.parquet"))?;
        let events = ArrowWriter::try_new(file, Arc::clone(&schema), Some(snappy_props()))?;
        Ok(Self { events: Some(events), schema })
    }
}

impl EventWriter for ParquetWriter {
    fn write_events(&mut self, records: &[EventRecord]) -> OutputResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.events.as_mut() else {
            return Ok(());
        };

        let mut kinds = StringBuilder::new();
        let mut frames = UInt64Builder::new();
        let mut ids = UInt64Builder::new();
        let mut fields = StringBuilder::new();

        for record in records {
            kinds.append_value(record.kind.to_string());
            frames.append_value(record.frame);
            ids.append_value(record.id);
            fields.append_value(record.fields_joined());
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![
                Arc::new(kinds.finish()),
                Arc::new(frames.finish()),
                Arc::new(ids.finish()),
                Arc::new(fields.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.events.take() {
            w.close()?;
        }
        Ok(())
    }
}
