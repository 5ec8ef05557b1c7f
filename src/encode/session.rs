//! Row-at-a-time Parquet encoding into a [`BufferedSink`]

use super::writer::EncoderConfig;
use crate::error::{Error, Result};
use crate::schema::{parse_numeric, parse_timestamp_millis, ColumnDescriptor, Schema, TIMESTAMP_TZ};
use crate::sink::BufferedSink;
use crate::types::{ColumnType, Row};
use arrow::array::{ArrayRef, Float64Builder, StringBuilder, TimestampMillisecondBuilder};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::borrow::Borrow;
use std::sync::Arc;

/// Counters reported after a successful encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeSummary {
    /// Data rows written
    pub rows: usize,
    /// Record batches handed to the Parquet writer
    pub batches: usize,
    /// Row groups in the finished file
    pub row_groups: usize,
}

/// A coerced cell value
enum Cell<'r> {
    Text(&'r str),
    Number(f64),
    Millis(i64),
}

/// Arrow builder for one column
enum ColumnBuilder {
    Text(StringBuilder),
    Number(Float64Builder),
    Millis(TimestampMillisecondBuilder),
}

impl ColumnBuilder {
    fn new(column: &ColumnDescriptor, capacity: usize) -> Self {
        match column.column_type {
            ColumnType::String => ColumnBuilder::Text(StringBuilder::with_capacity(capacity, 0)),
            ColumnType::Numeric => ColumnBuilder::Number(Float64Builder::with_capacity(capacity)),
            ColumnType::Timestamp => ColumnBuilder::Millis(
                TimestampMillisecondBuilder::with_capacity(capacity).with_timezone(TIMESTAMP_TZ),
            ),
        }
    }

    fn append(&mut self, cell: &Cell<'_>) {
        match (self, cell) {
            (ColumnBuilder::Text(b), Cell::Text(v)) => b.append_value(v),
            (ColumnBuilder::Number(b), Cell::Number(v)) => b.append_value(*v),
            (ColumnBuilder::Millis(b), Cell::Millis(v)) => b.append_value(*v),
            // cells are coerced from the same descriptor the builder was made from
            _ => unreachable!("cell type does not match column builder"),
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Text(b) => Arc::new(b.finish()) as ArrayRef,
            ColumnBuilder::Number(b) => Arc::new(b.finish()) as ArrayRef,
            ColumnBuilder::Millis(b) => Arc::new(b.finish()) as ArrayRef,
        }
    }
}

/// Coerce a raw CSV value to the column's declared type
fn coerce<'r>(column: &ColumnDescriptor, raw: &'r str, row_index: usize) -> Result<Cell<'r>> {
    let cell = match column.column_type {
        ColumnType::String => Some(Cell::Text(raw)),
        ColumnType::Numeric => parse_numeric(raw).map(Cell::Number),
        ColumnType::Timestamp => parse_timestamp_millis(raw).map(Cell::Millis),
    };

    cell.ok_or_else(|| {
        Error::type_mismatch(&column.name, row_index, column.column_type.to_string(), raw)
    })
}

/// Incremental encoder: rows are pushed one by one, in order
///
/// Nothing is written to the sink until the first batch is flushed, so a
/// session that sees no rows leaves the sink empty.
pub struct EncodeSession<'a> {
    schema: &'a Schema,
    arrow_schema: SchemaRef,
    properties: Option<WriterProperties>,
    sink: Option<&'a mut BufferedSink>,
    writer: Option<ArrowWriter<&'a mut BufferedSink>>,
    builders: Vec<ColumnBuilder>,
    batch_size: usize,
    buffered: usize,
    rows: usize,
    batches: usize,
}

impl<'a> EncodeSession<'a> {
    /// Start encoding `schema` into `sink`
    pub fn new(schema: &'a Schema, sink: &'a mut BufferedSink, config: &EncoderConfig) -> Self {
        let batch_size = config.batch_size.max(1);
        let builders = schema
            .columns()
            .iter()
            .map(|c| ColumnBuilder::new(c, batch_size))
            .collect();

        Self {
            schema,
            arrow_schema: Arc::new(schema.to_arrow()),
            properties: Some(config.build_properties(schema)),
            sink: Some(sink),
            writer: None,
            builders,
            batch_size,
            buffered: 0,
            rows: 0,
            batches: 0,
        }
    }

    /// Rows accepted so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Validate, coerce and buffer one row
    ///
    /// The row is rejected as a whole: on error nothing from it is buffered.
    pub fn push(&mut self, row: &Row) -> Result<()> {
        let row_index = self.rows;

        let cells = self
            .schema
            .columns()
            .iter()
            .map(|column| {
                let raw = row
                    .get(&column.name)
                    .ok_or_else(|| Error::missing_column(&column.name, row_index))?;
                coerce(column, raw, row_index)
            })
            .collect::<Result<Vec<_>>>()?;

        for (builder, cell) in self.builders.iter_mut().zip(&cells) {
            builder.append(cell);
        }

        self.rows += 1;
        self.buffered += 1;

        if self.buffered >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush buffered rows and write the file footer
    ///
    /// Fails with [`Error::NoData`] if no row was pushed.
    pub fn finish(mut self) -> Result<EncodeSummary> {
        if self.rows == 0 {
            return Err(Error::NoData);
        }

        self.flush()?;

        let writer = self
            .writer
            .take()
            .ok_or_else(|| Error::Other("parquet writer was never opened".to_string()))?;
        let metadata = writer.close()?;

        Ok(EncodeSummary {
            rows: self.rows,
            batches: self.batches,
            row_groups: metadata.row_groups.len(),
        })
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffered == 0 {
            return Ok(());
        }

        let columns: Vec<ArrayRef> = self.builders.iter_mut().map(ColumnBuilder::finish).collect();
        let batch = RecordBatch::try_new(self.arrow_schema.clone(), columns)?;

        if self.writer.is_none() {
            let sink = self
                .sink
                .take()
                .ok_or_else(|| Error::Other("encode sink already taken".to_string()))?;
            let writer =
                ArrowWriter::try_new(sink, self.arrow_schema.clone(), self.properties.take())?;
            self.writer = Some(writer);
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Other("parquet writer was never opened".to_string()))?;
        writer.write(&batch)?;
        self.batches += 1;
        self.buffered = 0;
        Ok(())
    }
}

/// Encode every row of `rows` against `schema` into `sink`
pub fn encode<I>(
    schema: &Schema,
    rows: I,
    sink: &mut BufferedSink,
    config: &EncoderConfig,
) -> Result<EncodeSummary>
where
    I: IntoIterator,
    I::Item: Borrow<Row>,
{
    let mut session = EncodeSession::new(schema, sink, config);
    for row in rows {
        session.push(row.borrow())?;
    }
    session.finish()
}
