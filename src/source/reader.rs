//! Pull-based CSV row reader over an async byte stream

use super::types::{RaggedRows, RowEvent, SourceConfig};
use crate::error::{Error, Result};
use crate::types::Row;
use csv_async::{AsyncReader, AsyncReaderBuilder, StringRecord};
use futures::Stream;
use tokio::io::AsyncRead;

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Headers,
    Rows,
    Done,
}

/// Lazy, non-restartable sequence of [`RowEvent`]s parsed from `R`
pub struct RowSource<R> {
    reader: AsyncReader<R>,
    /// Label used in upstream failure messages
    name: String,
    ragged_rows: RaggedRows,
    headers: Vec<String>,
    record: StringRecord,
    phase: Phase,
    rows_read: usize,
}

impl<R> RowSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Create a row source over `reader`
    pub fn new(reader: R, config: &SourceConfig) -> Result<Self> {
        let delimiter = config.delimiter_byte().ok_or_else(|| {
            Error::invalid_value(
                "csv.delimiter",
                format!("'{}' is not a single-byte character", config.delimiter),
            )
        })?;

        let reader = AsyncReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .buffer_capacity(config.buffer_capacity.max(1024))
            .create_reader(reader);

        Ok(Self {
            reader,
            name: "input".to_string(),
            ragged_rows: config.ragged_rows,
            headers: Vec::new(),
            record: StringRecord::new(),
            phase: Phase::Headers,
            rows_read: 0,
        })
    }

    /// Set the label used in upstream failure messages
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Headers seen so far (empty until the `Headers` event)
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows yielded so far
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Pull the next event, or `None` once a terminal event was returned
    pub async fn next_event(&mut self) -> Option<RowEvent> {
        match self.phase {
            Phase::Done => None,
            Phase::Headers => Some(self.read_headers().await),
            Phase::Rows => Some(self.read_row().await),
        }
    }

    /// Expose the sequence as a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = RowEvent> + Send
    where
        R: 'static,
    {
        futures::stream::unfold(self, |mut source| async move {
            let event = source.next_event().await?;
            Some((event, source))
        })
    }

    async fn read_headers(&mut self) -> RowEvent {
        match self.reader.headers().await {
            Ok(record) => {
                let mut headers: Vec<String> = record.iter().map(str::to_string).collect();
                if let Some(first) = headers.first_mut() {
                    if let Some(stripped) = first.strip_prefix(BOM) {
                        *first = stripped.to_string();
                    }
                }
                self.headers.clone_from(&headers);
                self.phase = Phase::Rows;
                RowEvent::Headers(headers)
            }
            Err(e) => self.fail(e),
        }
    }

    async fn read_row(&mut self) -> RowEvent {
        match self.reader.read_record(&mut self.record).await {
            Ok(true) => match self.build_row() {
                Ok(row) => {
                    self.rows_read += 1;
                    RowEvent::Row(row)
                }
                Err(e) => {
                    self.phase = Phase::Done;
                    RowEvent::Error(e)
                }
            },
            Ok(false) => {
                self.phase = Phase::Done;
                RowEvent::End
            }
            Err(e) => self.fail(e),
        }
    }

    fn build_row(&self) -> Result<Row> {
        let expected = self.headers.len();
        let found = self.record.len();

        if found != expected && self.ragged_rows == RaggedRows::Reject {
            let line = self.record.position().map_or(0, csv_async::Position::line);
            return Err(Error::csv(format!(
                "line {line}: expected {expected} fields, found {found}"
            )));
        }

        Ok(self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = self.record.get(i).unwrap_or_default();
                (header.clone(), value.to_string())
            })
            .collect())
    }

    fn fail(&mut self, err: csv_async::Error) -> RowEvent {
        self.phase = Phase::Done;
        let error = if matches!(err.kind(), csv_async::ErrorKind::Io(_)) {
            Error::fetch(&self.name, err.to_string())
        } else {
            Error::csv(err.to_string())
        };
        RowEvent::Error(error)
    }
}

/// Collect every event of a source (convenience for small inputs)
pub async fn collect_events<R>(mut source: RowSource<R>) -> Vec<RowEvent>
where
    R: AsyncRead + Unpin + Send,
{
    let mut events = Vec::new();
    while let Some(event) = source.next_event().await {
        events.push(event);
    }
    events
}
