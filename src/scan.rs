//! Reference scan driver over a chunked table.
//!
//! The core only ever translates one local window over one batch. [`TableScan`] is the piece in
//! front of it: it applies an absolute `OFFSET`/`LIMIT` to a table split into record batches,
//! finds the batch that holds each absolute row, and hands that batch's local window to the
//! [`OffsetTranslator`]. Output chunks never span two batches.

use arrow_array::{Array, RecordBatch};
use arrow_data::ArrayData;
use arrow_schema::SchemaRef;

use crate::{ArrayNode, OffsetTranslator, TranslateError, Value, Window};

/// Default number of rows per output chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// Row selection and chunking for a [`TableScan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    offset: usize,
    limit: Option<usize>,
    chunk_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ScanOptions {
    /// Scan every row in chunks of [`DEFAULT_CHUNK_SIZE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the first `offset` rows of the table.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Return at most `limit` rows.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Emit chunks of at most `chunk_size` rows.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Number of leading rows skipped.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Maximum number of rows returned, if bounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Maximum rows per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

/// A table of record batches prepared for windowed scanning.
#[derive(Debug)]
pub struct TableScan {
    schema: SchemaRef,
    batches: Vec<Vec<ArrayData>>,
    ends: Vec<usize>,
    projection: Vec<usize>,
    options: ScanOptions,
}

impl TableScan {
    /// Prepare a scan over `batches`, all of which must match `schema`.
    ///
    /// # Errors
    /// Returns [`TranslateError::Invalid`] for a zero chunk size or a batch whose column types
    /// differ from `schema`.
    pub fn try_new(
        schema: SchemaRef,
        batches: &[RecordBatch],
        options: ScanOptions,
    ) -> Result<Self, TranslateError> {
        if options.chunk_size == 0 {
            return Err(TranslateError::invalid("chunk size must be positive"));
        }
        let mut ends = Vec::with_capacity(batches.len());
        let mut total = 0usize;
        let mut data = Vec::with_capacity(batches.len());
        for (index, batch) in batches.iter().enumerate() {
            check_batch_schema(&schema, batch, index)?;
            total += batch.num_rows();
            ends.push(total);
            data.push(batch.columns().iter().map(|column| column.to_data()).collect());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            batches = batches.len(),
            rows = total,
            offset = options.offset,
            limit = ?options.limit,
            chunk_size = options.chunk_size,
            "prepared table scan"
        );

        Ok(Self {
            projection: (0..schema.fields().len()).collect(),
            schema,
            batches: data,
            ends,
            options,
        })
    }

    /// Restrict the output to `columns`, in the given order.
    ///
    /// # Errors
    /// Returns [`TranslateError::ColumnOutOfBounds`] for an index past the schema width.
    pub fn with_projection(mut self, columns: &[usize]) -> Result<Self, TranslateError> {
        let width = self.schema.fields().len();
        if let Some(&column) = columns.iter().find(|&&column| column >= width) {
            return Err(TranslateError::ColumnOutOfBounds { column, width });
        }
        self.projection = columns.to_vec();
        Ok(self)
    }

    /// Schema shared by every batch.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Scan options in effect.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Total rows across all batches, before offset and limit.
    pub fn num_rows(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Rows the scan will emit after offset and limit.
    pub fn output_rows(&self) -> usize {
        let available = self.num_rows().saturating_sub(self.options.offset);
        self.options
            .limit
            .map_or(available, |limit| limit.min(available))
    }

    /// Locate absolute row `row`, returning `(batch index, row within batch)`.
    pub fn locate(&self, row: usize) -> Option<(usize, usize)> {
        let batch = self.ends.partition_point(|&end| end <= row);
        if batch == self.ends.len() {
            return None;
        }
        Some((batch, row - self.batch_start(batch)))
    }

    /// Iterate the selected rows chunk by chunk.
    pub fn chunks(&self) -> ScanChunks<'_> {
        let remaining = self.output_rows();
        let (batch, row) = self.locate(self.options.offset).unwrap_or((self.ends.len(), 0));
        ScanChunks {
            scan: self,
            batch,
            row,
            remaining,
            nodes: None,
        }
    }

    /// Collect every selected row, one `Vec` of column values per row.
    ///
    /// # Errors
    /// Returns the first translation error met.
    pub fn rows(&self) -> Result<Vec<Vec<Value<'_>>>, TranslateError> {
        let mut rows = Vec::with_capacity(self.output_rows());
        for chunk in self.chunks() {
            rows.extend(chunk?.into_rows());
        }
        Ok(rows)
    }

    fn batch_start(&self, batch: usize) -> usize {
        if batch == 0 { 0 } else { self.ends[batch - 1] }
    }

    fn batch_len(&self, batch: usize) -> usize {
        self.ends[batch] - self.batch_start(batch)
    }

    fn batch_nodes(&self, batch: usize) -> Result<Vec<ArrayNode<'_>>, TranslateError> {
        self.projection
            .iter()
            .map(|&column| {
                ArrayNode::from_data_with_field(
                    &self.batches[batch][column],
                    self.schema.field(column),
                )
            })
            .collect()
    }
}

fn check_batch_schema(
    schema: &SchemaRef,
    batch: &RecordBatch,
    index: usize,
) -> Result<(), TranslateError> {
    let expected = schema.fields();
    let actual = batch.schema_ref().fields();
    if expected.len() != actual.len() {
        return Err(TranslateError::invalid(format!(
            "batch {index} has {} columns, schema has {}",
            actual.len(),
            expected.len()
        )));
    }
    for (field, column) in expected.iter().zip(batch.columns()) {
        if !column.data_type().equals_datatype(field.data_type()) {
            return Err(TranslateError::invalid(format!(
                "batch {index} column '{}' has type {}, schema declares {}",
                field.name(),
                column.data_type(),
                field.data_type()
            )));
        }
    }
    Ok(())
}

/// Iterator over the chunks of a [`TableScan`].
///
/// The iterator fuses after the first error.
pub struct ScanChunks<'s> {
    scan: &'s TableScan,
    batch: usize,
    row: usize,
    remaining: usize,
    nodes: Option<(usize, Vec<ArrayNode<'s>>)>,
}

impl<'s> ScanChunks<'s> {
    fn next_chunk(&mut self) -> Result<ScanChunk<'s>, TranslateError> {
        let scan = self.scan;
        while self.row >= scan.batch_len(self.batch) {
            self.batch += 1;
            self.row = 0;
        }
        let batch = self.batch;
        let nodes = match self.nodes.take() {
            Some((cached, nodes)) if cached == batch => nodes,
            _ => scan.batch_nodes(batch)?,
        };

        let length = scan
            .options
            .chunk_size
            .min(scan.batch_len(batch) - self.row)
            .min(self.remaining);
        let window = Window::new(self.row, length);

        #[cfg(feature = "tracing")]
        tracing::debug!(batch, offset = window.offset, length, "translating local window");

        let columns = nodes
            .iter()
            .zip(&scan.projection)
            .map(|(node, &column)| {
                OffsetTranslator::new(node)
                    .named(scan.schema.field(column).name())
                    .translate(window)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.nodes = Some((batch, nodes));
        self.row += length;
        self.remaining -= length;
        Ok(ScanChunk {
            first_row: scan.batch_start(batch) + window.offset,
            batch,
            window,
            columns,
        })
    }
}

impl<'s> Iterator for ScanChunks<'s> {
    type Item = Result<ScanChunk<'s>, TranslateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let chunk = self.next_chunk();
        if chunk.is_err() {
            self.remaining = 0;
        }
        Some(chunk)
    }
}

/// Rows of one batch window, stored column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanChunk<'s> {
    first_row: usize,
    batch: usize,
    window: Window,
    columns: Vec<Vec<Value<'s>>>,
}

impl<'s> ScanChunk<'s> {
    /// Number of rows in the chunk.
    pub fn len(&self) -> usize {
        self.window.length
    }

    /// Returns true if the chunk holds no rows.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Absolute table row of the chunk's first row.
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    /// Index of the batch the chunk was read from.
    pub fn batch_index(&self) -> usize {
        self.batch
    }

    /// Local window within that batch.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Column values, in projection order.
    pub fn columns(&self) -> &[Vec<Value<'s>>] {
        &self.columns
    }

    /// Transpose into rows.
    pub fn into_rows(self) -> Vec<Vec<Value<'s>>> {
        let mut rows: Vec<Vec<Value<'s>>> = (0..self.window.length)
            .map(|_| Vec::with_capacity(self.columns.len()))
            .collect();
        for column in self.columns {
            for (row, value) in rows.iter_mut().zip(column) {
                row.push(value);
            }
        }
        rows
    }
}
