//! Batch driver: drives the row phase of a result set to completion.

use std::sync::Arc;

use log::debug;

use crate::column::{Converter, MySqlColumn, MySqlField};
use crate::columnar::ColumnarBuffer;
use crate::decode::decode_value;
use crate::error::{Error, MySqlDatabaseError, Result};
use crate::options::{OutputFormat, ResultOptions};
use crate::protocol::{EofPacket, TextRow};
use crate::row::{assemble, Batch, Row};
use crate::stream::{MySqlStream, Socket};

/// One column's converter slot: the declared encoding (`None` ⇒ binary
/// column) and an optional caller converter.
pub type ConverterSlot = (Option<String>, Option<Converter>);

/// The caller's handle for one result set: field metadata and options in,
/// rows and completion bookkeeping out.
///
/// The driver attaches its reader state here on the first fetch and
/// detaches it once the result is exhausted.
pub struct TextResults {
    fields: Vec<MySqlField>,
    converters: Vec<ConverterSlot>,
    options: ResultOptions,

    /// Total rows emitted, recorded when a batch completes.
    pub affected_rows: Option<u64>,

    /// Warning count carried by the terminating EOF packet.
    pub warning_count: u16,

    /// Whether the server announced another result set after this one.
    pub has_next: bool,

    /// Set while an unbuffered result is being streamed; cleared at EOF
    /// and when a server error aborts the result.
    pub unbuffered_active: bool,

    state: Option<ReaderState>,
    finished: bool,
}

impl TextResults {
    /// `converters` holds one slot per field; missing slots default to a
    /// UTF-8 text column with no converter.
    pub fn new(
        fields: Vec<MySqlField>,
        converters: Vec<ConverterSlot>,
        options: ResultOptions,
    ) -> Self {
        let unbuffered_active = options.unbuffered;

        Self {
            fields,
            converters,
            options,
            affected_rows: None,
            warning_count: 0,
            has_next: false,
            unbuffered_active,
            state: None,
            finished: false,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[MySqlField] {
        &self.fields
    }

    pub fn options(&self) -> &ResultOptions {
        &self.options
    }

    /// Whether the row phase has completed and the reader state has been
    /// detached. Further fetches perform no I/O.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Per-result reader state, created on the first fetch and destroyed when
/// the result is exhausted.
struct ReaderState {
    columns: Vec<MySqlColumn>,
    output: OutputFormat,

    /// Column names shared by every record and map of this result set.
    names: Arc<[Arc<str>]>,

    /// Object-mode batch container.
    rows: Vec<Row>,

    columnar: Option<ColumnarBuffer>,

    n_rows: u64,
    n_rows_in_batch: u64,
    unbuffered: bool,

    /// Sticky once the EOF packet has been consumed; no further frames are
    /// read for this result.
    is_eof: bool,
}

impl ReaderState {
    fn new(results: &TextResults, requested_rows: u64) -> Result<Self> {
        if results.options.unbuffered && !results.unbuffered_active {
            return Err(Error::protocol("unbuffered result set is not active"));
        }

        let columns = results
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                MySqlColumn::from_field(field, results.converters.get(index), &results.options)
            })
            .collect::<Result<Vec<_>>>()?;

        let names: Arc<[Arc<str>]> = columns
            .iter()
            .map(|column| Arc::clone(&column.name))
            .collect::<Vec<_>>()
            .into();

        let output = results.options.output;
        let columnar = if output.is_columnar() {
            Some(ColumnarBuffer::new(
                &columns,
                requested_rows,
                results.options.unbuffered,
            )?)
        } else {
            None
        };

        Ok(Self {
            columns,
            output,
            names,
            rows: Vec::new(),
            columnar,
            n_rows: 0,
            n_rows_in_batch: 0,
            unbuffered: results.options.unbuffered,
            is_eof: false,
        })
    }

    fn reset_batch(&mut self, requested_rows: u64) -> Result<()> {
        self.n_rows_in_batch = 0;

        if self.output.is_columnar() {
            self.columnar = Some(ColumnarBuffer::new(
                &self.columns,
                requested_rows,
                self.unbuffered,
            )?);
        } else if requested_rows != 1 {
            self.rows = Vec::new();
        } else {
            // a single-row fetch keeps reusing its one-slot batch
            self.rows.clear();
        }

        Ok(())
    }

    fn take_batch(&mut self) -> Batch {
        match self.columnar.take() {
            Some(columnar) => Batch::Array(columnar.finish()),
            None => Batch::Rows(std::mem::take(&mut self.rows)),
        }
    }
}

impl<S: Socket> MySqlStream<S> {
    /// Fetch up to `n` rows (`n == 0` means until EOF), assembling them per
    /// the result's options.
    ///
    /// A buffered result always yields a batch, empty once the result is
    /// exhausted. An unbuffered result yields `None` exactly when it is
    /// exhausted: the EOF packet was consumed with no rows in the current
    /// batch.
    pub fn fetch(&mut self, results: &mut TextResults, n: u64) -> Result<Option<Batch>> {
        if results.state.is_none() {
            if results.finished {
                // exhausted earlier; no further I/O
                return Ok(if results.options.unbuffered {
                    None
                } else {
                    Some(Batch::Rows(Vec::new()))
                });
            }

            results.state = Some(ReaderState::new(results, n)?);
        } else if n > 0 {
            results
                .state
                .as_mut()
                .expect("reader state present")
                .reset_batch(n)?;
        }

        let requested = if n == 0 { u64::MAX } else { n };

        let mut state = results.state.take().expect("reader state present");
        let outcome = self.drive(&mut state, results, requested);

        // the state survives a failed batch; the caller decides whether
        // the connection is still usable
        results.state = Some(state);
        let rows_read = outcome?;

        let state = results.state.as_mut().expect("reader state present");
        let unbuffered = state.unbuffered;
        let is_eof = state.is_eof;
        let n_rows = state.n_rows;

        debug!(
            "batch complete: rows_in_batch={} total={}",
            state.n_rows_in_batch, n_rows
        );

        if unbuffered && is_eof && rows_read == 0 {
            results.affected_rows = Some(n_rows);
            results.finished = true;
            results.state = None;

            return Ok(None);
        }

        let batch = results
            .state
            .as_mut()
            .expect("reader state present")
            .take_batch();

        if !unbuffered {
            results.affected_rows = Some(n_rows);

            if is_eof {
                results.finished = true;
                results.state = None;
            }
        }

        Ok(Some(batch))
    }

    /// Fetch the next row of an object-mode result; `None` once exhausted.
    ///
    /// Columnar results have no single-row object shape; fetch them as
    /// batches of one instead.
    pub fn fetch_one(&mut self, results: &mut TextResults) -> Result<Option<Row>> {
        match self.fetch(results, 1)? {
            None => Ok(None),
            Some(Batch::Rows(mut rows)) => Ok(rows.pop()),
            Some(Batch::Array(_)) => Err(Error::protocol(
                "fetch_one yields object rows; fetch columnar results as batches",
            )),
        }
    }

    /// Fetch every remaining row.
    pub fn fetch_all(&mut self, results: &mut TextResults) -> Result<Option<Batch>> {
        self.fetch(results, 0)
    }

    fn drive(
        &mut self,
        state: &mut ReaderState,
        results: &mut TextResults,
        requested: u64,
    ) -> Result<u64> {
        let mut rows_read = 0_u64;

        if state.is_eof {
            return Ok(rows_read);
        }

        while rows_read < requested {
            let packet = self.read_packet()?;

            if packet.first() == Some(&0xFF) {
                // server-reported failure; drop the streaming flag before
                // surfacing it
                results.unbuffered_active = false;

                return Err(MySqlDatabaseError::decode(&packet)?.into());
            }

            if EofPacket::is_eof(&packet) {
                let eof = EofPacket::decode(&packet)?;

                debug!(
                    "end of result set: warnings={} has_next={}",
                    eof.warnings,
                    eof.has_next()
                );

                results.warning_count = eof.warnings;
                results.has_next = eof.has_next();
                results.unbuffered_active = false;
                state.is_eof = true;

                break;
            }

            state.n_rows += 1;
            state.n_rows_in_batch += 1;

            let row = TextRow::decode(packet, state.columns.len());
            debug_assert_eq!(row.len(), state.columns.len());

            if let Some(columnar) = &mut state.columnar {
                columnar.write_row(&row, &state.columns, &results.options)?;
            } else {
                let values = state
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(index, column)| decode_value(row.get(index), column, &results.options))
                    .collect::<Result<Vec<_>>>()?;

                state.rows.push(assemble(state.output, &state.names, values));
            }

            rows_read += 1;
        }

        Ok(rows_read)
    }
}
