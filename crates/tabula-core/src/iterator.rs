//! Pull iterator over the records of one source
//!
//! The iterator owns the cursor state for a single input: the record parser,
//! the current record, and the record terminator fixed by the first record
//! that had one. Every later terminator has to match it.

use std::io::Read;

use crate::error::{Error, ParseErrorKind, Result};
use crate::parser::RecordParser;
use crate::settings::{RecordTerminator, Settings};
use crate::source::{CharSource, ReadSource, StrSource};

/// 1-based line and position within the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Line number
    pub line: usize,
    /// Character position within the line
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// Where an iterator is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IteratorState {
    /// `advance` has not been called yet
    NotStarted,
    /// A record is available
    HasRecord,
    /// No more records (end of input or a parse error)
    Exhausted,
    /// `close` was called
    Closed,
}

/// Forward-only record iterator
///
/// # Example
///
/// ```rust
/// use tabula_core::{CsvIterator, Settings};
///
/// let mut it = CsvIterator::from_str("Denel,NTW-20\r\nWalther,WA 2000", &Settings::default())?;
/// while it.advance()? {
///     let record = it.record()?.unwrap_or_default();
///     assert_eq!(record.len(), 2);
/// }
/// assert_eq!(it.record_number()?, 2);
/// # Ok::<(), tabula_core::Error>(())
/// ```
#[derive(Debug)]
pub struct CsvIterator<S> {
    source: Option<S>,
    parser: Option<RecordParser>,
    record: Option<Vec<Option<String>>>,
    terminator: Option<RecordTerminator>,
    record_number: usize,
    position: Position,
    next_line: usize,
    state: IteratorState,
}

impl<'a> CsvIterator<StrSource<'a>> {
    /// Iterate over the records of an in-memory string
    pub fn from_str(text: &'a str, settings: &Settings) -> Result<Self> {
        Self::new(StrSource::new(text), settings)
    }
}

impl<R: Read> CsvIterator<ReadSource<R>> {
    /// Iterate over UTF-8 text read from `reader`
    ///
    /// Pass `&mut reader` to keep using the reader after the iterator is gone.
    pub fn from_reader(reader: R, settings: &Settings) -> Result<Self> {
        Self::new(ReadSource::new(reader), settings)
    }
}

impl<S: CharSource> CsvIterator<S> {
    /// Create an iterator over any character source
    pub fn new(source: S, settings: &Settings) -> Result<Self> {
        let parser = RecordParser::new(settings)?;
        Ok(Self {
            source: Some(source),
            parser: Some(parser),
            record: None,
            terminator: settings.record_terminator,
            record_number: 0,
            position: Position::default(),
            next_line: 1,
            state: IteratorState::NotStarted,
        })
    }

    /// Move to the next record. Returns `false` once the input is exhausted.
    ///
    /// After an error the iterator is exhausted; there is no resynchronisation.
    pub fn advance(&mut self) -> Result<bool> {
        match self.state {
            IteratorState::Closed => return Err(Error::Closed),
            IteratorState::Exhausted => {
                self.record = None;
                return Ok(false);
            }
            IteratorState::NotStarted | IteratorState::HasRecord => {}
        }

        let (Some(source), Some(parser)) = (self.source.as_mut(), self.parser.as_mut()) else {
            return Err(Error::Closed);
        };

        let parsed = match parser.parse(source, self.next_line, 1) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => {
                log::trace!("end of input after {} records", self.record_number);
                self.exhaust();
                return Ok(false);
            }
            Err(e) => {
                self.exhaust();
                return Err(e);
            }
        };

        self.record_number += 1;
        self.position = Position {
            line: parsed.line,
            column: parsed.column,
        };
        self.next_line = parsed.line + 1;
        self.record = Some(parsed.fields);
        self.state = IteratorState::HasRecord;

        if let Some(observed) = parsed.terminator {
            match self.terminator {
                None => {
                    log::debug!(
                        "record terminator fixed to {} by record {}",
                        observed,
                        self.record_number
                    );
                    self.terminator = Some(observed);
                }
                Some(fixed) if fixed != observed => {
                    log::debug!(
                        "record {} ends with {} but {} was fixed",
                        self.record_number,
                        observed,
                        fixed
                    );
                    self.exhaust();
                    return Err(Error::parse(
                        ParseErrorKind::InconsistentRecordTerminator,
                        self.position.line,
                        self.position.column,
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(true)
    }

    fn exhaust(&mut self) {
        self.record = None;
        self.state = IteratorState::Exhausted;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == IteratorState::Closed {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// The current record, `None` before the first `advance` or once exhausted
    pub fn record(&self) -> Result<Option<&[Option<String>]>> {
        self.ensure_open()?;
        Ok(self.record.as_deref())
    }

    /// Move the current record out, leaving the iterator without one
    pub fn take_record(&mut self) -> Result<Option<Vec<Option<String>>>> {
        self.ensure_open()?;
        Ok(self.record.take())
    }

    /// 1-based number of the current record (0 before the first one)
    pub fn record_number(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.record_number)
    }

    /// Line at the end of the current record
    pub fn line(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.position.line)
    }

    /// Position within the line at the end of the current record
    pub fn column(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.position.column)
    }

    /// Line and position at the end of the current record
    pub fn position(&self) -> Result<Position> {
        self.ensure_open()?;
        Ok(self.position)
    }

    /// The record terminator in force: forced by settings or fixed by the first record
    pub fn record_terminator(&self) -> Option<RecordTerminator> {
        self.terminator
    }

    /// Current lifecycle state
    pub fn state(&self) -> IteratorState {
        self.state
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.state == IteratorState::Closed
    }

    /// Release the source and parser buffers. Calling it again does nothing.
    pub fn close(&mut self) {
        if self.state == IteratorState::Closed {
            return;
        }
        log::trace!("closing iterator after {} records", self.record_number);
        self.source = None;
        self.parser = None;
        self.record = None;
        self.state = IteratorState::Closed;
    }

    /// Stop iterating and hand the source back, or `None` if already closed
    pub fn into_inner(mut self) -> Option<S> {
        self.source.take()
    }

    /// Iterate over the remaining records by value
    ///
    /// The adapter stops after the first error.
    pub fn records(&mut self) -> Records<'_, S> {
        Records {
            iter: self,
            failed: false,
        }
    }
}

/// Record-by-record adapter returned by [`CsvIterator::records`]
#[derive(Debug)]
pub struct Records<'a, S> {
    iter: &'a mut CsvIterator<S>,
    failed: bool,
}

impl<S: CharSource> Iterator for Records<'_, S> {
    type Item = Result<Vec<Option<String>>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let step = match self.iter.advance() {
            Ok(true) => self.iter.take_record().map(|r| r.unwrap_or_default()),
            Ok(false) => return None,
            Err(e) => Err(e),
        };
        if step.is_err() {
            self.failed = true;
        }
        Some(step)
    }
}
